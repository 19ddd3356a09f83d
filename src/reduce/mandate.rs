//! Command-line mandates.

use crate::errors::{PrepError, Result};
use crate::macros::MacroRegistry;
use crate::model::{Collation, Lookup};

/// Honor the command-line allow-list. Names resolve against the first
/// parallel, like references in the collation body: `$m` mandates the
/// first hand of every member of that group (root exempt), and naming
/// a corrector mandates its first hand too, since the corrector cannot
/// stand without it. A name that cannot be honored stops the run
/// before anything is suppressed. With at least one name given, every
/// hand neither suppressed nor mandated is then dropped, in every
/// parallel: the list is an allow-list, not a hint.
pub(super) fn apply(coll: &mut Collation, names: &[String]) -> Result<()> {
    for name in names {
        if name.starts_with('$') {
            mandate_group(coll, name)?;
            continue;
        }
        let (witness, hand) = match coll.resolve_in(0, name) {
            Lookup::Found { witness, hand } => (witness, hand),
            Lookup::Suppressed => {
                return Err(PrepError::mandate(name, "suppressed in the collation"));
            }
            Lookup::Unknown => return Err(PrepError::mandate(name, "not a declared witness")),
            Lookup::BadHand => return Err(PrepError::mandate(name, "no such hand")),
        };
        for pp in 0..coll.parallels.len() {
            let t = &mut coll.parallels[pp].testimony[witness];
            t.hands[hand].mandated = true;
            t.hands[0].mandated = true;
        }
    }
    if names.is_empty() {
        return Ok(());
    }
    for parallel in &mut coll.parallels {
        for testimony in &mut parallel.testimony {
            for hand in &mut testimony.hands {
                if !hand.mandated {
                    hand.suppressed = true;
                }
            }
        }
    }
    Ok(())
}

/// `$m` on the command line mandates the first hand of every member,
/// in every parallel. Groups resolve against the first parallel's
/// registry; the root is exempt, as with every group operation.
fn mandate_group(coll: &mut Collation, token: &str) -> Result<()> {
    let members: Vec<usize> = MacroRegistry::name_of(token)
        .and_then(|name| coll.parallels.first()?.macros.get(name))
        .map(|mac| mac.members().collect())
        .ok_or_else(|| PrepError::mandate(token, "not a declared macro"))?;
    let first = usize::from(coll.root.is_some());
    for parallel in &mut coll.parallels {
        for &ms in members.iter().filter(|&&ms| ms >= first) {
            parallel.testimony[ms].hands[0].mandated = true;
        }
    }
    Ok(())
}
