//! Constant units carry no signal and lose their weight.

use std::collections::HashMap;

use crate::model::{Collation, MAX_HANDS, MISSING};

/// Zero the weight of units that no longer vary across surviving
/// hands. Under the singleton rule a state must be attested twice to
/// count as variation. Returns how many units were zeroed.
pub(super) fn pass(coll: &mut Collation, no_singletons: bool) -> usize {
    let mut zeroed = 0;
    for piece in 0..coll.pieces.len() {
        for unit in 0..coll.pieces[piece].units {
            let var = coll.pieces[piece].first_unit + unit;
            if coll.weights[var] == 0 {
                continue;
            }
            if informative(coll, piece, unit, no_singletons) {
                continue;
            }
            coll.weighted_units -= coll.weights[var];
            coll.weights[var] = 0;
            zeroed += 1;
        }
    }
    zeroed
}

/// A unit stays informative while two states are properly attested.
fn informative(coll: &Collation, piece: usize, unit: usize, no_singletons: bool) -> bool {
    let mut counts: HashMap<char, u32> = HashMap::new();
    for pp in 0..coll.parallels.len() {
        for ms in 0..coll.n_witnesses() {
            for h in 0..MAX_HANDS {
                if !coll.surviving(pp, ms, h) {
                    continue;
                }
                let state = coll.state_at(pp, ms, h, piece, unit);
                if state != MISSING {
                    *counts.entry(state).or_insert(0) += 1;
                }
            }
        }
    }
    let need = if no_singletons { 2 } else { 1 };
    counts.values().filter(|&&n| n >= need).count() >= 2
}
