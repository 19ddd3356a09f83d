//! Duplicate witnesses collapse onto their first representative.

use crate::diagnostics::Diagnostics;
use crate::model::Collation;

use super::{Cause, Reduction, Suppression};

/// Suppress any witness whose first hand carries exactly the same
/// cells as an earlier surviving witness of the same parallel. Cells
/// compare by identity, not by content: witnesses are duplicates only
/// when the same claims covered them throughout.
pub(super) fn pass(coll: &mut Collation, diags: &mut Diagnostics, summary: &mut Reduction) {
    for pp in 0..coll.parallels.len() {
        for ms1 in 0..coll.n_witnesses() {
            if coll.parallels[pp].testimony[ms1].hands[0].suppressed {
                continue;
            }
            for ms2 in ms1 + 1..coll.n_witnesses() {
                if coll.parallels[pp].testimony[ms2].hands[0].suppressed {
                    continue;
                }
                if !identical(coll, pp, ms1, ms2) {
                    continue;
                }
                let kept = coll.input_label(pp, ms1, 0);
                let label = coll.input_label(pp, ms2, 0);
                for hand in &mut coll.parallels[pp].testimony[ms2].hands {
                    hand.suppressed = true;
                }
                diags.note(format_args!("Dropping duplicate: {label} = {kept}"));
                summary.suppressed.push(Suppression {
                    label,
                    count: 0,
                    cause: Cause::Duplicate,
                });
            }
        }
    }
}

fn identical(coll: &Collation, pp: usize, ms1: usize, ms2: usize) -> bool {
    let t1 = &coll.parallels[pp].testimony[ms1];
    let t2 = &coll.parallels[pp].testimony[ms2];
    (0..coll.pieces.len()).all(|piece| t1.hands[0].cell(piece) == t2.hands[0].cell(piece))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn run(source: &str) -> (Collation, Reduction) {
        let (mut coll, mut diags) = testing::interpret(source);
        let mut summary = Reduction::default();
        pass(&mut coll, &mut diags, &mut summary);
        (coll, summary)
    }

    #[test]
    fn test_shared_claims_collapse() {
        let (coll, summary) =
            run("* A B C ; = $u A B ; [ w | a b ] < x $u | y C > [ v | c d ] < x $u | z C >");
        assert!(coll.surviving(0, 0, 0));
        assert!(!coll.surviving(0, 1, 0));
        assert!(coll.surviving(0, 2, 0));
        assert_eq!(summary.suppressed.len(), 1);
        assert_eq!(summary.suppressed[0].label, "B");
        assert_eq!(summary.suppressed[0].cause, Cause::Duplicate);
    }

    #[test]
    fn test_same_content_different_claims_survive() {
        let (coll, summary) = run("* A B ; [ w | a b ] < x A | x B >");
        assert!(coll.surviving(0, 1, 0));
        assert!(summary.suppressed.is_empty());
    }

    #[test]
    fn test_one_divergent_piece_breaks_identity() {
        let (coll, _) =
            run("* A B C ; = $u A B ; [ w | a b ] < x $u | y C > [ v | c d ] < x $u | z C | w B >");
        assert!(coll.surviving(0, 1, 0));
    }

    #[test]
    fn test_duplicates_compare_within_their_parallel() {
        let (coll, _) = run(
            "* A B /m /l ; = $u A B ; [ w | a b ] < x $u > /l = $v A B ; [ v | c d ] < y $v | z B >",
        );
        assert!(!coll.surviving(0, 1, 0));
        assert!(coll.surviving(1, 1, 0));
    }

    #[test]
    fn test_every_copy_of_the_first_witness_falls() {
        let (coll, summary) = run("* A B C ; = $u A B C ; [ w | a b ] < x $u >");
        assert!(coll.surviving(0, 0, 0));
        assert!(!coll.surviving(0, 1, 0));
        assert!(!coll.surviving(0, 2, 0));
        assert_eq!(summary.suppressed.len(), 2);
    }
}
