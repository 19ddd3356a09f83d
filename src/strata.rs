//! Chronological strata and ordering constraints.
//!
//! Each surviving hand lands in a stratum from its average date,
//! either by literary period or by a fixed slice of years. Raw strata
//! are then compacted to consecutive numbers from zero, earliest
//! first, so the tree builder never sees a gap.

use std::collections::{BTreeSet, HashMap};

use crate::config::Granularity;
use crate::model::{Collation, MAX_HANDS};

/// Upper bounds of the literary periods, classical antiquity through
/// the sixteenth century.
const PERIODS: [i32; 13] = [
    100, 350, 450, 600, 775, 950, 1100, 1200, 1300, 1400, 1500, 1600, 9999,
];

fn raw_stratum(average: i32, granularity: Granularity) -> i32 {
    match granularity {
        Granularity::Literary => PERIODS
            .iter()
            .position(|&bound| average <= bound)
            .unwrap_or(PERIODS.len()) as i32,
        Granularity::Years(slice) => {
            let slice = slice as i32;
            (average + slice / 2) / slice
        }
    }
}

/// Assign every surviving hand its compacted stratum. Returns the
/// number of distinct strata in use.
pub fn stratify(coll: &mut Collation, granularity: Granularity) -> usize {
    let mut used = BTreeSet::new();
    for pp in 0..coll.parallels.len() {
        for ms in 0..coll.n_witnesses() {
            for h in 0..MAX_HANDS {
                if coll.surviving(pp, ms, h) {
                    used.insert(raw_stratum(
                        coll.parallels[pp].testimony[ms].hands[h].average,
                        granularity,
                    ));
                }
            }
        }
    }
    let rank: HashMap<i32, usize> = used.iter().enumerate().map(|(i, &raw)| (raw, i)).collect();
    for pp in 0..coll.parallels.len() {
        for ms in 0..coll.n_witnesses() {
            for h in 0..MAX_HANDS {
                if !coll.surviving(pp, ms, h) {
                    continue;
                }
                let hand = &mut coll.parallels[pp].testimony[ms].hands[h];
                hand.stratum = rank[&raw_stratum(hand.average, granularity)];
            }
        }
    }
    used.len()
}

/// Hands that certainly precede the given one: every hand whose latest
/// possible date falls before this hand's earliest, and the same
/// witness's hands up to and including itself. An open latest bound
/// precedes nothing.
pub fn predecessors(
    coll: &Collation,
    pp: usize,
    ms: usize,
    h: usize,
) -> Vec<(usize, usize, usize)> {
    let earliest = coll.parallels[pp].testimony[ms].hands[h].earliest;
    let mut preds = Vec::new();
    for pp2 in 0..coll.parallels.len() {
        for ms2 in 0..coll.n_witnesses() {
            for h2 in 0..MAX_HANDS {
                if !coll.surviving(pp2, ms2, h2) {
                    continue;
                }
                let other = &coll.parallels[pp2].testimony[ms2].hands[h2];
                let certainly_earlier = matches!(other.latest, Some(latest) if earliest > latest);
                let same_lineage = pp2 == pp && ms2 == ms && h >= h2;
                if certainly_earlier || same_lineage {
                    preds.push((pp2, ms2, h2));
                }
            }
        }
    }
    preds
}
