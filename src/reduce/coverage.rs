//! Coverage thresholds: fragments and trivial corrections.

use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::model::{Collation, MAX_HANDS, MISSING};

use super::{Cause, Reduction, Suppression};

/// Suppress first hands with too little extant testimony and
/// correctors that differ too little from the hand they corrected.
/// Mandated hands are exempt but still logged.
pub(super) fn pass(
    coll: &mut Collation,
    diags: &mut Diagnostics,
    config: &Config,
    summary: &mut Reduction,
) {
    let f_thresh = config
        .fragment_threshold
        .unwrap_or(coll.weighted_units / 2 + 1);
    let c_thresh = config.correction_threshold.unwrap_or(if coll.n_units() > 200 {
        100
    } else {
        coll.weighted_units / 10 + 1
    });
    summary.fragment_threshold = f_thresh;
    summary.correction_threshold = c_thresh;

    for pp in 0..coll.parallels.len() {
        for ms in 0..coll.n_witnesses() {
            if coll.parallels[pp].testimony[ms].hands[0].suppressed {
                continue;
            }
            let extant = extant_weight(coll, pp, ms);
            if extant < f_thresh {
                let label = coll.input_label(pp, ms, 0);
                if coll.parallels[pp].testimony[ms].hands[0].mandated {
                    diags.note(format_args!(
                        "Keeping mandated fragment: {label} ({extant} of {f_thresh})"
                    ));
                } else {
                    for hand in &mut coll.parallels[pp].testimony[ms].hands {
                        hand.suppressed = true;
                    }
                    diags.note(format_args!(
                        "Dropping fragment: {label} ({extant} of {f_thresh})"
                    ));
                    summary.suppressed.push(Suppression {
                        label,
                        count: i64::from(extant),
                        cause: Cause::Fragment,
                    });
                    continue;
                }
            }
            let mut last = 0;
            for h in 1..MAX_HANDS {
                let hand = &coll.parallels[pp].testimony[ms].hands[h];
                if hand.suppressed || !hand.testified() {
                    continue;
                }
                let mandated = hand.mandated;
                // A correction is measured against the nearest earlier
                // hand still in the run, whatever order the hands
                // entered the collation, and inherits from it too.
                coll.parallels[pp].testimony[ms].hands[h].prior = last;
                let diffs = correction_weight(coll, pp, ms, h);
                if diffs >= c_thresh {
                    last = h;
                    continue;
                }
                let label = coll.input_label(pp, ms, h);
                if mandated {
                    diags.note(format_args!(
                        "Keeping mandated correction: {label} ({diffs} of {c_thresh})"
                    ));
                    last = h;
                    continue;
                }
                coll.parallels[pp].testimony[ms].hands[h].suppressed = true;
                diags.note(format_args!(
                    "Dropping correction: {label} ({diffs} of {c_thresh})"
                ));
                if diffs > c_thresh / 2 {
                    diags.note(format_args!("Near miss: {label}"));
                }
                summary.suppressed.push(Suppression {
                    label,
                    count: i64::from(diffs),
                    cause: Cause::Correction,
                });
            }
        }
    }
}

/// Weighted testimony a first hand actually shows.
fn extant_weight(coll: &Collation, pp: usize, ms: usize) -> u32 {
    let mut total = 0;
    for (piece, p) in coll.pieces.iter().enumerate() {
        for unit in 0..p.units {
            let var = p.first_unit + unit;
            if coll.weights[var] == 0 {
                continue;
            }
            if coll.state_at(pp, ms, 0, piece, unit) != MISSING {
                total += coll.weights[var];
            }
        }
    }
    total
}

/// Weighted difference between a corrector and the hand it corrected.
/// Units where either hand is missing do not count.
fn correction_weight(coll: &Collation, pp: usize, ms: usize, h: usize) -> u32 {
    let prior = coll.parallels[pp].testimony[ms].hands[h].prior;
    let mut diffs = 0;
    for (piece, p) in coll.pieces.iter().enumerate() {
        for unit in 0..p.units {
            let var = p.first_unit + unit;
            if coll.weights[var] == 0 {
                continue;
            }
            let corrected = coll.state_at(pp, ms, h, piece, unit);
            let original = coll.state_at(pp, ms, prior, piece, unit);
            if corrected != original && corrected != MISSING && original != MISSING {
                diffs += coll.weights[var];
            }
        }
    }
    diffs
}
