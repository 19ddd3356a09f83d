//! Testimony reduction.
//!
//! After interpretation the collation is narrowed in a fixed order:
//! command-line mandates, a constancy pass, coverage thresholds,
//! constancy again, duplicate suppression, an optional further
//! constancy pass, and the chronological cutoff. No pass ever revives
//! a hand, so the order is load-bearing: coverage must see the weights
//! constancy left behind, and the cutoff must not reopen units that
//! duplicate suppression settled.

mod constancy;
mod coverage;
mod identity;
mod mandate;

use serde::Serialize;

use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::errors::Result;
use crate::model::{Collation, MAX_HANDS};

/// Why a hand left the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cause {
    Fragment,
    Correction,
    Duplicate,
    Late,
}

/// One suppressed hand, with the count that condemned it.
#[derive(Debug, Clone, Serialize)]
pub struct Suppression {
    pub label: String,
    pub count: i64,
    pub cause: Cause,
}

/// What reduction did, for the run report.
#[derive(Debug, Default, Serialize)]
pub struct Reduction {
    pub fragment_threshold: u32,
    pub correction_threshold: u32,
    pub zeroed_units: usize,
    pub suppressed: Vec<Suppression>,
}

/// Run every reduction pass over the collation.
pub fn reduce(
    coll: &mut Collation,
    diags: &mut Diagnostics,
    config: &Config,
    mandates: &[String],
) -> Result<Reduction> {
    mandate::apply(coll, mandates)?;
    let mut summary = Reduction::default();
    summary.zeroed_units += constancy::pass(coll, config.no_singletons);
    coverage::pass(coll, diags, config, &mut summary);
    summary.zeroed_units += constancy::pass(coll, config.no_singletons);
    if !config.keep_identical {
        identity::pass(coll, diags, &mut summary);
    }
    if config.constancy_after_identity {
        summary.zeroed_units += constancy::pass(coll, config.no_singletons);
    }
    if let Some(year) = config.year_cutoff {
        suppress_late(coll, diags, year, &mut summary);
    }
    coll.refresh_corrected();
    Ok(summary)
}

/// Drop hands dated entirely after the cutoff year. Undated hands sit
/// at year zero and always survive.
fn suppress_late(
    coll: &mut Collation,
    diags: &mut Diagnostics,
    year: i32,
    summary: &mut Reduction,
) {
    for pp in 0..coll.parallels.len() {
        for ms in 0..coll.n_witnesses() {
            for h in 0..MAX_HANDS {
                if !coll.surviving(pp, ms, h) {
                    continue;
                }
                let hand = &coll.parallels[pp].testimony[ms].hands[h];
                let earliest = hand.earliest;
                if earliest <= year || hand.mandated {
                    continue;
                }
                let label = coll.input_label(pp, ms, h);
                coll.parallels[pp].testimony[ms].hands[h].suppressed = true;
                diags.note(format_args!(
                    "Dropping late hand: {label} ({earliest} after {year})"
                ));
                summary.suppressed.push(Suppression {
                    label,
                    count: i64::from(earliest),
                    cause: Cause::Late,
                });
            }
        }
    }
}
