//! The ordering constraints.
//!
//! One row per surviving hand: its stratum, then every hand known to
//! precede it. Every surviving hand with no chronology record is
//! reported, since its open dates make it precede nothing.

use std::fmt::Write;

use crate::diagnostics::Diagnostics;
use crate::model::{Collation, MAX_HANDS};
use crate::strata;

pub fn render(coll: &Collation, diags: &mut Diagnostics) -> String {
    note_undated(coll, diags);
    let mut out = String::new();
    for pp in 0..coll.parallels.len() {
        for ms in 0..coll.n_witnesses() {
            for h in 0..MAX_HANDS {
                if !coll.surviving(pp, ms, h) {
                    continue;
                }
                let hand = &coll.parallels[pp].testimony[ms].hands[h];
                let _ = write!(out, "{:<9} {} < ", coll.label(pp, ms, h), hand.stratum);
                for (pp2, ms2, h2) in strata::predecessors(coll, pp, ms, h) {
                    let _ = write!(out, "{} ", coll.label(pp2, ms2, h2));
                }
                out.push_str(">\n");
            }
        }
    }
    out
}

fn note_undated(coll: &Collation, diags: &mut Diagnostics) {
    for pp in 0..coll.parallels.len() {
        for ms in 0..coll.n_witnesses() {
            for h in 0..MAX_HANDS {
                if !coll.surviving(pp, ms, h) {
                    continue;
                }
                if coll.parallels[pp].testimony[ms].hands[h].latest.is_some() {
                    continue;
                }
                let w = &coll.witnesses[ms];
                diags.note(format_args!(
                    "No chron entry for {} ~ {} ~ {}",
                    coll.input_label(pp, ms, h),
                    w.chron_name,
                    w.display_name
                ));
            }
        }
    }
}
