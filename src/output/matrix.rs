//! The state matrix.
//!
//! One row per surviving hand. The header carries the row count and
//! the total weight; each state character repeats by its unit's
//! weight, so every row is exactly that wide. Zero-weight units leave
//! no column at all.

use std::fmt::Write;

use crate::model::{Collation, MAX_HANDS};

pub fn render(coll: &Collation) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<9} {}", coll.active_hands(), coll.weighted_units);
    for pp in 0..coll.parallels.len() {
        for ms in 0..coll.n_witnesses() {
            for h in 0..MAX_HANDS {
                if !coll.surviving(pp, ms, h) {
                    continue;
                }
                let _ = write!(out, "{:<9} ", coll.label(pp, ms, h));
                for (piece, p) in coll.pieces.iter().enumerate() {
                    for unit in 0..p.units {
                        let weight = coll.weights[p.first_unit + unit];
                        if weight == 0 {
                            continue;
                        }
                        let state = coll.state_at(pp, ms, h, piece, unit);
                        for _ in 0..weight {
                            out.push(state);
                        }
                    }
                }
                out.push('\n');
            }
        }
    }
    out
}
