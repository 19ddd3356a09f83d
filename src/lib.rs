//! # prep
//!
//! Prepare a hand-authored manuscript collation for stemmatic analysis.
//!
//! A collation file describes, for every place the text varies, which
//! witnesses read what, corrector by corrector. `prep` interprets that
//! notation, weeds out testimony that cannot inform a tree (fragments,
//! trivial corrections, duplicates, constant units), dates what remains,
//! and writes three artifacts for the tree builder: a state matrix, a
//! set of chronological ordering constraints, and a variant listing.
//!
//! The stages line up with the modules:
//!
//! * [`lexer`] — whitespace-delimited words with line tracking
//! * [`interp`] — the command interpreter filling a [`model::Collation`]
//! * [`reduce`] — the suppression passes
//! * [`strata`] — chronological strata and precedence
//! * [`output`] — the three artifact renderers
//! * [`run`] — the driver tying a whole run together

pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod interp;
pub mod lexer;
pub mod macros;
pub mod model;
pub mod output;
pub mod reduce;
pub mod run;
pub mod strata;

#[cfg(test)]
pub(crate) mod testing;
