//! Artifact writers.
//!
//! A successful run leaves three files beside the collation: the state
//! matrix (`.tx`), the ordering constraints (`.no`), and the variant
//! listing (`.vr`). Each writer renders to a string so the run driver
//! can hold all three back until every pass has succeeded.

pub mod constraints;
pub mod listing;
pub mod matrix;
