//! The run driver.
//!
//! One call interprets a collation file, reduces it, stratifies it, and
//! writes the three artifacts beside it: `<file>.tx` (state matrix),
//! `<file>.no` (ordering constraints), `<file>.vr` (variant listing).
//! Nothing is written while warnings stand; a collation with problems
//! is fixed and rerun, never half-trusted.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::errors::{PrepError, Result};
use crate::interp;
use crate::model::Collation;
use crate::output;
use crate::reduce::{self, Reduction};
use crate::strata;

/// Counts of a completed run, also serialized by `--report-json`.
#[derive(Debug, Serialize)]
pub struct Report {
    pub parallels: usize,
    pub witnesses: usize,
    pub pieces: usize,
    pub units: usize,
    pub reading_sets: usize,
    pub active_hands: usize,
    pub weighted_units: u32,
    pub strata: usize,
    pub notes: usize,
    pub reduction: Reduction,
}

/// How a run ended, short of a fatal error.
#[derive(Debug)]
pub enum Outcome {
    /// Artifacts written.
    Clean(Report),
    /// Warnings stood; no artifacts written.
    Warnings(usize),
}

/// Interpret, reduce, stratify, and write artifacts for one collation.
pub fn run(
    collation: &Path,
    mandates: &[String],
    config: &Config,
    report_json: Option<&Path>,
) -> Result<Outcome> {
    let source =
        std::fs::read_to_string(collation).map_err(|err| PrepError::io(collation, err))?;

    let mut coll = Collation::new(config);
    let mut diags = Diagnostics::new();
    interp::interpret(&source, &mut coll, &mut diags, config)?;
    tracing::info!(
        witnesses = coll.n_witnesses(),
        parallels = coll.parallels.len(),
        pieces = coll.pieces.len(),
        units = coll.n_units(),
        weighted_units = coll.weighted_units,
        "interpreted {}",
        collation.display()
    );
    if !diags.is_clean() {
        return Ok(Outcome::Warnings(diags.warning_count()));
    }

    let reduction = reduce::reduce(&mut coll, &mut diags, config, mandates)?;
    let strata = strata::stratify(&mut coll, config.granularity);
    tracing::info!(
        active_hands = coll.active_hands(),
        weighted_units = coll.weighted_units,
        strata,
        "reduced {}",
        collation.display()
    );

    let matrix = output::matrix::render(&coll);
    let constraints = output::constraints::render(&coll, &mut diags);
    let listing = output::listing::render(&source, &coll);
    write_artifact(collation, "tx", &matrix)?;
    write_artifact(collation, "no", &constraints)?;
    write_artifact(collation, "vr", &listing)?;

    let report = Report {
        parallels: coll.parallels.len(),
        witnesses: coll.n_witnesses(),
        pieces: coll.pieces.len(),
        units: coll.n_units(),
        reading_sets: coll.sets.len(),
        active_hands: coll.active_hands(),
        weighted_units: coll.weighted_units,
        strata,
        notes: diags.note_count(),
        reduction,
    };
    if let Some(path) = report_json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|err| PrepError::io(path, err.into()))?;
        std::fs::write(path, json).map_err(|err| PrepError::io(path, err))?;
    }
    Ok(Outcome::Clean(report))
}

/// `<collation>.<ext>`, keeping whatever extension the collation had.
fn artifact_path(collation: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(collation.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

fn write_artifact(collation: &Path, ext: &str, contents: &str) -> Result<()> {
    let path = artifact_path(collation, ext);
    std::fs::write(&path, contents).map_err(|err| PrepError::io(path, err))
}
