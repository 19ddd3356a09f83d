//! Command-line interface for prep.
//!
//! Usage:
//!   prep <collation> [name ...]        - interpret, reduce, write artifacts
//!   prep <collation> --report-json p   - also write a JSON run report
//!
//! Trailing names are witnesses or `$`-groups to keep no matter what;
//! naming any makes them a hard allow-list for the reduction passes.
//! All other tuning comes from the environment (YEARGRAN, FTHRESH,
//! CTHRESH, YEAR, NOSING, ROOT, WEIGHBYED, IDOK, IDCONST, ROOTSTATE).
//!
//! Exit status: 0 for a clean run; the warning count (capped at 125)
//! when the collation drew warnings, in which case no artifacts are
//! written; 253 for a fatal error.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use prep::config::Config;
use prep::run::{self, Outcome};

const MAX_WARNING_STATUS: usize = 125;
const FATAL_STATUS: u8 = 253;

/// Prepare a manuscript collation for stemmatic analysis.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Collation file to interpret.
    collation: PathBuf,

    /// Witnesses or $-groups exempt from automatic suppression; with at
    /// least one named, everything else is suppressed.
    mandates: Vec<String>,

    /// Write a JSON run report to this path.
    #[arg(long, value_name = "PATH")]
    report_json: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let config = Config::from_env();
    match run::run(
        &cli.collation,
        &cli.mandates,
        &config,
        cli.report_json.as_deref(),
    ) {
        Ok(Outcome::Clean(report)) => {
            tracing::info!(
                active_hands = report.active_hands,
                weighted_units = report.weighted_units,
                "done"
            );
            ExitCode::SUCCESS
        }
        Ok(Outcome::Warnings(count)) => {
            eprintln!("prep: {count} warnings; no artifacts written");
            ExitCode::from(count.min(MAX_WARNING_STATUS) as u8)
        }
        Err(err) => {
            eprintln!("prep: {err}");
            ExitCode::from(FATAL_STATUS)
        }
    }
}
