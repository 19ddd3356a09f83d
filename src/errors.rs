//! Run-level error type.
//!
//! Only conditions that stop a run outright are errors. Recoverable problems
//! in the collation itself become warnings, collected by
//! [`crate::diagnostics::Diagnostics`] and reported at the end of the run.

use std::path::PathBuf;

use thiserror::Error;

use crate::diagnostics::Diagnostic;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PrepError>;

/// A condition that terminates the run immediately.
#[derive(Error, Debug)]
pub enum PrepError {
    /// A file could not be opened, read, or written.
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The collation is malformed beyond recovery.
    #[error("{0}")]
    Fatal(Diagnostic),

    /// A witness or group named on the command line cannot be honored.
    #[error("cannot mandate {name}: {reason}")]
    Mandate { name: String, reason: &'static str },
}

impl PrepError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PrepError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn mandate(name: impl Into<String>, reason: &'static str) -> Self {
        PrepError::Mandate {
            name: name.into(),
            reason,
        }
    }
}
