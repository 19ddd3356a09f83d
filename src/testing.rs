//! Test support: one-call interpretation of collation snippets.

use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::errors::Result;
use crate::interp;
use crate::model::Collation;

/// Interpret `source` under the given configuration.
pub fn interpret_with(source: &str, config: &Config) -> Result<(Collation, Diagnostics)> {
    let mut coll = Collation::new(config);
    let mut diags = Diagnostics::new();
    interp::interpret(source, &mut coll, &mut diags, config)?;
    Ok((coll, diags))
}

/// Interpret `source` under default configuration, panicking on fatal
/// errors. Warnings are left for the caller to inspect.
pub fn interpret(source: &str) -> (Collation, Diagnostics) {
    match interpret_with(source, &Config::default()) {
        Ok(parts) => parts,
        Err(err) => panic!("collation does not interpret: {err}"),
    }
}

/// Interpret `source` under default configuration, keeping the error.
pub fn try_interpret(source: &str) -> Result<(Collation, Diagnostics)> {
    interpret_with(source, &Config::default())
}
