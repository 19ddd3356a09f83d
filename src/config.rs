//! Run configuration.
//!
//! Tuning comes entirely from the environment, the way collation runs are
//! driven from per-text shell scripts. Every knob has a safe default; an
//! unparseable value is logged and ignored rather than failing the run.
//!
//! | Variable    | Effect                                                    |
//! |-------------|-----------------------------------------------------------|
//! | `YEARGRAN`  | Stratum size in years, or `-1` for the literary table     |
//! | `FTHRESH`   | Fragment threshold override                               |
//! | `CTHRESH`   | Correction threshold override                             |
//! | `YEAR`      | Suppress hands whose earliest date falls after this year  |
//! | `NOSING`    | Suppress units without two states attested twice          |
//! | `ROOT`      | Declare a synthetic root witness with this name           |
//! | `WEIGHBYED` | Divisor applied to edit-distance weights (0 disables)     |
//! | `IDOK`      | Keep witnesses whose testimony duplicates an earlier one  |
//! | `IDCONST`   | Re-run constancy suppression after identity suppression   |
//! | `ROOTSTATE` | State character the root shows at unset units             |
//! | `HOME`      | Base directory for `~` paths in chronology imports        |

use std::path::PathBuf;

/// How average dates map to strata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// Bucket dates by literary period boundaries.
    Literary,
    /// Bucket dates into spans of the given number of years.
    Years(u32),
}

/// Tunable settings for a run.
#[derive(Debug, Clone)]
pub struct Config {
    pub granularity: Granularity,
    /// Extant-weight threshold below which a witness is a fragment;
    /// defaults to half the weighted units plus one.
    pub fragment_threshold: Option<u32>,
    /// Difference threshold below which a corrector is negligible;
    /// the default depends on the collation size.
    pub correction_threshold: Option<u32>,
    /// Suppress hands whose earliest date falls after this year.
    pub year_cutoff: Option<i32>,
    /// Suppress units where fewer than two states are attested twice.
    pub no_singletons: bool,
    /// Declaration token for the synthetic root witness.
    pub root: Option<String>,
    /// Divisor applied to edit-distance weights; zero disables weighing.
    pub ed_divisor: u32,
    /// Skip identity suppression.
    pub keep_identical: bool,
    /// Re-run constancy suppression after identity suppression.
    pub constancy_after_identity: bool,
    /// State character the root shows at unset units.
    pub root_state: char,
    /// Base directory for `~` paths in chronology imports.
    pub home: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            granularity: Granularity::Literary,
            fragment_threshold: None,
            correction_threshold: None,
            year_cutoff: None,
            no_singletons: false,
            root: None,
            ed_divisor: 6,
            keep_identical: false,
            constancy_after_identity: false,
            root_state: '0',
            home: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Config::default();
        apply_env_overrides(&mut config);
        config
    }
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(raw) = std::env::var("YEARGRAN") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            match trimmed.parse::<i64>() {
                Ok(-1) => config.granularity = Granularity::Literary,
                Ok(n) if n >= 1 => config.granularity = Granularity::Years(n as u32),
                Ok(n) => tracing::warn!("YEARGRAN must be -1 or positive, ignoring: {n}"),
                Err(err) => tracing::warn!("invalid YEARGRAN, ignoring: {err}"),
            }
        }
    }

    if let Ok(raw) = std::env::var("FTHRESH") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            match trimmed.parse::<u32>() {
                Ok(value) => config.fragment_threshold = Some(value),
                Err(err) => tracing::warn!("invalid FTHRESH, ignoring: {err}"),
            }
        }
    }

    if let Ok(raw) = std::env::var("CTHRESH") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            match trimmed.parse::<u32>() {
                Ok(value) => config.correction_threshold = Some(value),
                Err(err) => tracing::warn!("invalid CTHRESH, ignoring: {err}"),
            }
        }
    }

    if let Ok(raw) = std::env::var("YEAR") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            match trimmed.parse::<i32>() {
                Ok(value) => config.year_cutoff = Some(value),
                Err(err) => tracing::warn!("invalid YEAR, ignoring: {err}"),
            }
        }
    }

    if std::env::var("NOSING").is_ok() {
        config.no_singletons = true;
    }

    if let Ok(raw) = std::env::var("ROOT") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            config.root = Some(trimmed.to_string());
        }
    }

    if let Ok(raw) = std::env::var("WEIGHBYED") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            match trimmed.parse::<u32>() {
                Ok(value) => config.ed_divisor = value,
                Err(err) => tracing::warn!("invalid WEIGHBYED, ignoring: {err}"),
            }
        }
    }

    if std::env::var("IDOK").is_ok() {
        config.keep_identical = true;
    }

    if std::env::var("IDCONST").is_ok() {
        config.constancy_after_identity = true;
    }

    if let Ok(raw) = std::env::var("ROOTSTATE") {
        let mut chars = raw.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => config.root_state = c,
            _ => tracing::warn!("ROOTSTATE must be a single character, ignoring: {raw}"),
        }
    }

    if let Ok(raw) = std::env::var("HOME") {
        if !raw.is_empty() {
            config.home = Some(PathBuf::from(raw));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Mutex, MutexGuard, OnceLock};

    fn env_lock() -> MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock")
    }

    struct EnvGuard {
        _lock: MutexGuard<'static, ()>,
        prev: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new(vars: &[(&str, Option<&str>)]) -> Self {
            let lock = env_lock();
            let mut prev = Vec::with_capacity(vars.len());
            for (key, value) in vars {
                prev.push(((*key).to_string(), std::env::var(key).ok()));
                match value {
                    Some(value) => std::env::set_var(key, value),
                    None => std::env::remove_var(key),
                }
            }
            Self { _lock: lock, prev }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in self.prev.drain(..) {
                match value {
                    Some(val) => std::env::set_var(&key, val),
                    None => std::env::remove_var(&key),
                }
            }
        }
    }

    const ALL_KNOBS: [&str; 11] = [
        "YEARGRAN",
        "FTHRESH",
        "CTHRESH",
        "YEAR",
        "NOSING",
        "ROOT",
        "WEIGHBYED",
        "IDOK",
        "IDCONST",
        "ROOTSTATE",
        "HOME",
    ];

    fn clean_env() -> Vec<(&'static str, Option<&'static str>)> {
        ALL_KNOBS.iter().map(|k| (*k, None)).collect()
    }

    #[test]
    fn test_defaults() {
        let vars = clean_env();
        let _guard = EnvGuard::new(&vars);
        let config = Config::from_env();
        assert_eq!(config.granularity, Granularity::Literary);
        assert_eq!(config.fragment_threshold, None);
        assert_eq!(config.correction_threshold, None);
        assert_eq!(config.year_cutoff, None);
        assert!(!config.no_singletons);
        assert_eq!(config.root, None);
        assert_eq!(config.ed_divisor, 6);
        assert!(!config.keep_identical);
        assert!(!config.constancy_after_identity);
        assert_eq!(config.root_state, '0');
    }

    #[test]
    fn test_env_overrides_apply() {
        let mut vars = clean_env();
        vars.extend([
            ("YEARGRAN", Some("50")),
            ("FTHRESH", Some("12")),
            ("CTHRESH", Some("3")),
            ("YEAR", Some("800")),
            ("NOSING", Some("1")),
            ("ROOT", Some("UBS~UBS~Root")),
            ("WEIGHBYED", Some("0")),
            ("IDOK", Some("1")),
            ("IDCONST", Some("1")),
            ("ROOTSTATE", Some("1")),
        ]);
        let _guard = EnvGuard::new(&vars);
        let config = Config::from_env();
        assert_eq!(config.granularity, Granularity::Years(50));
        assert_eq!(config.fragment_threshold, Some(12));
        assert_eq!(config.correction_threshold, Some(3));
        assert_eq!(config.year_cutoff, Some(800));
        assert!(config.no_singletons);
        assert_eq!(config.root.as_deref(), Some("UBS~UBS~Root"));
        assert_eq!(config.ed_divisor, 0);
        assert!(config.keep_identical);
        assert!(config.constancy_after_identity);
        assert_eq!(config.root_state, '1');
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let mut vars = clean_env();
        vars.extend([
            ("YEARGRAN", Some("0")),
            ("FTHRESH", Some("lots")),
            ("ROOTSTATE", Some("ab")),
        ]);
        let _guard = EnvGuard::new(&vars);
        let config = Config::from_env();
        assert_eq!(config.granularity, Granularity::Literary);
        assert_eq!(config.fragment_threshold, None);
        assert_eq!(config.root_state, '0');
    }

    #[test]
    fn test_explicit_literary_granularity() {
        let mut vars = clean_env();
        vars.push(("YEARGRAN", Some("-1")));
        let _guard = EnvGuard::new(&vars);
        assert_eq!(Config::from_env().granularity, Granularity::Literary);
    }
}
