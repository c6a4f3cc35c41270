use std::env;
use std::path::PathBuf;

use log::LevelFilter;

pub const SESSION_LOG_ENV: &str = "BATCHEXEC_SESSION_LOG";
pub const LOG_LEVEL_ENV: &str = "BATCHEXEC_LOG";

pub const DEFAULT_SESSION_LOG: &str = "OUTPUT.txt";
pub const BEGIN_MARKER: &str = "%BEGIN";
pub const END_MARKER: &str = "%END";

/// Run settings: built-in defaults with environment overrides on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub session_log: PathBuf,
    pub begin_marker: String,
    pub end_marker: String,
    pub log_level: LevelFilter,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            session_log: PathBuf::from(DEFAULT_SESSION_LOG),
            begin_marker: BEGIN_MARKER.to_string(),
            end_marker: END_MARKER.to_string(),
            log_level: LevelFilter::Info,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| env::var(key).ok())
    }

    /// Applies overrides from `lookup`. An unparsable log level keeps the default.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup(SESSION_LOG_ENV).filter(|p| !p.is_empty()) {
            self.session_log = PathBuf::from(path);
        }
        if let Some(level) = lookup(LOG_LEVEL_ENV) {
            match level.trim().parse() {
                Ok(level) => self.log_level = level,
                // the logger is not installed yet
                Err(_) => eprintln!("warning: ignoring invalid {LOG_LEVEL_ENV} value `{level}`"),
            }
        }
        self
    }
}
