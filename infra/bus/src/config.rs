use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings for a [`Radio`](crate::Radio) registry and its host's logger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioConfig {
    /// Emit advisory warnings for unhandled, overwritten and unregistered handlers.
    pub debug: bool,
    /// Channels whose activity is relayed to the log from the start.
    pub tune_in: Vec<String>,
    pub logging: LoggingConfig,
}

/// Subscriber settings, applied by the `radio` facade through `radio-logger`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Rolling file prefix.
    pub name: String,
    pub level: String,
    pub console: bool,
    pub targets: bool,
    /// Directory for rolling log files; no file output when unset.
    pub path: Option<PathBuf>,
    /// `minutely`, `hourly`, `daily` or `never`.
    pub rotation: String,
    /// Rolled files kept in `path`; older ones are deleted.
    pub max_files: usize,
    pub json: bool,
    /// Explicit filter directives, overriding `RUST_LOG`.
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            name: "radio".to_owned(),
            level: "info".to_owned(),
            console: true,
            targets: false,
            path: None,
            rotation: "daily".to_owned(),
            max_files: 10,
            json: false,
            env_filter: None,
        }
    }
}
