//! # Logger
//!
//! Subscriber bootstrap for hosts of radio channels.
//!
//! Channels never write output themselves. Advisory warnings are `tracing` events
//! under `radio::debug`, the tune-in relay emits under `radio::activity`. A host
//! installs one subscriber per process with [`Logger::builder`]: a console layer,
//! a [`FileOutput`] of rolling files, or both. `RUST_LOG` applies unless explicit
//! directives are set with [`LoggerBuilder::env_filter`].
//!
//! ```rust,no_run
//! use radio_logger::{FileFormat, FileOutput, LevelFilter, Logger};
//!
//! # fn main() -> Result<(), radio_logger::LoggerError> {
//! let _logger = Logger::builder()
//!     .name("app")
//!     .level(LevelFilter::DEBUG)
//!     .env_filter("radio::activity=info,radio::debug=warn")
//!     .file(FileOutput::new("logs").rotation(Logger::parse_rotation("hourly")?).format(FileFormat::Json))
//!     .init()?;
//! # Ok(())
//! # }
//! ```

mod builder;
mod error;
mod file;

pub use crate::builder::{LoggerBuilder, Named, Unnamed};
pub use crate::error::{LoggerError, LoggerErrorExt};
pub use crate::file::{FileFormat, FileOutput};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;

/// The installed subscriber. Owns the file writer thread when file output is on.
#[must_use = "Dropping the logger stops the file writer and loses buffered lines."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Starts a builder with console output at `INFO`.
    pub const fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Parses a level name such as `"trace"`, `"info"` or `"off"`, ignoring case
    /// and surrounding whitespace.
    ///
    /// # Errors
    /// Returns [`LoggerError::InvalidConfiguration`] for unknown names.
    pub fn parse_level(level: &str) -> Result<LevelFilter, LoggerError> {
        LevelFilter::from_str(level.trim())
            .map_err(|e| LoggerError::invalid(format!("Invalid log level '{level}': {e}")))
    }

    /// Parses a rotation period: `minutely`, `hourly`, `daily` or `never`.
    ///
    /// # Errors
    /// Returns [`LoggerError::InvalidConfiguration`] for any other value.
    pub fn parse_rotation(rotation: &str) -> Result<Rotation, LoggerError> {
        match rotation.trim().to_ascii_lowercase().as_str() {
            "minutely" => Ok(Rotation::MINUTELY),
            "hourly" => Ok(Rotation::HOURLY),
            "daily" => Ok(Rotation::DAILY),
            "never" => Ok(Rotation::NEVER),
            _ => Err(LoggerError::invalid(format!("Invalid log rotation '{rotation}'"))),
        }
    }

    #[must_use]
    pub const fn guard(&self) -> Option<&WorkerGuard> {
        self.guard.as_ref()
    }

    pub(crate) const fn with_guard(guard: Option<WorkerGuard>) -> Self {
        Self { guard }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::debug!("Flushing file logs");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(Logger::parse_level("debug").unwrap(), LevelFilter::DEBUG);
        assert_eq!(Logger::parse_level(" WARN ").unwrap(), LevelFilter::WARN);
        assert!(matches!(
            Logger::parse_level("loud"),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_parse_rotation() {
        assert_eq!(Logger::parse_rotation("Hourly").unwrap(), Rotation::HOURLY);
        assert_eq!(Logger::parse_rotation(" never ").unwrap(), Rotation::NEVER);

        let err = Logger::parse_rotation("fortnightly").unwrap_err();
        assert!(err.to_string().contains("'fortnightly'"));
    }
}
