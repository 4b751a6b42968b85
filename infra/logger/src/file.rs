use crate::{LoggerError, LoggerErrorExt};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::Layer;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::registry::LookupSpan;

const LOG_FILE_SUFFIX: &str = "log";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FileFormat {
    #[default]
    Plain,
    /// One JSON object per line, event fields included.
    Json,
}

/// Rolling log files in one directory, written by a background thread.
///
/// Files are named `<logger name>.<period>.log` (`<logger name>.log` with
/// [`Rotation::NEVER`]). Beyond `max_files`, the oldest files are deleted.
#[derive(Debug, Clone)]
pub struct FileOutput {
    dir: PathBuf,
    rotation: Rotation,
    max_files: usize,
    format: FileFormat,
}

impl FileOutput {
    pub const DEFAULT_MAX_FILES: usize = 10;

    /// Daily plain-text files in `dir`, keeping [`Self::DEFAULT_MAX_FILES`].
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            rotation: Rotation::DAILY,
            max_files: Self::DEFAULT_MAX_FILES,
            format: FileFormat::Plain,
        }
    }

    #[must_use]
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    #[must_use]
    pub const fn max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    #[must_use]
    pub const fn format(mut self, format: FileFormat) -> Self {
        self.format = format;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub(crate) fn validate(&self) -> Result<(), LoggerError> {
        if self.max_files == 0 {
            return Err(LoggerError::invalid("max_files must be greater than zero"));
        }
        Ok(())
    }

    /// Creates the directory and the non-blocking writer behind a file layer.
    pub(crate) fn layer<S>(
        &self,
        prefix: &str,
    ) -> Result<(Box<dyn Layer<S> + Send + Sync + 'static>, WorkerGuard), LoggerError>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        fs::create_dir_all(&self.dir)
            .context(format!("Failed to create log directory {}", self.dir.display()))?;

        let appender = RollingFileAppender::builder()
            .rotation(self.rotation.clone())
            .filename_prefix(prefix)
            .filename_suffix(LOG_FILE_SUFFIX)
            .max_log_files(self.max_files)
            .build(&self.dir)?;
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let base = layer().with_writer(writer).with_ansi(false);
        let boxed = match self.format {
            FileFormat::Plain => base.boxed(),
            FileFormat::Json => base.json().boxed(),
        };
        Ok((boxed, guard))
    }
}
