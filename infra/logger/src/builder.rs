use crate::file::FileOutput;
use crate::{Logger, LoggerError};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

mod sealed {
    pub trait NameState {}
}

/// Builder state until [`LoggerBuilder::name`] is called. Cannot `init`.
#[derive(Debug)]
pub struct Unnamed;

/// Builder state holding the logger name.
#[derive(Debug)]
pub struct Named(String);

impl sealed::NameState for Unnamed {}
impl sealed::NameState for Named {}

/// Collects subscriber settings; [`LoggerBuilder::init`] installs them.
#[must_use = "The builder does nothing until `init` is called."]
#[derive(Debug)]
pub struct LoggerBuilder<S: sealed::NameState = Unnamed> {
    state: S,
    level: LevelFilter,
    env_filter: Option<String>,
    console: bool,
    targets: bool,
    file: Option<FileOutput>,
}

impl LoggerBuilder<Unnamed> {
    pub(crate) const fn new() -> Self {
        Self {
            state: Unnamed,
            level: LevelFilter::INFO,
            env_filter: None,
            console: true,
            targets: true,
            file: None,
        }
    }

    /// Names the logger; file output uses it as the file name prefix.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<Named> {
        LoggerBuilder {
            state: Named(name.into()),
            level: self.level,
            env_filter: self.env_filter,
            console: self.console,
            targets: self.targets,
            file: self.file,
        }
    }
}

impl<S: sealed::NameState> LoggerBuilder<S> {
    /// Default level for targets no directive mentions.
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Filter directives used instead of `RUST_LOG`, e.g. `radio::debug=warn`.
    pub fn env_filter(mut self, directives: impl Into<String>) -> Self {
        self.env_filter = Some(directives.into());
        self
    }

    pub const fn console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    /// Prints `radio::debug` / `radio::activity` targets on console lines.
    pub const fn targets(mut self, enabled: bool) -> Self {
        self.targets = enabled;
        self
    }

    pub fn file(mut self, output: FileOutput) -> Self {
        self.file = Some(output);
        self
    }

    fn filter(&self) -> Result<EnvFilter, LoggerError> {
        let builder = EnvFilter::builder().with_default_directive(self.level.into());
        match &self.env_filter {
            Some(directives) => builder.parse(directives).map_err(|e| {
                LoggerError::invalid(format!("Invalid env filter '{directives}': {e}"))
            }),
            None => Ok(builder.from_env_lossy()),
        }
    }
}

impl LoggerBuilder<Named> {
    /// Installs the process-wide subscriber.
    ///
    /// # Errors
    /// - [`LoggerError::InvalidConfiguration`] for a blank name, no enabled output,
    ///   unparsable directives or a file output keeping zero files.
    /// - [`LoggerError::Io`] / [`LoggerError::Appender`] when the log directory is unusable.
    /// - [`LoggerError::Subscriber`] when a subscriber is already installed.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let Named(ref name) = self.state;
        if name.trim().is_empty() {
            return Err(LoggerError::invalid("Logger name cannot be empty"));
        }
        if !self.console && self.file.is_none() {
            return Err(LoggerError::invalid("Enable console or file output"));
        }
        if let Some(output) = &self.file {
            output.validate()?;
        }
        let filter = self.filter()?;

        let mut layers = Vec::new();
        if self.console {
            layers.push(layer().compact().with_target(self.targets).with_ansi(true).boxed());
        }
        let guard = match &self.file {
            Some(output) => {
                let (file_layer, guard) = output.layer(name)?;
                layers.push(file_layer);
                Some(guard)
            },
            None => None,
        };

        tracing_subscriber::registry().with(filter).with(layers).try_init()?;
        Ok(Logger::with_guard(guard))
    }
}
