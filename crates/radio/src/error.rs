use radio_bus::RadioError;
use radio_logger::LoggerError;
use std::borrow::Cow;

/// Errors surfaced while bootstrapping or using the process-wide registry.
#[radio_derive::radio_error]
pub enum Error {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    #[error("Logger error{}: {source}", format_context(.context))]
    Logger { source: LoggerError, context: Option<Cow<'static, str>> },

    #[error("Radio error{}: {source}", format_context(.context))]
    Radio { source: RadioError, context: Option<Cow<'static, str>> },
}
