//! Facade crate for radio messaging.
//! Re-exports the channel primitives and keeps one process-wide [`Radio`] registry,
//! with top-level functions that address channels by name.
//! Keep this crate thin: messaging semantics live in `radio-bus`, subscriber
//! setup in `radio-logger`.
//!
//! ## Usage
//! - Call [`init`] with a [`RadioConfig`] (see [`load_config`]) to apply the
//!   debug switch, tune in channels and install the logger.
//! - Use the top-level functions for one-off calls, or [`channel`] to keep a handle.
//!
//! ```rust
//! use radio::{Handler, json};
//!
//! # fn main() -> Result<(), radio::RadioError> {
//! radio::reply("docs", "greeting", Handler::new(|_, args| json!(format!("hello {}", args[0]))))?;
//!
//! let greeting = radio::request("docs", "greeting", &[json!("world")])?.into_value();
//! assert_eq!(greeting, Some(json!("hello \"world\"")));
//! # Ok(())
//! # }
//! ```

mod config;
mod error;

pub use crate::config::load_config;
pub use crate::error::{Error, ErrorExt};
pub use radio_bus as bus;
pub use radio_bus::{
    ACTIVITY_TARGET, ALL_EVENTS, Callback, Channel, Context, DEBUG_TARGET, DEFAULT_HANDLER,
    Emitter, EventBus, Filter, Handler, Key, LoggingConfig, Radio, RadioConfig, RadioError,
    Registration, Reply, Response, Value, json,
};
pub use radio_logger as logger;
pub use radio_logger::Logger;

use radio_logger::{FileFormat, FileOutput};
use std::sync::LazyLock;
use tracing::debug;

static GLOBAL: LazyLock<Radio> = LazyLock::new(Radio::new);

/// The process-wide registry behind the top-level functions. Empty at startup.
pub fn global() -> &'static Radio {
    &GLOBAL
}

/// Generates top-level functions forwarding to the same-named [`Radio`] method
/// on the process-wide registry.
macro_rules! global_mirror {
    ($( $(#[$meta:meta])* fn $method:ident($($arg:ident: $ty:ty),* $(,)?) -> $ret:ty; )*) => {
        $(
            $(#[$meta])*
            ///
            /// # Errors
            /// Returns [`RadioError::InvalidChannelName`] when `channel` is empty.
            pub fn $method(channel: &str, $($arg: $ty),*) -> Result<$ret, RadioError> {
                global().$method(channel, $($arg),*)
            }
        )*
    };
}

global_mirror! {
    /// Subscribes a listener on the named channel.
    fn on(key: impl Into<Key<Handler>>, registration: impl Into<Registration>) -> Channel;
    /// Subscribes a run-once listener on the named channel.
    fn once(key: impl Into<Key<Handler>>, registration: impl Into<Registration>) -> Channel;
    /// Unsubscribes listeners on the named channel.
    fn off(key: impl Into<Key<Handler>>, filter: impl Into<Filter>) -> Channel;
    /// Triggers events on the named channel.
    fn trigger(key: impl Into<Key<Value>>, args: &[Value]) -> Channel;
    /// The named channel listens to `other`.
    fn listen_to(other: &dyn Emitter, key: impl Into<Key<Handler>>, callback: Option<Handler>) -> Channel;
    fn listen_to_once(other: &dyn Emitter, key: impl Into<Key<Handler>>, callback: Option<Handler>) -> Channel;
    fn stop_listening(other: Option<&dyn Emitter>, key: impl Into<Key<Handler>>, callback: Option<Handler>) -> Channel;
    /// Issues a command on the named channel.
    fn command(key: impl Into<Key<Value>>, args: &[Value]) -> Channel;
    fn comply(key: impl Into<Key<Handler>>, registration: impl Into<Registration>) -> Channel;
    fn comply_once(key: impl Into<Key<Handler>>, registration: impl Into<Registration>) -> Channel;
    fn stop_complying(key: impl Into<Key<Handler>>, filter: impl Into<Filter>) -> Channel;
    /// Issues a request on the named channel and returns its answer.
    fn request(key: impl Into<Key<Value>>, args: &[Value]) -> Response;
    fn reply(key: impl Into<Key<Reply>>, registration: impl Into<Registration<Reply>>) -> Channel;
    fn reply_once(key: impl Into<Key<Reply>>, registration: impl Into<Registration<Reply>>) -> Channel;
    fn stop_replying(key: impl Into<Key<Handler>>, filter: impl Into<Filter>) -> Channel;
    /// Clears every registration of the named channel.
    fn reset() -> Channel;
}

/// Returns the named channel of the process-wide registry, creating it on first use.
///
/// # Errors
/// Returns [`RadioError::InvalidChannelName`] when `name` is empty.
pub fn channel(name: &str) -> Result<Channel, RadioError> {
    global().channel(name)
}

pub fn set_debug(enabled: bool) -> &'static Radio {
    global().set_debug(enabled)
}

pub fn is_debug() -> bool {
    global().is_debug()
}

/// # Errors
/// Returns [`RadioError::InvalidChannelName`] when `channel` is empty.
pub fn tune_in(channel: &str) -> Result<&'static Radio, RadioError> {
    global().tune_in(channel)
}

/// # Errors
/// Returns [`RadioError::InvalidChannelName`] when `channel` is empty.
pub fn tune_out(channel: &str) -> Result<&'static Radio, RadioError> {
    global().tune_out(channel)
}

pub fn log(channel: &str, event: &str, args: &[Value]) -> &'static Radio {
    global().log(channel, event, args)
}

/// Applies `config` to the process-wide registry and installs the logger.
///
/// Keep the returned [`Logger`] alive for as long as file logs should be written.
///
/// # Errors
/// Returns [`Error::Radio`] when `tune_in` lists an empty channel name, and
/// [`Error::Logger`] when the level is unknown or a subscriber is already installed.
pub fn init(config: &RadioConfig) -> Result<Logger, Error> {
    global().apply(config)?;

    let logger = start_logger(config)?;
    debug!(debug = config.debug, tuned_in = ?config.tune_in, "Radio initialized");
    Ok(logger)
}

fn start_logger(config: &RadioConfig) -> Result<Logger, Error> {
    let logging = &config.logging;

    let mut builder = Logger::builder()
        .name(logging.name.as_str())
        .level(Logger::parse_level(&logging.level)?)
        .console(logging.console)
        .targets(logging.targets);
    if let Some(filter) = &logging.env_filter {
        builder = builder.env_filter(filter.as_str());
    }
    if let Some(dir) = &logging.path {
        let format = if logging.json { FileFormat::Json } else { FileFormat::Plain };
        builder = builder.file(
            FileOutput::new(dir.clone())
                .rotation(Logger::parse_rotation(&logging.rotation)?)
                .max_files(logging.max_files)
                .format(format),
        );
    }

    Ok(builder.init()?)
}
