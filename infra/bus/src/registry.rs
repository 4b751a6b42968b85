use crate::channel::Channel;
use crate::config::RadioConfig;
use crate::diagnostics::{self, Diagnostics};
use crate::error::RadioError;
use crate::events::{ALL_EVENTS, Emitter};
use crate::handler::{Filter, Handler, Registration, Reply};
use crate::names::Key;
use crate::requests::Response;
use fxhash::FxHashMap;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tracing::debug;

/// Generates forwarders that resolve a channel by name, then call the
/// same-named [`Channel`] method. `chain` methods answer the channel.
macro_rules! channel_mirror {
    (@ret chain) => { Channel };
    (@ret answer) => { Response };
    (@call chain, $channel:ident, $method:ident($($arg:expr),*)) => {{
        $channel.$method($($arg),*);
        Ok($channel)
    }};
    (@call answer, $channel:ident, $method:ident($($arg:expr),*)) => {
        Ok($channel.$method($($arg),*))
    };
    ($( $(#[$meta:meta])* $kind:ident fn $method:ident($($arg:ident: $ty:ty),* $(,)?); )*) => {
        $(
            $(#[$meta])*
            ///
            /// # Errors
            /// Returns [`RadioError::InvalidChannelName`] when `channel` is empty.
            pub fn $method(&self, channel: &str, $($arg: $ty),*) -> Result<channel_mirror!(@ret $kind), RadioError> {
                let channel = self.channel(channel)?;
                channel_mirror!(@call $kind, channel, $method($($arg),*))
            }
        )*
    };
}

/// A registry of channels, keyed by name.
///
/// Each `Radio` is isolated: channels, the debug switch and the tune-in relays
/// are never shared between instances. The `radio` facade keeps one
/// process-wide instance.
///
/// # Examples
/// ```rust
/// use radio_bus::{Handler, Radio, json};
///
/// # fn main() -> Result<(), radio_bus::RadioError> {
/// let radio = Radio::new();
/// radio.reply("app", "version", json!("1.0"))?;
///
/// let version = radio.request("app", "version", &[])?.into_value();
/// assert_eq!(version, Some(json!("1.0")));
/// assert_eq!(radio.channel("app")?, radio.channel("app")?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct Radio {
    channels: RwLock<FxHashMap<String, Channel>>,
    diagnostics: Diagnostics,
    relays: Mutex<FxHashMap<String, Handler>>,
}

impl Radio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the debug switch and tuned-in channels of `config`.
    ///
    /// # Errors
    /// Returns [`RadioError::InvalidChannelName`] when `tune_in` lists an empty name.
    pub fn from_config(config: &RadioConfig) -> Result<Self, RadioError> {
        let radio = Self::new();
        radio.apply(config)?;
        Ok(radio)
    }

    /// Sets the debug switch from `config` and tunes in its channels. Channels
    /// tuned in before stay tuned in.
    ///
    /// # Errors
    /// Returns [`RadioError::InvalidChannelName`] at the first empty name in
    /// `tune_in`; the names before it are already tuned in.
    pub fn apply(&self, config: &RadioConfig) -> Result<&Self, RadioError> {
        self.set_debug(config.debug);
        for name in &config.tune_in {
            self.tune_in(name)?;
        }
        Ok(self)
    }

    /// Returns the channel named `name`, creating it on first use.
    ///
    /// # Errors
    /// Returns [`RadioError::InvalidChannelName`] when `name` is empty.
    pub fn channel(&self, name: &str) -> Result<Channel, RadioError> {
        if name.is_empty() {
            return Err(RadioError::missing_channel_name());
        }
        if let Some(channel) = self.channels.read().get(name) {
            return Ok(channel.clone());
        }

        let mut channels = self.channels.write();
        if let Some(channel) = channels.get(name) {
            return Ok(channel.clone());
        }
        let channel = Channel::with_diagnostics(name, self.diagnostics.clone())?;
        channels.insert(name.to_owned(), channel.clone());
        debug!(channel = name, "Channel created");
        Ok(channel)
    }

    /// Names of the channels created so far, sorted.
    pub fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Turns advisory warnings on or off for every channel of this registry.
    pub fn set_debug(&self, enabled: bool) -> &Self {
        self.diagnostics.set_enabled(enabled);
        self
    }

    pub fn is_debug(&self) -> bool {
        self.diagnostics.is_enabled()
    }

    /// Relays every event, command and request of `channel` to the activity log.
    /// Tuning in twice attaches the relay once.
    ///
    /// # Errors
    /// Returns [`RadioError::InvalidChannelName`] when `channel` is empty.
    pub fn tune_in(&self, channel: &str) -> Result<&Self, RadioError> {
        let target = self.channel(channel)?;
        let relay = self.relay(channel);
        target.set_tuned_in(true);
        target.off(ALL_EVENTS, relay.clone()).on(ALL_EVENTS, relay);
        Ok(self)
    }

    /// Detaches the relay installed by [`Radio::tune_in`]. Harmless when not tuned in.
    ///
    /// # Errors
    /// Returns [`RadioError::InvalidChannelName`] when `channel` is empty.
    pub fn tune_out(&self, channel: &str) -> Result<&Self, RadioError> {
        let target = self.channel(channel)?;
        target.set_tuned_in(false);
        if let Some(relay) = self.relays.lock().remove(channel) {
            target.off(ALL_EVENTS, relay);
        }
        Ok(self)
    }

    /// Writes one activity line for `event` on `channel`.
    pub fn log(&self, channel: &str, event: &str, args: &[Value]) -> &Self {
        diagnostics::activity(channel, event, args);
        self
    }

    /// The relay handler of `channel`; the same instance until tuned out.
    fn relay(&self, channel: &str) -> Handler {
        self.relays
            .lock()
            .entry(channel.to_owned())
            .or_insert_with(|| {
                let channel = channel.to_owned();
                Handler::effect(move |_, args| {
                    let (event, rest) = match args.split_first() {
                        Some((event, rest)) => (event.as_str().unwrap_or_default(), rest),
                        None => ("", args),
                    };
                    diagnostics::activity(&channel, event, rest);
                })
            })
            .clone()
    }

    channel_mirror! {
        /// [`Channel::on`] on the named channel.
        chain fn on(key: impl Into<Key<Handler>>, registration: impl Into<Registration>);
        /// [`Channel::once`] on the named channel.
        chain fn once(key: impl Into<Key<Handler>>, registration: impl Into<Registration>);
        /// [`Channel::off`] on the named channel.
        chain fn off(key: impl Into<Key<Handler>>, filter: impl Into<Filter>);
        /// [`Channel::trigger`] on the named channel.
        chain fn trigger(key: impl Into<Key<Value>>, args: &[Value]);
        /// [`Channel::listen_to`] on the named channel.
        chain fn listen_to(other: &dyn Emitter, key: impl Into<Key<Handler>>, callback: Option<Handler>);
        /// [`Channel::listen_to_once`] on the named channel.
        chain fn listen_to_once(other: &dyn Emitter, key: impl Into<Key<Handler>>, callback: Option<Handler>);
        /// [`Channel::stop_listening`] on the named channel.
        chain fn stop_listening(other: Option<&dyn Emitter>, key: impl Into<Key<Handler>>, callback: Option<Handler>);
        /// [`Channel::command`] on the named channel.
        chain fn command(key: impl Into<Key<Value>>, args: &[Value]);
        /// [`Channel::comply`] on the named channel.
        chain fn comply(key: impl Into<Key<Handler>>, registration: impl Into<Registration>);
        /// [`Channel::comply_once`] on the named channel.
        chain fn comply_once(key: impl Into<Key<Handler>>, registration: impl Into<Registration>);
        /// [`Channel::stop_complying`] on the named channel.
        chain fn stop_complying(key: impl Into<Key<Handler>>, filter: impl Into<Filter>);
        /// [`Channel::request`] on the named channel.
        answer fn request(key: impl Into<Key<Value>>, args: &[Value]);
        /// [`Channel::reply`] on the named channel.
        chain fn reply(key: impl Into<Key<Reply>>, registration: impl Into<Registration<Reply>>);
        /// [`Channel::reply_once`] on the named channel.
        chain fn reply_once(key: impl Into<Key<Reply>>, registration: impl Into<Registration<Reply>>);
        /// [`Channel::stop_replying`] on the named channel.
        chain fn stop_replying(key: impl Into<Key<Handler>>, filter: impl Into<Filter>);
        /// [`Channel::reset`] on the named channel.
        chain fn reset();
    }
}
