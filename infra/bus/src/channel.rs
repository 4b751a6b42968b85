use crate::commands::Commands;
use crate::diagnostics::{self, Diagnostics};
use crate::error::RadioError;
use crate::events::{Emitter, EventBus};
use crate::handler::{Context, Filter, Handler, Registration, Reply};
use crate::names::Key;
use crate::requests::{Requests, Response};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// State shared by a channel and its handler stores.
#[derive(Debug)]
pub(crate) struct ChannelMeta {
    pub(crate) name: Arc<str>,
    pub(crate) context: Context,
    pub(crate) diagnostics: Diagnostics,
    tuned_in: AtomicBool,
}

impl ChannelMeta {
    pub(crate) fn log_activity(&self, name: &str, args: &[Value]) {
        if self.tuned_in.load(Ordering::Relaxed) {
            diagnostics::activity(&self.name, name, args);
        }
    }
}

#[cfg(test)]
impl ChannelMeta {
    /// Metadata for a store exercised without a channel around it.
    pub(crate) fn detached(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: Arc::from(name),
            context: Context::new(()),
            diagnostics: Diagnostics::default(),
            tuned_in: AtomicBool::new(false),
        })
    }
}

#[derive(Debug)]
struct ChannelInner {
    meta: Arc<ChannelMeta>,
    events: EventBus,
    commands: Commands,
    requests: Requests,
}

/// Channel identity carried by a channel's [`Context`].
#[derive(Debug, Clone)]
pub(crate) struct ChannelRef {
    name: Arc<str>,
    channel: Weak<ChannelInner>,
}

impl ChannelRef {
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn upgrade(&self) -> Option<Channel> {
        self.channel.upgrade().map(|inner| Channel { inner })
    }
}

/// A named messaging endpoint: events, commands and requests.
///
/// `Channel` is a handle; clones share the same listeners and handlers.
/// Handlers registered without a context receive [`Channel::context`].
///
/// # Examples
/// ```rust
/// use radio_bus::{Channel, Handler, json};
///
/// # fn main() -> Result<(), radio_bus::RadioError> {
/// let channel = Channel::new("app")?;
/// channel.reply("user", Handler::new(|_, args| json!({ "id": args[0] })));
///
/// let user = channel.request("user", &[json!(7)]).into_value();
/// assert_eq!(user, Some(json!({ "id": 7 })));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Channel {
    inner: Arc<ChannelInner>,
}

impl Channel {
    /// Creates a standalone channel with diagnostics off.
    ///
    /// # Errors
    /// Returns [`RadioError::InvalidChannelName`] when `name` is empty.
    pub fn new(name: &str) -> Result<Self, RadioError> {
        Self::with_diagnostics(name, Diagnostics::default())
    }

    pub(crate) fn with_diagnostics(name: &str, diagnostics: Diagnostics) -> Result<Self, RadioError> {
        if name.is_empty() {
            return Err(RadioError::missing_channel_name());
        }

        let name: Arc<str> = Arc::from(name);
        let inner = Arc::new_cyclic(|channel| {
            let context = Context::new(ChannelRef { name: name.clone(), channel: channel.clone() });
            let meta = Arc::new(ChannelMeta {
                name,
                context: context.clone(),
                diagnostics,
                tuned_in: AtomicBool::new(false),
            });
            ChannelInner {
                events: EventBus::with_context(context),
                commands: Commands::new(meta.clone()),
                requests: Requests::new(meta.clone()),
                meta,
            }
        });

        Ok(Self { inner })
    }

    pub fn name(&self) -> &str {
        &self.inner.meta.name
    }

    /// Default receiver of this channel's handlers; resolves back to the
    /// channel through [`Context::channel`].
    pub fn context(&self) -> &Context {
        &self.inner.meta.context
    }

    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    /// Whether commands, requests and events on this channel are relayed to
    /// the activity log.
    pub fn is_tuned_in(&self) -> bool {
        self.inner.meta.tuned_in.load(Ordering::Relaxed)
    }

    /// Whether advisory warnings are on for this channel.
    pub fn is_debug(&self) -> bool {
        self.inner.meta.diagnostics.is_enabled()
    }

    pub(crate) fn set_tuned_in(&self, tuned_in: bool) {
        self.inner.meta.tuned_in.store(tuned_in, Ordering::Relaxed);
    }

    pub fn on(&self, key: impl Into<Key<Handler>>, registration: impl Into<Registration>) -> &Self {
        self.inner.events.on(key, registration);
        self
    }

    pub fn once(&self, key: impl Into<Key<Handler>>, registration: impl Into<Registration>) -> &Self {
        self.inner.events.once(key, registration);
        self
    }

    pub fn off(&self, key: impl Into<Key<Handler>>, filter: impl Into<Filter>) -> &Self {
        self.inner.events.off(key, filter);
        self
    }

    pub fn trigger(&self, key: impl Into<Key<Value>>, args: &[Value]) -> &Self {
        self.inner.events.trigger(key, args);
        self
    }

    pub fn listen_to<E: Emitter + ?Sized>(
        &self,
        other: &E,
        key: impl Into<Key<Handler>>,
        callback: Option<Handler>,
    ) -> &Self {
        self.inner.events.listen_to(other, key, callback);
        self
    }

    pub fn listen_to_once<E: Emitter + ?Sized>(
        &self,
        other: &E,
        key: impl Into<Key<Handler>>,
        callback: Option<Handler>,
    ) -> &Self {
        self.inner.events.listen_to_once(other, key, callback);
        self
    }

    pub fn stop_listening(
        &self,
        other: Option<&dyn Emitter>,
        key: impl Into<Key<Handler>>,
        callback: Option<Handler>,
    ) -> &Self {
        self.inner.events.stop_listening(other, key, callback);
        self
    }

    /// Issues a command. Always returns the channel, handled or not.
    pub fn command(&self, key: impl Into<Key<Value>>, args: &[Value]) -> &Self {
        self.inner.commands.command(key.into(), args.to_vec());
        self
    }

    /// Registers the handler of a command, replacing any previous one.
    pub fn comply(&self, key: impl Into<Key<Handler>>, registration: impl Into<Registration>) -> &Self {
        self.inner.commands.comply(key.into(), registration.into());
        self
    }

    pub fn comply_once(
        &self,
        key: impl Into<Key<Handler>>,
        registration: impl Into<Registration>,
    ) -> &Self {
        self.inner.commands.comply_once(key.into(), registration.into());
        self
    }

    pub fn stop_complying(&self, key: impl Into<Key<Handler>>, filter: impl Into<Filter>) -> &Self {
        self.inner.commands.stop_complying(key.into(), filter.into());
        self
    }

    /// Issues a request and returns its answer.
    pub fn request(&self, key: impl Into<Key<Value>>, args: &[Value]) -> Response {
        self.inner.requests.request(key.into(), args.to_vec())
    }

    /// Registers the answer to a request: a handler, or a constant value.
    pub fn reply(
        &self,
        key: impl Into<Key<Reply>>,
        registration: impl Into<Registration<Reply>>,
    ) -> &Self {
        self.inner.requests.reply(key.into(), registration.into());
        self
    }

    pub fn reply_once(
        &self,
        key: impl Into<Key<Reply>>,
        registration: impl Into<Registration<Reply>>,
    ) -> &Self {
        self.inner.requests.reply_once(key.into(), registration.into());
        self
    }

    pub fn stop_replying(&self, key: impl Into<Key<Handler>>, filter: impl Into<Filter>) -> &Self {
        self.inner.requests.stop_replying(key.into(), filter.into());
        self
    }

    /// Drops every listener, listening, command and request of this channel.
    ///
    /// The channel stays registered and keeps its tuned-in state.
    pub fn reset(&self) -> &Self {
        self.inner.events.off(Key::<Handler>::Any, Filter::any());
        self.inner.events.stop_listening(None, Key::<Handler>::Any, None);
        self.inner.commands.clear();
        self.inner.requests.clear();
        self
    }

    pub fn has_command(&self, name: &str) -> bool {
        self.inner.commands.contains(name)
    }

    pub fn has_request(&self, name: &str) -> bool {
        self.inner.requests.contains(name)
    }

    /// Registered commands and requests.
    pub fn handler_count(&self) -> usize {
        self.inner.commands.len() + self.inner.requests.len()
    }
}

impl Emitter for Channel {
    fn events(&self) -> &EventBus {
        &self.inner.events
    }
}

impl PartialEq for Channel {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Channel {}
