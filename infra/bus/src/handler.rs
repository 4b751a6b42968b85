use crate::channel::{Channel, ChannelRef};
use crate::names::Prepend;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique id for store entries and listeners.
pub(crate) fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// The callable behind a [`Handler`]: receives the registration context and the
/// invocation arguments, and produces a reply value.
pub type Callback = dyn Fn(&Context, &[Value]) -> Value + Send + Sync;

/// A shared callback with identity.
///
/// Clones compare equal; two handlers built from identical closures do not.
/// Keep a clone around to remove the registration later.
#[derive(Clone)]
pub struct Handler(Arc<Callback>);

impl Handler {
    /// Wraps a closure that produces a reply value.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Context, &[Value]) -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Wraps a closure with no meaningful result (commands, event listeners).
    pub fn effect<F>(f: F) -> Self
    where
        F: Fn(&Context, &[Value]) + Send + Sync + 'static,
    {
        Self::new(move |context, args| {
            f(context, args);
            Value::Null
        })
    }

    /// A handler that always answers `value`.
    pub fn constant(value: Value) -> Self {
        Self::new(move |_, _| value.clone())
    }

    /// Invokes the callback.
    pub fn call(&self, context: &Context, args: &[Value]) -> Value {
        (self.0)(context, args)
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Handler {}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler").field(&Arc::as_ptr(&self.0).cast::<()>()).finish()
    }
}

/// The receiver a handler is invoked with.
///
/// Compared by identity. Registrations without an explicit context receive the
/// owning channel's context, which resolves back to the channel via [`Context::channel`].
#[derive(Clone)]
pub struct Context(Arc<dyn Any + Send + Sync>);

impl Context {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.0).downcast_ref::<T>()
    }

    /// The channel this context belongs to, if it is a channel context and the
    /// channel is still alive.
    pub fn channel(&self) -> Option<Channel> {
        self.downcast_ref::<ChannelRef>().and_then(ChannelRef::upgrade)
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Context {}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.downcast_ref::<ChannelRef>() {
            Some(channel) => f.debug_tuple("Context").field(&channel.name()).finish(),
            None => f.debug_tuple("Context").field(&Arc::as_ptr(&self.0).cast::<()>()).finish(),
        }
    }
}

/// Answer registered for a request: computed by a handler, or a constant.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Handler(Handler),
    Value(Value),
}

impl Reply {
    /// Constants become a constant-returning handler.
    pub fn into_handler(self) -> Handler {
        match self {
            Self::Handler(handler) => handler,
            Self::Value(value) => Handler::constant(value),
        }
    }
}

impl From<Handler> for Reply {
    fn from(handler: Handler) -> Self {
        Self::Handler(handler)
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Callback and optional context for `on`, `comply`, `reply` and their `once` variants.
///
/// For mapping-style keys leave `callback` empty: each mapping value fills it.
#[derive(Debug, Clone)]
pub struct Registration<H = Handler> {
    pub callback: Option<H>,
    pub context: Option<Context>,
}

impl<H> Registration<H> {
    pub fn new(callback: impl Into<H>) -> Self {
        Self { callback: Some(callback.into()), context: None }
    }

    /// A registration without a callback, for mapping-style keys.
    pub const fn empty() -> Self {
        Self { callback: None, context: None }
    }

    #[must_use]
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }
}

impl<H> Default for Registration<H> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<H> From<H> for Registration<H> {
    fn from(callback: H) -> Self {
        Self { callback: Some(callback), context: None }
    }
}

impl<H> From<(H, Context)> for Registration<H> {
    fn from((callback, context): (H, Context)) -> Self {
        Self { callback: Some(callback), context: Some(context) }
    }
}

impl From<Handler> for Registration<Reply> {
    fn from(handler: Handler) -> Self {
        Self { callback: Some(Reply::Handler(handler)), context: None }
    }
}

impl From<Value> for Registration<Reply> {
    fn from(value: Value) -> Self {
        Self { callback: Some(Reply::Value(value)), context: None }
    }
}

impl From<(Handler, Context)> for Registration<Reply> {
    fn from((handler, context): (Handler, Context)) -> Self {
        Self { callback: Some(Reply::Handler(handler)), context: Some(context) }
    }
}

impl<H> Prepend<H> for Registration<H> {
    fn prepend(mut self, value: H) -> Self {
        self.callback = Some(value);
        self
    }
}

/// Which registrations `off` / `stop_complying` / `stop_replying` remove.
///
/// An empty filter matches everything. A callback filter matches both the
/// registered callback and the original callback wrapped by a `once` variant.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub callback: Option<Handler>,
    pub context: Option<Context>,
}

impl Filter {
    pub const fn any() -> Self {
        Self { callback: None, context: None }
    }

    pub const fn callback(callback: Handler) -> Self {
        Self { callback: Some(callback), context: None }
    }

    pub const fn context(context: Context) -> Self {
        Self { callback: None, context: Some(context) }
    }

    #[must_use]
    pub fn and_context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    pub const fn is_empty(&self) -> bool {
        self.callback.is_none() && self.context.is_none()
    }

    pub(crate) fn matches(
        &self,
        callback: &Handler,
        original: Option<&Handler>,
        context: Option<&Context>,
    ) -> bool {
        let callback_matches = self
            .callback
            .as_ref()
            .is_none_or(|filter| filter == callback || original == Some(filter));
        let context_matches =
            self.context.as_ref().is_none_or(|filter| context == Some(filter));
        callback_matches && context_matches
    }
}

impl From<Handler> for Filter {
    fn from(callback: Handler) -> Self {
        Self::callback(callback)
    }
}

impl From<Context> for Filter {
    fn from(context: Context) -> Self {
        Self::context(context)
    }
}

impl From<(Handler, Context)> for Filter {
    fn from((callback, context): (Handler, Context)) -> Self {
        Self { callback: Some(callback), context: Some(context) }
    }
}

impl Prepend<Handler> for Filter {
    fn prepend(mut self, value: Handler) -> Self {
        self.callback = Some(value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_handler_identity() {
        let a = Handler::constant(json!(1));
        let b = Handler::constant(json!(1));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_constant_reply_becomes_handler() {
        let handler = Reply::from(json!({"id": 7})).into_handler();
        let context = Context::new(());
        assert_eq!(handler.call(&context, &[json!("ignored")]), json!({"id": 7}));
    }

    #[test]
    fn test_filter_matches_original_of_once_wrapper() {
        let outer = Handler::constant(Value::Null);
        let inner = Handler::constant(Value::Null);
        let other = Handler::constant(Value::Null);
        let context = Context::new(());

        assert!(Filter::any().matches(&outer, Some(&inner), None));
        assert!(Filter::callback(outer.clone()).matches(&outer, Some(&inner), None));
        assert!(Filter::callback(inner.clone()).matches(&outer, Some(&inner), None));
        assert!(!Filter::callback(other).matches(&outer, Some(&inner), None));
        assert!(!Filter::context(context.clone()).matches(&outer, None, None));
        assert!(Filter::context(context.clone()).matches(&outer, None, Some(&context)));
        assert!(!Filter::context(context).matches(&outer, None, Some(&Context::new(()))));
    }
}
