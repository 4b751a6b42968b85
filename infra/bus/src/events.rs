use crate::handler::{Context, Filter, Handler, Registration, next_id};
use crate::names::{Dispatch, Key, dispatch};
use fxhash::FxHashMap;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::trace;

/// Wildcard event: its listeners receive every event, name first.
pub const ALL_EVENTS: &str = "all";

/// Anything that owns an [`EventBus`] and can be listened to.
pub trait Emitter {
    fn events(&self) -> &EventBus;
}

#[derive(Debug, Clone)]
struct Listener {
    id: u64,
    callback: Handler,
    original: Option<Handler>,
    /// Context given at registration; the bus owner is used when absent.
    context: Option<Context>,
}

impl Listener {
    fn call(&self, owner: &Context, args: &[Value]) {
        self.callback.call(self.context.as_ref().unwrap_or(owner), args);
    }

    fn matches(&self, filter: &Filter) -> bool {
        filter.matches(&self.callback, self.original.as_ref(), self.context.as_ref())
    }
}

#[derive(Debug)]
struct BusInner {
    id: u64,
    owner: Context,
    events: RwLock<FxHashMap<String, Vec<Listener>>>,
    listening_to: Mutex<FxHashMap<u64, Weak<BusInner>>>,
}

/// Multi-subscriber observer keyed by event name.
///
/// Listeners run synchronously in registration order. The lists are
/// snapshotted before each dispatch, so listeners may subscribe, unsubscribe
/// or trigger on the same bus while it is dispatching.
///
/// # Examples
/// ```rust
/// use radio_bus::{EventBus, Handler, json};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let bus = EventBus::new();
/// let seen = Arc::new(AtomicUsize::new(0));
/// let counter = seen.clone();
///
/// bus.on("change", Handler::effect(move |_, _| {
///     counter.fetch_add(1, Ordering::Relaxed);
/// }));
/// bus.trigger("change", &[json!(1)]).trigger("change other", &[]);
///
/// assert_eq!(seen.load(Ordering::Relaxed), 2);
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Creates a bus whose owner is a fresh, anonymous context.
    pub fn new() -> Self {
        Self::with_context(Context::new(()))
    }

    /// Creates a bus owned by `owner`. The owner is the receiver of listeners
    /// registered without a context, and the context `listen_to` registers with.
    pub fn with_context(owner: Context) -> Self {
        Self {
            inner: Arc::new(BusInner {
                id: next_id(),
                owner,
                events: RwLock::default(),
                listening_to: Mutex::default(),
            }),
        }
    }

    pub fn owner(&self) -> &Context {
        &self.inner.owner
    }

    /// Subscribes a listener. Mapping keys take their callbacks from the values.
    pub fn on(&self, key: impl Into<Key<Handler>>, registration: impl Into<Registration>) -> &Self {
        self.on_key(key.into(), registration.into());
        self
    }

    /// Subscribes a listener that unsubscribes itself before its first run.
    pub fn once(
        &self,
        key: impl Into<Key<Handler>>,
        registration: impl Into<Registration>,
    ) -> &Self {
        self.once_key(key.into(), registration.into());
        self
    }

    /// Unsubscribes listeners. No name and an empty filter removes everything.
    pub fn off(&self, key: impl Into<Key<Handler>>, filter: impl Into<Filter>) -> &Self {
        self.off_key(key.into(), filter.into());
        self
    }

    /// Calls the listeners of each named event, then the [`ALL_EVENTS`] listeners
    /// with the event name prepended.
    pub fn trigger(&self, key: impl Into<Key<Value>>, args: &[Value]) -> &Self {
        self.trigger_key(key.into(), args.to_vec());
        self
    }

    /// Subscribes to `other` with this bus's owner as the context, and tracks
    /// `other` for [`EventBus::stop_listening`].
    pub fn listen_to<E: Emitter + ?Sized>(
        &self,
        other: &E,
        key: impl Into<Key<Handler>>,
        callback: Option<Handler>,
    ) -> &Self {
        let target = other.events();
        self.track(target);
        target.on_key(key.into(), self.owned(callback));
        self
    }

    pub fn listen_to_once<E: Emitter + ?Sized>(
        &self,
        other: &E,
        key: impl Into<Key<Handler>>,
        callback: Option<Handler>,
    ) -> &Self {
        let target = other.events();
        self.track(target);
        target.once_key(key.into(), self.owned(callback));
        self
    }

    /// Removes what this bus registered on `other` (or on every tracked emitter).
    ///
    /// A target is forgotten when neither a name nor a callback was given, or
    /// once it has no listeners left.
    pub fn stop_listening(
        &self,
        other: Option<&dyn Emitter>,
        key: impl Into<Key<Handler>>,
        callback: Option<Handler>,
    ) -> &Self {
        let key = key.into();
        let forget = key.is_any() && callback.is_none();
        let filter = Filter { callback, context: Some(self.inner.owner.clone()) };

        let targets: Vec<EventBus> = match other {
            Some(other) => vec![other.events().clone()],
            None => {
                let mut listening_to = self.inner.listening_to.lock();
                listening_to.retain(|_, target| target.strong_count() > 0);
                listening_to
                    .values()
                    .filter_map(Weak::upgrade)
                    .map(|inner| EventBus { inner })
                    .collect()
            },
        };

        for target in targets {
            target.off_key(key.clone(), filter.clone());
            if forget || target.is_empty() {
                self.inner.listening_to.lock().remove(&target.inner.id);
            }
        }
        self
    }

    /// Number of listeners subscribed to `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        self.inner.events.read().get(name).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.events.read().is_empty()
    }

    /// Number of live emitters this bus is listening to.
    pub fn listening_count(&self) -> usize {
        self.inner.listening_to.lock().values().filter(|target| target.strong_count() > 0).count()
    }

    fn on_key(&self, key: Key<Handler>, registration: Registration) {
        let Dispatch::Single(name, registration) =
            dispatch(key, registration, |key, registration| self.on_key(key, registration))
        else {
            return;
        };
        let Some(callback) = registration.callback else { return };
        if name.is_empty() {
            return;
        }
        self.push(
            name,
            Listener { id: next_id(), callback, original: None, context: registration.context },
        );
    }

    fn once_key(&self, key: Key<Handler>, registration: Registration) {
        let Dispatch::Single(name, registration) =
            dispatch(key, registration, |key, registration| self.once_key(key, registration))
        else {
            return;
        };
        let Some(callback) = registration.callback else { return };
        if name.is_empty() {
            return;
        }

        let id = next_id();
        let bus = Arc::downgrade(&self.inner);
        let target = name.clone();
        let original = callback.clone();
        let fired = AtomicBool::new(false);

        let adapter = Handler::new(move |context, args| {
            if fired.swap(true, Ordering::AcqRel) {
                return Value::Null;
            }
            if let Some(bus) = bus.upgrade() {
                remove_listener(&bus, &target, id);
            }
            original.call(context, args)
        });

        self.push(
            name,
            Listener { id, callback: adapter, original: Some(callback), context: registration.context },
        );
    }

    fn off_key(&self, key: Key<Handler>, filter: Filter) {
        let Dispatch::Single(name, filter) =
            dispatch(key, filter, |key, filter| self.off_key(key, filter))
        else {
            return;
        };

        let mut events = self.inner.events.write();
        if name.is_empty() && filter.is_empty() {
            events.clear();
        } else if name.is_empty() {
            events.retain(|_, listeners| {
                listeners.retain(|listener| !listener.matches(&filter));
                !listeners.is_empty()
            });
        } else if let Some(listeners) = events.get_mut(&name) {
            listeners.retain(|listener| !listener.matches(&filter));
            if listeners.is_empty() {
                events.remove(&name);
            }
        }
    }

    fn trigger_key(&self, key: Key<Value>, args: Vec<Value>) {
        let Dispatch::Single(name, args) =
            dispatch(key, args, |key, args| self.trigger_key(key, args))
        else {
            return;
        };
        if name.is_empty() {
            return;
        }

        let (named, all) = {
            let events = self.inner.events.read();
            (events.get(&name).cloned(), events.get(ALL_EVENTS).cloned())
        };

        trace!(
            event = %name,
            listeners = named.as_ref().map_or(0, Vec::len),
            all = all.as_ref().map_or(0, Vec::len),
            "Triggering event"
        );

        for listener in named.iter().flatten() {
            listener.call(&self.inner.owner, &args);
        }

        if let Some(all) = all {
            let mut full = Vec::with_capacity(args.len() + 1);
            full.push(Value::String(name));
            full.extend(args);
            for listener in &all {
                listener.call(&self.inner.owner, &full);
            }
        }
    }

    fn push(&self, name: String, listener: Listener) {
        self.inner.events.write().entry(name).or_default().push(listener);
    }

    fn owned(&self, callback: Option<Handler>) -> Registration {
        Registration { callback, context: Some(self.inner.owner.clone()) }
    }

    fn track(&self, target: &Self) {
        self.inner.listening_to.lock().insert(target.inner.id, Arc::downgrade(&target.inner));
    }
}

impl Emitter for EventBus {
    fn events(&self) -> &EventBus {
        self
    }
}

impl PartialEq for EventBus {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for EventBus {}

fn remove_listener(bus: &BusInner, name: &str, id: u64) {
    let mut events = bus.events.write();
    if let Some(listeners) = events.get_mut(name) {
        listeners.retain(|listener| listener.id != id);
        if listeners.is_empty() {
            events.remove(name);
        }
    }
}
