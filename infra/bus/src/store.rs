use crate::channel::ChannelMeta;
use crate::diagnostics::Warning;
use crate::handler::{Context, Filter, Handler, next_id};
use fxhash::FxHashMap;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::trace;

/// Reserved name of the fallback handler.
pub const DEFAULT_HANDLER: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StoreKind {
    Commands,
    Requests,
}

impl StoreKind {
    const fn unhandled(self) -> Warning {
        match self {
            Self::Commands => Warning::UnhandledCommand,
            Self::Requests => Warning::UnhandledRequest,
        }
    }

    const fn overwritten(self) -> Warning {
        match self {
            Self::Commands => Warning::CommandOverwritten,
            Self::Requests => Warning::RequestOverwritten,
        }
    }

    const fn unregistered(self) -> Warning {
        match self {
            Self::Commands => Warning::UnregisteredCommand,
            Self::Requests => Warning::UnregisteredRequest,
        }
    }
}

/// A registered handler. `original` is the wrapped callback when `callback` is a
/// once-adapter.
#[derive(Debug, Clone)]
struct HandlerEntry {
    id: u64,
    callback: Handler,
    original: Option<Handler>,
    context: Context,
}

#[derive(Debug)]
struct StoreInner {
    kind: StoreKind,
    meta: Arc<ChannelMeta>,
    entries: Mutex<FxHashMap<String, HandlerEntry>>,
}

/// Name → handler table with one entry per name and `"default"` fallback.
#[derive(Debug, Clone)]
pub(crate) struct HandlerStore {
    inner: Arc<StoreInner>,
}

impl HandlerStore {
    pub(crate) fn new(kind: StoreKind, meta: Arc<ChannelMeta>) -> Self {
        Self { inner: Arc::new(StoreInner { kind, meta, entries: Mutex::default() }) }
    }

    pub(crate) fn register(&self, name: &str, callback: Handler, context: Option<Context>) {
        let context = context.unwrap_or_else(|| self.inner.meta.context.clone());
        self.insert(name, HandlerEntry { id: next_id(), callback, original: None, context });
    }

    /// Registers `callback` behind an adapter that deregisters its own entry and
    /// runs `callback` at most once. Repeat calls answer the first result.
    pub(crate) fn register_once(&self, name: &str, callback: Handler, context: Option<Context>) {
        let id = next_id();
        let store = Arc::downgrade(&self.inner);
        let target = name.to_owned();
        let original = callback.clone();
        let fired = AtomicBool::new(false);
        let first: Mutex<Option<Value>> = Mutex::new(None);

        let adapter = Handler::new(move |context, args| {
            if fired.swap(true, Ordering::AcqRel) {
                return first.lock().clone().unwrap_or(Value::Null);
            }
            remove_entry(&store, &target, id);
            let result = original.call(context, args);
            *first.lock() = Some(result.clone());
            result
        });

        let context = context.unwrap_or_else(|| self.inner.meta.context.clone());
        self.insert(name, HandlerEntry { id, callback: adapter, original: Some(callback), context });
    }

    fn insert(&self, name: &str, entry: HandlerEntry) {
        let replaced = self.inner.entries.lock().insert(name.to_owned(), entry).is_some();
        if replaced {
            self.warn(self.inner.kind.overwritten(), name);
        }
    }

    /// Calls the handler for `name`, or the `"default"` handler with `name`
    /// prepended to `args`. Without a name, `null` is prepended only when there
    /// are arguments. Returns `None` when neither handler exists.
    pub(crate) fn invoke(&self, name: &str, args: &[Value]) -> Option<Value> {
        let (entry, fallback) = {
            let entries = self.inner.entries.lock();
            match entries.get(name) {
                Some(entry) => (Some(entry.clone()), false),
                None => (entries.get(DEFAULT_HANDLER).cloned(), true),
            }
        };

        let Some(entry) = entry else {
            self.warn(self.inner.kind.unhandled(), name);
            return None;
        };

        trace!(channel = %self.inner.meta.name, name, fallback, kind = ?self.inner.kind, "Dispatching");

        if fallback && (!name.is_empty() || !args.is_empty()) {
            let mut full = Vec::with_capacity(args.len() + 1);
            full.push(if name.is_empty() { Value::Null } else { Value::String(name.to_owned()) });
            full.extend_from_slice(args);
            Some(entry.callback.call(&entry.context, &full))
        } else {
            Some(entry.callback.call(&entry.context, args))
        }
    }

    /// Removes the entries of `name` (every name when empty) that match `filter`.
    /// No name and an empty filter clears the store.
    pub(crate) fn remove(&self, name: &str, filter: &Filter) -> bool {
        if name.is_empty() && filter.is_empty() {
            self.clear();
            return true;
        }

        let matches = |entry: &HandlerEntry| {
            filter.matches(&entry.callback, entry.original.as_ref(), Some(&entry.context))
        };

        let removed = {
            let mut entries = self.inner.entries.lock();
            if name.is_empty() {
                let before = entries.len();
                entries.retain(|_, entry| !matches(entry));
                entries.len() != before
            } else if entries.get(name).is_some_and(matches) {
                entries.remove(name);
                true
            } else {
                false
            }
        };

        if !removed {
            self.warn(self.inner.kind.unregistered(), name);
        }
        removed
    }

    pub(crate) fn clear(&self) {
        self.inner.entries.lock().clear();
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.inner.entries.lock().contains_key(name)
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.entries.lock().len()
    }

    fn warn(&self, warning: Warning, name: &str) {
        self.inner.meta.diagnostics.warn(warning, name, &self.inner.meta.name);
    }
}

/// Drops `name` only while it still holds entry `id`, so a newer registration
/// under the same name survives a stale once-adapter.
fn remove_entry(store: &Weak<StoreInner>, name: &str, id: u64) {
    let Some(store) = store.upgrade() else { return };
    let mut entries = store.entries.lock();
    if entries.get(name).is_some_and(|entry| entry.id == id) {
        entries.remove(name);
    }
}
