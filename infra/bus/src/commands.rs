use crate::channel::ChannelMeta;
use crate::handler::{Filter, Handler, Registration};
use crate::names::{Dispatch, Key, dispatch};
use crate::store::{HandlerStore, StoreKind};
use serde_json::Value;
use std::sync::Arc;

/// Fire-and-forget orders: one handler per name, `"default"` as fallback.
#[derive(Debug, Clone)]
pub(crate) struct Commands {
    meta: Arc<ChannelMeta>,
    store: HandlerStore,
}

impl Commands {
    pub(crate) fn new(meta: Arc<ChannelMeta>) -> Self {
        Self { store: HandlerStore::new(StoreKind::Commands, meta.clone()), meta }
    }

    pub(crate) fn command(&self, key: Key<Value>, args: Vec<Value>) {
        if let Dispatch::Single(name, args) = dispatch(key, args, |key, args| self.command(key, args)) {
            self.meta.log_activity(&name, &args);
            self.store.invoke(&name, &args);
        }
    }

    pub(crate) fn comply(&self, key: Key<Handler>, registration: Registration) {
        if let Dispatch::Single(name, Registration { callback: Some(callback), context }) =
            dispatch(key, registration, |key, registration| self.comply(key, registration))
            && !name.is_empty()
        {
            self.store.register(&name, callback, context);
        }
    }

    pub(crate) fn comply_once(&self, key: Key<Handler>, registration: Registration) {
        if let Dispatch::Single(name, Registration { callback: Some(callback), context }) =
            dispatch(key, registration, |key, registration| self.comply_once(key, registration))
            && !name.is_empty()
        {
            self.store.register_once(&name, callback, context);
        }
    }

    pub(crate) fn stop_complying(&self, key: Key<Handler>, filter: Filter) {
        if let Dispatch::Single(name, filter) =
            dispatch(key, filter, |key, filter| self.stop_complying(key, filter))
        {
            self.store.remove(&name, &filter);
        }
    }

    pub(crate) fn clear(&self) {
        self.store.clear();
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.store.contains(name)
    }

    pub(crate) fn len(&self) -> usize {
        self.store.len()
    }
}
