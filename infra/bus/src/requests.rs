use crate::channel::ChannelMeta;
use crate::handler::{Filter, Handler, Registration, Reply};
use crate::names::{Dispatch, Key, dispatch};
use crate::store::{HandlerStore, StoreKind};
use serde_json::Value;
use std::sync::Arc;

/// The answer to a request.
///
/// A single name answers [`Response::Single`], `None` when nothing handled it.
/// Several names or a mapping answer [`Response::Many`], one entry per name in
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Single(Option<Value>),
    Many(Vec<Response>),
}

impl Response {
    /// The single answer, if this is one.
    pub const fn value(&self) -> Option<&Value> {
        match self {
            Self::Single(value) => value.as_ref(),
            Self::Many(_) => None,
        }
    }

    /// Flattens into a JSON value: unhandled becomes `None` at the top level
    /// and `null` inside arrays.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Single(value) => value,
            Self::Many(responses) => Some(Value::Array(
                responses.into_iter().map(|r| r.into_value().unwrap_or(Value::Null)).collect(),
            )),
        }
    }

    /// The per-name answers. A single answer becomes a one-element list.
    pub fn into_many(self) -> Vec<Self> {
        match self {
            Self::Many(responses) => responses,
            single @ Self::Single(_) => vec![single],
        }
    }

    pub const fn is_handled(&self) -> bool {
        match self {
            Self::Single(value) => value.is_some(),
            Self::Many(_) => true,
        }
    }
}

impl From<Response> for Option<Value> {
    fn from(response: Response) -> Self {
        response.into_value()
    }
}

/// Call-and-return lookups: one handler per name, `"default"` as fallback.
#[derive(Debug, Clone)]
pub(crate) struct Requests {
    meta: Arc<ChannelMeta>,
    store: HandlerStore,
}

impl Requests {
    pub(crate) fn new(meta: Arc<ChannelMeta>) -> Self {
        Self { store: HandlerStore::new(StoreKind::Requests, meta.clone()), meta }
    }

    pub(crate) fn request(&self, key: Key<Value>, args: Vec<Value>) -> Response {
        match dispatch(key, args, |key, args| self.request(key, args)) {
            Dispatch::Fanout(responses) => Response::Many(responses),
            Dispatch::Single(name, args) => {
                self.meta.log_activity(&name, &args);
                Response::Single(self.store.invoke(&name, &args))
            },
        }
    }

    pub(crate) fn reply(&self, key: Key<Reply>, registration: Registration<Reply>) {
        if let Dispatch::Single(name, Registration { callback: Some(reply), context }) =
            dispatch(key, registration, |key, registration| self.reply(key, registration))
            && !name.is_empty()
        {
            self.store.register(&name, reply.into_handler(), context);
        }
    }

    pub(crate) fn reply_once(&self, key: Key<Reply>, registration: Registration<Reply>) {
        if let Dispatch::Single(name, Registration { callback: Some(reply), context }) =
            dispatch(key, registration, |key, registration| self.reply_once(key, registration))
            && !name.is_empty()
        {
            self.store.register_once(&name, reply.into_handler(), context);
        }
    }

    pub(crate) fn stop_replying(&self, key: Key<Handler>, filter: Filter) {
        if let Dispatch::Single(name, filter) =
            dispatch(key, filter, |key, filter| self.stop_replying(key, filter))
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
