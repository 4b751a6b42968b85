//! Name argument normalization shared by every channel operation.
//!
//! An operation's first argument is a [`Key`]: nothing, one name, several names
//! (explicit or whitespace-separated), or an ordered name→value mapping. [`dispatch`]
//! expands multi-name input into one sub-call per name and leaves single names to
//! the caller.

use serde_json::Value;

/// The name argument of an event, command or request operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key<V> {
    /// No name. Removal operations treat this as "every name".
    Any,
    /// One name; whitespace-separated names fan out.
    Name(String),
    /// An explicit list of names.
    Names(Vec<String>),
    /// Name→value pairs, applied in order. The value is placed in front of the
    /// remaining arguments of each sub-call.
    Map(Vec<(String, V)>),
}

impl<V> Key<V> {
    pub fn names<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self::Names(names.into_iter().map(Into::into).collect())
    }

    pub fn map<K: Into<String>, T: Into<V>>(entries: impl IntoIterator<Item = (K, T)>) -> Self {
        Self::Map(entries.into_iter().map(|(name, value)| (name.into(), value.into())).collect())
    }

    pub const fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

impl<V> From<&str> for Key<V> {
    fn from(name: &str) -> Self {
        if name.is_empty() { Self::Any } else { Self::Name(name.to_owned()) }
    }
}

impl<V> From<String> for Key<V> {
    fn from(name: String) -> Self {
        if name.is_empty() { Self::Any } else { Self::Name(name) }
    }
}

impl<V> From<&String> for Key<V> {
    fn from(name: &String) -> Self {
        Self::from(name.as_str())
    }
}

impl<V, K: Into<String>, const N: usize> From<[(K, V); N]> for Key<V> {
    fn from(entries: [(K, V); N]) -> Self {
        Self::Map(entries.into_iter().map(|(name, value)| (name.into(), value)).collect())
    }
}

impl<V> From<Vec<(String, V)>> for Key<V> {
    fn from(entries: Vec<(String, V)>) -> Self {
        Self::Map(entries)
    }
}

/// How a mapping value is placed in front of an operation's remaining arguments.
pub(crate) trait Prepend<V> {
    #[must_use]
    fn prepend(self, value: V) -> Self;
}

impl Prepend<Value> for Vec<Value> {
    fn prepend(mut self, value: Value) -> Self {
        self.insert(0, value);
        self
    }
}

/// Outcome of [`dispatch`].
#[derive(Debug)]
pub(crate) enum Dispatch<T, R> {
    /// The key expanded into sub-calls; their results, in order.
    Fanout(Vec<T>),
    /// Not a fan-out: the caller handles this single name itself. An empty
    /// name means no name was given.
    Single(String, R),
}

/// Expands `key` into sub-calls of `op`, or hands a single name back.
///
/// Every sub-call receives a [`Key::Name`], so keys nested in mappings are
/// expanded again by the recursive call.
pub(crate) fn dispatch<V, R, T>(
    key: Key<V>,
    rest: R,
    mut op: impl FnMut(Key<V>, R) -> T,
) -> Dispatch<T, R>
where
    R: Clone + Prepend<V>,
{
    match key {
        Key::Any => Dispatch::Single(String::new(), rest),
        Key::Map(entries) => Dispatch::Fanout(
            entries
                .into_iter()
                .map(|(name, value)| op(Key::Name(name), rest.clone().prepend(value)))
                .collect(),
        ),
        Key::Names(names) if names.len() > 1 => Dispatch::Fanout(
            names.into_iter().map(|name| op(Key::Name(name), rest.clone())).collect(),
        ),
        Key::Names(names) => match names.into_iter().next() {
            Some(name) => dispatch(Key::Name(name), rest, op),
            None => Dispatch::Single(String::new(), rest),
        },
        Key::Name(name) => {
            let tokens: Vec<&str> = name.split_whitespace().collect();
            match tokens.as_slice() {
                [] => Dispatch::Single(String::new(), rest),
                [single] => Dispatch::Single((*single).to_owned(), rest),
                many => Dispatch::Fanout(
                    many.iter().map(|token| op(Key::Name((*token).to_owned()), rest.clone())).collect(),
                ),
            }
        },
    }
}
