#![forbid(unsafe_code)]

//! Recursive wrapper builder.
//!
//! [`build`] turns a raw value into an observed tree. Every container in the
//! value is rebuilt into a fresh [`ObservedNode`], eagerly and exactly once,
//! each bound to the chain of keys leading to it. Scalars are stored as they
//! are.
//!
//! Eager wrapping front-loads work proportional to the size of the value,
//! and in exchange every node can intercept mutations as soon as `build`
//! returns.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::change::{Change, Notifier};
use crate::entry::Entry;
use crate::error::NotifyResult;
use crate::key::{Chain, Key};
use crate::node::{ObservedNode, Slots};

/// Initial value for a tree: given outright or produced on demand.
pub enum Seed {
    Value(Value),
    /// Called once, when the seed is resolved.
    Producer(Box<dyn FnOnce() -> Value>),
}

impl Seed {
    /// Seed from a producer, run only when the seed is resolved.
    pub fn lazy(producer: impl FnOnce() -> Value + 'static) -> Self {
        Self::Producer(Box::new(producer))
    }

    /// The raw value, running the producer if there is one.
    #[must_use]
    pub fn resolve(self) -> Value {
        match self {
            Self::Value(v) => v,
            Self::Producer(f) => f(),
        }
    }
}

impl From<Value> for Seed {
    fn from(v: Value) -> Self {
        Self::Value(v)
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

/// Observe `seed`, reporting every intercepted mutation to `notify`.
///
/// Returns the root entry: a node when the resolved value is a container,
/// the value itself otherwise.
pub fn build(
    seed: impl Into<Seed>,
    notify: impl Fn(Change) -> NotifyResult + 'static,
) -> Entry {
    let notify: Notifier = Rc::new(notify);
    build_with(seed, &notify)
}

/// Like [`build`], sharing an existing notifier.
pub fn build_with(seed: impl Into<Seed>, notify: &Notifier) -> Entry {
    let value = seed.into().resolve();
    let entry = build_at(value, notify, Chain::root());
    if let Entry::Node(root) = &entry {
        tracing::debug!(kind = ?root.kind(), len = root.len(), "observed tree built");
    }
    entry
}

/// Wrap `value` as if it lived at `chain` of a tree reporting to `notify`.
///
/// Used to re-wrap a freshly assigned container at its destination.
pub fn build_at(value: Value, notify: &Notifier, chain: Chain) -> Entry {
    let slots = match value {
        Value::Array(items) => Slots::Sequence(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| build_at(item, notify, chain.child(Key::Index(i))))
                .collect(),
        ),
        Value::Object(fields) => Slots::Map(
            fields
                .into_iter()
                .map(|(k, item)| {
                    let child = build_at(item, notify, chain.child(Key::Field(k.clone())));
                    (k, child)
                })
                .collect::<IndexMap<String, Entry>>(),
        ),
        scalar => return Entry::Value(scalar),
    };
    Entry::Node(ObservedNode::from_slots(chain, slots, Rc::clone(notify)))
}
