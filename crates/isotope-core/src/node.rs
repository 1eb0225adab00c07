#![forbid(unsafe_code)]

//! Observed containers with write/delete interception.
//!
//! # Design
//!
//! [`ObservedNode`] wraps one container (a sequence or a map) in shared,
//! reference-counted storage (`Rc<..>` with a `RefCell` around the slots).
//! It remembers the [`Chain`] it was built at, a mutation counter, and the
//! tree's [`Notifier`].
//!
//! Writes and deletes are not applied to the slots. They are turned into a
//! [`Change`] at `chain + [key]` and handed to the notifier, whose answer
//! becomes the result of the operation. Only while suppression is active
//! (see [`crate::suppression`]) do writes and deletes touch the slots
//! directly.
//!
//! # Invariants
//!
//! 1. `chain` never changes after construction.
//! 2. The counter starts at 0 and only moves through
//!    [`increment_counter`](ObservedNode::increment_counter).
//! 3. One notification per unsuppressed write or delete, issued before the
//!    operation returns.
//! 4. No node references its parent; children are separate nodes held in
//!    the slots, so trees never form cycles.
//!
//! # Failure Modes
//!
//! - **Notifier error**: returned unchanged from `set`/`delete`; nothing is
//!   rolled back because nothing was applied.
//! - **Re-entrant notifier**: the slots are never borrowed while the notifier
//!   runs, so a notifier may read and (under suppression) write any node of
//!   the tree, this one included.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::binding::Binding;
use crate::change::{Change, Notifier};
use crate::entry::Entry;
use crate::error::{NotifyResult, ObserveError};
use crate::key::{Chain, Key};
use crate::suppression;

/// Most `null` holes a single direct write may add past the end of a
/// sequence.
pub const MAX_GAP: usize = 1024;

/// Field that resizes a sequence when written.
const LENGTH: &str = "length";

/// Container shape of an [`ObservedNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Sequence,
    Map,
}

/// Storage of a node: entries under their keys.
pub(crate) enum Slots {
    Sequence(Vec<Entry>),
    Map(IndexMap<String, Entry>),
}

impl Slots {
    fn kind(&self) -> ContainerKind {
        match self {
            Self::Sequence(_) => ContainerKind::Sequence,
            Self::Map(_) => ContainerKind::Map,
        }
    }

    fn get(&self, key: &Key) -> Option<&Entry> {
        match self {
            Self::Sequence(items) => key.as_index().and_then(|i| items.get(i)),
            Self::Map(fields) => fields.get(&key.to_field()),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Sequence(items) => items.len(),
            Self::Map(fields) => fields.len(),
        }
    }
}

/// Shared interior for [`ObservedNode`].
struct NodeInner {
    chain: Chain,
    counter: Cell<u64>,
    slots: RefCell<Slots>,
    notify: Notifier,
}

/// An observed container.
///
/// Cloning an `ObservedNode` creates a new handle to the **same** node:
/// same slots, same counter.
pub struct ObservedNode {
    inner: Rc<NodeInner>,
}

impl Clone for ObservedNode {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for ObservedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.inner.slots.borrow();
        f.debug_struct("ObservedNode")
            .field("chain", &self.inner.chain.to_string())
            .field("kind", &slots.kind())
            .field("len", &slots.len())
            .field("counter", &self.inner.counter.get())
            .finish()
    }
}

impl ObservedNode {
    pub(crate) fn from_slots(chain: Chain, slots: Slots, notify: Notifier) -> Self {
        Self {
            inner: Rc::new(NodeInner {
                chain,
                counter: Cell::new(0),
                slots: RefCell::new(slots),
                notify,
            }),
        }
    }

    /// Path this node was built at.
    #[must_use]
    pub fn chain(&self) -> &Chain {
        &self.inner.chain
    }

    #[must_use]
    pub fn kind(&self) -> ContainerKind {
        self.inner.slots.borrow().kind()
    }

    /// Whether two handles point at the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The notifier this node reports to.
    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.inner.notify
    }

    // -- Counter ------------------------------------------------------------

    /// Current value of this node's mutation counter.
    #[must_use]
    pub fn mutation_count(&self) -> u64 {
        self.inner.counter.get()
    }

    /// Add one to this node's mutation counter. Nothing else happens: no
    /// notification, no effect on other nodes.
    pub fn increment_counter(&self) {
        self.inner.counter.set(self.inner.counter.get() + 1);
    }

    /// Set the suppression switch shared by every node on this thread.
    ///
    /// See [`suppression::set_suppression`]; nodes built on other threads
    /// are not affected.
    pub fn set_suppression(&self, on: bool) {
        suppression::set_suppression(on);
    }

    // -- Reads --------------------------------------------------------------

    /// Entry stored under `key`. Nested containers come back as nodes.
    #[must_use]
    pub fn get(&self, key: impl Into<Key>) -> Option<Entry> {
        self.inner.slots.borrow().get(&key.into()).cloned()
    }

    /// Raw value under `key`, if it holds one (not a node).
    #[must_use]
    pub fn value(&self, key: impl Into<Key>) -> Option<Value> {
        self.get(key).and_then(|e| e.as_value().cloned())
    }

    /// Node under `key`, if it holds one.
    #[must_use]
    pub fn child(&self, key: impl Into<Key>) -> Option<ObservedNode> {
        self.get(key).and_then(Entry::into_node)
    }

    /// Whether `key` is an own key of this container.
    ///
    /// Sequence indices past the end are not own keys.
    #[must_use]
    pub fn contains_key(&self, key: impl Into<Key>) -> bool {
        self.inner.slots.borrow().get(&key.into()).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.slots.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Own keys in order.
    #[must_use]
    pub fn keys(&self) -> Vec<Key> {
        match &*self.inner.slots.borrow() {
            Slots::Sequence(items) => (0..items.len()).map(Key::Index).collect(),
            Slots::Map(fields) => fields.keys().map(|k| Key::Field(k.clone())).collect(),
        }
    }

    /// Follow `path` from this node through nested nodes.
    ///
    /// An empty path yields this node.
    #[must_use]
    pub fn entry_at<K: Into<Key> + Clone>(&self, path: &[K]) -> Option<Entry> {
        let mut current = Entry::Node(self.clone());
        for key in path {
            current = current.as_node()?.get(key.clone())?;
        }
        Some(current)
    }

    /// Follow `path` and require an observed node at its end.
    ///
    /// # Errors
    ///
    /// [`ObserveError::NotAContainer`] naming the first chain along the path
    /// that is missing or not a node.
    pub fn node_at<K: Into<Key> + Clone>(&self, path: &[K]) -> Result<ObservedNode, ObserveError> {
        let mut node = self.clone();
        let mut walked = self.chain().clone();
        for key in path {
            let key: Key = key.clone().into();
            walked = walked.child(key.clone());
            node = node
                .child(key)
                .ok_or_else(|| ObserveError::NotAContainer {
                    chain: walked.clone(),
                })?;
        }
        Ok(node)
    }

    /// Raw value of the whole subtree.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        match &*self.inner.slots.borrow() {
            Slots::Sequence(items) => Value::Array(items.iter().map(Entry::snapshot).collect()),
            Slots::Map(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.snapshot()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }

    /// Reactive binding for own key `prop`, or `None` if there is no such key.
    #[must_use]
    pub fn binding_for(&self, prop: impl Into<Key>) -> Option<Binding> {
        let prop = prop.into();
        let current = self.inner.slots.borrow().get(&prop)?.clone();
        let chain = self.inner.chain.child(self.normalize(prop).ok()?);
        Some(Binding::derive(chain, current, Rc::clone(&self.inner.notify)))
    }

    // -- Mutations ----------------------------------------------------------

    /// Assign `value` under `key`.
    ///
    /// Notifies a `set` at `chain + [key]` and returns the notifier's answer.
    /// Every key is forwarded: numeric keys on a sequence as indices, all
    /// others as fields (`length` included).
    ///
    /// While suppressed, stores the value directly and returns `Ok(true)`.
    /// A raw container stored this way is not wrapped. On a sequence,
    /// `length` truncates or pads with `null`, and an index past the end pads
    /// the gap with `null`, up to [`MAX_GAP`] holes.
    ///
    /// # Errors
    ///
    /// The notifier's error. While suppressed on a sequence,
    /// [`ObserveError::InvalidKey`] for a non-numeric key,
    /// [`ObserveError::OutOfRange`] past the gap limit, and
    /// [`ObserveError::InvalidLength`] for a bad `length`.
    pub fn set(&self, key: impl Into<Key>, value: impl Into<Entry>) -> NotifyResult {
        let key = key.into();
        let value = value.into();
        if suppression::is_suppressed() {
            tracing::trace!(chain = %self.inner.chain, %key, "suppressed set");
            self.store(key, value)?;
            return Ok(true);
        }
        let chain = self.inner.chain.child(self.forward_key(key));
        tracing::trace!(%chain, "set intercepted");
        (self.inner.notify)(Change::set(chain, value))
    }

    /// Remove `key`.
    ///
    /// Notifies a `deleteProperty` at `chain + [key]` and returns the
    /// notifier's answer. While suppressed, removes directly: map fields are
    /// dropped, sequence slots are left as `null` holes so later indices do
    /// not shift.
    ///
    /// # Errors
    ///
    /// The notifier's error, or [`ObserveError::InvalidKey`] for a
    /// non-numeric key on a sequence while suppressed.
    pub fn delete(&self, key: impl Into<Key>) -> NotifyResult {
        let key = key.into();
        if suppression::is_suppressed() {
            let key = self.normalize(key)?;
            tracing::trace!(chain = %self.inner.chain, %key, "suppressed delete");
            self.evict(&key);
            return Ok(true);
        }
        let chain = self.inner.chain.child(self.forward_key(key));
        tracing::trace!(%chain, "delete intercepted");
        (self.inner.notify)(Change::delete(chain))
    }

    /// Append `value` to a sequence: a `set` at index `len`.
    ///
    /// # Errors
    ///
    /// [`ObserveError::NotASequence`] on a map, otherwise as for
    /// [`set`](Self::set).
    pub fn push(&self, value: impl Into<Entry>) -> NotifyResult {
        self.require_sequence()?;
        self.set(self.len(), value)
    }

    /// Resize a sequence: a `set` of its `length`.
    ///
    /// Shorter drops the tail; longer pads with `null`.
    ///
    /// # Errors
    ///
    /// As for [`push`](Self::push).
    pub fn truncate(&self, len: usize) -> NotifyResult {
        self.require_sequence()?;
        self.set(LENGTH, Value::from(len))
    }

    fn require_sequence(&self) -> Result<(), ObserveError> {
        match self.kind() {
            ContainerKind::Sequence => Ok(()),
            ContainerKind::Map => Err(ObserveError::NotASequence {
                chain: self.inner.chain.clone(),
            }),
        }
    }

    /// Key as it appears in a notified chain.
    fn forward_key(&self, key: Key) -> Key {
        match (self.kind(), key.as_index()) {
            (ContainerKind::Sequence, Some(i)) => Key::Index(i),
            _ => Key::Field(key.to_field()),
        }
    }

    /// Bring `key` into the form this container stores it in.
    fn normalize(&self, key: Key) -> Result<Key, ObserveError> {
        match self.kind() {
            ContainerKind::Map => Ok(Key::Field(key.to_field())),
            ContainerKind::Sequence => self.index_of(key).map(Key::Index),
        }
    }

    fn index_of(&self, key: Key) -> Result<usize, ObserveError> {
        key.as_index().ok_or_else(|| ObserveError::InvalidKey {
            chain: self.inner.chain.clone(),
            key,
        })
    }

    fn store(&self, key: Key, value: Entry) -> Result<(), ObserveError> {
        if let Slots::Map(fields) = &mut *self.inner.slots.borrow_mut() {
            fields.insert(key.to_field(), value);
            return Ok(());
        }

        if matches!(&key, Key::Field(name) if name == LENGTH) {
            let len = self.length_of(&value)?;
            self.check_gap(len)?;
            self.resize(len);
            return Ok(());
        }
        let i = self.index_of(key)?;
        if i >= self.len() {
            self.check_gap(i)?;
            self.resize(i + 1);
        }
        if let Slots::Sequence(items) = &mut *self.inner.slots.borrow_mut() {
            items[i] = value;
        }
        Ok(())
    }

    /// Reject padding up to `end` when it needs more than [`MAX_GAP`] holes.
    fn check_gap(&self, end: usize) -> Result<(), ObserveError> {
        if end.saturating_sub(self.len()) > MAX_GAP {
            return Err(ObserveError::OutOfRange {
                chain: self.inner.chain.clone(),
                index: end,
            });
        }
        Ok(())
    }

    /// Truncate or `null`-pad a sequence to `len`.
    fn resize(&self, len: usize) {
        if let Slots::Sequence(items) = &mut *self.inner.slots.borrow_mut() {
            items.resize(len, Entry::Value(Value::Null));
        }
    }

    fn length_of(&self, value: &Entry) -> Result<usize, ObserveError> {
        value
            .as_value()
            .and_then(Value::as_u64)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| ObserveError::InvalidLength {
                chain: self.inner.chain.clone(),
                value: value.snapshot(),
            })
    }

    fn evict(&self, key: &Key) {
        match &mut *self.inner.slots.borrow_mut() {
            Slots::Sequence(items) => {
                if let Some(slot) = key.as_index().and_then(|i| items.get_mut(i)) {
                    *slot = Entry::Value(Value::Null);
                }
            }
            Slots::Map(fields) => {
                fields.shift_remove(&key.to_field());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
