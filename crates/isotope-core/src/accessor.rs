#![forbid(unsafe_code)]

//! String-keyed accessor protocol over observed nodes.
//!
//! Plain-data consumers address everything by property name, including a
//! handful of reserved names that reach node instrumentation instead of
//! stored data. [`Interceptable::read`] resolves a name with ordered checks:
//!
//! | Name | Result |
//! |------|--------|
//! | `__isRadioactive__` | [`Accessor::Marker`], always `true` |
//! | `$` | [`Accessor::Count`], the node's mutation counter |
//! | `__INC$__` | [`Accessor::Increment`], a hook bumping the counter |
//! | `__disableOnChange__` | [`Accessor::Suppress`], a hook setting the shared switch |
//! | `$prop` with own key `prop` | [`Accessor::Binding`] for `prop` |
//! | anything else | [`Accessor::Entry`], the stored entry if any |
//!
//! A `$prop` name without an own key `prop` falls through to the last row.

use std::fmt;

use crate::binding::Binding;
use crate::entry::Entry;
use crate::error::NotifyResult;
use crate::node::ObservedNode;
use crate::suppression;

pub const IDENTITY_MARKER: &str = "__isRadioactive__";
pub const COUNTER: &str = "$";
pub const INCREMENT: &str = "__INC$__";
pub const SUPPRESSION: &str = "__disableOnChange__";
pub const BINDING_PREFIX: char = '$';

/// Mutation and read surface of an observed container, keyed by name.
pub trait Interceptable {
    /// Resolve `key` under the accessor priority rules.
    fn read(&self, key: &str) -> Accessor;

    /// Write `value` under `key`.
    ///
    /// # Errors
    ///
    /// See [`ObservedNode::set`].
    fn write(&self, key: &str, value: Entry) -> NotifyResult;

    /// Remove `key`.
    ///
    /// # Errors
    ///
    /// See [`ObservedNode::delete`].
    fn remove(&self, key: &str) -> NotifyResult;
}

/// Result of [`Interceptable::read`].
#[derive(Debug, Clone)]
pub enum Accessor {
    Marker(bool),
    Count(u64),
    Increment(IncrementHook),
    Suppress(SuppressionHook),
    Binding(Binding),
    /// Stored entry; `None` when the key is absent.
    Entry(Option<Entry>),
}

impl Accessor {
    /// The stored entry, when the name resolved to data.
    #[must_use]
    pub fn into_entry(self) -> Option<Entry> {
        match self {
            Self::Entry(e) => e,
            _ => None,
        }
    }

    #[must_use]
    pub fn into_binding(self) -> Option<Binding> {
        match self {
            Self::Binding(b) => Some(b),
            _ => None,
        }
    }
}

/// Zero-argument hook adding one to a node's mutation counter.
#[derive(Clone)]
pub struct IncrementHook {
    node: ObservedNode,
}

impl IncrementHook {
    pub fn call(&self) {
        self.node.increment_counter();
    }
}

impl fmt::Debug for IncrementHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncrementHook")
            .field("chain", &self.node.chain().to_string())
            .finish()
    }
}

/// One-argument hook setting the shared suppression switch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuppressionHook;

impl SuppressionHook {
    pub fn call(&self, on: bool) {
        suppression::set_suppression(on);
    }
}

impl Interceptable for ObservedNode {
    fn read(&self, key: &str) -> Accessor {
        match key {
            IDENTITY_MARKER => return Accessor::Marker(true),
            COUNTER => return Accessor::Count(self.mutation_count()),
            INCREMENT => return Accessor::Increment(IncrementHook { node: self.clone() }),
            SUPPRESSION => return Accessor::Suppress(SuppressionHook),
            _ => {}
        }
        if let Some(prop) = key.strip_prefix(BINDING_PREFIX) {
            if let Some(binding) = self.binding_for(prop) {
                return Accessor::Binding(binding);
            }
        }
        Accessor::Entry(self.get(key))
    }

    fn write(&self, key: &str, value: Entry) -> NotifyResult {
        self.set(key, value)
    }

    fn remove(&self, key: &str) -> NotifyResult {
        self.delete(key)
    }
}
