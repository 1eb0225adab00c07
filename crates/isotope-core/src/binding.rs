#![forbid(unsafe_code)]

//! Reactive bindings: a property's current value paired with a ready-made
//! change handler, shaped for form inputs.
//!
//! Booleans bind as checkboxes (`checked`), everything else as text-like
//! inputs (`value`). The handler reads the matching field of the input event,
//! coerces it back to a number when the bound property was numeric, and
//! notifies a `set` that must be applied immediately so text inputs do not
//! lose their caret position.

use std::fmt;

use serde_json::Value;

use crate::change::{Change, Notifier};
use crate::coerce::to_number;
use crate::entry::Entry;
use crate::error::NotifyResult;
use crate::key::Chain;

/// Which input field a binding drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKey {
    /// Checkbox-style: the bound property is a boolean.
    Checked,
    /// Text-style: anything else.
    Value,
}

impl BindingKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Checked => "checked",
            Self::Value => "value",
        }
    }

    fn for_entry(entry: &Entry) -> Self {
        if entry.is_bool() {
            Self::Checked
        } else {
            Self::Value
        }
    }
}

/// The input fields an input event can carry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputEvent {
    pub value: Option<Value>,
    pub checked: Option<bool>,
}

impl InputEvent {
    /// Event from a text-like input.
    #[must_use]
    pub fn value(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            checked: None,
        }
    }

    /// Event from a checkbox.
    #[must_use]
    pub fn checked(checked: bool) -> Self {
        Self {
            value: None,
            checked: Some(checked),
        }
    }

    /// The field named by `key`; absent fields read as `null`.
    #[must_use]
    pub fn field(&self, key: BindingKey) -> Value {
        match key {
            BindingKey::Checked => self.checked.map_or(Value::Null, Value::Bool),
            BindingKey::Value => self.value.clone().unwrap_or(Value::Null),
        }
    }
}

/// Change handler of a [`Binding`].
///
/// Holds its own copy of the property chain and the tree's notifier, so it
/// stays usable after the binding is dropped.
#[derive(Clone)]
pub struct ChangeHandler {
    chain: Chain,
    key: BindingKey,
    numeric: bool,
    notify: Notifier,
}

impl ChangeHandler {
    /// Notify an immediate `set` of the event's value at the bound chain.
    ///
    /// # Errors
    ///
    /// Returns whatever the notifier returns.
    pub fn call(&self, event: &InputEvent) -> NotifyResult {
        let mut value = event.field(self.key);
        if self.numeric {
            value = to_number(&value);
        }
        tracing::trace!(chain = %self.chain, field = self.key.as_str(), "binding change");
        (self.notify)(Change::set(self.chain.clone(), Entry::Value(value)).immediate())
    }

    #[must_use]
    pub fn chain(&self) -> &Chain {
        &self.chain
    }
}

impl fmt::Debug for ChangeHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeHandler")
            .field("chain", &self.chain)
            .field("key", &self.key)
            .field("numeric", &self.numeric)
            .finish_non_exhaustive()
    }
}

/// Read-on-demand view of one property for an input control.
#[derive(Debug, Clone)]
pub struct Binding {
    key: BindingKey,
    current: Entry,
    handler: ChangeHandler,
}

impl Binding {
    /// Derive the binding for the property at `chain` whose value is
    /// `current`.
    pub(crate) fn derive(chain: Chain, current: Entry, notify: Notifier) -> Self {
        let key = BindingKey::for_entry(&current);
        let handler = ChangeHandler {
            chain,
            key,
            numeric: current.is_number(),
            notify,
        };
        Self {
            key,
            current,
            handler,
        }
    }

    #[must_use]
    pub fn key(&self) -> BindingKey {
        self.key
    }

    /// The property value at derivation time.
    #[must_use]
    pub fn current(&self) -> &Entry {
        &self.current
    }

    /// The `checked` field, present for boolean properties.
    #[must_use]
    pub fn checked(&self) -> Option<&Entry> {
        (self.key == BindingKey::Checked).then_some(&self.current)
    }

    /// The `value` field, present for non-boolean properties.
    #[must_use]
    pub fn value(&self) -> Option<&Entry> {
        (self.key == BindingKey::Value).then_some(&self.current)
    }

    #[must_use]
    pub fn handler(&self) -> &ChangeHandler {
        &self.handler
    }

    /// Forward an input event through the handler.
    ///
    /// # Errors
    ///
    /// Returns whatever the notifier returns.
    pub fn on_change(&self, event: &InputEvent) -> NotifyResult {
        self.handler.call(event)
    }
}
