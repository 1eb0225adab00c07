#![forbid(unsafe_code)]

//! Change events and the notification channel.
//!
//! Every intercepted write or delete becomes one [`Change`], handed to the
//! tree's [`Notifier`]. The notifier decides what the change means: apply it
//! to a backing store, schedule a refresh, reject it. Its boolean answer is
//! reported back to the writer as the success signal of the operation.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::entry::Entry;
use crate::error::NotifyResult;
use crate::key::Chain;

/// Shared notification callback, one per observed tree.
pub type Notifier = Rc<dyn Fn(Change) -> NotifyResult>;

/// Kind of intercepted mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    /// A key was assigned.
    Set,
    /// A key was removed.
    DeleteProperty,
}

impl Operation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::DeleteProperty => "deleteProperty",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One intercepted mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    /// Full path of the mutated key, starting at the root.
    pub chain: Chain,
    /// Assigned value. `None` for deletes.
    pub value: Option<Entry>,
    pub operation: Operation,
    /// The notifier must apply the change and refresh before returning.
    ///
    /// Set by input bindings so text fields keep their caret position.
    pub force_immediate: bool,
}

impl Change {
    #[must_use]
    pub fn set(chain: Chain, value: Entry) -> Self {
        Self {
            chain,
            value: Some(value),
            operation: Operation::Set,
            force_immediate: false,
        }
    }

    #[must_use]
    pub fn delete(chain: Chain) -> Self {
        Self {
            chain,
            value: None,
            operation: Operation::DeleteProperty,
            force_immediate: false,
        }
    }

    /// Mark the change as requiring synchronous application.
    #[must_use]
    pub fn immediate(mut self) -> Self {
        self.force_immediate = true;
        self
    }
}
