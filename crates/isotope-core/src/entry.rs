#![forbid(unsafe_code)]

//! Slot contents of an observed container.

use std::fmt;

use serde_json::Value;

use crate::node::ObservedNode;

/// What a container slot holds: a raw value or a nested observed node.
///
/// Raw containers only appear in a slot when they were written directly
/// while notifications were suppressed; the builder wraps every container it
/// sees.
#[derive(Clone)]
pub enum Entry {
    Value(Value),
    Node(ObservedNode),
}

impl Entry {
    #[must_use]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::Node(_) => None,
        }
    }

    #[must_use]
    pub fn as_node(&self) -> Option<&ObservedNode> {
        match self {
            Self::Node(n) => Some(n),
            Self::Value(_) => None,
        }
    }

    #[must_use]
    pub fn into_node(self) -> Option<ObservedNode> {
        match self {
            Self::Node(n) => Some(n),
            Self::Value(_) => None,
        }
    }

    #[must_use]
    pub fn is_node(&self) -> bool {
        matches!(self, Self::Node(_))
    }

    #[must_use]
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Value(Value::Bool(_)))
    }

    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Value(Value::Number(_)))
    }

    /// Raw value of this entry, unwrapping nested nodes recursively.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        match self {
            Self::Value(v) => v.clone(),
            Self::Node(n) => n.snapshot(),
        }
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "Value({v})"),
            Self::Node(n) => fmt::Debug::fmt(n, f),
        }
    }
}

/// Nodes compare by identity, values by content.
impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => a == b,
            (Self::Node(a), Self::Node(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

/// Compares the entry's snapshot against a raw value.
impl PartialEq<Value> for Entry {
    fn eq(&self, other: &Value) -> bool {
        match self {
            Self::Value(v) => v == other,
            Self::Node(n) => n.snapshot() == *other,
        }
    }
}

impl From<Value> for Entry {
    fn from(v: Value) -> Self {
        Self::Value(v)
    }
}

impl From<ObservedNode> for Entry {
    fn from(n: ObservedNode) -> Self {
        Self::Node(n)
    }
}

/// Identity marker: does this value intercept mutations?
pub trait Observe {
    fn is_observed(&self) -> bool;
}

impl Observe for Value {
    fn is_observed(&self) -> bool {
        false
    }
}

impl Observe for ObservedNode {
    fn is_observed(&self) -> bool {
        true
    }
}

impl Observe for Entry {
    fn is_observed(&self) -> bool {
        self.is_node()
    }
}
