#![forbid(unsafe_code)]

//! Errors surfaced by observed nodes.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Notification failure | The notify callback returned `Err` | Propagated unchanged to the writer |
//! | Invalid key | Non-numeric field addressed to a sequence | Direct write/delete fails, read yields nothing |
//! | Out of range | Direct write too far past the end of a sequence | Direct write fails, sequence unchanged |
//! | Invalid length | `length` of a sequence set to a non-integer | Direct write fails, sequence unchanged |
//! | Not a sequence | `push`/`truncate` on a map | Fails before notifying |
//! | Not a container | A path walks through a scalar or a missing slot | Path lookup fails |
//!
//! Nothing here is logged or retried; every error goes to the immediate
//! caller.

use std::error::Error;
use std::fmt;

use serde_json::Value;

use crate::key::{Chain, Key};

/// Result of a write or delete: `Ok(true)` when the mutation was accepted.
pub type NotifyResult = Result<bool, ObserveError>;

/// Errors from observed-tree operations.
#[derive(Debug)]
pub enum ObserveError {
    /// The notification callback failed.
    Notify(Box<dyn Error + 'static>),
    /// The key cannot address a slot of the node at `chain`.
    InvalidKey { chain: Chain, key: Key },
    /// A path lookup reached something that is not an observed container.
    NotAContainer { chain: Chain },
    /// Writing `index` would leave more than [`MAX_GAP`](crate::node::MAX_GAP)
    /// `null` holes after the end of the sequence at `chain`.
    OutOfRange { chain: Chain, index: usize },
    /// `length` of the sequence at `chain` set to something other than a
    /// non-negative integer.
    InvalidLength { chain: Chain, value: Value },
    /// A sequence-only operation addressed the map at `chain`.
    NotASequence { chain: Chain },
}

impl ObserveError {
    /// Wrap a notification-layer failure.
    pub fn notify(err: impl Into<Box<dyn Error + 'static>>) -> Self {
        Self::Notify(err.into())
    }
}

impl fmt::Display for ObserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Notify(err) => write!(f, "notification failed: {err}"),
            Self::InvalidKey { chain, key } => {
                write!(f, "key '{key}' cannot address a slot of the sequence at {chain}")
            }
            Self::NotAContainer { chain } => write!(f, "no observed container at {chain}"),
            Self::OutOfRange { chain, index } => {
                write!(f, "index {index} is too far past the end of the sequence at {chain}")
            }
            Self::InvalidLength { chain, value } => {
                write!(f, "invalid length {value} for the sequence at {chain}")
            }
            Self::NotASequence { chain } => write!(f, "{chain} is not a sequence"),
        }
    }
}

impl Error for ObserveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Notify(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_keeps_source() {
        let err = ObserveError::notify("store offline");
        assert_eq!(err.to_string(), "notification failed: store offline");
        assert_eq!(err.source().unwrap().to_string(), "store offline");
    }

    #[test]
    fn invalid_key_names_location() {
        let err = ObserveError::InvalidKey {
            chain: Chain::from(["todos"]),
            key: Key::from("title"),
        };
        assert_eq!(
            err.to_string(),
            "key 'title' cannot address a slot of the sequence at $.todos"
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn range_and_length_name_location() {
        let err = ObserveError::OutOfRange {
            chain: Chain::from(["todos"]),
            index: usize::MAX,
        };
        assert_eq!(
            err.to_string(),
            format!("index {} is too far past the end of the sequence at $.todos", usize::MAX)
        );
        let err = ObserveError::InvalidLength {
            chain: Chain::root(),
            value: Value::from("two"),
        };
        assert_eq!(err.to_string(), "invalid length \"two\" for the sequence at $");
    }
}
