#![forbid(unsafe_code)]

//! Errors from the host layer.

use std::error::Error;
use std::fmt;
use std::io;

use isotope_core::{Chain, ObserveError};

/// Errors from state cells.
#[derive(Debug)]
pub enum StateError {
    /// The initial state is not a map or a sequence.
    InvalidInitialState(String),
    /// A change addressed a key whose parent is not an observed container.
    MissingParent { chain: Chain },
    /// Applying a change to the tree failed.
    Observe(ObserveError),
    /// Writing the change log failed.
    ChangeLog(io::Error),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInitialState(msg) => write!(f, "invalid initial state: {msg}"),
            Self::MissingParent { chain } => {
                write!(f, "no observed container at {chain} to apply the change to")
            }
            Self::Observe(err) => write!(f, "{err}"),
            Self::ChangeLog(err) => write!(f, "change log write failed: {err}"),
        }
    }
}

impl Error for StateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Observe(err) => Some(err),
            Self::ChangeLog(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ObserveError> for StateError {
    fn from(err: ObserveError) -> Self {
        Self::Observe(err)
    }
}

impl From<io::Error> for StateError {
    fn from(err: io::Error) -> Self {
        Self::ChangeLog(err)
    }
}
