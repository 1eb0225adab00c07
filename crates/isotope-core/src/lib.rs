#![forbid(unsafe_code)]

//! Core: deep, path-aware mutation interception over nested data.
//!
//! # Role in Isotope
//! `isotope-core` wraps a JSON-shaped value into a tree of observed nodes.
//! Every write or delete on any node, at any depth, becomes a [`Change`]
//! carrying the full key chain from the root, handed synchronously to one
//! notification callback. What the callback does with it (apply it to a
//! store, refresh a view) is up to the host; `isotope-runtime` ships one.
//!
//! # Primary responsibilities
//! - **Builder** ([`build`]): eager recursive wrapping, one node per
//!   container, each bound to its chain.
//! - **Interception** ([`ObservedNode`]): writes and deletes become
//!   notifications, or apply directly while suppressed.
//! - **Suppression** ([`suppression`]): shared switch and scoped guards.
//! - **Mutation counters**: per-node, moved only by an explicit hook.
//! - **Bindings** ([`Binding`]): value plus change handler for form inputs.
//! - **Accessor protocol** ([`Interceptable`]): the same surface addressed
//!   by property name, reserved names included.
//!
//! # Example
//!
//! ```
//! use isotope_core::{build, Chain, Entry, Operation};
//! use serde_json::json;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//! let root = build(json!({"a": {"b": 1}}), move |change| {
//!     sink.borrow_mut().push(change);
//!     Ok(true)
//! });
//!
//! let a = root.as_node().unwrap().child("a").unwrap();
//! a.set("b", json!(2)).unwrap();
//!
//! let seen = seen.borrow();
//! assert_eq!(seen[0].chain, Chain::from(["a", "b"]));
//! assert_eq!(seen[0].value, Some(Entry::Value(json!(2))));
//! assert_eq!(seen[0].operation, Operation::Set);
//! ```

pub mod accessor;
pub mod binding;
pub mod build;
pub mod change;
pub mod coerce;
pub mod entry;
pub mod error;
pub mod key;
pub mod node;
pub mod suppression;

pub use accessor::{Accessor, IncrementHook, Interceptable, SuppressionHook};
pub use binding::{Binding, BindingKey, ChangeHandler, InputEvent};
pub use build::{Seed, build, build_at, build_with};
pub use change::{Change, Notifier, Operation};
pub use entry::{Entry, Observe};
pub use error::{NotifyResult, ObserveError};
pub use key::{Chain, Key};
pub use node::{ContainerKind, MAX_GAP, ObservedNode};
pub use suppression::{SuppressionGuard, is_suppressed, set_suppression, suppress};
