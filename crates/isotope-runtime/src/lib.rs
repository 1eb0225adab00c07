#![forbid(unsafe_code)]

//! Runtime: the host side of an observed state tree.
//!
//! # Role in Isotope
//! `isotope-core` reports mutations but never applies them. This crate is
//! the collaborator on the other end of the notifier: it keeps the tree for
//! one logical state instance, applies every reported change to it, bumps
//! mutation counters along the changed chain, and schedules a refresh of
//! whatever renders the state.
//!
//! # Primary responsibilities
//! - **StateCell**: build once, cache, apply changes, refresh.
//! - **Validation**: the initial state must be a container.
//! - **Refresh**: deferred (pending until flushed) or immediate.
//! - **ChangeLog**: optional JSONL record of applied changes.
//! - **Config**: [`StateConfig`], overridable from `ISOTOPE_*` variables.

pub mod change_log;
pub mod config;
pub mod error;
pub mod refresh;
pub mod state;
pub mod validate;

pub use change_log::{ChangeLog, ChangeLogConfig, ChangeLogDestination};
pub use config::StateConfig;
pub use error::StateError;
pub use refresh::{Refresh, RefreshMode};
pub use state::StateCell;
pub use validate::validate_initial_state;
