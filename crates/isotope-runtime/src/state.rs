#![forbid(unsafe_code)]

//! State cells: one observed tree per logical state instance.
//!
//! # Design
//!
//! A [`StateCell`] is the persistent slot a view keeps across refreshes. The
//! first [`get_or_init`](StateCell::get_or_init) resolves the seed, validates
//! it, and builds the observed tree with a notifier bound to the cell. Later
//! calls hand back the cached root; the seed is never resolved again.
//!
//! The notifier applies each change to the tree itself:
//!
//! 1. Walk from the root to the parent of the changed key.
//! 2. Under a suppression guard, store the value (re-wrapped at the changed
//!    chain) or remove the key.
//! 3. Bump the counter of every node from the root to that parent, when
//!    `count_mutations` is on.
//! 4. Append the change to the change log, if one is configured.
//! 5. Refresh now for immediate changes or `RefreshMode::Immediate`,
//!    otherwise mark a refresh pending.
//!
//! # Invariants
//!
//! 1. The seed is resolved at most once per cell.
//! 2. Nodes installed by the notifier carry the chain they were stored at.
//! 3. At most one refresh is pending at a time; `flush` clears it.
//!
//! # Failure Modes
//!
//! - **Change outside the tree**: no container at the parent chain (for
//!   example, a write through a node that was replaced). Rejected with
//!   [`StateError::MissingParent`]; the writer sees it as
//!   `ObserveError::Notify`.
//! - **Change log I/O**: the change is applied and the refresh runs or is
//!   scheduled as usual; the error then reaches the writer.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use isotope_core::{
    Change, Entry, Key, Notifier, NotifyResult, ObserveError, ObservedNode, Operation, Seed,
    build_at, build_with, suppress,
};
use serde_json::Value;

use crate::change_log::ChangeLog;
use crate::config::StateConfig;
use crate::error::StateError;
use crate::refresh::{Refresh, RefreshMode};
use crate::validate::validate_initial_state;

/// Shared interior for [`StateCell`].
struct StateInner {
    config: StateConfig,
    root: RefCell<Option<ObservedNode>>,
    refresh: Box<dyn Refresh>,
    pending: Cell<bool>,
    change_log: Option<ChangeLog>,
}

/// Persistent slot holding one observed state tree.
///
/// Cloning a `StateCell` creates a new handle to the **same** slot.
pub struct StateCell {
    inner: Rc<StateInner>,
}

impl Clone for StateCell {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for StateCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCell")
            .field("config", &self.inner.config)
            .field("initialized", &self.is_initialized())
            .field("refresh_pending", &self.inner.pending.get())
            .finish()
    }
}

impl StateCell {
    /// Create an empty cell that calls `refresh` after applied changes.
    ///
    /// # Errors
    ///
    /// [`StateError::ChangeLog`] when the configured change log cannot be
    /// opened.
    pub fn new(config: StateConfig, refresh: impl Refresh + 'static) -> Result<Self, StateError> {
        let change_log = ChangeLog::from_config(&config.change_log)?;
        Ok(Self::with_change_log(config, refresh, change_log))
    }

    /// Create an empty cell logging to an already built change log.
    pub fn with_change_log(
        config: StateConfig,
        refresh: impl Refresh + 'static,
        change_log: Option<ChangeLog>,
    ) -> Self {
        Self {
            inner: Rc::new(StateInner {
                config,
                root: RefCell::new(None),
                refresh: Box::new(refresh),
                pending: Cell::new(false),
                change_log,
            }),
        }
    }

    /// The observed root, building it from `seed` on the first call.
    ///
    /// # Errors
    ///
    /// [`StateError::InvalidInitialState`] when the resolved seed is not a
    /// container. Nothing is cached in that case.
    pub fn get_or_init(&self, seed: impl Into<Seed>) -> Result<ObservedNode, StateError> {
        if let Some(root) = self.root() {
            return Ok(root);
        }

        let value = seed.into().resolve();
        validate_initial_state(&value)?;

        let weak = Rc::downgrade(&self.inner);
        let notify: Notifier = Rc::new(move |change| notify_cell(&weak, change));
        let root = build_with(value, &notify)
            .into_node()
            .ok_or_else(|| StateError::InvalidInitialState("root did not build".to_string()))?;

        tracing::debug!(len = root.len(), kind = ?root.kind(), "state cell initialized");
        *self.inner.root.borrow_mut() = Some(root.clone());
        Ok(root)
    }

    /// The cached root, if the cell has been initialized.
    #[must_use]
    pub fn root(&self) -> Option<ObservedNode> {
        self.inner.root.borrow().clone()
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.inner.root.borrow().is_some()
    }

    /// Raw value of the current state.
    #[must_use]
    pub fn snapshot(&self) -> Option<Value> {
        self.root().map(|root| root.snapshot())
    }

    #[must_use]
    pub fn config(&self) -> &StateConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn refresh_pending(&self) -> bool {
        self.inner.pending.get()
    }

    /// Run the pending refresh, if any. Returns whether one ran.
    pub fn flush(&self) -> bool {
        if !self.inner.pending.replace(false) {
            return false;
        }
        self.inner.refresh.refresh();
        true
    }

    /// Apply `change` to the tree and schedule the refresh.
    ///
    /// # Errors
    ///
    /// See the module-level failure modes.
    pub fn apply(&self, change: Change) -> Result<bool, StateError> {
        let root = self.root().ok_or_else(|| StateError::MissingParent {
            chain: change.chain.clone(),
        })?;
        let Some((parent_chain, key)) = change.chain.split_last() else {
            return Err(StateError::MissingParent {
                chain: change.chain.clone(),
            });
        };
        let path: Vec<Key> = parent_chain.keys().to_vec();
        let parent = match root.node_at(&path) {
            Ok(parent) => parent,
            Err(_) => {
                tracing::warn!(chain = %change.chain, "change addresses a missing container");
                return Err(StateError::MissingParent {
                    chain: parent_chain,
                });
            }
        };

        {
            let _quiet = suppress();
            match change.operation {
                Operation::Set => {
                    let value = self.rewrap(&root, &change);
                    parent.set(key.clone(), value)?;
                }
                Operation::DeleteProperty => {
                    parent.delete(key.clone())?;
                }
            }
        }

        if self.inner.config.count_mutations {
            root.increment_counter();
            let mut node = root.clone();
            for step in &path {
                match node.child(step.clone()) {
                    Some(next) => {
                        next.increment_counter();
                        node = next;
                    }
                    None => break,
                }
            }
        }

        let logged = match &self.inner.change_log {
            Some(log) => log.record(&change).inspect_err(|err| {
                tracing::warn!(chain = %change.chain, error = %err, "change log write failed");
            }),
            None => Ok(()),
        };

        tracing::trace!(
            chain = %change.chain,
            op = change.operation.as_str(),
            immediate = change.force_immediate,
            "change applied"
        );

        if change.force_immediate || self.inner.config.refresh == RefreshMode::Immediate {
            self.inner.pending.set(false);
            self.inner.refresh.refresh();
        } else {
            self.inner.pending.set(true);
        }
        logged?;
        Ok(true)
    }

    /// The entry to store for a `set`: containers are wrapped at the changed
    /// chain so they intercept mutations there.
    fn rewrap(&self, root: &ObservedNode, change: &Change) -> Entry {
        match &change.value {
            None => Entry::Value(Value::Null),
            Some(Entry::Node(node))
                if node.chain() == &change.chain
                    && Rc::ptr_eq(node.notifier(), root.notifier()) =>
            {
                Entry::Node(node.clone())
            }
            Some(entry) => build_at(entry.snapshot(), root.notifier(), change.chain.clone()),
        }
    }
}

fn notify_cell(cell: &Weak<StateInner>, change: Change) -> NotifyResult {
    let Some(inner) = cell.upgrade() else {
        return Err(ObserveError::notify("state cell dropped"));
    };
    StateCell { inner }
        .apply(change)
        .map_err(ObserveError::notify)
}
