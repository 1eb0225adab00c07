#![forbid(unsafe_code)]

//! Notification suppression shared by every observed node.
//!
//! While suppression is active, writes and deletes on any node apply
//! directly to the node's storage and no notification is sent.
//!
//! Two controls feed the same state:
//!
//! - The **switch** ([`set_suppression`]): a plain boolean, the form exposed
//!   through a node's `__disableOnChange__` accessor. Not reentrant; the last
//!   caller wins.
//! - **Scoped guards** ([`suppress`]): each live [`SuppressionGuard`] adds one
//!   level of depth and releases it on drop, so nested scopes compose.
//!
//! Suppression is active when the switch is on or the depth is non-zero.
//!
//! # Scope
//!
//! Nodes are `Rc`-based and never leave their thread, so the state is kept
//! per thread. Every node able to observe it shares it, whichever tree it
//! belongs to.

use std::cell::Cell;
use std::marker::PhantomData;
use std::rc::Rc;

struct SuppressionState {
    switch: Cell<bool>,
    depth: Cell<usize>,
}

thread_local! {
    static STATE: SuppressionState = const {
        SuppressionState {
            switch: Cell::new(false),
            depth: Cell::new(0),
        }
    };
}

/// Whether notifications are currently suppressed.
#[must_use]
pub fn is_suppressed() -> bool {
    STATE.with(|s| s.switch.get() || s.depth.get() > 0)
}

/// Set the suppression switch of the calling thread.
///
/// Only nodes on the calling thread see it. A call made from any other
/// thread leaves this thread's nodes notifying as before.
///
/// Live [`SuppressionGuard`]s keep suppression active even after the switch
/// is turned off.
pub fn set_suppression(on: bool) {
    STATE.with(|s| s.switch.set(on));
    tracing::trace!(on, "suppression switch set");
}

/// Suppress notifications until the returned guard is dropped.
#[must_use = "suppression ends when the guard is dropped"]
pub fn suppress() -> SuppressionGuard {
    STATE.with(|s| s.depth.set(s.depth.get() + 1));
    SuppressionGuard {
        _not_send: PhantomData,
    }
}

/// RAII guard for one level of scoped suppression.
#[derive(Debug)]
pub struct SuppressionGuard {
    _not_send: PhantomData<Rc<()>>,
}

impl Drop for SuppressionGuard {
    fn drop(&mut self) {
        STATE.with(|s| s.depth.set(s.depth.get().saturating_sub(1)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_off() {
        assert!(!is_suppressed());
    }

    #[test]
    fn switch_toggles() {
        set_suppression(true);
        assert!(is_suppressed());
        set_suppression(false);
        assert!(!is_suppressed());
    }

    #[test]
    fn nested_guards_release_in_order() {
        let outer = suppress();
        {
            let _inner = suppress();
            assert!(is_suppressed());
        }
        assert!(is_suppressed());
        drop(outer);
        assert!(!is_suppressed());
    }

    #[test]
    fn guard_outlives_switch_off() {
        let guard = suppress();
        set_suppression(true);
        set_suppression(false);
        assert!(is_suppressed());
        drop(guard);
        assert!(!is_suppressed());
    }

    #[test]
    fn switch_from_another_thread_is_invisible() {
        std::thread::spawn(|| {
            set_suppression(true);
            assert!(is_suppressed());
        })
        .join()
        .unwrap();
        assert!(!is_suppressed());
    }
}
