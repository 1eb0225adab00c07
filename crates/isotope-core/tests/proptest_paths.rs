//! Property-based invariants for observed trees.
//!
//! 1. A write at any existing path notifies exactly once, with that exact
//!    chain, the written value, and `set`.
//! 2. A delete at any existing path notifies exactly once with no value.
//! 3. Under suppression, any sequence of writes notifies zero times and every
//!    write is visible to the next read.
//! 4. A node's counter equals the number of increments it received.
//! 5. A write of any field name, on a map or a sequence, notifies exactly
//!    once at `chain + [name]`.

use std::cell::RefCell;
use std::rc::Rc;

use isotope_core::{Chain, Change, Entry, Key, ObservedNode, Operation, build, suppress};
use proptest::prelude::*;
use serde_json::{Value, json};

// ── Strategies ────────────────────────────────────────────────────────────

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z]{0,6}".prop_map(Value::String),
    ]
}

fn tree() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 1..4).prop_map(Value::Array),
            proptest::collection::btree_map("[a-z]{1,3}", inner, 1..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

// ── Helpers ───────────────────────────────────────────────────────────────

fn observed(value: Value) -> Option<(ObservedNode, Rc<RefCell<Vec<Change>>>)> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let root = build(value, move |change| {
        sink.borrow_mut().push(change);
        Ok(true)
    });
    root.into_node().map(|node| (node, log))
}

/// Every (parent node, key, full chain) in the tree.
fn slots(root: &ObservedNode) -> Vec<(ObservedNode, Key, Chain)> {
    let mut out = Vec::new();
    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        for key in node.keys() {
            out.push((node.clone(), key.clone(), node.chain().child(key.clone())));
            if let Some(child) = node.child(key) {
                stack.push(child);
            }
        }
    }
    out
}

// ── Properties ────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn write_notifies_once_with_exact_chain(value in tree(), leaf in scalar()) {
        let Some((root, log)) = observed(value) else { return Ok(()); };
        for (parent, key, chain) in slots(&root) {
            log.borrow_mut().clear();
            prop_assert!(parent.set(key, leaf.clone()).unwrap());
            let log = log.borrow();
            prop_assert_eq!(log.len(), 1);
            prop_assert_eq!(&log[0].chain, &chain);
            prop_assert_eq!(&log[0].value, &Some(Entry::Value(leaf.clone())));
            prop_assert_eq!(log[0].operation, Operation::Set);
            prop_assert!(!log[0].force_immediate);
        }
    }

    #[test]
    fn delete_notifies_once_without_value(value in tree()) {
        let Some((root, log)) = observed(value) else { return Ok(()); };
        for (parent, key, chain) in slots(&root) {
            log.borrow_mut().clear();
            parent.delete(key).unwrap();
            let log = log.borrow();
            prop_assert_eq!(log.len(), 1);
            prop_assert_eq!(&log[0].chain, &chain);
            prop_assert!(log[0].value.is_none());
            prop_assert_eq!(log[0].operation, Operation::DeleteProperty);
        }
    }

    #[test]
    fn suppressed_writes_are_silent_and_visible(
        value in tree(),
        writes in proptest::collection::vec(scalar(), 1..8),
    ) {
        let Some((root, log)) = observed(value) else { return Ok(()); };
        let targets = slots(&root);
        let _quiet = suppress();
        for (i, leaf) in writes.iter().enumerate() {
            let (parent, key, _) = &targets[i % targets.len()];
            parent.set(key.clone(), leaf.clone()).unwrap();
            prop_assert_eq!(parent.value(key.clone()), Some(leaf.clone()));
        }
        prop_assert!(log.borrow().is_empty());
    }

    #[test]
    fn counter_tracks_increments(value in tree(), bumps in 0usize..20) {
        let Some((root, _log)) = observed(value) else { return Ok(()); };
        for _ in 0..bumps {
            root.increment_counter();
        }
        prop_assert_eq!(root.mutation_count(), bumps as u64);
        let mut stack: Vec<ObservedNode> =
            root.keys().into_iter().filter_map(|k| root.child(k)).collect();
        while let Some(node) = stack.pop() {
            prop_assert_eq!(node.mutation_count(), 0);
            stack.extend(node.keys().into_iter().filter_map(|k| node.child(k)));
        }
    }

    #[test]
    fn any_field_name_is_forwarded(value in tree(), name in "[a-z]{1,6}", leaf in scalar()) {
        let Some((root, log)) = observed(value) else { return Ok(()); };
        let mut nodes = vec![root.clone()];
        nodes.extend(slots(&root).into_iter().filter_map(|(parent, key, _)| parent.child(key)));
        for node in nodes {
            log.borrow_mut().clear();
            prop_assert!(node.set(name.as_str(), leaf.clone()).unwrap());
            let log = log.borrow();
            prop_assert_eq!(log.len(), 1);
            prop_assert_eq!(&log[0].chain, &node.chain().child(Key::Field(name.clone())));
        }
    }
}
