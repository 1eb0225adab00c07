//! End-to-end behavior of observed trees through the public API.

use std::cell::RefCell;
use std::rc::Rc;

use isotope_core::accessor::{COUNTER, IDENTITY_MARKER, INCREMENT, SUPPRESSION};
use isotope_core::{
    Accessor, BindingKey, Chain, Change, Entry, InputEvent, Interceptable, Key, Observe,
    ObservedNode, Operation, build,
};
use serde_json::{Value, json};

type Log = Rc<RefCell<Vec<Change>>>;

fn observed(value: Value) -> (ObservedNode, Log) {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let root = build(value, move |change| {
        sink.borrow_mut().push(change);
        Ok(true)
    });
    (root.into_node().expect("container root"), log)
}

#[test]
fn nested_write_reports_full_chain() {
    let (root, log) = observed(json!({"a": {"b": 1}}));
    root.child("a").unwrap().set("b", json!(2)).unwrap();

    assert_eq!(
        *log.borrow(),
        vec![Change {
            chain: Chain::from(["a", "b"]),
            value: Some(Entry::Value(json!(2))),
            operation: Operation::Set,
            force_immediate: false,
        }]
    );
}

#[test]
fn deep_sequence_write() {
    let (root, log) = observed(json!({"a": {"b": {"c": {"d": [0, 0, 0]}}}}));
    let d = root
        .node_at(&["a", "b", "c", "d"])
        .expect("d is a sequence node");
    d.set(2usize, json!(100)).unwrap();

    let log = log.borrow();
    assert_eq!(log.len(), 1);
    assert_eq!(
        log[0].chain,
        Chain::from(vec![
            Key::from("a"),
            Key::from("b"),
            Key::from("c"),
            Key::from("d"),
            Key::Index(2),
        ])
    );
}

#[test]
fn notifications_follow_issue_order() {
    let (root, log) = observed(json!({"x": 0, "y": {"z": 0}}));
    root.set("x", json!(1)).unwrap();
    root.child("y").unwrap().delete("z").unwrap();
    root.set("x", json!(1)).unwrap();

    let log = log.borrow();
    let ops: Vec<(String, Operation)> = log
        .iter()
        .map(|c| (c.chain.to_string(), c.operation))
        .collect();
    assert_eq!(
        ops,
        vec![
            ("$.x".to_string(), Operation::Set),
            ("$.y.z".to_string(), Operation::DeleteProperty),
            ("$.x".to_string(), Operation::Set),
        ]
    );
}

#[test]
fn identity_marker_on_every_node() {
    let (root, _log) = observed(json!({"list": [{"deep": {}}]}));
    let mut stack = vec![root];
    let mut seen = 0;
    while let Some(node) = stack.pop() {
        seen += 1;
        assert!(node.is_observed());
        assert!(matches!(node.read(IDENTITY_MARKER), Accessor::Marker(true)));
        for key in node.keys() {
            if let Some(child) = node.child(key) {
                stack.push(child);
            }
        }
    }
    assert_eq!(seen, 4);
    assert!(!json!({"plain": true}).is_observed());
}

#[test]
fn counters_are_independent() {
    let (root, _log) = observed(json!({"a": {"b": {}}, "c": {}}));
    let a = root.child("a").unwrap();
    let b = a.child("b").unwrap();
    let c = root.child("c").unwrap();

    let Accessor::Increment(bump_b) = b.read(INCREMENT) else {
        panic!("expected increment hook");
    };
    bump_b.call();
    bump_b.call();
    bump_b.call();
    c.increment_counter();

    assert!(matches!(b.read(COUNTER), Accessor::Count(3)));
    assert_eq!(c.mutation_count(), 1);
    assert_eq!(a.mutation_count(), 0);
    assert_eq!(root.mutation_count(), 0);
}

#[test]
fn suppression_is_shared_across_trees() {
    let (first, first_log) = observed(json!({"n": 0}));
    let (second, second_log) = observed(json!({"n": 0}));

    let Accessor::Suppress(hook) = first.read(SUPPRESSION) else {
        panic!("expected suppression hook");
    };
    hook.call(true);
    second.set("n", json!(1)).unwrap();
    second.delete("n").unwrap();
    first.set("n", json!(5)).unwrap();
    hook.call(false);

    assert!(first_log.borrow().is_empty());
    assert!(second_log.borrow().is_empty());
    assert_eq!(second.snapshot(), json!({}));
    assert_eq!(first.value("n"), Some(json!(5)));

    second.set("n", json!(2)).unwrap();
    assert_eq!(second_log.borrow().len(), 1);
}

#[test]
fn independent_trees_keep_their_own_chains() {
    let (first, _) = observed(json!({"a": {"b": {}}}));
    let (second, _) = observed(json!({"b": {}}));
    let fb = first.node_at(&["a", "b"]).unwrap();
    let sb = second.child("b").unwrap();
    assert_eq!(fb.chain(), &Chain::from(["a", "b"]));
    assert_eq!(sb.chain(), &Chain::from(["b"]));
    fb.increment_counter();
    assert_eq!(sb.mutation_count(), 0);
}

#[test]
fn checkbox_binding() {
    let (root, log) = observed(json!({"flag": true}));
    let binding = root.binding_for("flag").unwrap();
    assert_eq!(binding.key(), BindingKey::Checked);
    assert_eq!(binding.checked(), Some(&Entry::Value(json!(true))));

    binding.on_change(&InputEvent::checked(false)).unwrap();
    let log = log.borrow();
    assert_eq!(log[0].chain, Chain::from(["flag"]));
    assert_eq!(log[0].value, Some(Entry::Value(json!(false))));
    assert!(log[0].force_immediate);
}

#[test]
fn numeric_binding_coerces_text() {
    let (root, log) = observed(json!({"count": 5}));
    let binding = root.read("$count").into_binding().unwrap();
    assert_eq!(binding.key(), BindingKey::Value);
    assert_eq!(binding.value(), Some(&Entry::Value(json!(5))));

    binding.on_change(&InputEvent::value("7")).unwrap();
    let log = log.borrow();
    assert_eq!(log[0].value, Some(Entry::Value(json!(7))));
    assert_ne!(log[0].value, Some(Entry::Value(json!("7"))));
    assert!(log[0].force_immediate);
}

#[test]
fn binding_over_a_container_uses_value() {
    let (root, _log) = observed(json!({"tags": ["a"]}));
    let binding = root.binding_for("tags").unwrap();
    assert_eq!(binding.key(), BindingKey::Value);
    assert!(binding.current().is_node());
    assert!(root.binding_for("absent").is_none());
}

#[test]
fn scalar_root_is_returned_as_is() {
    let root = build(json!(3), |_| Ok(true));
    assert!(!root.is_observed());
    assert_eq!(root, json!(3));
}
