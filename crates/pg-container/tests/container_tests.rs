use pg_container::{Container, ContainerError, Member, ObserverId};
use pg_test_utils::{
    artist, container_of, counting_observer, leaf, leaf_ids, logging_observer, EventLog,
    RecordingArtist,
};
use proptest::prelude::*;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone)]
enum Op {
    Add,
    Remove(usize),
    RemoveUnknown(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Add),
        2 => (0..32usize).prop_map(Op::Remove),
        1 => (1000..2000u64).prop_map(Op::RemoveUnknown),
    ]
}

#[derive(Debug, Clone)]
enum Shape {
    Leaf,
    Seq(Vec<Shape>),
    Group(Vec<Shape>),
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    let leaf = Just(Shape::Leaf);
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Shape::Seq),
            prop::collection::vec(inner, 0..4).prop_map(Shape::Group),
        ]
    })
}

fn build(shape: &Shape, next: &mut u64, log: &EventLog) -> Member {
    match shape {
        Shape::Leaf => {
            *next += 1;
            leaf(*next, log)
        }
        Shape::Seq(items) => Member::Seq(items.iter().map(|s| build(s, next, log)).collect()),
        Shape::Group(items) => Member::Group(Rc::new(Container::new(
            items.iter().map(|s| build(s, next, log)).collect(),
        ))),
    }
}

proptest! {
    #[test]
    fn prop_observer_ids_strictly_increase(ops in prop::collection::vec(op_strategy(), 0..64)) {
        let container = Container::new(vec![]);
        let mut issued: Vec<ObserverId> = Vec::new();

        for op in ops {
            match op {
                Op::Add => {
                    let id = container.add_callback(|_| Ok(()));
                    if let Some(last) = issued.last() {
                        prop_assert!(id > *last);
                    }
                    issued.push(id);
                }
                Op::Remove(i) => {
                    if let Some(id) = issued.get(i) {
                        container.remove_callback(*id);
                    }
                }
                Op::RemoveUnknown(raw) => {
                    let before = container.observer_ids();
                    prop_assert!(!container.remove_callback(ObserverId(raw)));
                    prop_assert_eq!(before, container.observer_ids());
                }
            }
        }

        let mut unique = issued.clone();
        unique.dedup();
        prop_assert_eq!(unique.len(), issued.len());
    }

    #[test]
    fn prop_flatten_visits_leaves_in_order(shapes in prop::collection::vec(shape_strategy(), 0..6)) {
        let log = EventLog::new();
        let mut next = 0;
        let members = shapes.iter().map(|s| build(s, &mut next, &log)).collect();
        let container = Container::new(members);

        // Leaves are numbered in construction order, so a depth-first walk sees 1..=n.
        let expected: Vec<u64> = (1..=next).collect();
        prop_assert_eq!(leaf_ids(&container), expected);
        prop_assert_eq!(container.children().len() as u64, next);
    }

    #[test]
    fn prop_label_is_string_form(value in any::<i64>()) {
        let container = Container::new(vec![]).with_label(value);
        prop_assert_eq!(container.label(), Some(value.to_string()));
    }
}

#[test]
fn test_label_scenario() {
    let log = EventLog::new();
    let container = container_of(&[1, 2, 3], &log);
    assert_eq!(container.label(), None);
    container.set_label(Some(5)).unwrap();
    assert_eq!(container.label().as_deref(), Some("5"));
}

#[test]
fn test_notify_calls_each_observer_once() {
    let log = EventLog::new();
    let container = container_of(&[1], &log).with_label("s");
    container.add_callback(logging_observer("a", &log));
    let dropped = container.add_callback(logging_observer("b", &log));
    container.add_callback(logging_observer("c", &log));
    container.remove_callback(dropped);

    container.pchanged().unwrap();
    assert_eq!(log.events(), vec!["notify a s", "notify c s"]);
}

#[test]
fn test_set_label_notifies_exactly_once() {
    let container = Container::new(vec![]);
    let calls = Rc::new(Cell::new(0));
    container.add_callback(counting_observer(&calls));
    container.add_callback(counting_observer(&calls));

    container.set_label(Some("x")).unwrap();
    assert_eq!(calls.get(), 2);
    container.clear_label().unwrap();
    assert_eq!(calls.get(), 4);
}

#[test]
fn test_flatten_example() {
    let log = EventLog::new();
    let nested = Rc::new(container_of(&[2, 3], &log));
    let container = Container::new(vec![leaf(1, &log), Member::Group(nested), leaf(4, &log)]);
    assert_eq!(leaf_ids(&container), vec![1, 2, 3, 4]);
}

#[test]
fn test_remove_order_with_callback() {
    let log = EventLog::new();
    let container = container_of(&[1, 2], &log);
    let hook_log = log.clone();
    container.set_remove_method(move |c| hook_log.push(format!("callback {}", c.len())));

    container.remove().unwrap();
    assert_eq!(log.events(), vec!["remove 1", "remove 2", "callback 2"]);
}

#[test]
fn test_remove_without_callback() {
    let log = EventLog::new();
    let container = container_of(&[1, 2], &log);
    container.remove().unwrap();
    assert_eq!(log.events(), vec!["remove 1", "remove 2"]);
}

#[test]
fn test_remove_collects_failures_and_runs_callback() {
    let log = EventLog::new();
    let bad = RecordingArtist::failing(2, &log);
    let container = Container::new(vec![leaf(1, &log), Member::Artist(bad.clone()), leaf(3, &log)]);
    let hook_log = log.clone();
    container.set_remove_method(move |_| hook_log.push("callback"));

    let err = container.remove().unwrap_err();
    assert!(matches!(err, ContainerError::Removal { .. }));
    assert_eq!(err.removal_failures().len(), 1);
    assert_eq!(err.removal_failures()[0].artist.0, 2);
    assert_eq!(bad.removals(), 1);
    assert_eq!(
        log.events(),
        vec!["remove 1", "remove 2", "remove 3", "callback"]
    );
}

#[test]
fn test_stem_members_shape() {
    let log = EventLog::new();
    let stem = Container::stem(
        artist(1, &log),
        vec![artist(2, &log), artist(3, &log)],
        artist(4, &log),
    );
    assert_eq!(stem.to_string(), "<Container object of 3 artists>");
    assert_eq!(leaf_ids(&stem), vec![1, 2, 3, 4]);
    stem.remove().unwrap();
    assert_eq!(
        log.events(),
        vec!["remove 1", "remove 2", "remove 3", "remove 4"]
    );
}
