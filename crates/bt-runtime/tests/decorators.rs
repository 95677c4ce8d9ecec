mod common;

use bt_runtime::builder::{invert, leaf, repeat, repeat_forever, scope, sequencer};
use bt_runtime::{Blackboard, CompareValue, SetValue, Status, Tree};

use common::{Log, Recorder};

#[test]
fn invert_maps_results() {
    let log = Log::default();
    let (recorder, outcome) = Recorder::new("child", Status::Success, &log);
    let mut node = invert(leaf(recorder));
    let mut bb = Blackboard::new();

    assert_eq!(node.run(&mut bb), Status::Failure);
    outcome.set(Status::Failure);
    assert_eq!(node.run(&mut bb), Status::Success);
    outcome.set(Status::Running);
    assert_eq!(node.run(&mut bb), Status::Running);
}

#[test]
fn repeat_counts_completions() {
    let log = Log::default();
    let mut node = repeat(3, leaf(Recorder::fixed("child", Status::Success, &log)));
    let mut bb = Blackboard::new();

    assert_eq!(node.run(&mut bb), Status::Running);
    assert_eq!(node.run(&mut bb), Status::Running);
    assert_eq!(node.run(&mut bb), Status::Success);
    assert_eq!(log.count("child:start"), 3);
    assert_eq!(log.count("child:stop"), 3);

    // The counter restarts with the next activation.
    assert_eq!(node.run(&mut bb), Status::Running);
    assert_eq!(node.as_decorator().map(|d| d.iterations()), Some(1));
}

#[test]
fn repeat_waits_for_running_child() {
    let log = Log::default();
    let (recorder, outcome) = Recorder::new("child", Status::Running, &log);
    let mut node = repeat(1, leaf(recorder));
    let mut bb = Blackboard::new();

    assert_eq!(node.run(&mut bb), Status::Running);
    assert_eq!(node.run(&mut bb), Status::Running);
    assert_eq!(node.as_decorator().map(|d| d.iterations()), Some(0));

    outcome.set(Status::Failure);
    assert_eq!(node.run(&mut bb), Status::Success);
}

#[test]
fn repeat_forever_never_completes() {
    let log = Log::default();
    let mut node = repeat_forever(leaf(Recorder::fixed("child", Status::Failure, &log)));
    let mut bb = Blackboard::new();

    for _ in 0..10 {
        assert_eq!(node.run(&mut bb), Status::Running);
    }
    assert_eq!(node.as_decorator().map(|d| d.iterations()), Some(10));
}

#[test]
fn scope_isolates_writes_and_reads_through() {
    let log = Log::default();
    let mut tree = Tree::prototype(scope(sequencer(vec![
        leaf(SetValue::new("inner", 5i64)),
        leaf(CompareValue::new("outer", 1i64)),
        leaf(Recorder::fixed("work", Status::Running, &log)),
    ])))
    .expect("valid tree");
    let mut bb = Blackboard::new();
    bb.set_int("outer", 1);

    // Running proves the compare saw the enclosing value.
    assert_eq!(tree.tick(&mut bb), Status::Running);
    assert!(!bb.contains("inner"));

    let stored = tree.root().as_decorator().and_then(|d| d.scope());
    assert_eq!(stored.map(|s| s.get_int("inner", 0)), Some(5));
    assert_eq!(stored.map(|s| s.contains_local("outer")), Some(false));

    tree.stop(&mut bb);
    assert_eq!(log.count("work:stop"), 1);
    let stored = tree.root().as_decorator().and_then(|d| d.scope());
    assert_eq!(stored.map(|s| s.is_empty()), Some(true));
}

#[test]
fn scope_persists_across_ticks_of_one_activation() {
    let mut node = scope(leaf(bt_runtime::Action::new(|bb| {
        let n = bb.get_int("n", 0) + 1;
        bb.set_int("n", n);
        if n == 3 {
            Status::Success
        } else {
            Status::Running
        }
    })));
    let mut bb = Blackboard::new();

    assert_eq!(node.run(&mut bb), Status::Running);
    assert_eq!(node.run(&mut bb), Status::Running);
    assert_eq!(node.run(&mut bb), Status::Success);
    // Completing the activation clears the scope, so counting starts over.
    assert_eq!(node.run(&mut bb), Status::Running);
    assert_eq!(
        node.as_decorator()
            .and_then(|d| d.scope())
            .map(|s| s.get_int("n", 0)),
        Some(1)
    );
    assert!(!bb.contains("n"));
}
