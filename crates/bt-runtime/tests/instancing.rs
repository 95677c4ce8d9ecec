mod common;

use std::sync::Arc;
use std::thread;

use bt_runtime::builder::{leaf, repeat, scope, selector, sequencer};
use bt_runtime::{
    AwakeError, Behavior, Blackboard, CloneError, NodeId, NodePool, NodeState, OwnerContext,
    PoolConfig, Status, TickContext, Tree, TreeError, Wait,
};

use common::{Log, Recorder};

struct Host {
    name: &'static str,
}

/// Needs a [`Host`] owner; records which one it was bound to.
#[derive(Clone, Default)]
struct Bound {
    host: Option<&'static str>,
}

impl Behavior for Bound {
    fn on_awake(&mut self, owner: &OwnerContext) -> Result<(), AwakeError> {
        let host = owner
            .downcast_ref::<Host>()
            .ok_or(AwakeError::OwnerType { expected: "Host" })?;
        self.host = Some(host.name);
        Ok(())
    }

    fn on_run(&mut self, _blackboard: &mut Blackboard<'_>) -> Status {
        Status::Success
    }
}

fn patrol(log: &Log) -> Tree {
    Tree::prototype(selector(vec![
        sequencer(vec![
            leaf(Recorder::fixed("look", Status::Success, log)),
            leaf(Wait::new(1.0)),
        ]),
        scope(repeat(2, leaf(Recorder::fixed("idle", Status::Success, log)))),
    ]))
    .expect("valid tree")
}

fn owner() -> OwnerContext {
    OwnerContext::new(Host { name: "guard" })
}

#[test]
fn instances_are_independent_and_fresh() {
    let log = Log::default();
    let proto = patrol(&log);
    let pool = NodePool::new();

    let mut a = proto.instantiate(owner(), &pool).expect("instantiate");
    let b = proto.instantiate(owner(), &pool).expect("instantiate");

    assert!(a.is_cloned());
    assert!(!proto.is_cloned());
    assert_eq!(a.registry(), proto.registry());
    assert_eq!(a.len(), 7);

    let ids = |tree: &Tree| tree.iter().map(|n| n.id()).collect::<Vec<_>>();
    assert_eq!(ids(&a), ids(&proto));
    assert_eq!(ids(&b), ids(&proto));
    let names = |tree: &Tree| tree.iter().map(|n| n.name().to_owned()).collect::<Vec<_>>();
    assert_eq!(names(&a), names(&proto));

    let mut bb = Blackboard::new();
    assert_eq!(a.tick_with(&TickContext::new(0, 0.25), &mut bb), Status::Running);

    assert!(a.root().is_started());
    assert!(b
        .iter()
        .all(|n| n.state() == NodeState::NotStarted && !n.is_started()));
    assert!(proto.iter().all(|n| !n.is_started()));
}

#[test]
fn recycled_nodes_come_back_fresh() {
    let log = Log::default();
    let proto = patrol(&log);
    let pool = NodePool::new();

    let mut first = proto.instantiate(owner(), &pool).expect("instantiate");
    let mut bb = Blackboard::new();
    first.tick_with(&TickContext::new(0, 0.25), &mut bb);
    first.release(&pool);
    assert_eq!(pool.total_free(), proto.len());

    let second = proto.instantiate(owner(), &pool).expect("instantiate");
    let stats = pool.stats();
    assert_eq!(stats.misses, proto.len() as u64);
    assert_eq!(stats.hits, proto.len() as u64);
    assert_eq!(pool.total_free(), 0);

    assert!(second
        .iter()
        .all(|n| n.state() == NodeState::NotStarted && !n.is_started()));
    assert!(second
        .iter()
        .filter_map(|n| n.as_composite())
        .all(|c| c.resume_index() == 0));
    let wait = second.iter().find_map(|n| n.behavior::<Wait>());
    assert_eq!(wait.map(|w| w.elapsed()), Some(0.0));
}

#[test]
fn awake_failure_rolls_back_every_acquired_node() {
    let log = Log::default();
    let bound = leaf(Bound::default());
    let bound_id = bound.id();
    let proto = Tree::prototype(sequencer(vec![
        leaf(Recorder::fixed("a", Status::Success, &log)),
        leaf(Recorder::fixed("b", Status::Success, &log)),
        bound,
    ]))
    .expect("valid tree");
    let pool = NodePool::new();

    let err = proto
        .instantiate(OwnerContext::new(()), &pool)
        .expect_err("owner is not a host");
    assert!(
        matches!(&err, CloneError::Awake { node, source: AwakeError::OwnerType { .. }, .. } if *node == bound_id),
        "{err}"
    );
    assert_eq!(pool.total_free(), proto.len());

    let tree = proto.instantiate(owner(), &pool).expect("instantiate");
    assert_eq!(pool.stats().hits, proto.len() as u64);
    let bound = tree.find(bound_id).and_then(|n| n.behavior::<Bound>());
    assert_eq!(bound.and_then(|b| b.host), Some("guard"));
}

#[test]
fn instances_cannot_be_instantiated() {
    let log = Log::default();
    let proto = patrol(&log);
    let pool = NodePool::new();
    let instance = proto.instantiate(owner(), &pool).expect("instantiate");

    assert_eq!(
        instance.instantiate(owner(), &pool).map(|_| ()),
        Err(CloneError::NotAPrototype)
    );
}

#[test]
fn duplicate_ids_are_rejected() {
    let log = Log::default();
    let id = NodeId::from_u128(7);
    let result = Tree::prototype(sequencer(vec![
        leaf(Recorder::fixed("a", Status::Success, &log)).with_id(id),
        leaf(Recorder::fixed("b", Status::Success, &log)).with_id(id),
    ]));

    assert_eq!(result.map(|_| ()), Err(TreeError::DuplicateNodeId(id)));
}

#[test]
fn prewarmed_pool_serves_without_allocating() {
    let log = Log::default();
    let proto = patrol(&log);
    let pool = NodePool::new();
    pool.prewarm(&proto, 2);
    assert_eq!(pool.total_free(), proto.len() * 2);

    let a = proto.instantiate(owner(), &pool).expect("instantiate");
    let b = proto.instantiate(owner(), &pool).expect("instantiate");
    assert_eq!(pool.stats().misses, 0);

    a.release(&pool);
    b.release(&pool);
    assert_eq!(pool.total_free(), proto.len() * 2);
}

#[test]
fn releases_from_many_threads_share_one_pool() {
    let log = Log::default();
    let proto = patrol(&log);
    let pool = Arc::new(NodePool::with_config(PoolConfig {
        max_free_per_prototype: 4,
    }));

    let instances = (0..8)
        .map(|_| proto.instantiate(owner(), &pool).expect("instantiate"))
        .collect::<Vec<_>>();

    let handles = instances
        .into_iter()
        .map(|mut tree| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                let mut bb = Blackboard::new();
                tree.tick_with(&TickContext::new(0, 0.1), &mut bb);
                tree.stop(&mut bb);
                tree.release(&pool);
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.join().expect("worker panicked");
    }

    assert_eq!(pool.total_free(), proto.len() * 4);
    let stats = pool.stats();
    assert_eq!(stats.released, (proto.len() * 4) as u64);
    assert_eq!(stats.dropped, (proto.len() * 4) as u64);
}
