use std::fmt;

use bt_core::{Blackboard, NodeState, OwnerContext, Status};
use glam::Vec2;

use crate::composite::{Composite, CompositeKind};
use crate::decorator::{Decorator, DecoratorKind};
use crate::{AwakeError, Behavior, NodeId, TreeError};

/// Capability flags consulted by ancestors while resuming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeFlags {
    /// A resuming sequencer re-checks this node with [`Node::evaluate`] and fails if it no longer
    /// holds.
    pub can_re_evaluate: bool,
    /// A resuming selector lets this higher-priority node take over when its evaluation succeeds.
    pub enable_hijack: bool,
}

/// Author-time metadata carried through cloning untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeMeta {
    pub name: String,
    pub position: Vec2,
}

/// What a node does.
pub enum NodeKind {
    Leaf(Box<dyn Behavior>),
    Composite(Composite),
    Decorator(Decorator),
}

impl NodeKind {
    /// A fresh, childless copy of this kind's configuration.
    fn shell(&self) -> NodeKind {
        match self {
            NodeKind::Leaf(behavior) => NodeKind::Leaf(behavior.clone_box()),
            NodeKind::Composite(c) => {
                NodeKind::Composite(Composite::with_capacity(c.kind(), c.len()))
            }
            NodeKind::Decorator(d) => NodeKind::Decorator(Decorator::new(d.kind(), None)),
        }
    }
}

/// A node of a behavior tree: identity, lifecycle state and the kind-specific payload.
///
/// `run` drives the lifecycle:
///
/// - not started: `on_start`, then mark started
/// - always: `on_run`, store the result as the node state
/// - terminal result: `on_stop`, clear started
///
/// so running again after `Success`/`Failure` begins a fresh activation.
pub struct Node {
    id: NodeId,
    meta: NodeMeta,
    flags: NodeFlags,
    state: NodeState,
    started: bool,
    kind: NodeKind,
}

impl Node {
    fn with_kind(kind: NodeKind, name: &str) -> Self {
        Self {
            id: NodeId::new_v4(),
            meta: NodeMeta {
                name: name.to_owned(),
                position: Vec2::ZERO,
            },
            flags: NodeFlags::default(),
            state: NodeState::NotStarted,
            started: false,
            kind,
        }
    }

    pub fn leaf(behavior: impl Behavior) -> Self {
        Self::boxed_leaf(Box::new(behavior))
    }

    pub fn boxed_leaf(behavior: Box<dyn Behavior>) -> Self {
        let name = behavior.name();
        Self::with_kind(NodeKind::Leaf(behavior), name)
    }

    pub fn composite(kind: CompositeKind, children: Vec<Node>) -> Self {
        Self::with_kind(
            NodeKind::Composite(Composite::new(kind, children)),
            kind.label(),
        )
    }

    pub fn decorator(kind: DecoratorKind, child: Option<Node>) -> Self {
        Self::with_kind(NodeKind::Decorator(Decorator::new(kind, child)), kind.label())
    }

    pub fn with_id(mut self, id: NodeId) -> Self {
        self.id = id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.meta.name = name.into();
        self
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.meta.position = position;
        self
    }

    /// Marks the node as re-checkable by a resuming sequencer.
    pub fn re_evaluate(mut self) -> Self {
        self.flags.can_re_evaluate = true;
        self
    }

    /// Lets the node preempt lower-priority siblings of a resuming selector.
    pub fn hijack(mut self) -> Self {
        self.flags.enable_hijack = true;
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn as_composite(&self) -> Option<&Composite> {
        match &self.kind {
            NodeKind::Composite(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_decorator(&self) -> Option<&Decorator> {
        match &self.kind {
            NodeKind::Decorator(d) => Some(d),
            _ => None,
        }
    }

    /// Downcasts a leaf's behavior.
    pub fn behavior<T: Behavior>(&self) -> Option<&T> {
        match &self.kind {
            NodeKind::Leaf(b) => b.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Owned children in tick order. A decorator yields at most one.
    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Leaf(_) => &[],
            NodeKind::Composite(c) => c.children(),
            NodeKind::Decorator(d) => match d.child() {
                Some(child) => std::slice::from_ref(child),
                None => &[],
            },
        }
    }

    pub fn child_count(&self) -> usize {
        self.children().len()
    }

    pub fn child_at(&self, index: usize) -> Option<&Node> {
        self.children().get(index)
    }

    /// Appends to a composite or fills an empty decorator slot.
    pub fn add_child(&mut self, child: Node) -> Result<(), TreeError> {
        match &mut self.kind {
            NodeKind::Leaf(_) => Err(TreeError::LeafChild(self.id)),
            NodeKind::Composite(c) => {
                c.push(child);
                Ok(())
            }
            NodeKind::Decorator(d) if d.child().is_some() => {
                Err(TreeError::DecoratorOccupied(self.id))
            }
            NodeKind::Decorator(d) => {
                d.set_child(child);
                Ok(())
            }
        }
    }

    pub fn remove_child(&mut self, index: usize) -> Option<Node> {
        match &mut self.kind {
            NodeKind::Leaf(_) => None,
            NodeKind::Composite(c) => c.remove(index),
            NodeKind::Decorator(d) if index == 0 => d.take_child(),
            NodeKind::Decorator(_) => None,
        }
    }

    /// Advances the node by one tick.
    pub fn run(&mut self, blackboard: &mut Blackboard<'_>) -> Status {
        if !self.started {
            self.on_start(blackboard);
            self.started = true;
        }

        let status = self.on_run(blackboard);
        self.state = status.into();

        if status.is_terminal() {
            self.on_stop(blackboard);
            self.started = false;
        }
        status
    }

    /// Cancels the current activation.
    ///
    /// Runs `on_stop` (which aborts running descendants) only if the node is started, then puts
    /// the node back to `NotStarted`. Aborting an idle node is a no-op.
    pub fn abort(&mut self, blackboard: &mut Blackboard<'_>) {
        if self.started {
            tracing::trace!(node = %self.id, name = %self.meta.name, "abort");
            self.on_stop(blackboard);
            self.started = false;
        }
        self.state = NodeState::NotStarted;
    }

    /// Checks whether the node's condition currently holds without advancing it.
    pub fn evaluate(&self, blackboard: &Blackboard<'_>) -> Status {
        match &self.kind {
            NodeKind::Leaf(b) => b.evaluate(blackboard),
            NodeKind::Composite(_) => Status::Success,
            NodeKind::Decorator(d) => d.evaluate(blackboard),
        }
    }

    fn on_start(&mut self, blackboard: &mut Blackboard<'_>) {
        match &mut self.kind {
            NodeKind::Leaf(b) => b.on_start(blackboard),
            NodeKind::Composite(c) => c.on_start(),
            NodeKind::Decorator(d) => d.on_start(),
        }
    }

    fn on_run(&mut self, blackboard: &mut Blackboard<'_>) -> Status {
        match &mut self.kind {
            NodeKind::Leaf(b) => b.on_run(blackboard),
            NodeKind::Composite(c) => c.run(blackboard),
            NodeKind::Decorator(d) => d.run(blackboard),
        }
    }

    fn on_stop(&mut self, blackboard: &mut Blackboard<'_>) {
        match &mut self.kind {
            NodeKind::Leaf(b) => b.on_stop(blackboard),
            NodeKind::Composite(c) => c.on_stop(blackboard),
            NodeKind::Decorator(d) => d.on_stop(blackboard),
        }
    }

    pub(crate) fn awake(&mut self, owner: &OwnerContext) -> Result<(), AwakeError> {
        match &mut self.kind {
            NodeKind::Leaf(b) => b.on_awake(owner),
            NodeKind::Composite(_) | NodeKind::Decorator(_) => Ok(()),
        }
    }

    /// A new, childless instance carrying `proto`'s structure and fresh runtime state.
    pub(crate) fn shell_of(proto: &Node) -> Node {
        Node {
            id: proto.id,
            meta: proto.meta.clone(),
            flags: proto.flags,
            state: NodeState::NotStarted,
            started: false,
            kind: proto.kind.shell(),
        }
    }

    /// Turns a recycled instance into the equivalent of [`Node::shell_of`]`(proto)`, reusing
    /// whatever allocations it still holds.
    pub(crate) fn reset_from(&mut self, proto: &Node) {
        self.id = proto.id;
        self.meta.clone_from(&proto.meta);
        self.flags = proto.flags;
        self.state = NodeState::NotStarted;
        self.started = false;

        match (&mut self.kind, &proto.kind) {
            (NodeKind::Leaf(slot), NodeKind::Leaf(proto)) => proto.clone_into_box(slot),
            (NodeKind::Composite(c), NodeKind::Composite(p)) => c.reset_to(p.kind()),
            (NodeKind::Decorator(d), NodeKind::Decorator(p)) => d.reset_to(p.kind()),
            (kind, proto) => *kind = proto.shell(),
        }
    }

    /// Clears runtime fields on the way into the pool.
    pub(crate) fn scrub(&mut self) {
        self.state = NodeState::NotStarted;
        self.started = false;
        match &mut self.kind {
            NodeKind::Leaf(_) => {}
            NodeKind::Composite(c) => c.scrub(),
            NodeKind::Decorator(d) => d.scrub(),
        }
    }

    /// Moves every owned child into `out`, leaving the node childless.
    pub(crate) fn take_children(&mut self, out: &mut Vec<Node>) {
        match &mut self.kind {
            NodeKind::Leaf(_) => {}
            NodeKind::Composite(c) => c.drain_into(out),
            NodeKind::Decorator(d) => out.extend(d.take_child()),
        }
    }

    /// Reattaches a cloned child in order. Only used while building an instance.
    pub(crate) fn attach_child(&mut self, child: Node) {
        match &mut self.kind {
            NodeKind::Leaf(_) => {}
            NodeKind::Composite(c) => c.push(child),
            NodeKind::Decorator(d) => d.set_child(child),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            NodeKind::Leaf(_) => "Leaf",
            NodeKind::Composite(c) => c.kind().label(),
            NodeKind::Decorator(d) => d.kind().label(),
        };
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.meta.name)
            .field("kind", &kind)
            .field("state", &self.state)
            .field("started", &self.started)
            .field("children", &self.children())
            .finish()
    }
}
