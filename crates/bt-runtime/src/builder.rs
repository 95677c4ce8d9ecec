//! Builder utilities for ergonomic tree construction.
//!
//! Instead of `Node::composite(CompositeKind::Sequencer, vec![...])` you can write
//! `sequencer(vec![...])`. Every helper assigns a fresh [`NodeId`](crate::NodeId); chain
//! [`Node::with_id`] when ids must be stable across runs.

use crate::{Behavior, CompositeKind, DecoratorKind, Node, ParallelMode, RepeatCount};

/// Shorthand for `Node::leaf(behavior)`.
#[inline]
pub fn leaf(behavior: impl Behavior) -> Node {
    Node::leaf(behavior)
}

#[inline]
pub fn sequencer(children: Vec<Node>) -> Node {
    Node::composite(CompositeKind::Sequencer, children)
}

#[inline]
pub fn selector(children: Vec<Node>) -> Node {
    Node::composite(CompositeKind::Selector, children)
}

#[inline]
pub fn parallel(mode: ParallelMode, children: Vec<Node>) -> Node {
    Node::composite(CompositeKind::Parallel(mode), children)
}

#[inline]
pub fn invert(child: Node) -> Node {
    Node::decorator(DecoratorKind::Invert, Some(child))
}

#[inline]
pub fn succeeder(child: Node) -> Node {
    Node::decorator(DecoratorKind::Succeeder, Some(child))
}

/// Loops `child` until it has completed `times` times.
#[inline]
pub fn repeat(times: u32, child: Node) -> Node {
    Node::decorator(DecoratorKind::Repeat(RepeatCount::Times(times)), Some(child))
}

#[inline]
pub fn repeat_forever(child: Node) -> Node {
    Node::decorator(DecoratorKind::Repeat(RepeatCount::Forever), Some(child))
}

/// Runs `child` against its own blackboard scope.
#[inline]
pub fn scope(child: Node) -> Node {
    Node::decorator(DecoratorKind::BlackboardScope, Some(child))
}
