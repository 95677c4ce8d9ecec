//! Error types for authoring and instancing trees.
//!
//! Business-level failures never show up here: a leaf that fails returns
//! [`Status::Failure`](bt_core::Status::Failure). These errors cover broken structure and host
//! bindings that cannot be resolved while instancing.

use thiserror::Error;

use crate::NodeId;

/// Errors raised while building or editing a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node id {0} appears more than once in the tree")]
    DuplicateNodeId(NodeId),

    #[error("leaf node {0} cannot own children")]
    LeafChild(NodeId),

    #[error("decorator node {0} already has a child")]
    DecoratorOccupied(NodeId),
}

/// Errors a leaf may report from its awake hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AwakeError {
    #[error("owner context is not a `{expected}`")]
    OwnerType { expected: &'static str },

    #[error("missing host binding `{0}`")]
    MissingBinding(String),
}

/// Errors raised by [`Tree::instantiate`](crate::Tree::instantiate).
///
/// Whenever one is returned, every node acquired for the partial copy has already been handed
/// back to the pool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloneError {
    #[error("node {node} (`{name}`) failed to awake: {source}")]
    Awake {
        node: NodeId,
        name: String,
        #[source]
        source: AwakeError,
    },

    #[error("node pool corrupted: free list for {expected} held node {found}")]
    PoolCorrupted { expected: NodeId, found: NodeId },

    #[error("tree is already an instance; instantiate from its prototype")]
    NotAPrototype,
}
