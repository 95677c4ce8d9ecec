//! Behavior tree execution engine built on `bt-core`.
//!
//! A [`Tree`] is authored once as a prototype and then [instantiated](Tree::instantiate) per
//! owner. Instancing copies the structure iteratively and takes node instances from a
//! [`NodePool`] when one is free, so spawning and despawning many agents does not churn the
//! allocator.
//!
//! Ticking is cooperative: a node that cannot finish returns [`Status::Running`] and keeps its
//! continuation (resume index, loop counter, started flag) in its own fields.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod behavior;
pub mod builder;
mod clone;
pub mod composite;
pub mod decorator;
pub mod error;
pub mod id;
pub mod leaf;
pub mod node;
pub mod pool;
pub mod runner;
pub mod tree;

pub use behavior::{Behavior, BehaviorClone};
pub use composite::{Composite, CompositeKind, ParallelMode};
pub use decorator::{Decorator, DecoratorKind, RepeatCount};
pub use error::{AwakeError, CloneError, TreeError};
pub use id::NodeId;
pub use leaf::{Action, CompareValue, Condition, SetValue, Wait};
pub use node::{Node, NodeFlags, NodeKind, NodeMeta};
pub use pool::{NodePool, PoolConfig, PoolStats};
pub use runner::{RunnerConfig, TickSummary, TreeRunner};
pub use tree::{Nodes, Tree};

pub use bt_core::{keys, Blackboard, NodeState, OwnerContext, Status, TickContext};
