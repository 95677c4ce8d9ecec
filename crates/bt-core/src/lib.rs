//! Engine-agnostic primitives shared by every behavior tree node.
//!
//! - [`Status`] / [`NodeState`]: the tri-state tick result and the per-node lifecycle state.
//! - [`Blackboard`]: hierarchical key/value store; the only channel nodes use to talk to each other.
//! - [`TickContext`]: the externally supplied clock, published into the blackboard under [`keys`].
//! - [`OwnerContext`]: opaque per-owner handle threaded into node awake hooks.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod blackboard;
pub mod keys;
pub mod owner;
pub mod status;
pub mod tick;

pub use blackboard::{Blackboard, BlackboardError, BlackboardId, Value};
pub use owner::OwnerContext;
pub use status::{NodeState, Status};
pub use tick::TickContext;

pub use glam::Vec3;
