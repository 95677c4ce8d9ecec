//! Leaf authoring surface.
//!
//! Game logic plugs into the engine by implementing [`Behavior`]. The engine owns the state
//! machine around it ([`Node::run`](crate::Node::run)): hooks are only ever called in the order
//! `on_start`, `on_run`..., `on_stop`.

use std::any::Any;

use bt_core::{Blackboard, OwnerContext, Status};

use crate::AwakeError;

/// A leaf action or condition.
///
/// Implementors must be [`Clone`]: instancing a tree copies each leaf from its prototype, and a
/// pooled leaf is refreshed with `clone_from`, so the prototype's field values are what a new
/// instance starts with. Anything a leaf mutates while running should be reset in `on_start`.
pub trait Behavior: BehaviorClone + Send + 'static {
    /// Resolve host bindings once per instance. Called while the tree is being instantiated.
    fn on_awake(&mut self, _owner: &OwnerContext) -> Result<(), AwakeError> {
        Ok(())
    }

    /// Entering a fresh activation.
    fn on_start(&mut self, _blackboard: &mut Blackboard<'_>) {}

    /// One step of work. Return `Running` to be resumed next tick.
    fn on_run(&mut self, blackboard: &mut Blackboard<'_>) -> Status;

    /// Leaving an activation, either because it finished or because it was aborted.
    fn on_stop(&mut self, _blackboard: &mut Blackboard<'_>) {}

    /// Side-effect-free recorder used by ancestors deciding whether to re-check or hijack.
    fn evaluate(&self, _blackboard: &Blackboard<'_>) -> Status {
        Status::Success
    }

    /// Default display name for nodes wrapping this behavior.
    fn name(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }
}

/// Object-safe cloning for boxed behaviors. Blanket-implemented for every `Behavior + Clone`.
pub trait BehaviorClone {
    fn clone_box(&self) -> Box<dyn Behavior>;

    /// Overwrites `target` with a copy of `self`, reusing its allocation when the concrete types
    /// match.
    fn clone_into_box(&self, target: &mut Box<dyn Behavior>);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T> BehaviorClone for T
where
    T: Behavior + Clone,
{
    fn clone_box(&self) -> Box<dyn Behavior> {
        Box::new(self.clone())
    }

    fn clone_into_box(&self, target: &mut Box<dyn Behavior>) {
        if let Some(slot) = target.as_any_mut().downcast_mut::<T>() {
            slot.clone_from(self);
            return;
        }
        *target = Box::new(self.clone());
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
