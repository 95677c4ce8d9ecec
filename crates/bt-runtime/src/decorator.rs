//! Decorator nodes: one child, transformed result or context.
//!
//! A decorator without a child is a configuration error; it reports `Success` instead of
//! panicking.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use bt_core::{Blackboard, BlackboardId, Status};

use crate::Node;

/// How many times a repeat decorator loops its child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RepeatCount {
    Forever,
    Times(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DecoratorKind {
    /// Swaps `Success` and `Failure`.
    Invert,
    /// Turns `Failure` into `Success`.
    Succeeder,
    /// Restarts the child every time it completes; reports `Running` while looping.
    Repeat(RepeatCount),
    /// Runs the child against a private blackboard scope parented to the enclosing one.
    BlackboardScope,
}

impl DecoratorKind {
    pub fn label(self) -> &'static str {
        match self {
            DecoratorKind::Invert => "Invert",
            DecoratorKind::Succeeder => "Succeeder",
            DecoratorKind::Repeat(_) => "Repeat",
            DecoratorKind::BlackboardScope => "BlackboardScope",
        }
    }
}

pub struct Decorator {
    kind: DecoratorKind,
    child: Option<Box<Node>>,
    /// Completed child activations since the decorator started.
    counter: u32,
    /// Stored scope between ticks, created on first run.
    scope: Option<Blackboard<'static>>,
    /// The enclosing blackboard the scope was last attached to.
    scope_parent: Option<BlackboardId>,
}

impl Decorator {
    pub(crate) fn new(kind: DecoratorKind, child: Option<Node>) -> Self {
        Self {
            kind,
            child: child.map(Box::new),
            counter: 0,
            scope: None,
            scope_parent: None,
        }
    }

    pub fn kind(&self) -> DecoratorKind {
        self.kind
    }

    pub fn child(&self) -> Option<&Node> {
        self.child.as_deref()
    }

    /// Completed loops of a repeat decorator in the current activation.
    pub fn iterations(&self) -> u32 {
        self.counter
    }

    /// The stored blackboard scope, if it has been created yet.
    pub fn scope(&self) -> Option<&Blackboard<'static>> {
        self.scope.as_ref()
    }

    pub(crate) fn set_child(&mut self, child: Node) {
        self.child = Some(Box::new(child));
    }

    pub(crate) fn take_child(&mut self) -> Option<Node> {
        self.child.take().map(|child| *child)
    }

    pub(crate) fn reset_to(&mut self, kind: DecoratorKind) {
        self.kind = kind;
        self.child = None;
        self.scrub();
    }

    pub(crate) fn scrub(&mut self) {
        self.counter = 0;
        self.scope_parent = None;
        if let Some(scope) = self.scope.as_mut() {
            scope.clear();
        }
    }

    pub(crate) fn on_start(&mut self) {
        self.counter = 0;
    }

    pub(crate) fn run(&mut self, blackboard: &mut Blackboard<'_>) -> Status {
        let Some(child) = self.child.as_deref_mut() else {
            return Status::Success;
        };

        match self.kind {
            DecoratorKind::Invert => child.run(blackboard).invert(),
            DecoratorKind::Succeeder => match child.run(blackboard) {
                Status::Failure => Status::Success,
                status => status,
            },
            DecoratorKind::Repeat(count) => {
                if let RepeatCount::Times(limit) = count {
                    if self.counter >= limit {
                        return Status::Success;
                    }
                }
                if child.run(blackboard).is_running() {
                    return Status::Running;
                }
                // Fully reset the child before it is re-entered next tick.
                child.abort(blackboard);
                self.counter = self.counter.saturating_add(1);
                match count {
                    RepeatCount::Times(limit) if self.counter >= limit => Status::Success,
                    _ => Status::Running,
                }
            }
            DecoratorKind::BlackboardScope => {
                let store = take_scope(&mut self.scope, &mut self.scope_parent, blackboard.id());
                let mut scoped = store.attach(blackboard);
                let status = child.run(&mut scoped);
                self.scope = Some(scoped.detach());
                status
            }
        }
    }

    pub(crate) fn on_stop(&mut self, blackboard: &mut Blackboard<'_>) {
        let Some(child) = self.child.as_deref_mut() else {
            return;
        };

        match self.kind {
            DecoratorKind::BlackboardScope => {
                let store = take_scope(&mut self.scope, &mut self.scope_parent, blackboard.id());
                let mut scoped = store.attach(blackboard);
                if child.is_started() {
                    child.abort(&mut scoped);
                }
                scoped.clear();
                self.scope = Some(scoped.detach());
            }
            _ => {
                if child.is_started() {
                    child.abort(blackboard);
                }
            }
        }
    }

    pub(crate) fn evaluate(&self, blackboard: &Blackboard<'_>) -> Status {
        let Some(child) = self.child.as_deref() else {
            return Status::Success;
        };

        match self.kind {
            DecoratorKind::Invert => child.evaluate(blackboard).invert(),
            DecoratorKind::Succeeder => match child.evaluate(blackboard) {
                Status::Failure => Status::Success,
                status => status,
            },
            DecoratorKind::Repeat(_) => child.evaluate(blackboard),
            // Keys written into the stored scope shadow the enclosing blackboard.
            DecoratorKind::BlackboardScope => match self.scope.as_ref() {
                Some(store) if !store.is_empty() && self.scope_parent == Some(blackboard.id()) => {
                    child.evaluate(&store.overlay(blackboard))
                }
                _ => child.evaluate(blackboard),
            },
        }
    }
}

/// Takes the stored scope for a run under `enclosing`.
///
/// The scope is created lazily and reused across activations; if the enclosing blackboard is a
/// different instance than last time, a new scope replaces the old one.
fn take_scope(
    slot: &mut Option<Blackboard<'static>>,
    parent: &mut Option<BlackboardId>,
    enclosing: BlackboardId,
) -> Blackboard<'static> {
    let same_parent = parent.map_or(true, |prev| prev == enclosing);
    *parent = Some(enclosing);

    match slot.take() {
        Some(store) if same_parent => store,
        Some(_) => {
            tracing::debug!(
                enclosing = enclosing.get(),
                "enclosing blackboard changed; recreating scope"
            );
            Blackboard::new()
        }
        None => Blackboard::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{invert, leaf, repeat, scope, succeeder};
    use crate::Action;

    #[test]
    fn childless_decorators_succeed() {
        let mut bb = Blackboard::new();
        for kind in [
            DecoratorKind::Invert,
            DecoratorKind::Succeeder,
            DecoratorKind::Repeat(RepeatCount::Forever),
            DecoratorKind::BlackboardScope,
        ] {
            let mut node = Node::decorator(kind, None);
            assert_eq!(node.run(&mut bb), Status::Success, "{kind:?}");
            assert_eq!(node.evaluate(&bb), Status::Success, "{kind:?}");
        }
    }

    #[test]
    fn succeeder_passes_running_through() {
        let mut bb = Blackboard::new();
        let mut node = succeeder(leaf(Action::new(|_| Status::Running)));
        assert_eq!(node.run(&mut bb), Status::Running);

        let mut node = succeeder(leaf(Action::new(|_| Status::Failure)));
        assert_eq!(node.run(&mut bb), Status::Success);
    }

    #[test]
    fn invert_evaluates_inverted() {
        let bb = Blackboard::new();
        let node = invert(leaf(Action::new(|_| Status::Success)));
        assert_eq!(node.evaluate(&bb), Status::Failure);
    }

    #[test]
    fn repeat_zero_times_succeeds_without_running_child() {
        let mut bb = Blackboard::new();
        let mut node = repeat(0, leaf(Action::new(|bb| {
            bb.set_bool("ran", true);
            Status::Success
        })));
        assert_eq!(node.run(&mut bb), Status::Success);
        assert!(!bb.get_bool("ran", false));
    }

    /// Raises a flag while running; evaluates to whether the flag is visible.
    #[derive(Clone)]
    struct Flagging;

    impl crate::Behavior for Flagging {
        fn on_run(&mut self, blackboard: &mut Blackboard<'_>) -> Status {
            blackboard.set_bool("flag", true);
            Status::Running
        }

        fn evaluate(&self, blackboard: &Blackboard<'_>) -> Status {
            if blackboard.get_bool("flag", false) {
                Status::Success
            } else {
                Status::Failure
            }
        }
    }

    #[test]
    fn scope_evaluates_against_its_own_keys() {
        let mut bb = Blackboard::new();
        let mut node = scope(leaf(Flagging));
        assert_eq!(node.evaluate(&bb), Status::Failure);

        assert_eq!(node.run(&mut bb), Status::Running);
        assert!(!bb.contains("flag"));
        assert_eq!(node.evaluate(&bb), Status::Success);

        // A different enclosing blackboard never sees the stored scope.
        assert_eq!(node.evaluate(&Blackboard::new()), Status::Failure);

        node.abort(&mut bb);
        assert_eq!(node.evaluate(&bb), Status::Failure);
    }

    #[test]
    fn scope_is_replaced_when_enclosing_blackboard_changes() {
        let mut node = scope(leaf(Action::new(|bb| {
            let n = bb.get_int("n", 0);
            bb.set_int("n", n + 1);
            Status::Running
        })));

        let mut first = Blackboard::new();
        node.run(&mut first);
        node.run(&mut first);
        let first_scope = node.as_decorator().and_then(|d| d.scope()).map(|s| s.id());
        assert_eq!(
            node.as_decorator().and_then(|d| d.scope()).map(|s| s.get_int("n", 0)),
            Some(2)
        );

        let mut second = Blackboard::new();
        node.run(&mut second);
        let decorator = node.as_decorator().unwrap();
        let scope = decorator.scope().unwrap();
        assert_ne!(Some(scope.id()), first_scope);
        assert_eq!(scope.get_int("n", 0), 1);
    }
}
