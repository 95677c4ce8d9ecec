//! Composite nodes: ordered orchestration of several children.
//!
//! - [`CompositeKind::Sequencer`]: AND with memory. Fails on the first failing child, succeeds
//!   when every child succeeded.
//! - [`CompositeKind::Selector`]: OR with memory. Succeeds on the first succeeding child, fails
//!   when every child failed.
//! - [`CompositeKind::Parallel`]: ticks every child every tick; completion depends on
//!   [`ParallelMode`].
//!
//! Sequencer and Selector remember the index of the child that returned `Running` and resume
//! there next tick instead of re-running the children before it.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use bt_core::{Blackboard, NodeState, Status};

use crate::Node;

/// Completion policy of a parallel node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ParallelMode {
    /// Never completes on its own: always `Running`.
    #[default]
    Default,
    /// `Success` as soon as any child completes, whatever its result.
    UntilAnyComplete,
    /// `Success` as soon as any child fails.
    UntilAnyFailure,
    /// `Success` as soon as any child succeeds.
    UntilAnySuccess,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CompositeKind {
    Sequencer,
    Selector,
    Parallel(ParallelMode),
}

impl CompositeKind {
    pub fn label(self) -> &'static str {
        match self {
            CompositeKind::Sequencer => "Sequencer",
            CompositeKind::Selector => "Selector",
            CompositeKind::Parallel(_) => "Parallel",
        }
    }
}

/// Children plus the resume index.
///
/// The resume index never exceeds the child count; it is reset whenever the composite starts or
/// stops.
pub struct Composite {
    kind: CompositeKind,
    children: Vec<Node>,
    resume: usize,
}

impl Composite {
    pub(crate) fn new(kind: CompositeKind, children: Vec<Node>) -> Self {
        Self {
            kind,
            children,
            resume: 0,
        }
    }

    pub(crate) fn with_capacity(kind: CompositeKind, capacity: usize) -> Self {
        Self::new(kind, Vec::with_capacity(capacity))
    }

    pub fn kind(&self) -> CompositeKind {
        self.kind
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Index of the child the next tick resumes at.
    pub fn resume_index(&self) -> usize {
        self.resume
    }

    pub(crate) fn push(&mut self, child: Node) {
        self.children.push(child);
    }

    pub(crate) fn remove(&mut self, index: usize) -> Option<Node> {
        if index >= self.children.len() {
            return None;
        }
        let child = self.children.remove(index);
        self.resume = self.resume.min(self.children.len());
        Some(child)
    }

    pub(crate) fn drain_into(&mut self, out: &mut Vec<Node>) {
        out.extend(self.children.drain(..));
    }

    pub(crate) fn reset_to(&mut self, kind: CompositeKind) {
        self.kind = kind;
        self.children.clear();
        self.resume = 0;
    }

    pub(crate) fn scrub(&mut self) {
        self.resume = 0;
    }

    pub(crate) fn on_start(&mut self) {
        self.resume = 0;
    }

    pub(crate) fn run(&mut self, blackboard: &mut Blackboard<'_>) -> Status {
        match self.kind {
            CompositeKind::Sequencer => self.run_sequencer(blackboard),
            CompositeKind::Selector => self.run_selector(blackboard),
            CompositeKind::Parallel(mode) => self.run_parallel(mode, blackboard),
        }
    }

    pub(crate) fn on_stop(&mut self, blackboard: &mut Blackboard<'_>) {
        match self.kind {
            CompositeKind::Parallel(_) => {
                for child in self.children.iter_mut() {
                    if child.state() == NodeState::Running {
                        child.abort(blackboard);
                    }
                }
            }
            CompositeKind::Sequencer | CompositeKind::Selector => {
                let index = self.checked_resume();
                if let Some(child) = self.children.get_mut(index) {
                    if child.state() == NodeState::Running {
                        child.abort(blackboard);
                    }
                }
            }
        }
        self.resume = 0;
    }

    /// The resume index, clamped to the child count. Out of range is a bug.
    fn checked_resume(&mut self) -> usize {
        debug_assert!(
            self.resume <= self.children.len(),
            "resume index {} out of bounds for {} children",
            self.resume,
            self.children.len()
        );
        self.resume = self.resume.min(self.children.len());
        self.resume
    }

    fn run_sequencer(&mut self, blackboard: &mut Blackboard<'_>) -> Status {
        let mut index = self.checked_resume();

        if index > 0 && self.earlier_check_failed(index, blackboard) {
            return Status::Failure;
        }

        while index < self.children.len() {
            match self.children[index].run(blackboard) {
                Status::Success => index += 1,
                status => {
                    self.resume = index;
                    return status;
                }
            }
        }

        self.resume = index;
        Status::Success
    }

    fn run_selector(&mut self, blackboard: &mut Blackboard<'_>) -> Status {
        let mut index = self.checked_resume();

        if index > 0 {
            if let Some(hijacker) = self.hijacker(index, blackboard) {
                if let Some(running) = self.children.get_mut(index) {
                    running.abort(blackboard);
                }
                index = hijacker;
            }
        }

        while index < self.children.len() {
            match self.children[index].run(blackboard) {
                Status::Failure => index += 1,
                status => {
                    self.resume = index;
                    return status;
                }
            }
        }

        self.resume = index;
        Status::Failure
    }

    fn run_parallel(&mut self, mode: ParallelMode, blackboard: &mut Blackboard<'_>) -> Status {
        if self.children.is_empty() {
            return Status::Success;
        }

        let mut any_success = false;
        let mut any_failure = false;
        for child in self.children.iter_mut() {
            match child.run(blackboard) {
                Status::Success => any_success = true,
                Status::Failure => any_failure = true,
                Status::Running => {}
            }
        }

        let done = match mode {
            ParallelMode::Default => false,
            ParallelMode::UntilAnyComplete => any_success || any_failure,
            ParallelMode::UntilAnyFailure => any_failure,
            ParallelMode::UntilAnySuccess => any_success,
        };
        if done {
            Status::Success
        } else {
            Status::Running
        }
    }

    /// Whether a re-evaluable child before `index` no longer holds.
    fn earlier_check_failed(&self, index: usize, blackboard: &Blackboard<'_>) -> bool {
        self.children[..index]
            .iter()
            .any(|c| c.flags().can_re_evaluate && c.evaluate(blackboard).is_failure())
    }

    /// The first hijack-enabled child before `index` whose evaluation succeeds.
    fn hijacker(&self, index: usize, blackboard: &Blackboard<'_>) -> Option<usize> {
        self.children[..index]
            .iter()
            .position(|c| c.flags().enable_hijack && c.evaluate(blackboard).is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{leaf, sequencer};
    use crate::Action;

    #[test]
    fn empty_sequencer_succeeds_and_empty_selector_fails() {
        let mut bb = Blackboard::new();
        let mut seq = sequencer(vec![]);
        let mut sel = Node::composite(CompositeKind::Selector, vec![]);

        assert_eq!(seq.run(&mut bb), Status::Success);
        assert_eq!(sel.run(&mut bb), Status::Failure);
    }

    #[test]
    fn remove_clamps_resume_index() {
        let mut c = Composite::new(
            CompositeKind::Sequencer,
            vec![leaf(Action::new(|_| Status::Success))],
        );
        c.resume = 1;
        assert!(c.remove(0).is_some());
        assert_eq!(c.resume_index(), 0);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn corrupted_resume_index_is_clamped_in_release() {
        let mut c = Composite::new(
            CompositeKind::Sequencer,
            vec![leaf(Action::new(|_| Status::Success))],
        );
        c.resume = 5;
        let mut bb = Blackboard::new();
        assert_eq!(c.run(&mut bb), Status::Success);
        assert_eq!(c.resume_index(), 1);
    }
}
