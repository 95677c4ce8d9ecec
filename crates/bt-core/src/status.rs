//! Results and lifecycle states of behavior nodes.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The result of one `run` of a node.
///
/// `Running` is the explicit suspension signal: the node keeps its continuation in its own fields
/// and expects to be run again on the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Status {
    /// The node has not finished and must be resumed next tick.
    Running,
    /// The node completed successfully.
    Success,
    /// The node completed unsuccessfully.
    Failure,
}

impl Status {
    #[inline]
    pub fn is_running(self) -> bool {
        matches!(self, Status::Running)
    }

    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }

    #[inline]
    pub fn is_failure(self) -> bool {
        matches!(self, Status::Failure)
    }

    /// Returns `true` for `Success` and `Failure`, i.e. the end of an activation.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !self.is_running()
    }

    /// Swaps `Success` and `Failure`; `Running` passes through unchanged.
    #[inline]
    pub fn invert(self) -> Self {
        match self {
            Status::Running => Status::Running,
            Status::Success => Status::Failure,
            Status::Failure => Status::Success,
        }
    }
}

/// Lifecycle state stored on every node.
///
/// A node starts in `NotStarted`, reports `Running` while suspended, lands on a terminal state at
/// the end of an activation and goes back to `NotStarted` when aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NodeState {
    #[default]
    NotStarted,
    Running,
    Success,
    Failure,
}

impl NodeState {
    /// The status this state corresponds to, if the node has been run at least once.
    pub fn status(self) -> Option<Status> {
        match self {
            NodeState::NotStarted => None,
            NodeState::Running => Some(Status::Running),
            NodeState::Success => Some(Status::Success),
            NodeState::Failure => Some(Status::Failure),
        }
    }
}

impl From<Status> for NodeState {
    fn from(value: Status) -> Self {
        match value {
            Status::Running => NodeState::Running,
            Status::Success => NodeState::Success,
            Status::Failure => NodeState::Failure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invert_keeps_running() {
        assert_eq!(Status::Success.invert(), Status::Failure);
        assert_eq!(Status::Failure.invert(), Status::Success);
        assert_eq!(Status::Running.invert(), Status::Running);
    }

    #[test]
    fn node_state_maps_back_to_status() {
        assert_eq!(NodeState::default().status(), None);
        for status in [Status::Running, Status::Success, Status::Failure] {
            assert_eq!(NodeState::from(status).status(), Some(status));
        }
    }
}
