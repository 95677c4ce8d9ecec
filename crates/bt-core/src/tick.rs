#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{keys, Blackboard};

/// Clock signal supplied by the host once per update.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TickContext {
    pub tick: u64,
    pub dt_seconds: f32,
}

impl TickContext {
    pub fn new(tick: u64, dt_seconds: f32) -> Self {
        Self { tick, dt_seconds }
    }

    /// The context for the following update with the same step.
    pub fn next(self) -> Self {
        Self {
            tick: self.tick.wrapping_add(1),
            dt_seconds: self.dt_seconds,
        }
    }

    /// Writes [`keys::TICK`] and [`keys::DELTA_TIME`] into the blackboard's local scope.
    pub fn publish(&self, blackboard: &mut Blackboard<'_>) {
        blackboard.set_int(keys::TICK, self.tick as i64);
        blackboard.set_float(keys::DELTA_TIME, self.dt_seconds);
    }
}
