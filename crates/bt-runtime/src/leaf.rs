//! Reference leaves.
//!
//! Game code usually implements [`Behavior`] directly; these cover the common glue: closures over
//! the blackboard, timed waits and simple reads/writes.

use std::borrow::Cow;
use std::sync::Arc;

use bt_core::{keys, Blackboard, Status, Value};

use crate::Behavior;

type Predicate = dyn Fn(&Blackboard<'_>) -> bool + Send + Sync;
type Step = dyn Fn(&mut Blackboard<'_>) -> Status + Send + Sync;

/// Succeeds while the predicate holds. Its evaluation is the predicate itself, so it works as a
/// re-evaluation or hijack guard.
#[derive(Clone)]
pub struct Condition {
    predicate: Arc<Predicate>,
}

impl Condition {
    pub fn new(predicate: impl Fn(&Blackboard<'_>) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    fn check(&self, blackboard: &Blackboard<'_>) -> Status {
        if (self.predicate)(blackboard) {
            Status::Success
        } else {
            Status::Failure
        }
    }
}

impl Behavior for Condition {
    fn on_run(&mut self, blackboard: &mut Blackboard<'_>) -> Status {
        self.check(blackboard)
    }

    fn evaluate(&self, blackboard: &Blackboard<'_>) -> Status {
        self.check(blackboard)
    }
}

/// Runs a closure every tick and reports what it returns.
#[derive(Clone)]
pub struct Action {
    step: Arc<Step>,
}

impl Action {
    pub fn new(step: impl Fn(&mut Blackboard<'_>) -> Status + Send + Sync + 'static) -> Self {
        Self {
            step: Arc::new(step),
        }
    }
}

impl Behavior for Action {
    fn on_run(&mut self, blackboard: &mut Blackboard<'_>) -> Status {
        (self.step)(blackboard)
    }
}

/// Reports `Running` until `seconds` of [`keys::DELTA_TIME`] have accumulated.
#[derive(Debug, Clone, PartialEq)]
pub struct Wait {
    seconds: f32,
    elapsed: f32,
}

impl Wait {
    pub fn new(seconds: f32) -> Self {
        Self {
            seconds,
            elapsed: 0.0,
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

impl Behavior for Wait {
    fn on_start(&mut self, _blackboard: &mut Blackboard<'_>) {
        self.elapsed = 0.0;
    }

    fn on_run(&mut self, blackboard: &mut Blackboard<'_>) -> Status {
        self.elapsed += blackboard.get_float(keys::DELTA_TIME, 0.0);
        if self.elapsed >= self.seconds {
            Status::Success
        } else {
            Status::Running
        }
    }
}

/// Writes a value into the current scope and succeeds.
#[derive(Debug, Clone)]
pub struct SetValue {
    key: Cow<'static, str>,
    value: Value,
}

impl SetValue {
    pub fn new(key: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Behavior for SetValue {
    fn on_run(&mut self, blackboard: &mut Blackboard<'_>) -> Status {
        blackboard.set_value(&self.key, self.value.clone());
        Status::Success
    }
}

/// Succeeds when the key is visible and equal to `expected`.
#[derive(Debug, Clone)]
pub struct CompareValue {
    key: Cow<'static, str>,
    expected: Value,
}

impl CompareValue {
    pub fn new(key: impl Into<Cow<'static, str>>, expected: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            expected: expected.into(),
        }
    }

    fn check(&self, blackboard: &Blackboard<'_>) -> Status {
        if blackboard.value(&self.key) == Some(&self.expected) {
            Status::Success
        } else {
            Status::Failure
        }
    }
}

impl Behavior for CompareValue {
    fn on_run(&mut self, blackboard: &mut Blackboard<'_>) -> Status {
        self.check(blackboard)
    }

    fn evaluate(&self, blackboard: &Blackboard<'_>) -> Status {
        self.check(blackboard)
    }
}
