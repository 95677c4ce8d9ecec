#![allow(dead_code)]

use std::sync::Arc;

use bt_runtime::{Behavior, Blackboard, Status};
use parking_lot::Mutex;

/// Shared record of lifecycle hook calls, as `name:hook` strings.
#[derive(Clone, Default)]
pub struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    pub fn push(&self, entry: String) {
        self.0.lock().push(entry);
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock())
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.lock().iter().filter(|e| *e == entry).count()
    }
}

/// Result a [`Recorder`] reports, switchable from the test body between ticks.
#[derive(Clone)]
pub struct Outcome(Arc<Mutex<Status>>);

impl Outcome {
    pub fn new(status: Status) -> Self {
        Self(Arc::new(Mutex::new(status)))
    }

    pub fn set(&self, status: Status) {
        *self.0.lock() = status;
    }

    pub fn get(&self) -> Status {
        *self.0.lock()
    }
}

/// Leaf that logs every hook and returns its outcome from both `on_run` and `evaluate`.
#[derive(Clone)]
pub struct Recorder {
    label: &'static str,
    outcome: Outcome,
    log: Log,
}

impl Recorder {
    pub fn new(label: &'static str, status: Status, log: &Log) -> (Self, Outcome) {
        let outcome = Outcome::new(status);
        let recorder = Self {
            label,
            outcome: outcome.clone(),
            log: log.clone(),
        };
        (recorder, outcome)
    }

    pub fn fixed(label: &'static str, status: Status, log: &Log) -> Self {
        Self::new(label, status, log).0
    }
}

impl Behavior for Recorder {
    fn on_start(&mut self, _blackboard: &mut Blackboard<'_>) {
        self.log.push(format!("{}:start", self.label));
    }

    fn on_run(&mut self, _blackboard: &mut Blackboard<'_>) -> Status {
        self.log.push(format!("{}:run", self.label));
        self.outcome.get()
    }

    fn on_stop(&mut self, _blackboard: &mut Blackboard<'_>) {
        self.log.push(format!("{}:stop", self.label));
    }

    fn evaluate(&self, _blackboard: &Blackboard<'_>) -> Status {
        self.outcome.get()
    }
}

pub fn strings(entries: &[&str]) -> Vec<String> {
    entries.iter().map(|e| (*e).to_owned()).collect()
}
