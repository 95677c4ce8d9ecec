//! The demo agent: a guard that patrols a square route and engages whenever a threat shows up.

use std::sync::Arc;

use bt_core::{keys, Blackboard, OwnerContext, Status, Vec3};
use bt_runtime::builder::{leaf, scope, selector, sequencer};
use bt_runtime::{AwakeError, Behavior, Tree, TreeError, Wait};

pub const THREAT: &str = "guard.threat";
pub const SHOTS: &str = "guard.shots";
const HEADING: &str = "guard.heading";

/// Per-agent host data handed to the tree as its owner.
#[derive(Debug)]
pub struct Guard {
    pub id: u64,
    pub speed: f32,
    pub route: Arc<[Vec3]>,
}

impl Guard {
    pub fn new(id: u64) -> Self {
        let origin = Vec3::new((id % 16) as f32 * 20.0, 0.0, (id / 16) as f32 * 20.0);
        let side = 8.0 + (id % 3) as f32 * 2.0;
        let route = [
            Vec3::ZERO,
            Vec3::new(side, 0.0, 0.0),
            Vec3::new(side, 0.0, side),
            Vec3::new(0.0, 0.0, side),
        ]
        .map(|corner| origin + corner);

        Self {
            id,
            speed: 3.0 + (id % 4) as f32 * 0.5,
            route: route.into(),
        }
    }
}

/// Walks to the next waypoint of the owner's route; succeeds on arrival.
#[derive(Debug, Clone, Default)]
pub struct Patrol {
    route: Arc<[Vec3]>,
    speed: f32,
    leg: usize,
    position: Vec3,
    walked: f32,
}

impl Patrol {
    pub fn walked(&self) -> f32 {
        self.walked
    }
}

impl Behavior for Patrol {
    fn on_awake(&mut self, owner: &OwnerContext) -> Result<(), AwakeError> {
        let guard = owner
            .downcast_ref::<Guard>()
            .ok_or(AwakeError::OwnerType { expected: "Guard" })?;
        let Some(&start) = guard.route.first() else {
            return Err(AwakeError::MissingBinding(format!("route of guard {}", guard.id)));
        };

        self.route = Arc::clone(&guard.route);
        self.speed = guard.speed;
        self.position = start;
        self.leg = 1 % guard.route.len();
        Ok(())
    }

    fn on_run(&mut self, blackboard: &mut Blackboard<'_>) -> Status {
        let Some(&target) = self.route.get(self.leg) else {
            return Status::Failure;
        };
        let step = self.speed * blackboard.get_float(keys::DELTA_TIME, 0.0);
        let to_target = target - self.position;
        let distance = to_target.length();

        if distance <= step {
            self.position = target;
            self.walked += distance;
            self.leg = (self.leg + 1) % self.route.len();
            blackboard.set_vector(HEADING, Vec3::ZERO);
            return Status::Success;
        }

        let heading = to_target / distance;
        self.position += heading * step;
        self.walked += step;
        blackboard.set_vector(HEADING, heading);
        Status::Running
    }
}

/// Fires a burst at a visible threat. Its evaluation is the threat check, so it can preempt the
/// patrol.
#[derive(Debug, Clone)]
pub struct Engage {
    burst: u32,
    fired: u32,
}

impl Engage {
    pub fn new(burst: u32) -> Self {
        Self { burst, fired: 0 }
    }
}

impl Behavior for Engage {
    fn on_start(&mut self, _blackboard: &mut Blackboard<'_>) {
        self.fired = 0;
    }

    fn on_run(&mut self, blackboard: &mut Blackboard<'_>) -> Status {
        if !blackboard.get_bool(THREAT, false) {
            return Status::Failure;
        }
        self.fired += 1;
        let shots = blackboard.get_int(SHOTS, 0);
        blackboard.set_int(SHOTS, shots + 1);

        if self.fired >= self.burst {
            Status::Success
        } else {
            Status::Running
        }
    }

    fn evaluate(&self, blackboard: &Blackboard<'_>) -> Status {
        if blackboard.get_bool(THREAT, false) {
            Status::Success
        } else {
            Status::Failure
        }
    }
}

/// `Selector[Engage (hijack), Scope(Sequencer[Patrol, Wait])]`.
pub fn prototype(linger_seconds: f32) -> Result<Tree, TreeError> {
    let engage = leaf(Engage::new(3)).with_name("engage").hijack();
    let patrol = scope(sequencer(vec![
        leaf(Patrol::default()).with_name("walk"),
        leaf(Wait::new(linger_seconds)).with_name("linger"),
    ]))
    .with_name("patrol");

    Tree::prototype(selector(vec![engage, patrol]).with_name("guard"))
}

/// Deterministic threat schedule: sightings come and go in windows of 45 ticks.
pub fn threat_at(seed: u64, agent: u64, tick: u64) -> bool {
    let window = tick / 45;
    splitmix64(seed ^ agent.rotate_left(32) ^ window.wrapping_mul(0x9E37_79B9)) % 5 == 0
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}
