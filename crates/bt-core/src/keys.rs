//! Well-known blackboard keys written by the driver.

/// Current tick number (`int`).
pub const TICK: &str = "bt.clock.tick";

/// Seconds elapsed since the previous tick (`float`).
pub const DELTA_TIME: &str = "bt.clock.dt";
