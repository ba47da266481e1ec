use bevy_ecs::prelude::Resource;

pub const SECS_PER_DAY: u64 = 86_400;

/// Wall-clock input for the current tick. The engine never reads a global
/// clock; callers stamp this before each tick so regen and rollover edge
/// cases stay deterministic under test.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct Clock {
    pub now: u64,
}

/// UTC calendar-day index for an epoch-seconds timestamp.
pub fn day_index(now: u64) -> u64 {
    now / SECS_PER_DAY
}
