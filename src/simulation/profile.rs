use std::collections::HashSet;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::data::species::SpeciesId;

pub const ENERGY_CAP: u8 = 5;
pub const BOSS_ENERGY_CAP: u8 = 1;

const STARTING_CURRENCY: u32 = 100;

/// The single persistent player profile. Created on first run, mutated by
/// every subsystem, never destroyed.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub display_name: String,
    pub currency: u32,
    /// Encounter energy, 0..=ENERGY_CAP.
    pub energy: u8,
    /// Timestamp energy regen was last reconciled to (whole intervals only).
    pub energy_checkpoint: u64,
    /// Boss energy, 0..=BOSS_ENERGY_CAP, regenerated on day rollover.
    pub boss_energy: u8,
    pub boss_energy_reset: u64,
    pub wins: u32,
    pub losses: u32,
    /// Consecutive days on which all daily challenges were completed.
    pub streak: u32,
    /// Whether today's streak reward has already been claimed.
    pub streak_claimed: bool,
    /// Bosses beaten at least once, keyed by the boss's signature species.
    pub bosses_cleared: HashSet<SpeciesId>,
    /// Timestamp the daily challenges were last regenerated.
    pub challenges_reset: u64,
}

impl PlayerProfile {
    pub fn new(now: u64) -> Self {
        Self {
            display_name: "Keeper".to_string(),
            currency: STARTING_CURRENCY,
            energy: ENERGY_CAP,
            energy_checkpoint: now,
            boss_energy: BOSS_ENERGY_CAP,
            boss_energy_reset: now,
            wins: 0,
            losses: 0,
            streak: 0,
            streak_claimed: false,
            bosses_cleared: HashSet::new(),
            challenges_reset: now,
        }
    }
}
