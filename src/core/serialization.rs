use std::fs;
use std::io;
use std::path::Path;

use bevy_ecs::prelude::World;
use serde::{Deserialize, Serialize};

use crate::core::rng::EngineRng;
use crate::core::world::{ActionQueue, EngineLog};
use crate::data::species::SpeciesId;
use crate::simulation::battle::BattleState;
use crate::simulation::boss::BossState;
use crate::simulation::collection::{CollectionStore, OwnedCreature};
use crate::simulation::daily::DailyState;
use crate::simulation::encounter::EncounterState;
use crate::simulation::profile::PlayerProfile;

pub const SAVE_VERSION: u32 = 1;

fn default_version() -> u32 {
    SAVE_VERSION
}

/// Serializable snapshot of the durable game state. Live encounter, battle
/// and boss sessions are ephemeral and never saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveState {
    #[serde(default = "default_version")]
    pub version: u32,
    pub seed: u64,
    pub rng: u64,
    pub profile: PlayerProfile,
    pub creatures: Vec<OwnedCreature>,
    pub seen: Vec<SpeciesId>,
    pub caught: Vec<SpeciesId>,
    pub next_instance: u32,
    pub challenges: DailyState,
}

/// Extract a save state from the live world.
pub fn extract_state_from_world(world: &World, seed: u64) -> SaveState {
    let collection = world.resource::<CollectionStore>();
    let mut seen: Vec<SpeciesId> = collection.seen().iter().copied().collect();
    seen.sort();
    let mut caught: Vec<SpeciesId> = collection.caught().iter().copied().collect();
    caught.sort();

    SaveState {
        version: SAVE_VERSION,
        seed,
        rng: world.resource::<EngineRng>().0,
        profile: world.resource::<PlayerProfile>().clone(),
        creatures: collection.iter().cloned().collect(),
        seen,
        caught,
        next_instance: collection.next_instance(),
        challenges: world.resource::<DailyState>().clone(),
    }
}

/// Apply a saved state back into the live world, discarding any in-flight
/// session state.
pub fn apply_state_to_world(state: SaveState, world: &mut World) {
    world.insert_resource(state.profile);
    world.insert_resource(CollectionStore::from_saved(
        state.creatures,
        state.seen.into_iter().collect(),
        state.caught.into_iter().collect(),
        state.next_instance,
    ));
    world.insert_resource(state.challenges);
    world.insert_resource(EngineRng(state.rng));
    world.insert_resource(EncounterState::default());
    world.insert_resource(BattleState::default());
    world.insert_resource(BossState::default());
    world.insert_resource(ActionQueue::default());
    world.insert_resource(EngineLog::default());
}

/// Save state directly to a JSON file.
pub fn save_state_to_path<P: AsRef<Path>>(state: &SaveState, path: P) -> io::Result<()> {
    let json = serde_json::to_string_pretty(state)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    fs::write(path, json)
}

/// Load state from a JSON file.
pub fn load_state_from_path<P: AsRef<Path>>(path: P) -> io::Result<SaveState> {
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}
