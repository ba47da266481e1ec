use bevy_ecs::prelude::*;
use bevy_ecs::schedule::SystemSet;

use crate::core::rng::{hash_seed, EngineRng};
use crate::core::world::{ActionQueue, EngineLog};
use crate::data::bosses::BossCatalog;
use crate::data::species::SpeciesCatalog;
use crate::simulation::battle::{BattleState, BattleTuning};
use crate::simulation::boss::BossState;
use crate::simulation::collection::CollectionStore;
use crate::simulation::daily::{generate_challenges, DailyState};
use crate::simulation::encounter::EncounterState;
use crate::simulation::profile::PlayerProfile;
use crate::simulation::time::{day_index, Clock};
use crate::systems::battle::battle_system;
use crate::systems::boss::boss_system;
use crate::systems::daily::{claim_system, daily_cycle_system};
use crate::systems::encounter::encounter_system;
use crate::systems::fusion::fusion_system;
use crate::systems::profile::profile_system;

/// Canonical tick ordering for the simulation.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum TickSet {
    Upkeep,
    Actions,
}

/// Build the ECS world with baseline resources.
pub fn create_world(seed: u64, now: u64) -> World {
    let mut world = World::new();
    let mut rng = seed ^ hash_seed("wildspire");
    let catalog = SpeciesCatalog::builtin();
    let bosses = BossCatalog::builtin(&catalog);

    world.insert_resource(Clock { now });
    world.insert_resource(ActionQueue::default());
    world.insert_resource(EngineLog::default());
    world.insert_resource(PlayerProfile::new(now));
    world.insert_resource(CollectionStore::default());
    world.insert_resource(EncounterState::default());
    world.insert_resource(BattleState::default());
    world.insert_resource(BossState::default());
    world.insert_resource(BattleTuning::default());
    world.insert_resource(DailyState {
        challenges: generate_challenges(&mut rng, day_index(now)),
    });
    world.insert_resource(catalog);
    world.insert_resource(bosses);
    world.insert_resource(EngineRng(rng));
    world
}

/// Build the system schedule in the canonical order. Action systems run
/// chained so a single tick carrying several intents settles them in a
/// stable, reproducible order.
pub fn create_schedule() -> Schedule {
    let mut schedule = Schedule::default();

    schedule.configure_sets((TickSet::Upkeep, TickSet::Actions).chain());

    schedule.add_systems((
        daily_cycle_system.in_set(TickSet::Upkeep),
        (
            profile_system,
            encounter_system,
            fusion_system,
            battle_system,
            boss_system,
            claim_system,
        )
            .chain()
            .in_set(TickSet::Actions),
    ));

    schedule
}
