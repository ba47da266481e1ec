use std::path::Path;

use bevy_ecs::prelude::*;

use crate::core::ecs::{create_schedule, create_world};
use crate::core::serialization::{
    apply_state_to_world, extract_state_from_world, load_state_from_path, save_state_to_path,
    SaveState,
};
use crate::data::bosses::BossCatalog;
use crate::data::species::{CatalogError, Element, Rarity, SpeciesCatalog, SpeciesId};
use crate::simulation::battle::{BattlePhase, BattleSide, BattleState};
use crate::simulation::boss::BossState;
use crate::simulation::collection::{CollectionStore, InstanceId};
use crate::simulation::daily::DailyState;
use crate::simulation::encounter::EncounterState;
use crate::simulation::profile::PlayerProfile;
use crate::simulation::time::{day_index, Clock};

/// Intent-driven commands fed into the ECS each tick.
#[derive(Debug, Clone)]
pub enum ActionIntent {
    SetDisplayName { name: String },
    CreditCurrency { amount: u32 },
    StartEncounter,
    SelectCandidate { index: usize },
    ResolveCatch { success: bool, score: Option<u32> },
    CancelEncounter,
    Release { id: InstanceId },
    Fuse { a: InstanceId, b: InstanceId },
    StartBattle { team: Vec<InstanceId> },
    ResolveBattle,
    EndBattle,
    CancelBattle,
    StartBossEncounter { team: Vec<InstanceId> },
    ResolveBossEncounter,
    EndBossEncounter,
    CancelBossEncounter,
    ClaimChallengeReward { id: u32 },
    ClaimAllChallengeRewards,
    ClaimStreakReward,
}

/// Resource storing the intents for the next tick.
#[derive(Resource, Default, Debug)]
pub struct ActionQueue(pub Vec<ActionIntent>);

/// Resource capturing the most recent tick's narration.
#[derive(Resource, Default, Debug)]
pub struct EngineLog(pub Vec<String>);

/// Data snapshot returned to the UI layer after each tick.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub day: u64,
    pub profile: ProfileView,
    pub creatures: Vec<CreatureView>,
    pub dex: DexView,
    pub challenges: Vec<ChallengeView>,
    pub encounter: Option<EncounterView>,
    pub battle: Option<BattleView>,
    pub boss: Option<BossView>,
    pub log: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ProfileView {
    pub display_name: String,
    pub currency: u32,
    pub energy: u8,
    pub boss_energy: u8,
    pub wins: u32,
    pub losses: u32,
    pub streak: u32,
    pub streak_claimed: bool,
}

#[derive(Debug, Clone)]
pub struct CreatureView {
    pub id: InstanceId,
    pub species: SpeciesId,
    pub name: String,
    pub element: Element,
    pub rarity: Rarity,
    pub power: u32,
    pub guard: u32,
    pub speed: u32,
    pub wins: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct DexView {
    pub seen: usize,
    pub caught: usize,
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct ChallengeView {
    pub id: u32,
    pub description: String,
    pub progress: u32,
    pub target: u32,
    pub completed: bool,
    pub claimed: bool,
    pub reward: u32,
}

#[derive(Debug, Clone)]
pub struct EncounterView {
    pub cards: Vec<CardView>,
    pub selected: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct CardView {
    pub species: SpeciesId,
    pub name: String,
    pub element: Element,
    pub difficulty: f32,
}

#[derive(Debug, Clone)]
pub struct CombatantView {
    pub name: String,
    pub element: Element,
    pub power: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct RoundView {
    pub player_value: f32,
    pub opponent_value: f32,
    pub winner: Option<BattleSide>,
}

#[derive(Debug, Clone)]
pub struct BattleView {
    pub resolved: bool,
    pub team: Vec<CombatantView>,
    pub opponents: Vec<CombatantView>,
    pub rounds: Vec<RoundView>,
    pub player_score: u8,
    pub opponent_score: u8,
}

#[derive(Debug, Clone)]
pub struct BossView {
    pub title: String,
    pub resolved: bool,
    pub team: Vec<CombatantView>,
    pub opponents: Vec<CombatantView>,
    pub rounds: Vec<RoundView>,
    pub player_score: u8,
    pub opponent_score: u8,
}

/// Wrapper around the ECS world and schedule.
pub struct Game {
    world: World,
    schedule: Schedule,
    seed: u64,
}

impl Game {
    /// Create a fresh game world from a seed and the current wall-clock
    /// seconds.
    pub fn new(seed: u64, now: u64) -> Self {
        let world = create_world(seed, now);
        let schedule = create_schedule();
        Self {
            world,
            schedule,
            seed,
        }
    }

    /// Create a game world with a species catalog override. The builtin boss
    /// rotation is revalidated against it, so an override missing a species
    /// the rotation references is rejected here instead of panicking later.
    pub fn with_catalog(seed: u64, now: u64, catalog: SpeciesCatalog) -> Result<Self, CatalogError> {
        let bosses = BossCatalog::try_builtin(&catalog)?;
        let mut game = Self::new(seed, now);
        game.world.insert_resource(catalog);
        game.world.insert_resource(bosses);
        Ok(game)
    }

    /// Run a simulation tick with the provided intents and return a snapshot
    /// for rendering. State mutated by earlier intents is visible to later
    /// ones within the same tick.
    pub fn tick(&mut self, now: u64, intents: Vec<ActionIntent>) -> Snapshot {
        {
            let mut clock = self.world.resource_mut::<Clock>();
            clock.now = now;
        }
        {
            let mut queue = self.world.resource_mut::<ActionQueue>();
            queue.0 = intents;
        }

        self.schedule.run(&mut self.world);
        Snapshot::capture(&self.world)
    }

    /// Read-only snapshot without advancing the simulation.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.world)
    }

    /// Extract a serializable save state from the current world.
    pub fn save_state(&self) -> SaveState {
        extract_state_from_world(&self.world, self.seed)
    }

    /// Apply a saved state back into the live world.
    pub fn load_state(&mut self, state: SaveState) {
        self.seed = state.seed;
        apply_state_to_world(state, &mut self.world);
    }

    /// Save state directly to a file path.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        save_state_to_path(&self.save_state(), path)
    }

    /// Load state directly from a file path.
    pub fn load_from_path<P: AsRef<Path>>(&mut self, path: P) -> std::io::Result<()> {
        let state = load_state_from_path(path)?;
        self.load_state(state);
        Ok(())
    }
}

impl Snapshot {
    fn capture(world: &World) -> Self {
        let clock = world.resource::<Clock>();
        let catalog = world.resource::<SpeciesCatalog>();
        let profile = world.resource::<PlayerProfile>();
        let collection = world.resource::<CollectionStore>();
        let daily = world.resource::<DailyState>();

        let name_of = |id: SpeciesId| {
            catalog
                .lookup(id)
                .map(|def| def.name.clone())
                .unwrap_or_else(|| format!("creature #{}", id.0))
        };

        let creatures = collection
            .iter()
            .map(|creature| {
                let element = catalog
                    .lookup(creature.species)
                    .map(|def| def.element)
                    .unwrap_or(Element::Arcane);
                CreatureView {
                    id: creature.id,
                    species: creature.species,
                    name: name_of(creature.species),
                    element,
                    rarity: creature.rarity,
                    power: creature.stats.power,
                    guard: creature.stats.guard,
                    speed: creature.stats.speed,
                    wins: creature.wins,
                }
            })
            .collect();

        let challenges = daily
            .challenges
            .iter()
            .map(|c| ChallengeView {
                id: c.id,
                description: c.describe(),
                progress: c.progress,
                target: c.target,
                completed: c.completed,
                claimed: c.claimed,
                reward: c.reward,
            })
            .collect();

        let encounter = world
            .resource::<EncounterState>()
            .batch
            .as_ref()
            .map(|batch| EncounterView {
                cards: batch
                    .cards
                    .iter()
                    .map(|card| CardView {
                        species: card.species,
                        name: name_of(card.species),
                        element: card.element,
                        difficulty: card.difficulty,
                    })
                    .collect(),
                selected: batch.selected,
            });

        let rounds_view = |rounds: &[crate::simulation::battle::RoundOutcome]| {
            rounds
                .iter()
                .map(|r| RoundView {
                    player_value: r.player_value,
                    opponent_value: r.opponent_value,
                    winner: r.winner,
                })
                .collect::<Vec<_>>()
        };

        let battle = world.resource::<BattleState>().session.as_ref().map(|s| {
            BattleView {
                resolved: s.phase == BattlePhase::Resolved,
                team: s
                    .team
                    .iter()
                    .map(|m| CombatantView {
                        name: name_of(m.species),
                        element: m.element,
                        power: m.power,
                    })
                    .collect(),
                opponents: s
                    .opponents
                    .iter()
                    .map(|o| CombatantView {
                        name: name_of(o.species),
                        element: o.element,
                        power: o.power,
                    })
                    .collect(),
                rounds: rounds_view(&s.rounds),
                player_score: s.player_score,
                opponent_score: s.opponent_score,
            }
        });

        let boss = world.resource::<BossState>().encounter.as_ref().map(|e| {
            BossView {
                title: e.title.clone(),
                resolved: e.phase == BattlePhase::Resolved,
                team: e
                    .team
                    .iter()
                    .map(|m| CombatantView {
                        name: name_of(m.species),
                        element: m.element,
                        power: m.power,
                    })
                    .collect(),
                opponents: e
                    .opponents
                    .iter()
                    .map(|o| CombatantView {
                        name: name_of(o.species),
                        element: o.element,
                        power: o.power,
                    })
                    .collect(),
                rounds: rounds_view(&e.rounds),
                player_score: e.player_score,
                opponent_score: e.opponent_score,
            }
        });

        let log = world
            .get_resource::<EngineLog>()
            .map(|log| log.0.clone())
            .unwrap_or_default();

        Snapshot {
            day: day_index(clock.now),
            profile: ProfileView {
                display_name: profile.display_name.clone(),
                currency: profile.currency,
                energy: profile.energy,
                boss_energy: profile.boss_energy,
                wins: profile.wins,
                losses: profile.losses,
                streak: profile.streak,
                streak_claimed: profile.streak_claimed,
            },
            creatures,
            dex: DexView {
                seen: collection.seen().len(),
                caught: collection.caught().len(),
                total: catalog.len(),
            },
            challenges,
            encounter,
            battle,
            boss,
            log,
        }
    }
}
