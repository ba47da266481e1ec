//! Turn-based elemental battle resolution.
//!
//! A session pairs a snapshot of 3 owned instances against 3 freshly
//! generated opponents and resolves 3 rounds of jittered effective power.
//! Boss encounters reuse the round algorithm with their own team rules.

use bevy_ecs::prelude::Resource;

use crate::core::rng::{roll_f32, roll_index};
use crate::data::species::{CatalogError, Element, Rarity, SpeciesCatalog, SpeciesId};
use crate::simulation::collection::{roll_stats, CollectionStore, InstanceId};
use crate::simulation::encounter::roll_catch_rarity;
use crate::simulation::ledger::credit_currency;
use crate::simulation::profile::PlayerProfile;

pub const WIN_REWARD: u32 = 25;
pub const CONSOLATION_REWARD: u32 = 5;

/// Numeric knobs for round resolution. The disadvantage multiplier is kept
/// as a table entry but currently neutral.
#[derive(Resource, Debug, Clone)]
pub struct BattleTuning {
    pub advantage_mult: f32,
    pub disadvantage_mult: f32,
    pub jitter_min: f32,
    pub jitter_max: f32,
    pub tie_margin: f32,
    /// How far generated opponent power is pulled toward the player average.
    pub normalize_blend: f32,
}

impl Default for BattleTuning {
    fn default() -> Self {
        Self {
            advantage_mult: 1.25,
            disadvantage_mult: 1.0,
            jitter_min: 0.9,
            jitter_max: 1.1,
            tie_margin: 5.0,
            normalize_blend: 0.4,
        }
    }
}

/// The fixed element wheel: fire > air > earth > water > fire, light and
/// void counter each other, arcane sits outside the wheel entirely.
pub fn has_advantage(attacker: Element, defender: Element) -> bool {
    matches!(
        (attacker, defender),
        (Element::Fire, Element::Air)
            | (Element::Air, Element::Earth)
            | (Element::Earth, Element::Water)
            | (Element::Water, Element::Fire)
            | (Element::Light, Element::Void)
            | (Element::Void, Element::Light)
    )
}

pub fn element_multiplier(tuning: &BattleTuning, attacker: Element, defender: Element) -> f32 {
    if has_advantage(attacker, defender) {
        tuning.advantage_mult
    } else if has_advantage(defender, attacker) {
        tuning.disadvantage_mult
    } else {
        1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattlePhase {
    Selecting,
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleSide {
    Player,
    Opponent,
}

/// Stats snapshot of an owned team member, taken at session start so a
/// mid-session release cannot corrupt resolution.
#[derive(Debug, Clone, Copy)]
pub struct TeamMember {
    pub id: InstanceId,
    pub species: SpeciesId,
    pub element: Element,
    pub power: u32,
}

/// A generated, non-owned opposing creature.
#[derive(Debug, Clone, Copy)]
pub struct GeneratedCreature {
    pub species: SpeciesId,
    pub element: Element,
    pub rarity: Rarity,
    pub power: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct RoundOutcome {
    pub player_value: f32,
    pub opponent_value: f32,
    pub winner: Option<BattleSide>,
}

#[derive(Debug, Clone)]
pub struct BattleSession {
    pub phase: BattlePhase,
    pub team: Vec<TeamMember>,
    pub opponents: Vec<GeneratedCreature>,
    pub rounds: Vec<RoundOutcome>,
    pub player_score: u8,
    pub opponent_score: u8,
}

impl BattleSession {
    /// Only a strict round majority is a win; a drawn score is a non-win.
    pub fn player_won(&self) -> bool {
        self.phase == BattlePhase::Resolved && self.player_score > self.opponent_score
    }
}

/// The at-most-one live battle. Never persisted.
#[derive(Resource, Debug, Default, Clone)]
pub struct BattleState {
    pub session: Option<BattleSession>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleReward {
    pub won: bool,
    pub currency: u32,
}

/// Snapshot a valid 3-member team from the collection, or `None` when the
/// slice is not exactly 3 distinct owned instances.
pub fn snapshot_team(
    collection: &CollectionStore,
    catalog: &SpeciesCatalog,
    team: &[InstanceId],
) -> Result<Option<Vec<TeamMember>>, CatalogError> {
    if !collection.owns_distinct_team(team) {
        return Ok(None);
    }
    let mut members = Vec::with_capacity(team.len());
    for id in team {
        let creature = collection.get(*id).expect("validated above");
        let def = catalog.get(creature.species)?;
        members.push(TeamMember {
            id: creature.id,
            species: creature.species,
            element: def.element,
            power: creature.stats.power,
        });
    }
    Ok(Some(members))
}

/// Generate 3 opposing creatures with rolled species/rarity/stats, each
/// power-rescaled toward the player average by the configured blend so every
/// team faces comparable resistance.
pub fn generate_opponents(
    catalog: &SpeciesCatalog,
    player_avg_power: f32,
    blend: f32,
    rng: &mut u64,
) -> Vec<GeneratedCreature> {
    let pool: Vec<_> = catalog.iter().collect();
    (0..3)
        .map(|_| {
            let def = pool[roll_index(rng, pool.len())];
            let rarity = roll_catch_rarity(rng);
            let rolled = roll_stats(def, rarity, rng).power.max(1);
            let factor = player_avg_power / rolled as f32;
            let mult = 1.0 + blend * (factor - 1.0);
            GeneratedCreature {
                species: def.id,
                element: def.element,
                rarity,
                power: ((rolled as f32 * mult).round() as u32).max(1),
            }
        })
        .collect()
}

/// Start a session against a generated, power-normalized opponent team.
/// Rejected (no session created) for an invalid team or while one is live.
pub fn start_battle(
    state: &mut BattleState,
    collection: &CollectionStore,
    catalog: &SpeciesCatalog,
    tuning: &BattleTuning,
    rng: &mut u64,
    team: &[InstanceId],
) -> Result<bool, CatalogError> {
    if state.session.is_some() {
        return Ok(false);
    }
    let members = match snapshot_team(collection, catalog, team)? {
        Some(members) => members,
        None => return Ok(false),
    };
    let avg_power =
        members.iter().map(|m| m.power).sum::<u32>() as f32 / members.len() as f32;
    let opponents = generate_opponents(catalog, avg_power, tuning.normalize_blend, rng);
    state.session = Some(BattleSession {
        phase: BattlePhase::Selecting,
        team: members,
        opponents,
        rounds: Vec::new(),
        player_score: 0,
        opponent_score: 0,
    });
    Ok(true)
}

/// Resolve the 3 paired rounds. Shared by regular battles and bosses.
pub fn resolve_rounds(
    team: &[TeamMember],
    opponents: &[GeneratedCreature],
    tuning: &BattleTuning,
    rng: &mut u64,
) -> (Vec<RoundOutcome>, u8, u8) {
    let mut rounds = Vec::with_capacity(team.len());
    let mut player_score = 0;
    let mut opponent_score = 0;
    for (member, opponent) in team.iter().zip(opponents.iter()) {
        let player_value = member.power as f32
            * element_multiplier(tuning, member.element, opponent.element)
            * roll_f32(rng, tuning.jitter_min, tuning.jitter_max);
        let opponent_value = opponent.power as f32
            * element_multiplier(tuning, opponent.element, member.element)
            * roll_f32(rng, tuning.jitter_min, tuning.jitter_max);
        let winner = if (player_value - opponent_value).abs() < tuning.tie_margin {
            None
        } else if player_value > opponent_value {
            player_score += 1;
            Some(BattleSide::Player)
        } else {
            opponent_score += 1;
            Some(BattleSide::Opponent)
        };
        rounds.push(RoundOutcome {
            player_value,
            opponent_value,
            winner,
        });
    }
    (rounds, player_score, opponent_score)
}

/// Transition `selecting -> resolved`. False when no session is in the
/// selecting phase.
pub fn resolve_battle(state: &mut BattleState, tuning: &BattleTuning, rng: &mut u64) -> bool {
    let session = match state.session.as_mut() {
        Some(session) if session.phase == BattlePhase::Selecting => session,
        _ => return false,
    };
    let (rounds, player_score, opponent_score) =
        resolve_rounds(&session.team, &session.opponents, tuning, rng);
    session.rounds = rounds;
    session.player_score = player_score;
    session.opponent_score = opponent_score;
    session.phase = BattlePhase::Resolved;
    true
}

/// Pay rewards for a resolved session and tear it down. A win pays 25 and
/// bumps the win counters of the profile and each surviving participant; any
/// other outcome pays the 5-currency consolation.
pub fn end_battle(
    state: &mut BattleState,
    collection: &mut CollectionStore,
    profile: &mut PlayerProfile,
) -> Option<BattleReward> {
    if !matches!(state.session.as_ref(), Some(s) if s.phase == BattlePhase::Resolved) {
        return None;
    }
    let session = state.session.take()?;
    let won = session.player_won();
    let currency = if won {
        profile.wins += 1;
        for member in &session.team {
            if let Some(creature) = collection.get_mut(member.id) {
                creature.wins += 1;
            }
        }
        WIN_REWARD
    } else {
        profile.losses += 1;
        CONSOLATION_REWARD
    };
    credit_currency(profile, currency);
    Some(BattleReward { won, currency })
}

/// Discard any session, resolved or not, with no reward.
pub fn cancel_battle(state: &mut BattleState) -> bool {
    state.session.take().is_some()
}
