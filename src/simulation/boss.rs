//! Scripted daily boss encounters.
//!
//! Same round algorithm as regular battles, but the opponent team and reward
//! schedule are deterministic functions of the calendar day, entry burns the
//! single daily boss-energy unit, and a win mints a scripted reward creature.

use bevy_ecs::prelude::Resource;

use crate::core::rng::hash_seed;
use crate::data::bosses::{BossCatalog, BossDef};
use crate::data::species::{CatalogError, Rarity, SpeciesCatalog, SpeciesId};
use crate::simulation::battle::{
    resolve_rounds, snapshot_team, BattlePhase, BattleTuning, GeneratedCreature, RoundOutcome,
    TeamMember,
};
use crate::simulation::collection::{roll_stats, CollectionStore, InstanceId};
use crate::simulation::ledger::{credit_currency, spend_boss_energy};
use crate::simulation::profile::PlayerProfile;
use crate::simulation::time::day_index;

/// Paid once, the first time a given boss is beaten.
pub const FIRST_CLEAR_BONUS: u32 = 50;
pub const BOSS_CONSOLATION: u32 = 20;

#[derive(Debug, Clone)]
pub struct BossEncounter {
    /// Signature species, the first-clear key.
    pub boss_species: SpeciesId,
    pub title: String,
    pub day: u64,
    pub currency_reward: u32,
    pub reward_species: SpeciesId,
    pub reward_rarity: Rarity,
    pub phase: BattlePhase,
    pub team: Vec<TeamMember>,
    pub opponents: Vec<GeneratedCreature>,
    pub rounds: Vec<RoundOutcome>,
    pub player_score: u8,
    pub opponent_score: u8,
}

impl BossEncounter {
    pub fn player_won(&self) -> bool {
        self.phase == BattlePhase::Resolved && self.player_score > self.opponent_score
    }
}

/// The at-most-one live boss encounter. Never persisted.
#[derive(Resource, Debug, Default, Clone)]
pub struct BossState {
    pub encounter: Option<BossEncounter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BossReward {
    pub won: bool,
    pub currency: u32,
    pub first_clear: bool,
    pub minted: Option<InstanceId>,
}

/// Roll the boss team from a day-keyed stream: the same calendar day always
/// fields the same creatures, regardless of what else the player rolled.
pub fn generate_boss_team(
    def: &BossDef,
    catalog: &SpeciesCatalog,
    day: u64,
) -> Result<Vec<GeneratedCreature>, CatalogError> {
    let mut rng = hash_seed("boss_team") ^ day;
    let mut team = Vec::with_capacity(def.team.len());
    for slot in &def.team {
        let species = catalog.get(slot.species)?;
        let stats = roll_stats(species, slot.rarity, &mut rng);
        team.push(GeneratedCreature {
            species: species.id,
            element: species.element,
            rarity: slot.rarity,
            power: stats.power,
        });
    }
    Ok(team)
}

/// Start today's boss encounter. The team is validated before the energy
/// check so a malformed team costs nothing; once started, the energy is gone
/// even if the encounter is cancelled.
pub fn start_boss(
    state: &mut BossState,
    profile: &mut PlayerProfile,
    collection: &CollectionStore,
    catalog: &SpeciesCatalog,
    bosses: &BossCatalog,
    now: u64,
    team: &[InstanceId],
) -> Result<bool, CatalogError> {
    if state.encounter.is_some() {
        return Ok(false);
    }
    let members = match snapshot_team(collection, catalog, team)? {
        Some(members) => members,
        None => return Ok(false),
    };
    if !spend_boss_energy(profile) {
        return Ok(false);
    }
    let day = day_index(now);
    let def = bosses.boss_for_day(day);
    let opponents = generate_boss_team(def, catalog, day)?;
    state.encounter = Some(BossEncounter {
        boss_species: def.species,
        title: def.title.clone(),
        day,
        currency_reward: def.currency_reward,
        reward_species: def.reward_species,
        reward_rarity: def.reward_rarity,
        phase: BattlePhase::Selecting,
        team: members,
        opponents,
        rounds: Vec::new(),
        player_score: 0,
        opponent_score: 0,
    });
    Ok(true)
}

pub fn resolve_boss(state: &mut BossState, tuning: &BattleTuning, rng: &mut u64) -> bool {
    let encounter = match state.encounter.as_mut() {
        Some(encounter) if encounter.phase == BattlePhase::Selecting => encounter,
        _ => return false,
    };
    let (rounds, player_score, opponent_score) =
        resolve_rounds(&encounter.team, &encounter.opponents, tuning, rng);
    encounter.rounds = rounds;
    encounter.player_score = player_score;
    encounter.opponent_score = opponent_score;
    encounter.phase = BattlePhase::Resolved;
    true
}

/// Pay out a resolved encounter and tear it down. A win pays the boss's
/// configured reward, the one-time first-clear bonus, and mints the reward
/// creature; a loss pays the flat consolation.
pub fn end_boss(
    state: &mut BossState,
    collection: &mut CollectionStore,
    catalog: &SpeciesCatalog,
    profile: &mut PlayerProfile,
    rng: &mut u64,
) -> Result<Option<BossReward>, CatalogError> {
    if !matches!(state.encounter.as_ref(), Some(e) if e.phase == BattlePhase::Resolved) {
        return Ok(None);
    }
    let encounter = state.encounter.take().expect("checked above");
    if !encounter.player_won() {
        profile.losses += 1;
        credit_currency(profile, BOSS_CONSOLATION);
        return Ok(Some(BossReward {
            won: false,
            currency: BOSS_CONSOLATION,
            first_clear: false,
            minted: None,
        }));
    }

    profile.wins += 1;
    for member in &encounter.team {
        if let Some(creature) = collection.get_mut(member.id) {
            creature.wins += 1;
        }
    }
    let first_clear = profile.bosses_cleared.insert(encounter.boss_species);
    let mut currency = encounter.currency_reward;
    if first_clear {
        currency += FIRST_CLEAR_BONUS;
    }
    credit_currency(profile, currency);

    let reward_def = catalog.get(encounter.reward_species)?;
    let minted = collection.mint(reward_def, encounter.reward_rarity, rng);
    Ok(Some(BossReward {
        won: true,
        currency,
        first_clear,
        minted: Some(minted),
    }))
}

/// Discard a started encounter. The consumed boss energy stays consumed.
pub fn cancel_boss(state: &mut BossState) -> bool {
    state.encounter.take().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::hash_seed;
    use crate::data::species::Element;
    use crate::simulation::profile::BOSS_ENERGY_CAP;

    fn setup() -> (
        BossState,
        PlayerProfile,
        CollectionStore,
        SpeciesCatalog,
        BossCatalog,
        u64,
    ) {
        let catalog = SpeciesCatalog::builtin();
        let bosses = BossCatalog::builtin(&catalog);
        (
            BossState::default(),
            PlayerProfile::new(0),
            CollectionStore::default(),
            catalog,
            bosses,
            hash_seed("boss_tests"),
        )
    }

    fn team_of_three(
        collection: &mut CollectionStore,
        catalog: &SpeciesCatalog,
        rng: &mut u64,
    ) -> Vec<InstanceId> {
        let species = catalog.get(SpeciesId(1)).unwrap();
        (0..3)
            .map(|_| collection.mint(species, Rarity::Common, rng))
            .collect()
    }

    #[test]
    fn boss_team_is_deterministic_per_day() {
        let catalog = SpeciesCatalog::builtin();
        let bosses = BossCatalog::builtin(&catalog);
        let def = bosses.boss_for_day(12);
        let a = generate_boss_team(def, &catalog, 12).unwrap();
        let b = generate_boss_team(def, &catalog, 12).unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.species, y.species);
            assert_eq!(x.power, y.power);
        }
    }

    #[test]
    fn start_consumes_energy_but_invalid_team_is_free() {
        let (mut state, mut profile, mut collection, catalog, bosses, mut rng) = setup();
        let team = team_of_three(&mut collection, &catalog, &mut rng);

        // Invalid team: rejected with energy intact.
        assert!(!start_boss(
            &mut state, &mut profile, &collection, &catalog, &bosses, 0, &team[..2]
        )
        .unwrap());
        assert_eq!(profile.boss_energy, BOSS_ENERGY_CAP);

        assert!(start_boss(
            &mut state, &mut profile, &collection, &catalog, &bosses, 0, &team
        )
        .unwrap());
        assert_eq!(profile.boss_energy, 0);

        // Cancel does not refund.
        assert!(cancel_boss(&mut state));
        assert_eq!(profile.boss_energy, 0);
        assert!(!start_boss(
            &mut state, &mut profile, &collection, &catalog, &bosses, 0, &team
        )
        .unwrap());
    }

    fn forced_encounter(
        collection: &mut CollectionStore,
        catalog: &SpeciesCatalog,
        bosses: &BossCatalog,
        rng: &mut u64,
        player_power: u32,
    ) -> BossState {
        let team: Vec<_> = team_of_three(collection, catalog, rng)
            .into_iter()
            .map(|id| TeamMember {
                id,
                species: SpeciesId(1),
                element: Element::Arcane,
                power: player_power,
            })
            .collect();
        let def = bosses.boss_for_day(0);
        BossState {
            encounter: Some(BossEncounter {
                boss_species: def.species,
                title: def.title.clone(),
                day: 0,
                currency_reward: def.currency_reward,
                reward_species: def.reward_species,
                reward_rarity: def.reward_rarity,
                phase: BattlePhase::Selecting,
                team,
                opponents: generate_boss_team(def, catalog, 0).unwrap(),
                rounds: Vec::new(),
                player_score: 0,
                opponent_score: 0,
            }),
        }
    }

    #[test]
    fn first_clear_bonus_is_paid_exactly_once() {
        let (_, mut profile, mut collection, catalog, bosses, mut rng) = setup();
        let tuning = BattleTuning::default();

        let mut state =
            forced_encounter(&mut collection, &catalog, &bosses, &mut rng, 10_000);
        assert!(resolve_boss(&mut state, &tuning, &mut rng));
        let reward = end_boss(&mut state, &mut collection, &catalog, &mut profile, &mut rng)
            .unwrap()
            .unwrap();
        assert!(reward.won);
        assert!(reward.first_clear);
        let boss_reward = bosses.boss_for_day(0).currency_reward;
        assert_eq!(reward.currency, boss_reward + FIRST_CLEAR_BONUS);
        assert!(reward.minted.is_some());

        // Second clear of the same boss: no bonus.
        let mut state =
            forced_encounter(&mut collection, &catalog, &bosses, &mut rng, 10_000);
        assert!(resolve_boss(&mut state, &tuning, &mut rng));
        let reward = end_boss(&mut state, &mut collection, &catalog, &mut profile, &mut rng)
            .unwrap()
            .unwrap();
        assert!(!reward.first_clear);
        assert_eq!(reward.currency, boss_reward);
    }

    #[test]
    fn loss_pays_flat_consolation_and_mints_nothing() {
        let (_, mut profile, mut collection, catalog, bosses, mut rng) = setup();
        let tuning = BattleTuning::default();
        let before_len = |c: &CollectionStore| c.len();

        let mut state = forced_encounter(&mut collection, &catalog, &bosses, &mut rng, 1);
        let owned = before_len(&collection);
        assert!(resolve_boss(&mut state, &tuning, &mut rng));
        let reward = end_boss(&mut state, &mut collection, &catalog, &mut profile, &mut rng)
            .unwrap()
            .unwrap();
        assert!(!reward.won);
        assert_eq!(reward.currency, BOSS_CONSOLATION);
        assert!(reward.minted.is_none());
        assert_eq!(collection.len(), owned);
        assert_eq!(profile.losses, 1);
        assert!(profile.bosses_cleared.is_empty());
    }
}
