//! Encounter batches and catch resolution.
//!
//! One unit of encounter energy buys a batch of exactly 3 candidate cards.
//! The skill minigame that decides the catch lives outside the engine; it
//! reports back only a success flag (and an ignored performance score).

use bevy_ecs::prelude::Resource;

use crate::core::rng::{roll_f32, roll_index, roll_percent};
use crate::data::species::{CatalogError, Element, Rarity, SpeciesCatalog, SpeciesId};
use crate::simulation::collection::{CollectionStore, InstanceId};
use crate::simulation::ledger::spend_energy;
use crate::simulation::profile::PlayerProfile;

/// Chance a candidate draw comes from the base evolution tier.
const BASE_TIER_PERCENT: u32 = 70;

pub const BATCH_SIZE: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct EncounterCard {
    pub species: SpeciesId,
    pub element: Element,
    /// Hint for the minigame overlay; the engine never validates against it.
    pub difficulty: f32,
}

#[derive(Debug, Clone)]
pub struct EncounterBatch {
    pub cards: Vec<EncounterCard>,
    pub selected: Option<usize>,
}

/// The at-most-one live encounter. Never persisted.
#[derive(Resource, Debug, Default, Clone)]
pub struct EncounterState {
    pub batch: Option<EncounterBatch>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatchResolution {
    /// No selected card was active; nothing happened, nothing is reported.
    NoSelection,
    /// The minigame failed; the card is discarded.
    Escaped { species: SpeciesId, element: Element },
    /// A new instance joined the collection.
    Caught {
        id: InstanceId,
        species: SpeciesId,
        element: Element,
        rarity: Rarity,
    },
}

/// Rarity distribution for a raw catch: common 60, rare 25, epic 12,
/// legendary 3.
pub fn roll_catch_rarity(rng: &mut u64) -> Rarity {
    let roll = (crate::core::rng::next_u64(rng) % 100) + 1;
    match roll {
        1..=60 => Rarity::Common,
        61..=85 => Rarity::Rare,
        86..=97 => Rarity::Epic,
        _ => Rarity::Legendary,
    }
}

/// Spend one energy unit and draw a fresh batch, marking all candidates as
/// seen. Refused (false, nothing spent) while a batch is already live, and
/// failed (false) when no energy is available after reconciliation.
pub fn start_encounter(
    state: &mut EncounterState,
    profile: &mut PlayerProfile,
    collection: &mut CollectionStore,
    catalog: &SpeciesCatalog,
    rng: &mut u64,
    now: u64,
) -> bool {
    if state.batch.is_some() {
        return false;
    }
    if !spend_energy(profile, now) {
        return false;
    }
    let batch = draw_batch(catalog, rng);
    for card in &batch.cards {
        collection.mark_seen(card.species);
    }
    state.batch = Some(batch);
    true
}

/// Narrow the batch to one chosen card; the other two are forgotten.
pub fn select_candidate(state: &mut EncounterState, index: usize) -> bool {
    match state.batch.as_mut() {
        Some(batch) if index < batch.cards.len() && batch.selected.is_none() => {
            batch.selected = Some(index);
            true
        }
        _ => false,
    }
}

/// Consume the selected card with the collaborator's outcome. The optional
/// performance score is accepted but does not modulate the roll.
pub fn resolve_catch(
    state: &mut EncounterState,
    collection: &mut CollectionStore,
    catalog: &SpeciesCatalog,
    rng: &mut u64,
    success: bool,
) -> Result<CatchResolution, CatalogError> {
    let selected = match state.batch.as_ref().and_then(|b| b.selected) {
        Some(index) => index,
        None => return Ok(CatchResolution::NoSelection),
    };
    let batch = state.batch.take().expect("selection implies a live batch");
    let card = batch.cards[selected];

    if !success {
        return Ok(CatchResolution::Escaped {
            species: card.species,
            element: card.element,
        });
    }

    let species = catalog.get(card.species)?;
    let rarity = roll_catch_rarity(rng);
    let id = collection.mint(species, rarity, rng);
    Ok(CatchResolution::Caught {
        id,
        species: species.id,
        element: species.element,
        rarity,
    })
}

/// Discard a live batch. Energy already spent is not refunded.
pub fn cancel_encounter(state: &mut EncounterState) -> bool {
    state.batch.take().is_some()
}

fn draw_batch(catalog: &SpeciesCatalog, rng: &mut u64) -> EncounterBatch {
    let base = catalog.base_tier();
    let evolved = catalog.evolved_tier();
    let cards = (0..BATCH_SIZE)
        .map(|_| {
            let pool = if evolved.is_empty() || (!base.is_empty() && roll_percent(rng, BASE_TIER_PERCENT))
            {
                &base
            } else {
                &evolved
            };
            let def = pool[roll_index(rng, pool.len())];
            let difficulty = catch_difficulty(def.is_evolved(), rng);
            EncounterCard {
                species: def.id,
                element: def.element,
                difficulty,
            }
        })
        .collect();
    EncounterBatch {
        cards,
        selected: None,
    }
}

fn catch_difficulty(evolved: bool, rng: &mut u64) -> f32 {
    let base = if evolved { 0.55 } else { 0.35 };
    (base + roll_f32(rng, 0.0, 0.15)).min(0.95)
}
