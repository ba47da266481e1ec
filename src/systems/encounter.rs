use bevy_ecs::prelude::*;

use crate::core::rng::EngineRng;
use crate::core::world::{ActionIntent, ActionQueue, EngineLog};
use crate::data::species::{SpeciesCatalog, SpeciesId};
use crate::simulation::collection::{release, CollectionStore};
use crate::simulation::daily::{update_challenge_progress, DailyState, ProgressSignal};
use crate::simulation::encounter::{
    cancel_encounter, resolve_catch, select_candidate, start_encounter, CatchResolution,
    EncounterState,
};
use crate::simulation::profile::PlayerProfile;
use crate::simulation::time::Clock;

/// System: resolves encounter, catch, and release intents.
pub fn encounter_system(
    intents: Res<ActionQueue>,
    clock: Res<Clock>,
    catalog: Res<SpeciesCatalog>,
    mut state: ResMut<EncounterState>,
    mut profile: ResMut<PlayerProfile>,
    mut collection: ResMut<CollectionStore>,
    mut daily: ResMut<DailyState>,
    mut rng: ResMut<EngineRng>,
    mut log: ResMut<EngineLog>,
) {
    for intent in intents.0.iter() {
        match intent {
            ActionIntent::StartEncounter => {
                if start_encounter(
                    &mut state,
                    &mut profile,
                    &mut collection,
                    &catalog,
                    &mut rng.0,
                    clock.now,
                ) {
                    let batch = state.batch.as_ref().expect("just started");
                    log.0.push(format!(
                        "Three wild creatures appear: {}.",
                        batch
                            .cards
                            .iter()
                            .map(|card| species_name(&catalog, card.species))
                            .collect::<Vec<_>>()
                            .join(", ")
                    ));
                } else if state.batch.is_some() {
                    log.0
                        .push("An encounter is already underway.".to_string());
                } else {
                    log.0.push("Not enough energy to explore.".to_string());
                }
            }
            ActionIntent::SelectCandidate { index } => {
                if select_candidate(&mut state, *index) {
                    let batch = state.batch.as_ref().expect("selection implies a batch");
                    let card = batch.cards[*index];
                    log.0.push(format!(
                        "You approach the wild {}.",
                        species_name(&catalog, card.species)
                    ));
                } else {
                    log.0.push("That creature cannot be approached.".to_string());
                }
            }
            ActionIntent::ResolveCatch { success, score } => {
                if let Some(score) = score {
                    log::debug!("minigame reported score {}", score);
                }
                match resolve_catch(&mut state, &mut collection, &catalog, &mut rng.0, *success) {
                    Ok(CatchResolution::NoSelection) => {
                        log.0.push("There is nothing to catch.".to_string());
                    }
                    Ok(CatchResolution::Escaped { species, .. }) => {
                        update_challenge_progress(&mut daily, ProgressSignal::Minigame, 1);
                        log.0.push(format!(
                            "The wild {} escaped.",
                            species_name(&catalog, species)
                        ));
                    }
                    Ok(CatchResolution::Caught {
                        species,
                        element,
                        rarity,
                        ..
                    }) => {
                        update_challenge_progress(&mut daily, ProgressSignal::Minigame, 1);
                        update_challenge_progress(&mut daily, ProgressSignal::Catch, 1);
                        update_challenge_progress(
                            &mut daily,
                            ProgressSignal::CatchElement(element),
                            1,
                        );
                        log.0.push(format!(
                            "Caught a {} {}!",
                            rarity,
                            species_name(&catalog, species)
                        ));
                    }
                    Err(err) => {
                        log::error!("catch resolution failed: {}", err);
                        log.0.push("Something went wrong with the catch.".to_string());
                    }
                }
            }
            ActionIntent::CancelEncounter => {
                if cancel_encounter(&mut state) {
                    log.0.push("You back away from the encounter.".to_string());
                }
            }
            ActionIntent::Release { id } => match release(&mut collection, &mut profile, *id) {
                Some((rarity, refund)) => log.0.push(format!(
                    "Released a {} creature for {} coins.",
                    rarity, refund
                )),
                None => log.0.push("No such creature to release.".to_string()),
            },
            _ => {}
        }
    }
}

fn species_name(catalog: &SpeciesCatalog, id: SpeciesId) -> String {
    catalog
        .lookup(id)
        .map(|def| def.name.clone())
        .unwrap_or_else(|| format!("creature #{}", id.0))
}
