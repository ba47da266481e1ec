use bevy_ecs::prelude::*;

use crate::core::rng::EngineRng;
use crate::core::world::{ActionIntent, ActionQueue, EngineLog};
use crate::data::species::SpeciesCatalog;
use crate::simulation::battle::{
    cancel_battle, end_battle, resolve_battle, start_battle, BattleSide, BattleState, BattleTuning,
};
use crate::simulation::collection::CollectionStore;
use crate::simulation::daily::{update_challenge_progress, DailyState, ProgressSignal};
use crate::simulation::profile::PlayerProfile;

/// System: resolves regular battle intents.
pub fn battle_system(
    intents: Res<ActionQueue>,
    catalog: Res<SpeciesCatalog>,
    tuning: Res<BattleTuning>,
    mut state: ResMut<BattleState>,
    mut collection: ResMut<CollectionStore>,
    mut profile: ResMut<PlayerProfile>,
    mut daily: ResMut<DailyState>,
    mut rng: ResMut<EngineRng>,
    mut log: ResMut<EngineLog>,
) {
    for intent in intents.0.iter() {
        match intent {
            ActionIntent::StartBattle { team } => {
                match start_battle(
                    &mut state,
                    &collection,
                    &catalog,
                    &tuning,
                    &mut rng.0,
                    team,
                ) {
                    Ok(true) => {
                        let session = state.session.as_ref().expect("just started");
                        log.0.push(format!(
                            "A rival team challenges you: {}.",
                            session
                                .opponents
                                .iter()
                                .map(|o| {
                                    catalog
                                        .lookup(o.species)
                                        .map(|def| def.name.clone())
                                        .unwrap_or_else(|| format!("creature #{}", o.species.0))
                                })
                                .collect::<Vec<_>>()
                                .join(", ")
                        ));
                    }
                    Ok(false) => {
                        log.0.push(
                            "The battle could not start: pick 3 distinct creatures you own."
                                .to_string(),
                        );
                    }
                    Err(err) => {
                        log::error!("battle start failed: {}", err);
                        log.0.push("Something went wrong starting the battle.".to_string());
                    }
                }
            }
            ActionIntent::ResolveBattle => {
                if resolve_battle(&mut state, &tuning, &mut rng.0) {
                    let session = state.session.as_ref().expect("just resolved");
                    for (i, round) in session.rounds.iter().enumerate() {
                        log.0.push(match round.winner {
                            Some(BattleSide::Player) => format!("Round {}: you win.", i + 1),
                            Some(BattleSide::Opponent) => {
                                format!("Round {}: the rival wins.", i + 1)
                            }
                            None => format!("Round {}: a draw.", i + 1),
                        });
                    }
                    log.0.push(format!(
                        "Final score {} - {}.",
                        session.player_score, session.opponent_score
                    ));
                } else {
                    log.0.push("There is no battle waiting to resolve.".to_string());
                }
            }
            ActionIntent::EndBattle => {
                match end_battle(&mut state, &mut collection, &mut profile) {
                    Some(reward) if reward.won => {
                        update_challenge_progress(&mut daily, ProgressSignal::WinBattle, 1);
                        log.0
                            .push(format!("Victory! +{} coins.", reward.currency));
                    }
                    Some(reward) => {
                        log.0
                            .push(format!("Defeat. +{} coins for the effort.", reward.currency));
                    }
                    None => {
                        log.0.push("There is no finished battle to leave.".to_string());
                    }
                }
            }
            ActionIntent::CancelBattle => {
                if cancel_battle(&mut state) {
                    log.0.push("You withdraw from the battle.".to_string());
                }
            }
            _ => {}
        }
    }
}
