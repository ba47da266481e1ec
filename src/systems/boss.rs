use bevy_ecs::prelude::*;

use crate::core::rng::EngineRng;
use crate::core::world::{ActionIntent, ActionQueue, EngineLog};
use crate::data::bosses::BossCatalog;
use crate::data::species::SpeciesCatalog;
use crate::simulation::battle::{BattleSide, BattleTuning};
use crate::simulation::boss::{
    cancel_boss, end_boss, resolve_boss, start_boss, BossState,
};
use crate::simulation::collection::CollectionStore;
use crate::simulation::daily::{update_challenge_progress, DailyState, ProgressSignal};
use crate::simulation::profile::PlayerProfile;
use crate::simulation::time::Clock;

/// System: resolves boss encounter intents.
pub fn boss_system(
    intents: Res<ActionQueue>,
    clock: Res<Clock>,
    catalog: Res<SpeciesCatalog>,
    bosses: Res<BossCatalog>,
    tuning: Res<BattleTuning>,
    mut state: ResMut<BossState>,
    mut collection: ResMut<CollectionStore>,
    mut profile: ResMut<PlayerProfile>,
    mut daily: ResMut<DailyState>,
    mut rng: ResMut<EngineRng>,
    mut log: ResMut<EngineLog>,
) {
    for intent in intents.0.iter() {
        match intent {
            ActionIntent::StartBossEncounter { team } => {
                match start_boss(
                    &mut state,
                    &mut profile,
                    &collection,
                    &catalog,
                    &bosses,
                    clock.now,
                    team,
                ) {
                    Ok(true) => {
                        let encounter = state.encounter.as_ref().expect("just started");
                        log.0
                            .push(format!("{} blocks your path!", encounter.title));
                    }
                    Ok(false) => {
                        log.0.push(
                            "The boss will not face you: you need boss energy and a team of 3."
                                .to_string(),
                        );
                    }
                    Err(err) => {
                        log::error!("boss start failed: {}", err);
                        log.0
                            .push("Something went wrong approaching the boss.".to_string());
                    }
                }
            }
            ActionIntent::ResolveBossEncounter => {
                if resolve_boss(&mut state, &tuning, &mut rng.0) {
                    let encounter = state.encounter.as_ref().expect("just resolved");
                    for (i, round) in encounter.rounds.iter().enumerate() {
                        log.0.push(match round.winner {
                            Some(BattleSide::Player) => format!("Round {}: you win.", i + 1),
                            Some(BattleSide::Opponent) => {
                                format!("Round {}: the boss wins.", i + 1)
                            }
                            None => format!("Round {}: a draw.", i + 1),
                        });
                    }
                    log.0.push(format!(
                        "Final score {} - {}.",
                        encounter.player_score, encounter.opponent_score
                    ));
                } else {
                    log.0
                        .push("There is no boss fight waiting to resolve.".to_string());
                }
            }
            ActionIntent::EndBossEncounter => {
                match end_boss(&mut state, &mut collection, &catalog, &mut profile, &mut rng.0) {
                    Ok(Some(reward)) if reward.won => {
                        update_challenge_progress(&mut daily, ProgressSignal::WinBattle, 1);
                        let mut line = format!("The boss falls! +{} coins", reward.currency);
                        if reward.first_clear {
                            line.push_str(" (first clear)");
                        }
                        line.push('.');
                        log.0.push(line);
                        if reward.minted.is_some() {
                            log.0
                                .push("A rare creature joins your collection.".to_string());
                        }
                    }
                    Ok(Some(reward)) => {
                        log.0.push(format!(
                            "The boss stands. +{} coins for the attempt.",
                            reward.currency
                        ));
                    }
                    Ok(None) => {
                        log.0
                            .push("There is no finished boss fight to leave.".to_string());
                    }
                    Err(err) => {
                        log::error!("boss payout failed: {}", err);
                        log.0
                            .push("Something went wrong claiming the boss reward.".to_string());
                    }
                }
            }
            ActionIntent::CancelBossEncounter => {
                if cancel_boss(&mut state) {
                    log.0.push("You retreat from the boss.".to_string());
                }
            }
            _ => {}
        }
    }
}
