use bevy_ecs::prelude::*;

use crate::core::rng::EngineRng;
use crate::core::world::{ActionIntent, ActionQueue, EngineLog};
use crate::simulation::daily::{
    claim_all_challenge_rewards, claim_challenge_reward, claim_streak_reward, ensure_daily_cycle,
    DailyState,
};
use crate::simulation::ledger::reconcile_energy;
use crate::simulation::profile::PlayerProfile;
use crate::simulation::time::Clock;

/// System: runs ahead of every action tick. Clears the per-tick log, rolls
/// the calendar forward if a day boundary was crossed, and applies pending
/// energy regeneration.
pub fn daily_cycle_system(
    clock: Res<Clock>,
    mut profile: ResMut<PlayerProfile>,
    mut daily: ResMut<DailyState>,
    mut rng: ResMut<EngineRng>,
    mut log: ResMut<EngineLog>,
) {
    log.0.clear();

    if ensure_daily_cycle(&mut profile, &mut daily, &mut rng.0, clock.now) {
        log::info!("daily rollover, streak is now {}", profile.streak);
        log.0
            .push(format!("A new day begins. Streak: {}.", profile.streak));
        for challenge in &daily.challenges {
            log.0.push(format!("Today's challenge: {}.", challenge.describe()));
        }
    }

    let regained = reconcile_energy(&mut profile, clock.now);
    if regained > 0 {
        log.0.push(format!(
            "Recovered {} energy ({} / cap).",
            regained, profile.energy
        ));
    }
}

/// System: resolves challenge and streak claim intents.
pub fn claim_system(
    intents: Res<ActionQueue>,
    mut daily: ResMut<DailyState>,
    mut profile: ResMut<PlayerProfile>,
    mut log: ResMut<EngineLog>,
) {
    for intent in intents.0.iter() {
        match intent {
            ActionIntent::ClaimChallengeReward { id } => {
                match claim_challenge_reward(&mut daily, &mut profile, *id) {
                    Some(reward) => log
                        .0
                        .push(format!("Challenge reward claimed: +{} coins.", reward)),
                    None => log
                        .0
                        .push(format!("Challenge {} has nothing to claim.", id)),
                }
            }
            ActionIntent::ClaimAllChallengeRewards => {
                let total = claim_all_challenge_rewards(&mut daily, &mut profile);
                if total > 0 {
                    log.0
                        .push(format!("Challenge rewards claimed: +{} coins.", total));
                } else {
                    log.0.push("No challenge rewards to claim.".to_string());
                }
            }
            ActionIntent::ClaimStreakReward => match claim_streak_reward(&daily, &mut profile) {
                Some(reward) => {
                    let mut line = format!(
                        "Streak reward claimed: +{} coins",
                        reward.currency
                    );
                    if reward.bonus_energy > 0 {
                        line.push_str(&format!(", +{} energy", reward.bonus_energy));
                    }
                    line.push('.');
                    log.0.push(line);
                }
                None => log
                    .0
                    .push("The streak reward is not claimable right now.".to_string()),
            },
            _ => {}
        }
    }
}
