use bevy_ecs::prelude::*;

use crate::core::world::{ActionIntent, ActionQueue, EngineLog};
use crate::simulation::ledger::credit_currency;
use crate::simulation::profile::PlayerProfile;

/// System: resolves profile-level intents (rename, currency grants).
pub fn profile_system(
    intents: Res<ActionQueue>,
    mut profile: ResMut<PlayerProfile>,
    mut log: ResMut<EngineLog>,
) {
    for intent in intents.0.iter() {
        match intent {
            ActionIntent::SetDisplayName { name } => {
                let trimmed = name.trim();
                if trimmed.is_empty() {
                    log.0.push("A display name cannot be blank.".to_string());
                } else {
                    profile.display_name = trimmed.to_string();
                    log.0
                        .push(format!("You are now known as {}.", profile.display_name));
                }
            }
            ActionIntent::CreditCurrency { amount } => {
                credit_currency(&mut profile, *amount);
                log.0.push(format!(
                    "Received {} coins ({} total).",
                    amount, profile.currency
                ));
            }
            _ => {}
        }
    }
}
