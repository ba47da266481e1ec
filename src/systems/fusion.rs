use bevy_ecs::prelude::*;

use crate::core::rng::EngineRng;
use crate::core::world::{ActionIntent, ActionQueue, EngineLog};
use crate::data::species::SpeciesCatalog;
use crate::simulation::collection::CollectionStore;
use crate::simulation::fusion::fuse;
use crate::simulation::profile::PlayerProfile;

/// System: resolves fusion intents.
pub fn fusion_system(
    intents: Res<ActionQueue>,
    catalog: Res<SpeciesCatalog>,
    mut collection: ResMut<CollectionStore>,
    mut profile: ResMut<PlayerProfile>,
    mut rng: ResMut<EngineRng>,
    mut log: ResMut<EngineLog>,
) {
    for intent in intents.0.iter() {
        if let ActionIntent::Fuse { a, b } = intent {
            match fuse(&mut collection, &mut profile, &catalog, &mut rng.0, *a, *b) {
                Ok(Some(fused)) => {
                    let name = catalog
                        .lookup(fused.species)
                        .map(|def| def.name.clone())
                        .unwrap_or_else(|| format!("creature #{}", fused.species.0));
                    log.0.push(format!(
                        "The fusion produced a {} {}!",
                        fused.rarity, name
                    ));
                }
                Ok(None) => {
                    log.0.push("The fusion could not proceed.".to_string());
                }
                Err(err) => {
                    log::error!("fusion failed: {}", err);
                    log.0.push("Something went wrong with the fusion.".to_string());
                }
            }
        }
    }
}
