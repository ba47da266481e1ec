use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::data::species::{CatalogError, Rarity, SpeciesCatalog, SpeciesId};

/// One scripted daily boss: a signature species (also the key for first-clear
/// tracking), a fixed 3-slot team, and a reward schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossDef {
    pub title: String,
    /// Signature species; the profile records first clears against this id.
    pub species: SpeciesId,
    pub team: [BossSlot; 3],
    pub currency_reward: u32,
    pub reward_species: SpeciesId,
    pub reward_rarity: Rarity,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BossSlot {
    pub species: SpeciesId,
    pub rarity: Rarity,
}

/// Rotation of scripted bosses; "today's boss" is the calendar day index
/// modulo the rotation length.
#[derive(Debug, Clone, Resource)]
pub struct BossCatalog {
    bosses: Vec<BossDef>,
}

impl BossCatalog {
    pub fn from_defs(bosses: Vec<BossDef>, species: &SpeciesCatalog) -> Result<Self, CatalogError> {
        if bosses.is_empty() {
            return Err(CatalogError::Empty);
        }
        for boss in &bosses {
            species.get(boss.species)?;
            species.get(boss.reward_species)?;
            for slot in &boss.team {
                species.get(slot.species)?;
            }
        }
        Ok(Self { bosses })
    }

    pub fn builtin(species: &SpeciesCatalog) -> Self {
        Self::try_builtin(species).expect("builtin boss rotation is valid")
    }

    /// Fallible variant for catalog overrides, which may not carry every
    /// species the builtin rotation references.
    pub fn try_builtin(species: &SpeciesCatalog) -> Result<Self, CatalogError> {
        Self::from_defs(builtin_bosses(), species)
    }

    pub fn boss_for_day(&self, day_index: u64) -> &BossDef {
        &self.bosses[(day_index % self.bosses.len() as u64) as usize]
    }

    pub fn len(&self) -> usize {
        self.bosses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bosses.is_empty()
    }
}

fn builtin_bosses() -> Vec<BossDef> {
    fn boss(
        title: &str,
        species: u32,
        team: [(u32, Rarity); 3],
        currency_reward: u32,
        reward_species: u32,
        reward_rarity: Rarity,
    ) -> BossDef {
        BossDef {
            title: title.to_string(),
            species: SpeciesId(species),
            team: team.map(|(id, rarity)| BossSlot {
                species: SpeciesId(id),
                rarity,
            }),
            currency_reward,
            reward_species: SpeciesId(reward_species),
            reward_rarity,
        }
    }

    vec![
        boss(
            "Pyre Matriarch",
            2,
            [(1, Rarity::Rare), (15, Rarity::Rare), (2, Rarity::Epic)],
            60,
            1,
            Rarity::Rare,
        ),
        boss(
            "Warden of the Deep",
            4,
            [(3, Rarity::Rare), (16, Rarity::Rare), (4, Rarity::Epic)],
            60,
            16,
            Rarity::Rare,
        ),
        boss(
            "The Bouldermane",
            6,
            [(5, Rarity::Rare), (5, Rarity::Epic), (6, Rarity::Epic)],
            70,
            5,
            Rarity::Epic,
        ),
        boss(
            "Gale Sovereign",
            8,
            [(7, Rarity::Rare), (7, Rarity::Epic), (8, Rarity::Epic)],
            70,
            7,
            Rarity::Epic,
        ),
        boss(
            "Dawn Chorus",
            10,
            [(9, Rarity::Rare), (18, Rarity::Epic), (10, Rarity::Epic)],
            80,
            18,
            Rarity::Epic,
        ),
        boss(
            "Hollow King",
            12,
            [(11, Rarity::Epic), (17, Rarity::Epic), (12, Rarity::Legendary)],
            90,
            17,
            Rarity::Epic,
        ),
        boss(
            "Keeper of Sigils",
            14,
            [(13, Rarity::Epic), (13, Rarity::Epic), (14, Rarity::Legendary)],
            100,
            13,
            Rarity::Legendary,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::species::SpeciesCatalog;

    #[test]
    fn builtin_rotation_references_valid_species() {
        let species = SpeciesCatalog::builtin();
        let bosses = BossCatalog::builtin(&species);
        assert_eq!(bosses.len(), 7);
    }

    #[test]
    fn boss_for_day_cycles_deterministically() {
        let species = SpeciesCatalog::builtin();
        let bosses = BossCatalog::builtin(&species);
        let a = bosses.boss_for_day(3).species;
        let b = bosses.boss_for_day(3 + bosses.len() as u64).species;
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_reward_species_is_rejected() {
        let species = SpeciesCatalog::builtin();
        let mut defs = builtin_bosses();
        defs[0].reward_species = SpeciesId(999);
        assert!(BossCatalog::from_defs(defs, &species).is_err());
    }
}
