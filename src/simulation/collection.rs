use std::collections::HashSet;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::core::rng::roll_range;
use crate::data::species::{Rarity, SpeciesDef, SpeciesId};
use crate::simulation::ledger::credit_currency;
use crate::simulation::profile::PlayerProfile;

/// Unique identity of an owned creature instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub u32);

/// Rolled once at creation, frozen thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub power: u32,
    pub guard: u32,
    pub speed: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnedCreature {
    pub id: InstanceId,
    pub species: SpeciesId,
    pub rarity: Rarity,
    pub stats: Stats,
    /// Incremented when this instance is part of a winning team.
    pub wins: u32,
}

/// Roll the three stats uniformly within the species band scaled for rarity.
pub fn roll_stats(species: &SpeciesDef, rarity: Rarity, rng: &mut u64) -> Stats {
    let power = species.power.scaled(rarity);
    let guard = species.guard.scaled(rarity);
    let speed = species.speed.scaled(rarity);
    Stats {
        power: roll_range(rng, power.min, power.max),
        guard: roll_range(rng, guard.min, guard.max),
        speed: roll_range(rng, speed.min, speed.max),
    }
}

/// Owned creature instances plus the dex (seen/caught species sets).
#[derive(Resource, Debug, Default, Clone)]
pub struct CollectionStore {
    creatures: Vec<OwnedCreature>,
    seen: HashSet<SpeciesId>,
    caught: HashSet<SpeciesId>,
    next_instance: u32,
}

impl CollectionStore {
    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OwnedCreature> {
        self.creatures.iter()
    }

    pub fn get(&self, id: InstanceId) -> Option<&OwnedCreature> {
        self.creatures.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut OwnedCreature> {
        self.creatures.iter_mut().find(|c| c.id == id)
    }

    pub fn contains(&self, id: InstanceId) -> bool {
        self.get(id).is_some()
    }

    /// True when the slice is exactly 3 distinct owned instance IDs: the
    /// shape every battle team must have.
    pub fn owns_distinct_team(&self, team: &[InstanceId]) -> bool {
        team.len() == 3
            && team[0] != team[1]
            && team[0] != team[2]
            && team[1] != team[2]
            && team.iter().all(|id| self.contains(*id))
    }

    pub fn mark_seen(&mut self, species: SpeciesId) {
        self.seen.insert(species);
    }

    pub fn seen(&self) -> &HashSet<SpeciesId> {
        &self.seen
    }

    pub fn caught(&self) -> &HashSet<SpeciesId> {
        &self.caught
    }

    /// Roll and append a fresh instance, marking the species caught (and
    /// therefore seen). Returns the new id.
    pub fn mint(&mut self, species: &SpeciesDef, rarity: Rarity, rng: &mut u64) -> InstanceId {
        let id = self.alloc_id();
        let stats = roll_stats(species, rarity, rng);
        self.seen.insert(species.id);
        self.caught.insert(species.id);
        self.creatures.push(OwnedCreature {
            id,
            species: species.id,
            rarity,
            stats,
            wins: 0,
        });
        id
    }

    pub fn remove(&mut self, id: InstanceId) -> Option<OwnedCreature> {
        let idx = self.creatures.iter().position(|c| c.id == id)?;
        Some(self.creatures.remove(idx))
    }

    fn alloc_id(&mut self) -> InstanceId {
        self.next_instance += 1;
        InstanceId(self.next_instance)
    }

    /// Rebuild from persisted parts, bumping the allocator past every stored
    /// id so reloaded saves never hand out duplicates.
    pub fn from_saved(
        creatures: Vec<OwnedCreature>,
        seen: HashSet<SpeciesId>,
        caught: HashSet<SpeciesId>,
        next_instance: u32,
    ) -> Self {
        let max_id = creatures.iter().map(|c| c.id.0).max().unwrap_or(0);
        Self {
            creatures,
            seen,
            caught,
            next_instance: next_instance.max(max_id),
        }
    }

    pub fn next_instance(&self) -> u32 {
        self.next_instance
    }
}

/// Remove an instance and refund currency by rarity tier. A missing id is a
/// no-op returning `None`.
pub fn release(
    collection: &mut CollectionStore,
    profile: &mut PlayerProfile,
    id: InstanceId,
) -> Option<(Rarity, u32)> {
    let removed = collection.remove(id)?;
    let refund = removed.rarity.release_refund();
    credit_currency(profile, refund);
    Some((removed.rarity, refund))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::hash_seed;
    use crate::data::species::SpeciesCatalog;

    fn store_with(n: usize) -> (CollectionStore, Vec<InstanceId>, SpeciesCatalog) {
        let catalog = SpeciesCatalog::builtin();
        let mut store = CollectionStore::default();
        let mut rng = hash_seed("collection");
        let species = catalog.iter().next().unwrap().clone();
        let ids = (0..n)
            .map(|_| store.mint(&species, Rarity::Common, &mut rng))
            .collect();
        (store, ids, catalog)
    }

    #[test]
    fn minted_ids_are_unique_and_caught_implies_seen() {
        let (store, ids, _) = store_with(5);
        let mut unique: Vec<_> = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), ids.len());
        for species in store.caught() {
            assert!(store.seen().contains(species));
        }
    }

    #[test]
    fn stats_stay_inside_the_scaled_band() {
        let catalog = SpeciesCatalog::builtin();
        let species = catalog.iter().next().unwrap();
        let mut rng = hash_seed("stat_band");
        for rarity in [Rarity::Common, Rarity::Rare, Rarity::Epic, Rarity::Legendary] {
            let band = species.power.scaled(rarity);
            for _ in 0..50 {
                let stats = roll_stats(species, rarity, &mut rng);
                assert!(stats.power >= band.min && stats.power <= band.max);
            }
        }
    }

    #[test]
    fn release_refunds_by_rarity_and_removes_exactly_one() {
        let (mut store, ids, _) = store_with(3);
        let mut profile = PlayerProfile::new(0);
        let before = profile.currency;
        let refund = release(&mut store, &mut profile, ids[0]);
        assert_eq!(refund, Some((Rarity::Common, 5)));
        assert_eq!(profile.currency, before + 5);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn releasing_unknown_id_changes_nothing() {
        let (mut store, _, _) = store_with(2);
        let mut profile = PlayerProfile::new(0);
        let before = profile.currency;
        assert!(release(&mut store, &mut profile, InstanceId(999)).is_none());
        assert_eq!(store.len(), 2);
        assert_eq!(profile.currency, before);
    }

    #[test]
    fn team_validation_requires_three_distinct_owned() {
        let (store, ids, _) = store_with(3);
        assert!(store.owns_distinct_team(&ids));
        assert!(!store.owns_distinct_team(&ids[..2]));
        assert!(!store.owns_distinct_team(&[ids[0], ids[0], ids[1]]));
        assert!(!store.owns_distinct_team(&[ids[0], ids[1], InstanceId(999)]));
    }

    #[test]
    fn reloaded_store_does_not_reuse_ids() {
        let (store, ids, catalog) = store_with(3);
        let mut reloaded = CollectionStore::from_saved(
            store.iter().cloned().collect(),
            store.seen().clone(),
            store.caught().clone(),
            store.next_instance(),
        );
        let mut rng = 1u64;
        let species = catalog.iter().next().unwrap();
        let fresh = reloaded.mint(species, Rarity::Common, &mut rng);
        assert!(!ids.contains(&fresh));
    }
}
