//! Fusion: two owned instances plus currency become one new instance.

use crate::core::rng::{next_u64, roll_index};
use crate::data::species::{CatalogError, Element, Rarity, SpeciesCatalog, SpeciesId};
use crate::simulation::collection::{CollectionStore, InstanceId};
use crate::simulation::ledger::debit_currency;
use crate::simulation::profile::PlayerProfile;

pub const FUSION_COST: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FusedCreature {
    pub id: InstanceId,
    pub species: SpeciesId,
    pub element: Element,
    pub rarity: Rarity,
}

/// Rarity distribution for fusion results, biased upward relative to a raw
/// catch: common 40, rare 30, epic 30.
pub fn roll_fusion_rarity(rng: &mut u64) -> Rarity {
    let roll = (next_u64(rng) % 100) + 1;
    match roll {
        1..=40 => Rarity::Common,
        41..=70 => Rarity::Rare,
        _ => Rarity::Epic,
    }
}

/// Consume two distinct owned instances and 50 currency, mint one result.
///
/// Any failed precondition (unknown or identical ids, insufficient currency)
/// aborts with no state change and returns `None`. A catalog hole is the only
/// hard error.
pub fn fuse(
    collection: &mut CollectionStore,
    profile: &mut PlayerProfile,
    catalog: &SpeciesCatalog,
    rng: &mut u64,
    a: InstanceId,
    b: InstanceId,
) -> Result<Option<FusedCreature>, CatalogError> {
    if a == b || !collection.contains(a) || !collection.contains(b) {
        return Ok(None);
    }
    // Affordability gates the roll: a refused fusion must not advance the
    // random stream.
    if profile.currency < FUSION_COST {
        return Ok(None);
    }
    let species_a = collection.get(a).map(|c| c.species).expect("checked above");
    let species_b = collection.get(b).map(|c| c.species).expect("checked above");
    let result_species = choose_result_species(catalog, species_a, species_b, rng)?;

    debit_currency(profile, FUSION_COST);
    collection.remove(a);
    collection.remove(b);

    let def = catalog.get(result_species)?;
    let rarity = roll_fusion_rarity(rng);
    let id = collection.mint(def, rarity, rng);
    Ok(Some(FusedCreature {
        id,
        species: def.id,
        element: def.element,
        rarity,
    }))
}

/// Result species by priority: shared species with a successor evolves;
/// shared element draws within the element; otherwise a uniform draw over the
/// union of both input elements plus the arcane pool.
fn choose_result_species(
    catalog: &SpeciesCatalog,
    a: SpeciesId,
    b: SpeciesId,
    rng: &mut u64,
) -> Result<SpeciesId, CatalogError> {
    let def_a = catalog.get(a)?;
    let def_b = catalog.get(b)?;

    if a == b {
        if let Some(successor) = def_a.evolves_to {
            return Ok(successor);
        }
    }

    if def_a.element == def_b.element {
        let pool = catalog.of_element(def_a.element);
        return Ok(pool[roll_index(rng, pool.len())].id);
    }

    let mut pool = catalog.of_element(def_a.element);
    pool.extend(catalog.of_element(def_b.element));
    for arcane in catalog.of_element(Element::Arcane) {
        if !pool.iter().any(|def| def.id == arcane.id) {
            pool.push(arcane);
        }
    }
    Ok(pool[roll_index(rng, pool.len())].id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::hash_seed;

    fn setup() -> (CollectionStore, PlayerProfile, SpeciesCatalog, u64) {
        (
            CollectionStore::default(),
            PlayerProfile::new(0),
            SpeciesCatalog::builtin(),
            hash_seed("fusion_tests"),
        )
    }

    fn mint(
        collection: &mut CollectionStore,
        catalog: &SpeciesCatalog,
        species: SpeciesId,
        rng: &mut u64,
    ) -> InstanceId {
        collection.mint(catalog.get(species).unwrap(), Rarity::Common, rng)
    }

    #[test]
    fn same_species_with_successor_always_evolves() {
        let (mut collection, mut profile, catalog, mut rng) = setup();
        // Species 1 evolves to species 2 in the builtin catalog.
        for _ in 0..10 {
            let a = mint(&mut collection, &catalog, SpeciesId(1), &mut rng);
            let b = mint(&mut collection, &catalog, SpeciesId(1), &mut rng);
            profile.currency = 1_000;
            let fused = fuse(&mut collection, &mut profile, &catalog, &mut rng, a, b)
                .unwrap()
                .unwrap();
            assert_eq!(fused.species, SpeciesId(2));
            collection.remove(fused.id);
        }
    }

    #[test]
    fn shared_element_stays_in_element() {
        let (mut collection, mut profile, catalog, mut rng) = setup();
        profile.currency = 1_000;
        // Species 1 and 15 are both fire with no shared chain.
        let a = mint(&mut collection, &catalog, SpeciesId(1), &mut rng);
        let b = mint(&mut collection, &catalog, SpeciesId(15), &mut rng);
        let fused = fuse(&mut collection, &mut profile, &catalog, &mut rng, a, b)
            .unwrap()
            .unwrap();
        assert_eq!(fused.element, Element::Fire);
    }

    #[test]
    fn cross_element_result_comes_from_union_or_arcane() {
        let (mut collection, mut profile, catalog, mut rng) = setup();
        profile.currency = 10_000;
        for _ in 0..40 {
            let a = mint(&mut collection, &catalog, SpeciesId(1), &mut rng);
            let b = mint(&mut collection, &catalog, SpeciesId(3), &mut rng);
            let fused = fuse(&mut collection, &mut profile, &catalog, &mut rng, a, b)
                .unwrap()
                .unwrap();
            assert!(
                matches!(fused.element, Element::Fire | Element::Water | Element::Arcane),
                "unexpected element {:?}",
                fused.element
            );
            collection.remove(fused.id);
        }
    }

    #[test]
    fn fusion_removes_two_adds_one_and_debits_fifty() {
        let (mut collection, mut profile, catalog, mut rng) = setup();
        profile.currency = 80;
        let a = mint(&mut collection, &catalog, SpeciesId(1), &mut rng);
        let b = mint(&mut collection, &catalog, SpeciesId(3), &mut rng);
        let _keep = mint(&mut collection, &catalog, SpeciesId(5), &mut rng);
        let fused = fuse(&mut collection, &mut profile, &catalog, &mut rng, a, b).unwrap();
        assert!(fused.is_some());
        assert_eq!(collection.len(), 2);
        assert_eq!(profile.currency, 30);
        assert!(!collection.contains(a));
        assert!(!collection.contains(b));
    }

    #[test]
    fn refusals_leave_no_state_change() {
        let (mut collection, mut profile, catalog, mut rng) = setup();
        let a = mint(&mut collection, &catalog, SpeciesId(1), &mut rng);
        let b = mint(&mut collection, &catalog, SpeciesId(3), &mut rng);

        // Insufficient currency.
        profile.currency = FUSION_COST - 1;
        let rng_before = rng;
        assert!(fuse(&mut collection, &mut profile, &catalog, &mut rng, a, b)
            .unwrap()
            .is_none());
        assert_eq!(collection.len(), 2);
        assert_eq!(profile.currency, FUSION_COST - 1);
        // The refusal must not have consumed any rolls.
        assert_eq!(rng, rng_before);

        // Identical ids.
        profile.currency = 1_000;
        assert!(fuse(&mut collection, &mut profile, &catalog, &mut rng, a, a)
            .unwrap()
            .is_none());
        // Unknown id.
        assert!(
            fuse(&mut collection, &mut profile, &catalog, &mut rng, a, InstanceId(999))
                .unwrap()
                .is_none()
        );
        assert_eq!(collection.len(), 2);
        assert_eq!(profile.currency, 1_000);
    }

    #[test]
    fn fusion_rarity_never_rolls_legendary() {
        let mut rng = hash_seed("fusion_rarity");
        for _ in 0..5_000 {
            assert_ne!(roll_fusion_rarity(&mut rng), Rarity::Legendary);
        }
    }
}
