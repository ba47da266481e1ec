use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

/// Stable identity of a species in the static catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpeciesId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Fire,
    Water,
    Earth,
    Air,
    Light,
    Void,
    Arcane,
}

impl Element {
    pub const ALL: [Element; 7] = [
        Element::Fire,
        Element::Water,
        Element::Earth,
        Element::Air,
        Element::Light,
        Element::Void,
        Element::Arcane,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Element::Fire => "Fire",
            Element::Water => "Water",
            Element::Earth => "Earth",
            Element::Air => "Air",
            Element::Light => "Light",
            Element::Void => "Void",
            Element::Arcane => "Arcane",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Currency refunded when an instance of this tier is released.
    pub fn release_refund(self) -> u32 {
        match self {
            Rarity::Common => 5,
            Rarity::Rare => 15,
            Rarity::Epic => 40,
            Rarity::Legendary => 100,
        }
    }

    /// Multiplier applied to a species' base stat band for this tier.
    pub fn stat_scale(self) -> f32 {
        match self {
            Rarity::Common => 1.0,
            Rarity::Rare => 1.25,
            Rarity::Epic => 1.55,
            Rarity::Legendary => 2.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Inclusive roll band for one stat at common tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatBand {
    pub min: u32,
    pub max: u32,
}

impl StatBand {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Band scaled for a rarity tier.
    pub fn scaled(self, rarity: Rarity) -> StatBand {
        let scale = rarity.stat_scale();
        StatBand {
            min: (self.min as f32 * scale).round() as u32,
            max: (self.max as f32 * scale).round() as u32,
        }
    }
}

/// Static creature template. Immutable at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesDef {
    pub id: SpeciesId,
    pub name: String,
    pub element: Element,
    #[serde(default)]
    pub evolves_from: Option<SpeciesId>,
    #[serde(default)]
    pub evolves_to: Option<SpeciesId>,
    pub power: StatBand,
    pub guard: StatBand,
    pub speed: StatBand,
}

impl SpeciesDef {
    /// Evolved-tier species are later links in an evolution chain.
    pub fn is_evolved(&self) -> bool {
        self.evolves_from.is_some()
    }
}

/// A species reference with no matching catalog entry. This is a
/// data-integrity bug, never a user-input problem, so it surfaces as a hard
/// error instead of a rejected no-op.
#[derive(Debug)]
pub enum CatalogError {
    UnknownSpecies(SpeciesId),
    DuplicateSpecies(SpeciesId),
    DanglingEvolution { from: SpeciesId, to: SpeciesId },
    Empty,
    Io { path: String, source: std::io::Error },
    Json { path: String, source: serde_json::Error },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::UnknownSpecies(id) => {
                write!(f, "species {} is not in the catalog", id.0)
            }
            CatalogError::DuplicateSpecies(id) => {
                write!(f, "species {} appears twice in the catalog", id.0)
            }
            CatalogError::DanglingEvolution { from, to } => {
                write!(f, "species {} evolves to missing species {}", from.0, to.0)
            }
            CatalogError::Empty => write!(f, "the species catalog is empty"),
            CatalogError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path, source)
            }
            CatalogError::Json { path, source } => {
                write!(f, "failed to parse {}: {}", path, source)
            }
        }
    }
}

impl std::error::Error for CatalogError {}

/// Read-only species table, shared by every subsystem that rolls or looks up
/// creatures.
#[derive(Debug, Clone, Resource)]
pub struct SpeciesCatalog {
    species: Vec<SpeciesDef>,
}

impl SpeciesCatalog {
    pub fn from_defs(species: Vec<SpeciesDef>) -> Result<Self, CatalogError> {
        if species.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut ids = HashSet::new();
        for def in &species {
            if !ids.insert(def.id) {
                return Err(CatalogError::DuplicateSpecies(def.id));
            }
        }
        for def in &species {
            for link in [def.evolves_from, def.evolves_to].into_iter().flatten() {
                if !ids.contains(&link) {
                    return Err(CatalogError::DanglingEvolution {
                        from: def.id,
                        to: link,
                    });
                }
            }
        }
        Ok(Self { species })
    }

    /// The shipped default catalog: an evolution pair per element plus a few
    /// chainless strays so every fusion path has candidates.
    pub fn builtin() -> Self {
        Self::from_defs(builtin_species()).expect("builtin catalog is valid")
    }

    pub fn get(&self, id: SpeciesId) -> Result<&SpeciesDef, CatalogError> {
        self.lookup(id).ok_or(CatalogError::UnknownSpecies(id))
    }

    pub fn lookup(&self, id: SpeciesId) -> Option<&SpeciesDef> {
        self.species.iter().find(|def| def.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpeciesDef> {
        self.species.iter()
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn base_tier(&self) -> Vec<&SpeciesDef> {
        self.species.iter().filter(|def| !def.is_evolved()).collect()
    }

    pub fn evolved_tier(&self) -> Vec<&SpeciesDef> {
        self.species.iter().filter(|def| def.is_evolved()).collect()
    }

    pub fn of_element(&self, element: Element) -> Vec<&SpeciesDef> {
        self.species
            .iter()
            .filter(|def| def.element == element)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesCatalogFile {
    pub schema_version: u32,
    pub species: Vec<SpeciesDef>,
}

/// Load a catalog override from a JSON file.
pub fn load_species_catalog(path: impl AsRef<Path>) -> Result<SpeciesCatalog, CatalogError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let file: SpeciesCatalogFile =
        serde_json::from_str(&raw).map_err(|source| CatalogError::Json {
            path: path.display().to_string(),
            source,
        })?;
    SpeciesCatalog::from_defs(file.species)
}

fn builtin_species() -> Vec<SpeciesDef> {
    fn chain(
        id: u32,
        name: &str,
        element: Element,
        from: Option<u32>,
        to: Option<u32>,
        power: (u32, u32),
        guard: (u32, u32),
        speed: (u32, u32),
    ) -> SpeciesDef {
        SpeciesDef {
            id: SpeciesId(id),
            name: name.to_string(),
            element,
            evolves_from: from.map(SpeciesId),
            evolves_to: to.map(SpeciesId),
            power: StatBand::new(power.0, power.1),
            guard: StatBand::new(guard.0, guard.1),
            speed: StatBand::new(speed.0, speed.1),
        }
    }

    vec![
        chain(1, "Cindercub", Element::Fire, None, Some(2), (22, 34), (16, 26), (20, 30)),
        chain(2, "Emberlynx", Element::Fire, Some(1), None, (42, 58), (28, 40), (36, 50)),
        chain(3, "Dewfin", Element::Water, None, Some(4), (18, 30), (22, 34), (18, 28)),
        chain(4, "Tidewarden", Element::Water, Some(3), None, (36, 52), (44, 58), (26, 38)),
        chain(5, "Mossling", Element::Earth, None, Some(6), (20, 30), (26, 38), (12, 20)),
        chain(6, "Bouldermane", Element::Earth, Some(5), None, (40, 54), (50, 66), (14, 24)),
        chain(7, "Zephyrling", Element::Air, None, Some(8), (16, 28), (14, 24), (30, 44)),
        chain(8, "Galeraptor", Element::Air, Some(7), None, (38, 52), (24, 36), (52, 70)),
        chain(9, "Lumimoth", Element::Light, None, Some(10), (20, 32), (20, 30), (24, 36)),
        chain(10, "Dawnseraph", Element::Light, Some(9), None, (44, 60), (36, 50), (40, 54)),
        chain(11, "Gloomwisp", Element::Void, None, Some(12), (24, 36), (14, 24), (22, 34)),
        chain(12, "Nullshade", Element::Void, Some(11), None, (48, 64), (26, 38), (38, 52)),
        chain(13, "Runefox", Element::Arcane, None, Some(14), (22, 34), (18, 30), (26, 38)),
        chain(14, "Sigilwyrm", Element::Arcane, Some(13), None, (46, 62), (34, 48), (34, 48)),
        chain(15, "Ashtoad", Element::Fire, None, None, (26, 38), (22, 32), (16, 26)),
        chain(16, "Brinecrab", Element::Water, None, None, (24, 34), (30, 44), (10, 18)),
        chain(17, "Duskowl", Element::Void, None, None, (28, 40), (18, 28), (28, 40)),
        chain(18, "Glimmerkoi", Element::Light, None, None, (18, 28), (24, 36), (22, 32)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_validates() {
        let catalog = SpeciesCatalog::builtin();
        assert!(catalog.len() >= Element::ALL.len());
        for element in Element::ALL {
            assert!(
                !catalog.of_element(element).is_empty(),
                "no species for {}",
                element
            );
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut defs = builtin_species();
        let dup = defs[0].clone();
        defs.push(dup);
        assert!(matches!(
            SpeciesCatalog::from_defs(defs),
            Err(CatalogError::DuplicateSpecies(_))
        ));
    }

    #[test]
    fn dangling_evolution_is_rejected() {
        let mut defs = builtin_species();
        defs[0].evolves_to = Some(SpeciesId(999));
        assert!(matches!(
            SpeciesCatalog::from_defs(defs),
            Err(CatalogError::DanglingEvolution { .. })
        ));
    }

    #[test]
    fn catalog_file_loads_and_validates() {
        let path = std::env::temp_dir().join(format!(
            "wildspire_catalog_{}.json",
            std::process::id()
        ));
        let file = SpeciesCatalogFile {
            schema_version: 1,
            species: builtin_species(),
        };
        fs::write(&path, serde_json::to_string_pretty(&file).unwrap()).unwrap();
        let catalog = load_species_catalog(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(catalog.len(), builtin_species().len());
        assert!(catalog.lookup(SpeciesId(1)).is_some());
    }

    #[test]
    fn missing_catalog_file_is_an_io_error() {
        let path = std::env::temp_dir().join("wildspire_no_such_catalog.json");
        assert!(matches!(
            load_species_catalog(&path),
            Err(CatalogError::Io { .. })
        ));
    }

    #[test]
    fn malformed_catalog_file_is_a_json_error() {
        let path = std::env::temp_dir().join(format!(
            "wildspire_bad_catalog_{}.json",
            std::process::id()
        ));
        fs::write(&path, "{ not json").unwrap();
        let result = load_species_catalog(&path);
        fs::remove_file(&path).ok();
        assert!(matches!(result, Err(CatalogError::Json { .. })));
    }

    #[test]
    fn rarity_bands_scale_upward() {
        let band = StatBand::new(20, 30);
        let epic = band.scaled(Rarity::Epic);
        let legendary = band.scaled(Rarity::Legendary);
        assert!(epic.min > band.min && epic.max > band.max);
        assert!(legendary.min > epic.min && legendary.max > epic.max);
    }
}
