use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::core::serialization::{SaveState, SAVE_VERSION};
use crate::data::species::{Element, Rarity, SpeciesId};
use crate::simulation::collection::{InstanceId, OwnedCreature, Stats};
use crate::simulation::daily::{ChallengeKind, DailyChallenge, DailyState};
use crate::simulation::profile::PlayerProfile;

const SAVE_SCHEMA_VERSION: i64 = 1;

const SAVE_DB_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS save_meta (
  id INTEGER PRIMARY KEY CHECK (id = 1),
  schema_version INTEGER NOT NULL,
  save_version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS engine (
  id INTEGER PRIMARY KEY CHECK (id = 1),
  seed INTEGER NOT NULL,
  rng INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS profile (
  id INTEGER PRIMARY KEY CHECK (id = 1),
  display_name TEXT NOT NULL,
  currency INTEGER NOT NULL,
  energy INTEGER NOT NULL,
  energy_checkpoint INTEGER NOT NULL,
  boss_energy INTEGER NOT NULL,
  boss_energy_reset INTEGER NOT NULL,
  wins INTEGER NOT NULL,
  losses INTEGER NOT NULL,
  streak INTEGER NOT NULL,
  streak_claimed INTEGER NOT NULL,
  challenges_reset INTEGER NOT NULL,
  next_instance INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS bosses_cleared (
  species_id INTEGER PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS creatures (
  instance_id INTEGER PRIMARY KEY,
  species_id INTEGER NOT NULL,
  rarity TEXT NOT NULL,
  power INTEGER NOT NULL,
  guard INTEGER NOT NULL,
  speed INTEGER NOT NULL,
  wins INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS dex_seen (
  species_id INTEGER PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS dex_caught (
  species_id INTEGER PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS challenges (
  challenge_id INTEGER PRIMARY KEY,
  kind TEXT NOT NULL,
  element TEXT,
  target INTEGER NOT NULL,
  progress INTEGER NOT NULL,
  completed INTEGER NOT NULL,
  claimed INTEGER NOT NULL,
  reward INTEGER NOT NULL
);
"#;

#[derive(Debug)]
pub enum SaveDbError {
    Sqlite(rusqlite::Error),
    InvalidData(String),
}

impl std::fmt::Display for SaveDbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveDbError::Sqlite(err) => write!(f, "sqlite error: {}", err),
            SaveDbError::InvalidData(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for SaveDbError {}

impl From<rusqlite::Error> for SaveDbError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Sqlite(err)
    }
}

fn rarity_to_str(rarity: Rarity) -> &'static str {
    match rarity {
        Rarity::Common => "COMMON",
        Rarity::Rare => "RARE",
        Rarity::Epic => "EPIC",
        Rarity::Legendary => "LEGENDARY",
    }
}

fn rarity_from_str(value: &str) -> Result<Rarity, SaveDbError> {
    match value {
        "COMMON" => Ok(Rarity::Common),
        "RARE" => Ok(Rarity::Rare),
        "EPIC" => Ok(Rarity::Epic),
        "LEGENDARY" => Ok(Rarity::Legendary),
        _ => Err(SaveDbError::InvalidData(format!(
            "unknown rarity {}",
            value
        ))),
    }
}

fn element_to_str(element: Element) -> &'static str {
    match element {
        Element::Fire => "FIRE",
        Element::Water => "WATER",
        Element::Earth => "EARTH",
        Element::Air => "AIR",
        Element::Light => "LIGHT",
        Element::Void => "VOID",
        Element::Arcane => "ARCANE",
    }
}

fn element_from_str(value: &str) -> Result<Element, SaveDbError> {
    match value {
        "FIRE" => Ok(Element::Fire),
        "WATER" => Ok(Element::Water),
        "EARTH" => Ok(Element::Earth),
        "AIR" => Ok(Element::Air),
        "LIGHT" => Ok(Element::Light),
        "VOID" => Ok(Element::Void),
        "ARCANE" => Ok(Element::Arcane),
        _ => Err(SaveDbError::InvalidData(format!(
            "unknown element {}",
            value
        ))),
    }
}

fn challenge_kind_to_str(kind: ChallengeKind) -> (&'static str, Option<&'static str>) {
    match kind {
        ChallengeKind::CatchCount => ("CATCH_COUNT", None),
        ChallengeKind::WinBattles => ("WIN_BATTLES", None),
        ChallengeKind::CatchElement(element) => ("CATCH_ELEMENT", Some(element_to_str(element))),
        ChallengeKind::CompleteMinigames => ("COMPLETE_MINIGAMES", None),
    }
}

fn challenge_kind_from_str(
    kind: &str,
    element: Option<&str>,
) -> Result<ChallengeKind, SaveDbError> {
    match kind {
        "CATCH_COUNT" => Ok(ChallengeKind::CatchCount),
        "WIN_BATTLES" => Ok(ChallengeKind::WinBattles),
        "CATCH_ELEMENT" => {
            let element = element.ok_or_else(|| {
                SaveDbError::InvalidData("catch-element challenge without an element".to_string())
            })?;
            Ok(ChallengeKind::CatchElement(element_from_str(element)?))
        }
        "COMPLETE_MINIGAMES" => Ok(ChallengeKind::CompleteMinigames),
        _ => Err(SaveDbError::InvalidData(format!(
            "unknown challenge kind {}",
            kind
        ))),
    }
}

pub struct SaveDb {
    conn: Connection,
}

impl SaveDb {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SaveDbError> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, SaveDbError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, SaveDbError> {
        let mut db = Self { conn };
        db.conn.execute_batch(SAVE_DB_SCHEMA)?;
        db.ensure_save_meta()?;
        Ok(db)
    }

    /// Load the stored save, or `None` when the database is fresh.
    pub fn load_state(&self) -> Result<Option<SaveState>, SaveDbError> {
        let engine = self
            .conn
            .query_row("SELECT seed, rng FROM engine WHERE id = 1", [], |row| {
                Ok((row.get::<_, i64>(0)? as u64, row.get::<_, i64>(1)? as u64))
            })
            .optional()?;
        let Some((seed, rng)) = engine else {
            return Ok(None);
        };

        let (profile, next_instance) = self.load_profile()?;
        let creatures = self.load_creatures()?;
        let seen = self.load_dex("dex_seen")?;
        let caught = self.load_dex("dex_caught")?;
        let challenges = self.load_challenges()?;

        Ok(Some(SaveState {
            version: SAVE_VERSION,
            seed,
            rng,
            profile,
            creatures,
            seen,
            caught,
            next_instance,
            challenges,
        }))
    }

    /// Persist the full save state in one transaction.
    pub fn save_state(&mut self, state: &SaveState) -> Result<(), SaveDbError> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM engine", [])?;
        tx.execute(
            "INSERT INTO engine (id, seed, rng) VALUES (1, ?1, ?2)",
            params![state.seed as i64, state.rng as i64],
        )?;

        tx.execute("DELETE FROM profile", [])?;
        tx.execute(
            "INSERT INTO profile (id, display_name, currency, energy, energy_checkpoint, boss_energy, boss_energy_reset, wins, losses, streak, streak_claimed, challenges_reset, next_instance) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                state.profile.display_name,
                state.profile.currency as i64,
                state.profile.energy as i64,
                state.profile.energy_checkpoint as i64,
                state.profile.boss_energy as i64,
                state.profile.boss_energy_reset as i64,
                state.profile.wins as i64,
                state.profile.losses as i64,
                state.profile.streak as i64,
                if state.profile.streak_claimed { 1 } else { 0 },
                state.profile.challenges_reset as i64,
                state.next_instance as i64,
            ],
        )?;

        tx.execute("DELETE FROM bosses_cleared", [])?;
        for species in &state.profile.bosses_cleared {
            tx.execute(
                "INSERT INTO bosses_cleared (species_id) VALUES (?1)",
                params![species.0 as i64],
            )?;
        }

        tx.execute("DELETE FROM creatures", [])?;
        for creature in &state.creatures {
            tx.execute(
                "INSERT INTO creatures (instance_id, species_id, rarity, power, guard, speed, wins) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    creature.id.0 as i64,
                    creature.species.0 as i64,
                    rarity_to_str(creature.rarity),
                    creature.stats.power as i64,
                    creature.stats.guard as i64,
                    creature.stats.speed as i64,
                    creature.wins as i64,
                ],
            )?;
        }

        tx.execute("DELETE FROM dex_seen", [])?;
        for species in &state.seen {
            tx.execute(
                "INSERT INTO dex_seen (species_id) VALUES (?1)",
                params![species.0 as i64],
            )?;
        }
        tx.execute("DELETE FROM dex_caught", [])?;
        for species in &state.caught {
            tx.execute(
                "INSERT INTO dex_caught (species_id) VALUES (?1)",
                params![species.0 as i64],
            )?;
        }

        tx.execute("DELETE FROM challenges", [])?;
        for challenge in &state.challenges.challenges {
            let (kind, element) = challenge_kind_to_str(challenge.kind);
            tx.execute(
                "INSERT INTO challenges (challenge_id, kind, element, target, progress, completed, claimed, reward) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    challenge.id as i64,
                    kind,
                    element,
                    challenge.target as i64,
                    challenge.progress as i64,
                    if challenge.completed { 1 } else { 0 },
                    if challenge.claimed { 1 } else { 0 },
                    challenge.reward as i64,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn ensure_save_meta(&mut self) -> Result<(), SaveDbError> {
        let meta = self
            .conn
            .query_row(
                "SELECT schema_version, save_version FROM save_meta WHERE id = 1",
                [],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;

        match meta {
            Some((schema_version, save_version)) => {
                if schema_version == SAVE_SCHEMA_VERSION && save_version == SAVE_VERSION as i64 {
                    return Ok(());
                }
                Err(SaveDbError::InvalidData(format!(
                    "save_meta version mismatch (schema {}, save {}, expected {}, {})",
                    schema_version, save_version, SAVE_SCHEMA_VERSION, SAVE_VERSION
                )))
            }
            None => {
                self.conn.execute(
                    "INSERT INTO save_meta (id, schema_version, save_version) VALUES (1, ?1, ?2)",
                    params![SAVE_SCHEMA_VERSION, SAVE_VERSION as i64],
                )?;
                Ok(())
            }
        }
    }

    fn load_profile(&self) -> Result<(PlayerProfile, u32), SaveDbError> {
        let row = self
            .conn
            .query_row(
                "SELECT display_name, currency, energy, energy_checkpoint, boss_energy, boss_energy_reset, wins, losses, streak, streak_claimed, challenges_reset, next_instance FROM profile WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)? as u32,
                        row.get::<_, i64>(2)? as u8,
                        row.get::<_, i64>(3)? as u64,
                        row.get::<_, i64>(4)? as u8,
                        row.get::<_, i64>(5)? as u64,
                        row.get::<_, i64>(6)? as u32,
                        row.get::<_, i64>(7)? as u32,
                        row.get::<_, i64>(8)? as u32,
                        row.get::<_, i64>(9)? != 0,
                        row.get::<_, i64>(10)? as u64,
                        row.get::<_, i64>(11)? as u32,
                    ))
                },
            )
            .optional()?;

        let Some((
            display_name,
            currency,
            energy,
            energy_checkpoint,
            boss_energy,
            boss_energy_reset,
            wins,
            losses,
            streak,
            streak_claimed,
            challenges_reset,
            next_instance,
        )) = row
        else {
            return Err(SaveDbError::InvalidData(
                "engine row present but profile row missing".to_string(),
            ));
        };

        let mut profile = PlayerProfile::new(0);
        profile.display_name = display_name;
        profile.currency = currency;
        profile.energy = energy;
        profile.energy_checkpoint = energy_checkpoint;
        profile.boss_energy = boss_energy;
        profile.boss_energy_reset = boss_energy_reset;
        profile.wins = wins;
        profile.losses = losses;
        profile.streak = streak;
        profile.streak_claimed = streak_claimed;
        profile.challenges_reset = challenges_reset;
        profile.bosses_cleared = self.load_bosses_cleared()?;
        Ok((profile, next_instance))
    }

    fn load_bosses_cleared(
        &self,
    ) -> Result<std::collections::HashSet<SpeciesId>, SaveDbError> {
        let mut set = std::collections::HashSet::new();
        let mut stmt = self.conn.prepare("SELECT species_id FROM bosses_cleared")?;
        let rows = stmt.query_map([], |row| row.get::<_, i64>(0))?;
        for row in rows {
            set.insert(SpeciesId(row? as u32));
        }
        Ok(set)
    }

    fn load_creatures(&self) -> Result<Vec<OwnedCreature>, SaveDbError> {
        let mut out = Vec::new();
        let mut stmt = self.conn.prepare(
            "SELECT instance_id, species_id, rarity, power, guard, speed, wins FROM creatures ORDER BY instance_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)? as u32,
                row.get::<_, i64>(1)? as u32,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)? as u32,
                row.get::<_, i64>(4)? as u32,
                row.get::<_, i64>(5)? as u32,
                row.get::<_, i64>(6)? as u32,
            ))
        })?;
        for row in rows {
            let (instance_id, species_id, rarity, power, guard, speed, wins) = row?;
            out.push(OwnedCreature {
                id: InstanceId(instance_id),
                species: SpeciesId(species_id),
                rarity: rarity_from_str(&rarity)?,
                stats: Stats {
                    power,
                    guard,
                    speed,
                },
                wins,
            });
        }
        Ok(out)
    }

    fn load_dex(&self, table: &str) -> Result<Vec<SpeciesId>, SaveDbError> {
        let mut out = Vec::new();
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT species_id FROM {} ORDER BY species_id", table))?;
        let rows = stmt.query_map([], |row| row.get::<_, i64>(0))?;
        for row in rows {
            out.push(SpeciesId(row? as u32));
        }
        Ok(out)
    }

    fn load_challenges(&self) -> Result<DailyState, SaveDbError> {
        let mut challenges = Vec::new();
        let mut stmt = self.conn.prepare(
            "SELECT challenge_id, kind, element, target, progress, completed, claimed, reward FROM challenges ORDER BY challenge_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)? as u32,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, i64>(3)? as u32,
                row.get::<_, i64>(4)? as u32,
                row.get::<_, i64>(5)? != 0,
                row.get::<_, i64>(6)? != 0,
                row.get::<_, i64>(7)? as u32,
            ))
        })?;
        for row in rows {
            let (id, kind, element, target, progress, completed, claimed, reward) = row?;
            challenges.push(DailyChallenge {
                id,
                kind: challenge_kind_from_str(&kind, element.as_deref())?,
                target,
                progress,
                completed,
                claimed,
                reward,
            });
        }
        Ok(DailyState { challenges })
    }
}

impl crate::world::repository::SaveRepository for SaveDb {
    fn load(&mut self) -> Result<Option<SaveState>, Box<dyn std::error::Error>> {
        Ok(SaveDb::load_state(self)?)
    }

    fn save(&mut self, state: &SaveState) -> Result<(), Box<dyn std::error::Error>> {
        Ok(SaveDb::save_state(self, state)?)
    }
}
