use std::path::Path;

use bevy_utils::tracing::info;
use rusqlite::{params, Connection, OptionalExtension};

use crate::components::skill::{Skill, SkillId};
use crate::core::serialization::{SaveState, SavedPlayer};
use crate::world::repository::ProgressionRepository;

const RPG_SCHEMA_VERSION: i64 = 1;
const RPG_SAVE_VERSION: i64 = 1;

// Skill rows are keyed (player_index, slot) so insertion order round-trips.
const RPG_DB_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS rpg_meta (
  id INTEGER PRIMARY KEY CHECK (id = 1),
  schema_version INTEGER NOT NULL,
  save_version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS rpg_save (
  id INTEGER PRIMARY KEY CHECK (id = 1),
  version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS rpg_players (
  player_index INTEGER PRIMARY KEY,
  name TEXT NOT NULL,
  level INTEGER NOT NULL,
  xp INTEGER NOT NULL,
  credits INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS rpg_skills (
  player_index INTEGER NOT NULL,
  slot INTEGER NOT NULL,
  class_id TEXT NOT NULL,
  level INTEGER NOT NULL,
  max_level INTEGER,
  upgrade_cost INTEGER NOT NULL,
  downgrade_refund INTEGER NOT NULL,
  PRIMARY KEY (player_index, slot)
);
"#;

#[derive(Debug)]
pub enum ProgressionDbError {
    Sqlite(rusqlite::Error),
    InvalidData(String),
}

impl std::fmt::Display for ProgressionDbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressionDbError::Sqlite(err) => write!(f, "sqlite error: {}", err),
            ProgressionDbError::InvalidData(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for ProgressionDbError {}

impl From<rusqlite::Error> for ProgressionDbError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Sqlite(err)
    }
}

/// SQLite-backed progression store.
pub struct ProgressionDb {
    conn: Connection,
}

impl ProgressionDb {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ProgressionDbError> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, ProgressionDbError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, ProgressionDbError> {
        let mut db = Self { conn };
        db.conn.execute_batch(RPG_DB_SCHEMA)?;
        db.ensure_meta()?;
        Ok(db)
    }

    pub fn load_or_init(&mut self) -> Result<SaveState, ProgressionDbError> {
        if let Some(state) = self.load_state()? {
            Ok(state)
        } else {
            info!("no saved progression found, initializing empty state");
            let state = SaveState::default();
            self.save_state(&state)?;
            Ok(state)
        }
    }

    pub fn load_state(&self) -> Result<Option<SaveState>, ProgressionDbError> {
        let save = self
            .conn
            .query_row("SELECT version FROM rpg_save WHERE id = 1", [], |row| {
                row.get::<_, i64>(0)
            })
            .optional()?;
        let Some(version) = save else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            "SELECT player_index, name, level, xp, credits FROM rpg_players ORDER BY player_index",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })?;

        let mut players = Vec::new();
        for row in rows {
            let (index, name, level, xp, credits) = row?;
            let skills = self.load_skills(index)?;
            players.push(SavedPlayer {
                index: index as u32,
                name,
                level: level as u32,
                xp: xp as u32,
                credits: credits as u32,
                skills,
            });
        }

        Ok(Some(SaveState {
            version: version as u32,
            players,
        }))
    }

    pub fn save_state(&mut self, state: &SaveState) -> Result<(), ProgressionDbError> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM rpg_save", [])?;
        tx.execute(
            "INSERT INTO rpg_save (id, version) VALUES (1, ?1)",
            params![state.version as i64],
        )?;

        tx.execute("DELETE FROM rpg_players", [])?;
        tx.execute("DELETE FROM rpg_skills", [])?;
        for player in &state.players {
            tx.execute(
                "INSERT INTO rpg_players (player_index, name, level, xp, credits) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    player.index as i64,
                    player.name,
                    player.level as i64,
                    player.xp as i64,
                    player.credits as i64
                ],
            )?;
            for (slot, skill) in player.skills.iter().enumerate() {
                tx.execute(
                    "INSERT INTO rpg_skills (player_index, slot, class_id, level, max_level, upgrade_cost, downgrade_refund) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        player.index as i64,
                        slot as i64,
                        skill.class_id.0.as_str(),
                        skill.level as i64,
                        skill.max_level.map(|max| max as i64),
                        skill.upgrade_cost as i64,
                        skill.downgrade_refund as i64
                    ],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn load_skills(&self, player_index: i64) -> Result<Vec<Skill>, ProgressionDbError> {
        let mut stmt = self.conn.prepare(
            "SELECT class_id, level, max_level, upgrade_cost, downgrade_refund FROM rpg_skills WHERE player_index = ?1 ORDER BY slot",
        )?;
        let rows = stmt.query_map(params![player_index], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, Option<i64>>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })?;

        let mut skills = Vec::new();
        for row in rows {
            let (class_id, level, max_level, upgrade_cost, downgrade_refund) = row?;
            skills.push(Skill {
                class_id: SkillId(class_id),
                level: level as u32,
                max_level: max_level.map(|max| max as u32),
                upgrade_cost: upgrade_cost as u32,
                downgrade_refund: downgrade_refund as u32,
            });
        }
        Ok(skills)
    }

    fn ensure_meta(&mut self) -> Result<(), ProgressionDbError> {
        let meta = self
            .conn
            .query_row(
                "SELECT schema_version, save_version FROM rpg_meta WHERE id = 1",
                [],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;

        match meta {
            Some((schema_version, save_version)) => {
                if schema_version == RPG_SCHEMA_VERSION && save_version == RPG_SAVE_VERSION {
                    return Ok(());
                }
                Err(ProgressionDbError::InvalidData(format!(
                    "rpg_meta version mismatch (schema {}, save {}, expected {}, {})",
                    schema_version, save_version, RPG_SCHEMA_VERSION, RPG_SAVE_VERSION
                )))
            }
            None => {
                self.conn.execute(
                    "INSERT INTO rpg_meta (id, schema_version, save_version) VALUES (1, ?1, ?2)",
                    params![RPG_SCHEMA_VERSION, RPG_SAVE_VERSION],
                )?;
                Ok(())
            }
        }
    }
}

impl ProgressionRepository for ProgressionDb {
    fn load_or_init(&mut self) -> Result<SaveState, Box<dyn std::error::Error>> {
        Ok(ProgressionDb::load_or_init(self)?)
    }

    fn save_state(&mut self, state: &SaveState) -> Result<(), Box<dyn std::error::Error>> {
        Ok(ProgressionDb::save_state(self, state)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> SaveState {
        SaveState {
            version: 1,
            players: vec![SavedPlayer {
                index: 3,
                name: "Alice".to_string(),
                level: 2,
                xp: 85,
                credits: 4,
                skills: vec![
                    Skill {
                        class_id: SkillId::new("vampirism"),
                        level: 1,
                        max_level: Some(3),
                        upgrade_cost: 3,
                        downgrade_refund: 2,
                    },
                    Skill {
                        class_id: SkillId::new("long_jump"),
                        level: 0,
                        max_level: None,
                        upgrade_cost: 2,
                        downgrade_refund: 1,
                    },
                ],
            }],
        }
    }

    #[test]
    fn fresh_store_has_no_saved_state() {
        let db = ProgressionDb::open_in_memory().unwrap();
        assert!(db.load_state().unwrap().is_none());
    }

    #[test]
    fn load_or_init_seeds_an_empty_roster() {
        let mut db = ProgressionDb::open_in_memory().unwrap();
        let state = db.load_or_init().unwrap();
        assert!(state.players.is_empty());
        assert!(db.load_state().unwrap().is_some());
    }

    #[test]
    fn roundtrip_preserves_players_and_skill_order() {
        let mut db = ProgressionDb::open_in_memory().unwrap();
        db.save_state(&sample_state()).unwrap();

        let loaded = db.load_state().unwrap().unwrap();
        assert_eq!(loaded.players.len(), 1);
        let alice = &loaded.players[0];
        assert_eq!(alice.index, 3);
        assert_eq!(alice.level, 2);
        assert_eq!(alice.xp, 85);
        assert_eq!(alice.credits, 4);
        assert_eq!(alice.skills[0].class_id, SkillId::new("vampirism"));
        assert_eq!(alice.skills[0].max_level, Some(3));
        assert_eq!(alice.skills[1].class_id, SkillId::new("long_jump"));
        assert_eq!(alice.skills[1].max_level, None);
    }

    #[test]
    fn save_replaces_the_previous_roster() {
        let mut db = ProgressionDb::open_in_memory().unwrap();
        db.save_state(&sample_state()).unwrap();
        db.save_state(&SaveState::default()).unwrap();

        let loaded = db.load_state().unwrap().unwrap();
        assert!(loaded.players.is_empty());
    }
}
