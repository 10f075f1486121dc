use std::fs;
use std::path::Path;

use bevy_ecs::prelude::*;
use bevy_ecs::query::With;
use serde::{Deserialize, Serialize};

use crate::components::player::{PlayerId, PlayerName};
use crate::components::progression::Progression;
use crate::components::skill::Skill;

/// Save state capturing the persisted progression fields of every player.
///
/// Index, level, XP, credits, and the skill records are the only fields an
/// external store must round-trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveState {
    #[serde(default = "default_save_version")]
    pub version: u32,
    pub players: Vec<SavedPlayer>,
}

fn default_save_version() -> u32 {
    1
}

impl Default for SaveState {
    fn default() -> Self {
        Self {
            version: default_save_version(),
            players: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedPlayer {
    pub index: u32,
    #[serde(default)]
    pub name: String,
    pub level: u32,
    pub xp: u32,
    pub credits: u32,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

/// Extract a serializable snapshot of every player in the world.
pub fn extract_state_from_world(world: &World) -> SaveState {
    let mut players: Vec<SavedPlayer> = world
        .iter_entities()
        .filter_map(|entity_ref| {
            let index = entity_ref.get::<PlayerId>()?.0;
            let progression = entity_ref.get::<Progression>()?;
            let name = entity_ref
                .get::<PlayerName>()
                .map(|n| n.0.clone())
                .unwrap_or_default();
            Some(SavedPlayer {
                index,
                name,
                level: progression.level(),
                xp: progression.xp(),
                credits: progression.credits(),
                skills: progression.skills.clone(),
            })
        })
        .collect();
    players.sort_by_key(|player| player.index);

    SaveState {
        version: default_save_version(),
        players,
    }
}

/// Apply a saved snapshot back into the world, replacing existing players.
pub fn apply_state_to_world(state: SaveState, world: &mut World) {
    let to_remove: Vec<Entity> = world
        .query_filtered::<Entity, With<PlayerId>>()
        .iter(world)
        .collect();
    for entity in to_remove {
        let _ = world.despawn(entity);
    }

    for saved in state.players {
        world.spawn((
            PlayerId(saved.index),
            PlayerName(saved.name),
            Progression::new(saved.level, saved.xp, saved.credits, saved.skills),
        ));
    }
}

/// Serialize a save state into JSON for persistence.
pub fn save_state_to_json(state: &SaveState) -> serde_json::Result<String> {
    serde_json::to_string_pretty(state)
}

/// Deserialize JSON back into a save state.
pub fn load_state_from_json(data: &str) -> serde_json::Result<SaveState> {
    serde_json::from_str(data)
}

/// Write a save state to a file path.
pub fn save_state_to_path<P: AsRef<Path>>(state: &SaveState, path: P) -> std::io::Result<()> {
    let json =
        save_state_to_json(state).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    fs::write(path, json)
}

/// Read a save state from a file path.
pub fn load_state_from_path<P: AsRef<Path>>(path: P) -> std::io::Result<SaveState> {
    let data = fs::read_to_string(&path)?;
    load_state_from_json(&data).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
}
