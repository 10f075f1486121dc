use std::path::Path;

use bevy_ecs::prelude::*;

use crate::components::player::{PlayerId, PlayerName};
use crate::components::progression::Progression;
use crate::components::skill::{Skill, SkillId};
use crate::core::ecs::{create_schedule, create_world};
use crate::core::serialization::{
    apply_state_to_world, extract_state_from_world, load_state_from_path, save_state_to_path,
    SaveState,
};
use crate::events::{ProgressionEvent, ProgressionEventLog};
use crate::skills::{SkillEffect, SkillEventArgs, SkillLibrary};

/// Intent-driven commands fed into the ECS each tick.
#[derive(Debug, Clone)]
pub enum ProgressionIntent {
    GiveXp {
        player_index: u32,
        amount: i32,
    },
    UpgradeSkill {
        player_index: u32,
        skill_id: SkillId,
    },
    DowngradeSkill {
        player_index: u32,
        skill_id: SkillId,
    },
    ResetProgress {
        player_index: u32,
    },
    GameEvent {
        player_index: u32,
        event_name: String,
        args: SkillEventArgs,
    },
}

/// Resource storing the intents for the next tick.
#[derive(Resource, Default, Debug)]
pub struct IntentQueue(pub Vec<ProgressionIntent>);

/// Data snapshot returned to the host layer after each tick.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub players: Vec<PlayerSummary>,
    pub events: Vec<ProgressionEvent>,
}

#[derive(Debug, Clone)]
pub struct PlayerSummary {
    pub index: u32,
    pub name: String,
    pub level: u32,
    pub xp: u32,
    pub required_xp: u32,
    pub credits: u32,
    pub skills: Vec<Skill>,
}

/// Wrapper around the ECS world and schedule.
pub struct Game {
    world: World,
    schedule: Schedule,
}

impl Game {
    pub fn new() -> Self {
        Self {
            world: create_world(),
            schedule: create_schedule(),
        }
    }

    /// Spawn a player entity with fresh progression. Returns `false` if
    /// the index is already taken.
    pub fn add_player(&mut self, index: u32, name: &str) -> bool {
        if self.find_player(index).is_some() {
            return false;
        }
        self.world.spawn((
            PlayerId(index),
            PlayerName(name.to_string()),
            Progression::default(),
        ));
        true
    }

    /// Associate a skill record with a player. Duplicate class ids on one
    /// player are rejected.
    pub fn grant_skill(&mut self, index: u32, skill: Skill) -> bool {
        let Some(entity) = self.find_player(index) else {
            return false;
        };
        let Some(mut progression) = self.world.get_mut::<Progression>(entity) else {
            return false;
        };
        if progression.find_skill(&skill.class_id).is_some() {
            return false;
        }
        progression.skills.push(skill);
        true
    }

    /// Register the behavior behind a skill class id.
    pub fn register_effect(&mut self, id: SkillId, effect: Box<dyn SkillEffect>) {
        self.world.resource_mut::<SkillLibrary>().register(id, effect);
    }

    /// Run a tick with the provided intents and return a snapshot for
    /// rendering. The snapshot carries the events emitted this tick.
    pub fn tick(&mut self, intents: Vec<ProgressionIntent>) -> Snapshot {
        {
            let mut queue = self.world.resource_mut::<IntentQueue>();
            queue.0 = intents;
        }

        self.schedule.run(&mut self.world);
        Snapshot::capture(&self.world)
    }

    /// Extract a serializable save state from the current world.
    pub fn save_state(&self) -> SaveState {
        extract_state_from_world(&self.world)
    }

    /// Apply a saved state back into the live world, replacing the roster.
    pub fn load_state(&mut self, state: SaveState) {
        apply_state_to_world(state, &mut self.world);
    }

    /// Save state directly to a file path.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        save_state_to_path(&self.save_state(), path)
    }

    /// Load state directly from a file path.
    pub fn load_from_path<P: AsRef<Path>>(&mut self, path: P) -> std::io::Result<()> {
        let state = load_state_from_path(path)?;
        self.load_state(state);
        Ok(())
    }

    fn find_player(&mut self, index: u32) -> Option<Entity> {
        let mut query = self.world.query::<(Entity, &PlayerId)>();
        query
            .iter(&self.world)
            .find(|(_, id)| id.0 == index)
            .map(|(entity, _)| entity)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Snapshot {
    fn capture(world: &World) -> Self {
        let mut players: Vec<PlayerSummary> = world
            .iter_entities()
            .filter_map(|entity_ref| {
                let index = entity_ref.get::<PlayerId>()?.0;
                let progression = entity_ref.get::<Progression>()?;
                let name = entity_ref
                    .get::<PlayerName>()
                    .map(|n| n.0.clone())
                    .unwrap_or_else(|| format!("Player {}", index));
                Some(PlayerSummary {
                    index,
                    name,
                    level: progression.level(),
                    xp: progression.xp(),
                    required_xp: progression.required_xp(),
                    credits: progression.credits(),
                    skills: progression.skills.clone(),
                })
            })
            .collect();
        players.sort_by_key(|summary| summary.index);

        let events = world
            .get_resource::<ProgressionEventLog>()
            .map(|log| log.0.clone())
            .unwrap_or_default();

        Snapshot { players, events }
    }
}
