use std::collections::HashMap;

use bevy_ecs::prelude::*;

use crate::components::player::PlayerId;
use crate::components::skill::SkillId;

/// Loosely-typed event payload forwarded to skill effects.
pub type SkillEventArgs = serde_json::Map<String, serde_json::Value>;

/// One effect invocation: the owning player merged with the event payload.
#[derive(Debug)]
pub struct SkillCall<'a> {
    pub player: PlayerId,
    pub skill_level: u32,
    pub args: &'a SkillEventArgs,
}

/// Behavior hook behind a skill class id.
///
/// Concrete gameplay effects are registered by the host; this crate never
/// defines them.
pub trait SkillEffect: Send + Sync {
    fn on_event(&mut self, event_name: &str, call: &SkillCall);
}

/// Registry mapping skill class ids to their effect implementations.
#[derive(Resource, Default)]
pub struct SkillLibrary {
    effects: HashMap<SkillId, Box<dyn SkillEffect>>,
}

impl SkillLibrary {
    pub fn register(&mut self, id: SkillId, effect: Box<dyn SkillEffect>) {
        self.effects.insert(id, effect);
    }

    pub fn effect_mut(&mut self, id: &SkillId) -> Option<&mut (dyn SkillEffect + 'static)> {
        self.effects.get_mut(id).map(|effect| &mut **effect)
    }

    pub fn contains(&self, id: &SkillId) -> bool {
        self.effects.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
