use bevy_ecs::prelude::*;
use bevy_ecs::schedule::SystemSet;

use crate::core::world::IntentQueue;
use crate::events::ProgressionEventLog;
use crate::skills::SkillLibrary;
use crate::systems::progression::{progression_apply_system, skill_dispatch_system};

/// Canonical tick ordering for the progression step.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum TickSet {
    Intake,
    Simulation,
    Cleanup,
}

/// Build the ECS world with baseline resources.
pub fn create_world() -> World {
    let mut world = World::new();
    world.insert_resource(IntentQueue::default());
    world.insert_resource(ProgressionEventLog::default());
    world.insert_resource(SkillLibrary::default());
    world
}

/// Build the system schedule in the canonical order. Skill dispatch runs
/// after progression has been applied, so an XP grant and a game event in
/// the same tick see the post-grant skill levels.
pub fn create_schedule() -> Schedule {
    let mut schedule = Schedule::default();

    schedule.configure_sets((TickSet::Intake, TickSet::Simulation, TickSet::Cleanup).chain());

    schedule.add_systems(
        (progression_apply_system, skill_dispatch_system)
            .chain()
            .in_set(TickSet::Simulation),
    );

    schedule
}
