use bevy_ecs::prelude::*;
use serde::Serialize;

use crate::components::player::PlayerId;
use crate::components::skill::SkillId;

/// Notifications emitted by progression mutations.
///
/// `LevelUp` carries the levels and credits actually gained by the grant,
/// which may cover several thresholds crossed in one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ProgressionEvent {
    LevelUp {
        player: PlayerId,
        levels: u32,
        credits: u32,
    },
    SkillUpgraded {
        player: PlayerId,
        skill: SkillId,
        level: u32,
    },
    SkillDowngraded {
        player: PlayerId,
        skill: SkillId,
        level: u32,
    },
}

/// Fire-and-forget notification seam. Listeners must not fail the caller.
pub trait ProgressionEventSink {
    fn emit(&mut self, event: ProgressionEvent);
}

/// Default in-process sink, drained by the host after each tick.
#[derive(Resource, Debug, Default)]
pub struct ProgressionEventLog(pub Vec<ProgressionEvent>);

impl ProgressionEventSink for ProgressionEventLog {
    fn emit(&mut self, event: ProgressionEvent) {
        self.0.push(event);
    }
}
