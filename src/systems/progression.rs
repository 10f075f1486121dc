use bevy_ecs::prelude::*;
use bevy_utils::tracing::warn;

use crate::components::player::PlayerId;
use crate::components::progression::Progression;
use crate::core::world::{IntentQueue, ProgressionIntent};
use crate::events::ProgressionEventLog;
use crate::skills::SkillLibrary;

/// System: applies queued XP grants, skill spends, and resets to the
/// addressed player. Intents naming an unknown player index are dropped.
pub fn progression_apply_system(
    intents: Res<IntentQueue>,
    mut log: ResMut<ProgressionEventLog>,
    mut players: Query<(&PlayerId, &mut Progression)>,
) {
    log.0.clear();

    for intent in intents.0.iter() {
        match intent {
            ProgressionIntent::GiveXp {
                player_index,
                amount,
            } => {
                let Some((id, mut progression)) =
                    players.iter_mut().find(|(id, _)| id.0 == *player_index)
                else {
                    continue;
                };
                let id = *id;
                if let Err(err) = progression.give_xp(id, *amount, &mut *log) {
                    warn!("rejected xp grant for player {}: {}", player_index, err);
                }
            }
            ProgressionIntent::UpgradeSkill {
                player_index,
                skill_id,
            } => {
                let Some((id, mut progression)) =
                    players.iter_mut().find(|(id, _)| id.0 == *player_index)
                else {
                    continue;
                };
                let id = *id;
                progression.upgrade_skill(id, skill_id, &mut *log);
            }
            ProgressionIntent::DowngradeSkill {
                player_index,
                skill_id,
            } => {
                let Some((id, mut progression)) =
                    players.iter_mut().find(|(id, _)| id.0 == *player_index)
                else {
                    continue;
                };
                let id = *id;
                progression.downgrade_skill(id, skill_id, &mut *log);
            }
            ProgressionIntent::ResetProgress { player_index } => {
                if let Some((_, mut progression)) =
                    players.iter_mut().find(|(id, _)| id.0 == *player_index)
                {
                    progression.reset_progress();
                }
            }
            // Dispatched after progression has settled for the tick.
            ProgressionIntent::GameEvent { .. } => {}
        }
    }
}

/// System: forwards queued game events to the invested skills of the
/// addressed player.
pub fn skill_dispatch_system(
    intents: Res<IntentQueue>,
    mut library: ResMut<SkillLibrary>,
    players: Query<(&PlayerId, &Progression)>,
) {
    for intent in intents.0.iter() {
        let ProgressionIntent::GameEvent {
            player_index,
            event_name,
            args,
        } = intent
        else {
            continue;
        };

        if let Some((id, progression)) = players.iter().find(|(id, _)| id.0 == *player_index) {
            progression.execute_skill_callbacks(*id, event_name, args, &mut library);
        }
    }
}
