use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::player::PlayerId;
use crate::components::skill::{Skill, SkillId};
use crate::events::{ProgressionEvent, ProgressionEventSink};
use crate::rules::xp::{required_xp, LEVEL_UP_CREDITS};
use crate::skills::{SkillCall, SkillEventArgs, SkillLibrary};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressionError {
    NegativeXpAmount(i32),
}

impl std::fmt::Display for ProgressionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressionError::NegativeXpAmount(amount) => {
                write!(f, "negative value {} passed for give_xp", amount)
            }
        }
    }
}

impl std::error::Error for ProgressionError {}

/// Leveling state and skill investments for one player.
///
/// Levels are derived from XP: every time accumulated XP strictly exceeds
/// the current threshold, one level and [`LEVEL_UP_CREDITS`] credits are
/// granted. Credits are spent on skill upgrades. The component owns the
/// skill investment records but not the behavior behind them; effects live
/// in the [`SkillLibrary`].
#[derive(Component, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Progression {
    level: u32,
    xp: u32,
    credits: u32,
    pub skills: Vec<Skill>,
}

impl Progression {
    pub fn new(level: u32, xp: u32, credits: u32, skills: Vec<Skill>) -> Self {
        Self {
            level,
            xp,
            credits,
            skills,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn xp(&self) -> u32 {
        self.xp
    }

    pub fn credits(&self) -> u32 {
        self.credits
    }

    /// XP threshold to advance past the current level. Recomputed on
    /// demand since the level moves during a grant.
    pub fn required_xp(&self) -> u32 {
        required_xp(self.level)
    }

    /// Add XP and grant any levels and credits the new total covers.
    ///
    /// A large grant may cross several thresholds; a single `LevelUp`
    /// event carries the whole batch. Landing exactly on the threshold
    /// does not level.
    pub fn give_xp(
        &mut self,
        player: PlayerId,
        amount: i32,
        events: &mut dyn ProgressionEventSink,
    ) -> Result<(), ProgressionError> {
        if amount < 0 {
            return Err(ProgressionError::NegativeXpAmount(amount));
        }
        self.xp += amount as u32;
        let initial_level = self.level;
        let initial_credits = self.credits;
        while self.xp > self.required_xp() {
            self.xp -= self.required_xp();
            self.level += 1;
            self.credits += LEVEL_UP_CREDITS;
        }
        if self.level > initial_level {
            events.emit(ProgressionEvent::LevelUp {
                player,
                levels: self.level - initial_level,
                credits: self.credits - initial_credits,
            });
        }
        Ok(())
    }

    /// Zero out level, XP, credits, and every skill's invested level.
    pub fn reset_progress(&mut self) {
        self.level = 0;
        self.xp = 0;
        self.credits = 0;
        for skill in self.skills.iter_mut() {
            skill.level = 0;
        }
    }

    pub fn can_upgrade_skill(&self, id: &SkillId) -> bool {
        match self.find_skill(id) {
            Some(skill) => {
                self.credits >= skill.upgrade_cost
                    && skill.max_level.map_or(true, |max| max > skill.level)
            }
            None => false,
        }
    }

    pub fn can_downgrade_skill(&self, id: &SkillId) -> bool {
        self.find_skill(id).map_or(false, |skill| skill.level > 0)
    }

    /// Spend credits to raise a skill one level. Does nothing when the
    /// skill is unknown, unaffordable, or already capped.
    pub fn upgrade_skill(
        &mut self,
        player: PlayerId,
        id: &SkillId,
        events: &mut dyn ProgressionEventSink,
    ) -> bool {
        if !self.can_upgrade_skill(id) {
            return false;
        }
        let Some(skill) = self.find_skill_mut(id) else {
            return false;
        };
        let cost = skill.upgrade_cost;
        skill.level += 1;
        let level = skill.level;
        let skill_id = skill.class_id.clone();
        self.credits -= cost;
        events.emit(ProgressionEvent::SkillUpgraded {
            player,
            skill: skill_id,
            level,
        });
        true
    }

    /// Refund a skill one level down. Does nothing when the skill is
    /// unknown or has no levels to give back.
    pub fn downgrade_skill(
        &mut self,
        player: PlayerId,
        id: &SkillId,
        events: &mut dyn ProgressionEventSink,
    ) -> bool {
        if !self.can_downgrade_skill(id) {
            return false;
        }
        let Some(skill) = self.find_skill_mut(id) else {
            return false;
        };
        let refund = skill.downgrade_refund;
        skill.level -= 1;
        let level = skill.level;
        let skill_id = skill.class_id.clone();
        self.credits += refund;
        events.emit(ProgressionEvent::SkillDowngraded {
            player,
            skill: skill_id,
            level,
        });
        true
    }

    /// Run every invested skill's effect for `event_name`, in insertion
    /// order. Skills at level 0 contribute nothing.
    pub fn execute_skill_callbacks(
        &self,
        player: PlayerId,
        event_name: &str,
        args: &SkillEventArgs,
        library: &mut SkillLibrary,
    ) {
        for skill in self.skills.iter() {
            if skill.level == 0 {
                continue;
            }
            if let Some(effect) = library.effect_mut(&skill.class_id) {
                effect.on_event(
                    event_name,
                    &SkillCall {
                        player,
                        skill_level: skill.level,
                        args,
                    },
                );
            }
        }
    }

    /// First skill matching `class_id`, if any. Duplicate ids are
    /// unsupported; the first match wins.
    pub fn find_skill(&self, id: &SkillId) -> Option<&Skill> {
        self.skills.iter().find(|skill| &skill.class_id == id)
    }

    pub fn find_skill_mut(&mut self, id: &SkillId) -> Option<&mut Skill> {
        self.skills.iter_mut().find(|skill| &skill.class_id == id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::events::ProgressionEventLog;
    use crate::skills::SkillEffect;

    fn skill(id: &str, cost: u32, refund: u32, max: Option<u32>) -> Skill {
        Skill::new(SkillId::new(id), cost, refund, max)
    }

    fn player() -> PlayerId {
        PlayerId(7)
    }

    #[test]
    fn xp_on_threshold_does_not_level() {
        let mut progression = Progression::default();
        let mut log = ProgressionEventLog::default();
        progression.give_xp(player(), 300, &mut log).unwrap();
        assert_eq!(progression.level(), 0);
        assert_eq!(progression.xp(), 300);
        assert_eq!(progression.credits(), 0);
        assert!(log.0.is_empty());
    }

    #[test]
    fn xp_past_threshold_levels_once() {
        let mut progression = Progression::default();
        let mut log = ProgressionEventLog::default();
        progression.give_xp(player(), 301, &mut log).unwrap();
        assert_eq!(progression.level(), 1);
        assert_eq!(progression.xp(), 1);
        assert_eq!(progression.credits(), 5);
        assert_eq!(
            log.0,
            vec![ProgressionEvent::LevelUp {
                player: player(),
                levels: 1,
                credits: 5,
            }]
        );
    }

    #[test]
    fn large_grant_levels_twice_with_one_event() {
        let mut progression = Progression::default();
        let mut log = ProgressionEventLog::default();
        progression.give_xp(player(), 700, &mut log).unwrap();
        // 700 clears 300 (level 1) and 315 (level 2), leaving 85.
        assert_eq!(progression.level(), 2);
        assert_eq!(progression.xp(), 85);
        assert_eq!(progression.credits(), 10);
        assert_eq!(
            log.0,
            vec![ProgressionEvent::LevelUp {
                player: player(),
                levels: 2,
                credits: 10,
            }]
        );
    }

    #[test]
    fn negative_amount_is_rejected_without_mutation() {
        let mut progression = Progression::new(1, 50, 5, vec![skill("jump", 1, 1, None)]);
        let mut log = ProgressionEventLog::default();
        let err = progression.give_xp(player(), -1, &mut log).unwrap_err();
        assert_eq!(err, ProgressionError::NegativeXpAmount(-1));
        assert_eq!(progression.level(), 1);
        assert_eq!(progression.xp(), 50);
        assert_eq!(progression.credits(), 5);
        assert!(log.0.is_empty());
    }

    #[test]
    fn settled_xp_never_exceeds_threshold() {
        for amount in [0, 1, 299, 300, 301, 615, 5000, 123_456] {
            let mut progression = Progression::default();
            let mut log = ProgressionEventLog::default();
            progression.give_xp(player(), amount, &mut log).unwrap();
            assert!(
                progression.xp() <= progression.required_xp(),
                "xp {} above threshold {} after grant of {}",
                progression.xp(),
                progression.required_xp(),
                amount
            );
        }
    }

    #[test]
    fn upgrade_requires_membership_credits_and_headroom() {
        let mut progression = Progression::new(0, 0, 3, vec![skill("capped", 2, 1, Some(1))]);
        let mut log = ProgressionEventLog::default();

        // Unknown skill.
        assert!(!progression.upgrade_skill(player(), &SkillId::new("missing"), &mut log));

        // Affordable with headroom.
        assert!(progression.upgrade_skill(player(), &SkillId::new("capped"), &mut log));
        assert_eq!(progression.credits(), 1);

        // At max level now.
        assert!(!progression.can_upgrade_skill(&SkillId::new("capped")));
        assert!(!progression.upgrade_skill(player(), &SkillId::new("capped"), &mut log));

        // Insufficient credits.
        progression.skills.push(skill("pricey", 10, 5, None));
        assert!(!progression.upgrade_skill(player(), &SkillId::new("pricey"), &mut log));

        assert_eq!(log.0.len(), 1);
        assert_eq!(progression.credits(), 1);
        assert_eq!(
            progression.find_skill(&SkillId::new("capped")).map(|s| s.level),
            Some(1)
        );
    }

    #[test]
    fn upgrade_then_downgrade_restores_level() {
        let mut progression = Progression::new(0, 0, 10, vec![skill("drain", 4, 1, None)]);
        let mut log = ProgressionEventLog::default();
        let id = SkillId::new("drain");

        assert!(progression.upgrade_skill(player(), &id, &mut log));
        assert!(progression.downgrade_skill(player(), &id, &mut log));

        assert_eq!(progression.find_skill(&id).map(|s| s.level), Some(0));
        // Asymmetric cost schedule: net spend of cost - refund is expected.
        assert_eq!(progression.credits(), 7);
        assert_eq!(log.0.len(), 2);
    }

    #[test]
    fn downgrade_at_zero_is_a_noop() {
        let mut progression = Progression::new(0, 0, 0, vec![skill("jump", 1, 1, None)]);
        let mut log = ProgressionEventLog::default();
        assert!(!progression.can_downgrade_skill(&SkillId::new("jump")));
        assert!(!progression.downgrade_skill(player(), &SkillId::new("jump"), &mut log));
        assert_eq!(progression.credits(), 0);
        assert!(log.0.is_empty());
    }

    #[test]
    fn unbounded_skill_keeps_upgrading() {
        let mut progression = Progression::new(0, 0, 100, vec![skill("open", 1, 0, None)]);
        let mut log = ProgressionEventLog::default();
        let id = SkillId::new("open");
        for _ in 0..50 {
            assert!(progression.upgrade_skill(player(), &id, &mut log));
        }
        assert_eq!(progression.find_skill(&id).map(|s| s.level), Some(50));
        assert_eq!(progression.credits(), 50);
    }

    #[test]
    fn reset_zeroes_progress_and_skill_levels() {
        let mut progression = Progression::new(3, 120, 8, vec![skill("jump", 1, 1, None)]);
        let mut log = ProgressionEventLog::default();
        progression.upgrade_skill(player(), &SkillId::new("jump"), &mut log);

        progression.reset_progress();
        progression.reset_progress(); // idempotent

        assert_eq!(progression.level(), 0);
        assert_eq!(progression.xp(), 0);
        assert_eq!(progression.credits(), 0);
        assert_eq!(
            progression.find_skill(&SkillId::new("jump")).map(|s| s.level),
            Some(0)
        );
    }

    struct RecordingEffect {
        label: &'static str,
        calls: Arc<Mutex<Vec<(String, &'static str, u32)>>>,
    }

    impl SkillEffect for RecordingEffect {
        fn on_event(&mut self, event_name: &str, call: &SkillCall) {
            self.calls
                .lock()
                .unwrap()
                .push((event_name.to_string(), self.label, call.skill_level));
        }
    }

    #[test]
    fn callbacks_skip_unleveled_skills_and_follow_insertion_order() {
        let mut progression = Progression::new(
            0,
            0,
            0,
            vec![
                skill("second", 1, 1, None),
                skill("dormant", 1, 1, None),
                skill("first", 1, 1, None),
            ],
        );
        progression.find_skill_mut(&SkillId::new("second")).unwrap().level = 2;
        progression.find_skill_mut(&SkillId::new("first")).unwrap().level = 1;

        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut library = SkillLibrary::default();
        for label in ["second", "dormant", "first"] {
            library.register(
                SkillId::new(label),
                Box::new(RecordingEffect {
                    label,
                    calls: Arc::clone(&calls),
                }),
            );
        }

        let args = SkillEventArgs::new();
        progression.execute_skill_callbacks(player(), "player_jump", &args, &mut library);

        let recorded = calls.lock().unwrap();
        assert_eq!(
            *recorded,
            vec![
                ("player_jump".to_string(), "second", 2),
                ("player_jump".to_string(), "first", 1),
            ]
        );
    }
}
