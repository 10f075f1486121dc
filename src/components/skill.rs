use serde::{Deserialize, Serialize};

/// Stable identifier a skill is looked up by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkillId(pub String);

impl SkillId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for SkillId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One player's investment record for a single skill.
///
/// Costs are opaque values computed by whoever defines the skill; this
/// crate only spends and refunds them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub class_id: SkillId,
    pub level: u32,
    /// Upper bound on investment. `None` means unbounded.
    #[serde(default)]
    pub max_level: Option<u32>,
    pub upgrade_cost: u32,
    pub downgrade_refund: u32,
}

impl Skill {
    pub fn new(
        class_id: SkillId,
        upgrade_cost: u32,
        downgrade_refund: u32,
        max_level: Option<u32>,
    ) -> Self {
        Self {
            class_id,
            level: 0,
            max_level,
            upgrade_cost,
            downgrade_refund,
        }
    }
}
