/// XP needed to clear level 0.
pub const XP_BASE: u32 = 300;

/// Additional XP needed for every level already gained.
pub const XP_PER_LEVEL: u32 = 15;

/// Credits granted on every level-up.
pub const LEVEL_UP_CREDITS: u32 = 5;

/// XP threshold a player must strictly exceed to advance from `level`.
pub fn required_xp(level: u32) -> u32 {
    XP_BASE + XP_PER_LEVEL * level
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_grows_with_level() {
        assert_eq!(required_xp(0), 300);
        assert_eq!(required_xp(1), 315);
        assert!(required_xp(10) < required_xp(11));
    }
}
