pub mod xp;

pub use xp::{required_xp, LEVEL_UP_CREDITS, XP_BASE, XP_PER_LEVEL};
