pub mod progression;

pub use progression::{progression_apply_system, skill_dispatch_system};
