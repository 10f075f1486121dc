// Re-export core modules for use by the binary or other consumers
pub mod components;
pub mod core;
pub mod events;
pub mod rules;
pub mod skills;
pub mod systems;
pub mod world;

// Expose the main Game wrapper and types needed for interaction
pub use crate::core::serialization::SaveState;
pub use crate::core::world::{Game, IntentQueue, PlayerSummary, ProgressionIntent, Snapshot};
pub use crate::events::{ProgressionEvent, ProgressionEventLog, ProgressionEventSink};
