use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Stable engine-side index for addressing a player externally.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

/// Display name of a player.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct PlayerName(pub String);
