pub mod player;
pub mod progression;
pub mod skill;
