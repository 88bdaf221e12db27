// Use cases layer: application workflows for the game server.

pub mod game;
pub mod types;

pub use game::{Simulation, WorldSettings, world_task};
pub use types::{GameEvent, JoinAccepted, WorldEvent, WorldUpdate};
