// Domain layer: core simulation types and rules.

pub mod geometry;
pub mod input;
pub mod state;
pub mod systems;
pub mod tuning;
pub mod world;

pub use input::{Aim, PlayerInput};
pub use state::{
    BlockSnapshot, BulletSnapshot, EntityId, MapSize, PlayerId, PlayerSnapshot, SimBlock,
    SimBullet, SimPlayer, WorldSnapshot,
};
pub use systems::building::BuildError;
pub use tuning::GameTuning;
pub use world::World;
