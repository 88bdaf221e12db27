// Gameplay tuning, grouped by what it affects.

pub mod player;
pub mod projectile;
pub mod world;

pub use player::PlayerTuning;
pub use projectile::ProjectileTuning;
pub use world::WorldTuning;

/// Every gameplay knob the simulation reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct GameTuning {
    pub world: WorldTuning,
    pub player: PlayerTuning,
    pub projectile: ProjectileTuning,
}
