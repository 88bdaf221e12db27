// Per-tick systems that mutate simulation state.

pub mod building;
pub mod movement;
pub mod projectiles;
