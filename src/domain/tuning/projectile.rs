/// Gameplay tuning for projectiles.

#[derive(Debug, Clone, Copy)]
pub struct ProjectileTuning {
    /// Projectile speed in pixels per second.
    pub speed: f32,

    /// Lifetime in seconds before the projectile is despawned.
    pub life_time: f32,

    /// Edge length of the square hitbox centered on the projectile.
    pub size: f32,

    /// Health removed from a player on hit.
    pub damage: i32,

    /// Distance outside the map a projectile may travel before it is discarded.
    pub bounds_margin: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            speed: 700.0,
            life_time: 2.0,
            size: 4.0,
            damage: 20,
            bounds_margin: 50.0,
        }
    }
}
