/// Gameplay tuning for player avatars.
///
/// Keep this separate from runtime/server configuration (tick rates, buffer sizes, etc.).

#[derive(Debug, Clone, Copy)]
pub struct PlayerTuning {
    /// Collision box width in pixels.
    pub width: f32,

    /// Collision box height in pixels.
    pub height: f32,

    /// Horizontal speed in pixels per second while a direction is held.
    pub max_speed: f32,

    /// Vertical velocity applied on jump (negative is up).
    pub jump_velocity: f32,

    /// Downward acceleration in pixels per second squared.
    pub gravity: f32,

    /// Health on spawn and respawn.
    pub max_hp: i32,

    /// Longest display name kept, in characters.
    pub name_max_chars: usize,

    /// Spawn x is drawn from `[spawn_margin_left, map_width - spawn_margin_right]`.
    pub spawn_margin_left: f32,
    pub spawn_margin_right: f32,

    /// Spawn height for newly connected players.
    pub spawn_y: f32,

    /// Spawn height after death.
    pub respawn_y: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            width: 28.0,
            height: 48.0,
            max_speed: 220.0,
            jump_velocity: -420.0,
            gravity: 900.0,
            max_hp: 100,
            name_max_chars: 20,
            spawn_margin_left: 50.0,
            spawn_margin_right: 150.0,
            spawn_y: 100.0,
            respawn_y: 50.0,
        }
    }
}
