/// Map dimensions and simulation limits.

#[derive(Debug, Clone, Copy)]
pub struct WorldTuning {
    /// Map width in pixels.
    pub width: f32,

    /// Map height in pixels.
    pub height: f32,

    /// Edge length of a building grid cell (and of every block).
    pub grid_size: f32,

    /// Longest step in seconds a single tick may simulate.
    pub max_step: f32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            grid_size: 40.0,
            max_step: 0.1,
        }
    }
}
