use crate::domain::state::SimPlayer;
use crate::domain::systems::building::BlockGrid;
use crate::domain::tuning::{PlayerTuning, WorldTuning};

#[derive(Debug, Clone, Copy)]
pub struct MovementConfig {
    pub gravity: f32,       // px/s^2
    pub jump_velocity: f32, // px/s, negative is up

    pub map_width: f32,
    pub map_height: f32,
}

impl MovementConfig {
    pub fn new(player: &PlayerTuning, world: &WorldTuning) -> Self {
        Self {
            gravity: player.gravity,
            jump_velocity: player.jump_velocity,
            map_width: world.width,
            map_height: world.height,
        }
    }
}

/// Turns the held keys into velocity changes.
pub fn apply_intent(p: &mut SimPlayer, cfg: MovementConfig) {
    let input = *p.input.input();

    // Velocity is set outright; there is no acceleration curve.
    let mut target_vx = 0.0;
    if input.left {
        target_vx -= p.speed;
    }
    if input.right {
        target_vx += p.speed;
    }
    p.vx = target_vx;

    if input.jump && p.on_ground {
        p.vy = cfg.jump_velocity;
        p.on_ground = false;
    }
}

pub fn tick_player(p: &mut SimPlayer, blocks: &BlockGrid, dt: f32, cfg: MovementConfig) {
    apply_intent(p, cfg);

    p.vy += cfg.gravity * dt;

    let prev_bottom = p.y + p.h;
    p.x += p.vx * dt;
    p.y += p.vy * dt;

    p.x = p.x.clamp(0.0, cfg.map_width - p.w);

    let floor = cfg.map_height - p.h;
    if p.y > floor {
        p.y = floor;
        p.vy = 0.0;
        p.on_ground = true;
        return;
    }

    p.on_ground = false;
    // Creation order; a later block overrides an earlier push.
    for block in blocks.iter() {
        let b = block.rect;
        if !p.rect().intersects(&b) {
            continue;
        }

        if p.vy > 0.0 && prev_bottom <= b.y {
            // Landed on top.
            p.y = b.y - p.h;
            p.vy = 0.0;
            p.on_ground = true;
        } else {
            if p.x < b.x {
                p.x = b.x - p.w;
            } else {
                p.x = b.right();
            }
            p.vx = 0.0;
        }
    }

    // Pushes may shove the player past the map edge.
    p.x = p.x.clamp(0.0, cfg.map_width - p.w);
    if p.y < 0.0 {
        p.y = 0.0;
        p.vy = p.vy.max(0.0);
    }
}
