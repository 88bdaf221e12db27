// Domain-level simulation entities and snapshot types.

use crate::domain::geometry::{GridCell, Rect};
use crate::domain::input::LatestInput;

pub type PlayerId = u64;
pub type EntityId = u64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapSize {
    pub width: f32,
    pub height: f32,
}

pub struct SimPlayer {
    pub id: PlayerId,
    // Top-left corner of the collision box.
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub vx: f32,
    pub vy: f32,
    pub speed: f32,
    pub on_ground: bool,

    // Combat state.
    pub health: i32,

    pub name: String,
    pub input: LatestInput,
}

impl SimPlayer {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Resets combat and motion state at a new position; on-ground is left as is.
    pub fn respawn_at(&mut self, x: f32, y: f32, max_hp: i32) {
        self.health = max_hp;
        self.x = x;
        self.y = y;
        self.vx = 0.0;
        self.vy = 0.0;
    }
}

pub struct SimBlock {
    pub id: EntityId,
    pub owner_id: PlayerId,
    pub cell: GridCell,
    pub rect: Rect,
}

pub struct SimBullet {
    pub id: EntityId,
    pub owner_id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    // Seconds left before despawn.
    pub life: f32,
}

impl SimBullet {
    pub fn hitbox(&self, size: f32) -> Rect {
        Rect::centered(self.x, self.y, size)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub vx: f32,
    pub vy: f32,
    pub speed: f32,
    pub on_ground: bool,
    pub health: i32,
    pub name: String,
    pub input_seq: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockSnapshot {
    pub id: EntityId,
    pub owner_id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulletSnapshot {
    pub id: EntityId,
    pub owner_id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: f32,
}

/// Full copy of the mutable world, in iteration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldSnapshot {
    pub players: Vec<PlayerSnapshot>,
    pub blocks: Vec<BlockSnapshot>,
    pub bullets: Vec<BulletSnapshot>,
}

impl From<&SimPlayer> for PlayerSnapshot {
    fn from(p: &SimPlayer) -> Self {
        Self {
            id: p.id,
            x: p.x,
            y: p.y,
            w: p.w,
            h: p.h,
            vx: p.vx,
            vy: p.vy,
            speed: p.speed,
            on_ground: p.on_ground,
            health: p.health,
            name: p.name.clone(),
            input_seq: p.input.seq(),
        }
    }
}

impl From<&SimBlock> for BlockSnapshot {
    fn from(b: &SimBlock) -> Self {
        Self {
            id: b.id,
            owner_id: b.owner_id,
            x: b.rect.x,
            y: b.rect.y,
            w: b.rect.w,
            h: b.rect.h,
        }
    }
}

impl From<&SimBullet> for BulletSnapshot {
    fn from(b: &SimBullet) -> Self {
        Self {
            id: b.id,
            owner_id: b.owner_id,
            x: b.x,
            y: b.y,
            vx: b.vx,
            vy: b.vy,
            life: b.life,
        }
    }
}
