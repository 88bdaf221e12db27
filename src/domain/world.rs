// The single authoritative world: players, blocks and bullets plus the rules that change them.

use crate::domain::geometry::{GridCell, Rect};
use crate::domain::input::{LatestInput, PlayerInput};
use crate::domain::state::{
    BlockSnapshot, BulletSnapshot, EntityId, MapSize, PlayerId, PlayerSnapshot, SimBlock,
    SimBullet, SimPlayer, WorldSnapshot,
};
use crate::domain::systems::building::{BlockGrid, BuildError};
use crate::domain::systems::movement::{self, MovementConfig};
use crate::domain::systems::projectiles::{self, ProjectileConfig};
use crate::domain::tuning::GameTuning;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use tracing::debug;

pub struct World {
    tuning: GameTuning,
    // Keyed by increasing ids so iteration follows join order.
    players: BTreeMap<PlayerId, SimPlayer>,
    blocks: BlockGrid,
    bullets: Vec<SimBullet>,
    next_entity_id: EntityId,
    rng: StdRng,
}

impl World {
    pub fn new(tuning: GameTuning) -> Self {
        Self::with_rng(tuning, StdRng::from_entropy())
    }

    /// Deterministic spawn points, for tests and replays.
    pub fn with_seed(tuning: GameTuning, seed: u64) -> Self {
        Self::with_rng(tuning, StdRng::seed_from_u64(seed))
    }

    fn with_rng(tuning: GameTuning, rng: StdRng) -> Self {
        Self {
            tuning,
            players: BTreeMap::new(),
            blocks: BlockGrid::new(),
            bullets: Vec::new(),
            next_entity_id: 1,
            rng,
        }
    }

    pub fn map_size(&self) -> MapSize {
        MapSize {
            width: self.tuning.world.width,
            height: self.tuning.world.height,
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&SimPlayer> {
        self.players.get(&id)
    }

    pub fn players(&self) -> impl Iterator<Item = &SimPlayer> {
        self.players.values()
    }

    pub fn blocks(&self) -> &BlockGrid {
        &self.blocks
    }

    pub fn bullets(&self) -> &[SimBullet] {
        &self.bullets
    }

    /// Spawns a player for a new connection. An id that is already present is left untouched.
    pub fn add_player(&mut self, id: PlayerId) -> &SimPlayer {
        let x = spawn_x(&mut self.rng, &self.tuning);
        let t = self.tuning.player;
        self.players.entry(id).or_insert_with(|| SimPlayer {
            id,
            x,
            y: t.spawn_y,
            w: t.width,
            h: t.height,
            vx: 0.0,
            vy: 0.0,
            speed: t.max_speed,
            on_ground: false,
            health: t.max_hp,
            name: default_name(id),
            input: LatestInput::default(),
        })
    }

    /// Removes a player and every block it owns.
    pub fn remove_player(&mut self, id: PlayerId) -> Option<SimPlayer> {
        let player = self.players.remove(&id)?;
        let removed = self.blocks.remove_owned_by(id);
        debug!(player_id = id, blocks = removed.len(), "player removed");
        Some(player)
    }

    /// Stores the latest input for a player; returns false for unknown ids.
    pub fn record_input(&mut self, id: PlayerId, seq: Option<u64>, input: PlayerInput) -> bool {
        match self.players.get_mut(&id) {
            Some(player) => {
                player.input.overwrite(seq, input);
                true
            }
            None => false,
        }
    }

    /// Sets a display name, truncated to the configured length.
    pub fn rename(&mut self, id: PlayerId, requested: &str) -> Option<&str> {
        let max = self.tuning.player.name_max_chars;
        let player = self.players.get_mut(&id)?;
        player.name = requested.chars().take(max).collect();
        Some(&player.name)
    }

    pub fn spawn_bullet(&mut self, shooter_id: PlayerId, x: f32, y: f32) -> Option<EntityId> {
        let shooter = self.players.get(&shooter_id)?;
        let cfg = ProjectileConfig::new(&self.tuning.projectile, &self.tuning.world);
        Some(projectiles::spawn_projectile(
            shooter,
            x,
            y,
            &mut self.bullets,
            &mut self.next_entity_id,
            cfg,
        ))
    }

    /// Builds a block in the grid cell containing `(x, y)`.
    pub fn place_block(
        &mut self,
        owner_id: PlayerId,
        x: f32,
        y: f32,
    ) -> Result<EntityId, BuildError> {
        let grid = self.tuning.world.grid_size;
        let cell = GridCell::containing(x, y, grid).ok_or(BuildError::OutOfBounds)?;
        if !cell.fits_within(grid, self.tuning.world.width, self.tuning.world.height) {
            return Err(BuildError::OutOfBounds);
        }

        let occupants: Vec<Rect> = self.players.values().map(SimPlayer::rect).collect();
        let id = self.next_entity_id;
        let block_id = self.blocks.place(id, owner_id, cell, grid, &occupants)?.id;
        self.next_entity_id = self.next_entity_id.wrapping_add(1);
        debug!(block_id, owner_id, col = cell.col, row = cell.row, "block placed");
        Ok(block_id)
    }

    /// Removes the block in the grid cell containing `(x, y)`. Any player may remove any block.
    pub fn remove_block_at(&mut self, requester_id: PlayerId, x: f32, y: f32) -> Option<SimBlock> {
        let cell = GridCell::containing(x, y, self.tuning.world.grid_size)?;
        let block = self.blocks.remove_at(cell)?;
        debug!(
            block_id = block.id,
            owner_id = block.owner_id,
            requester_id,
            "block removed"
        );
        Some(block)
    }

    /// Advances the simulation by `dt` seconds, clamped to the configured maximum step.
    pub fn step(&mut self, dt: f32) {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.tuning.world.max_step)
        } else {
            0.0
        };

        let movement_cfg = MovementConfig::new(&self.tuning.player, &self.tuning.world);
        let ids: Vec<PlayerId> = self.players.keys().copied().collect();
        for id in ids {
            let Some(player) = self.players.get_mut(&id) else {
                continue;
            };
            movement::tick_player(player, &self.blocks, dt, movement_cfg);
            let input = *player.input.input();
            self.apply_actions(id, &input);
        }

        let tuning = self.tuning;
        let rng = &mut self.rng;
        projectiles::tick_projectiles(
            &mut self.players,
            &mut self.blocks,
            &mut self.bullets,
            dt,
            ProjectileConfig::new(&tuning.projectile, &tuning.world),
            |p| respawn_player(p, rng, &tuning),
        );
    }

    fn apply_actions(&mut self, id: PlayerId, input: &PlayerInput) {
        let Some(aim) = input.aim else {
            return;
        };

        if input.shoot {
            self.spawn_bullet(id, aim.x, aim.y);
        }
        if input.place {
            if let Err(e) = self.place_block(id, aim.x, aim.y) {
                debug!(player_id = id, error = ?e, "placement rejected");
            }
        }
        if input.remove {
            self.remove_block_at(id, aim.x, aim.y);
        }
    }

    /// Copies the full world state. Never mutates.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            players: self.players.values().map(PlayerSnapshot::from).collect(),
            blocks: self.blocks.iter().map(BlockSnapshot::from).collect(),
            bullets: self.bullets.iter().map(BulletSnapshot::from).collect(),
        }
    }
}

/// Full health and zero velocity at a fresh spawn point; on-ground is left as is.
fn respawn_player(player: &mut SimPlayer, rng: &mut StdRng, tuning: &GameTuning) {
    let x = spawn_x(rng, tuning);
    player.respawn_at(x, tuning.player.respawn_y, tuning.player.max_hp);
}

fn spawn_x(rng: &mut StdRng, tuning: &GameTuning) -> f32 {
    let lo = tuning.player.spawn_margin_left.floor() as i32;
    let hi = (tuning.world.width - tuning.player.spawn_margin_right).floor() as i32;
    if hi < lo {
        return lo as f32;
    }
    rng.gen_range(lo..=hi) as f32
}

fn default_name(id: PlayerId) -> String {
    let hex = format!("{id:04x}");
    format!("P-{}", &hex[hex.len() - 4..])
}
