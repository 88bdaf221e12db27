use crate::domain::state::{EntityId, PlayerId, SimBullet, SimPlayer};
use crate::domain::systems::building::BlockGrid;
use crate::domain::tuning::{ProjectileTuning, WorldTuning};
use std::collections::BTreeMap;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy)]
pub struct ProjectileConfig {
    pub speed: f32,
    pub ttl: f32,
    pub size: f32,
    pub damage: i32,
    pub margin: f32,
    pub map_width: f32,
    pub map_height: f32,
}

impl ProjectileConfig {
    pub fn new(projectile: &ProjectileTuning, world: &WorldTuning) -> Self {
        Self {
            speed: projectile.speed,
            ttl: projectile.life_time,
            size: projectile.size,
            damage: projectile.damage,
            margin: projectile.bounds_margin,
            map_width: world.width,
            map_height: world.height,
        }
    }

    fn out_of_bounds(&self, x: f32, y: f32) -> bool {
        x < -self.margin
            || x > self.map_width + self.margin
            || y < -self.margin
            || y > self.map_height + self.margin
    }
}

/// Fires from `shooter`'s center toward `(target_x, target_y)`.
///
/// A target on the center itself yields a bullet with zero velocity.
pub fn spawn_projectile(
    shooter: &SimPlayer,
    target_x: f32,
    target_y: f32,
    projectiles: &mut Vec<SimBullet>,
    next_entity_id: &mut EntityId,
    cfg: ProjectileConfig,
) -> EntityId {
    let (x, y) = shooter.center();
    let dx = target_x - x;
    let dy = target_y - y;
    let len = (dx * dx + dy * dy).sqrt();
    let len = if len > 0.0 { len } else { 1.0 };

    let id = *next_entity_id;
    *next_entity_id = next_entity_id.wrapping_add(1);
    projectiles.push(SimBullet {
        id,
        owner_id: shooter.id,
        x,
        y,
        vx: dx / len * cfg.speed,
        vy: dy / len * cfg.speed,
        life: cfg.ttl,
    });
    id
}

pub fn tick_projectiles(
    players: &mut BTreeMap<PlayerId, SimPlayer>,
    blocks: &mut BlockGrid,
    projectiles: &mut Vec<SimBullet>,
    dt: f32,
    cfg: ProjectileConfig,
    mut respawn: impl FnMut(&mut SimPlayer),
) {
    // Oldest first: when two bullets reach one block in a tick, the older one destroys it.
    projectiles.retain_mut(|p| {
        p.x += p.vx * dt;
        p.y += p.vy * dt;
        p.life -= dt;

        let hitbox = p.hitbox(cfg.size);
        let mut hit = false;

        // Blocks absorb the shot before any player behind them.
        if let Some(block) = blocks.remove_first_hit(&hitbox) {
            debug!(
                block_id = block.id,
                shooter_id = p.owner_id,
                projectile_id = p.id,
                "block destroyed"
            );
            hit = true;
        }

        if !hit {
            for e in players.values_mut() {
                if e.id == p.owner_id {
                    continue;
                }
                if !hitbox.intersects(&e.rect()) {
                    continue;
                }

                e.health = (e.health - cfg.damage).max(0);
                info!(
                    victim_id = e.id,
                    shooter_id = p.owner_id,
                    projectile_id = p.id,
                    victim_hp = e.health,
                    "player hit"
                );
                if e.health == 0 {
                    respawn(e);
                    info!(player_id = e.id, x = e.x, y = e.y, "player respawned");
                }
                hit = true;
                break;
            }
        }

        !(hit || p.life <= 0.0 || cfg.out_of_bounds(p.x, p.y))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::GridCell;
    use crate::domain::input::LatestInput;
    use assert_approx_eq::assert_approx_eq;

    fn cfg() -> ProjectileConfig {
        ProjectileConfig::new(&ProjectileTuning::default(), &WorldTuning::default())
    }

    fn player(id: PlayerId, x: f32, y: f32, health: i32) -> SimPlayer {
        SimPlayer {
            id,
            x,
            y,
            w: 28.0,
            h: 48.0,
            vx: 0.0,
            vy: 0.0,
            speed: 220.0,
            on_ground: false,
            health,
            name: format!("P-{id:04}"),
            input: LatestInput::default(),
        }
    }

    fn bullet(owner_id: PlayerId, x: f32, y: f32, vx: f32, vy: f32) -> SimBullet {
        SimBullet {
            id: 100,
            owner_id,
            x,
            y,
            vx,
            vy,
            life: 2.0,
        }
    }

    fn roster(players: Vec<SimPlayer>) -> BTreeMap<PlayerId, SimPlayer> {
        players.into_iter().map(|p| (p.id, p)).collect()
    }

    #[test]
    fn when_aimed_along_x_then_projectile_moves_only_along_x() {
        let shooter = player(1, 100.0, 100.0, 100);
        let mut players = roster(vec![]);
        let mut blocks = BlockGrid::new();
        let mut projectiles = Vec::new();
        let mut next_id = 1;

        spawn_projectile(&shooter, 300.0, 124.0, &mut projectiles, &mut next_id, cfg());
        assert_eq!(next_id, 2);
        assert_eq!(projectiles[0].x, 114.0);
        assert_eq!(projectiles[0].y, 124.0);

        tick_projectiles(&mut players, &mut blocks, &mut projectiles, 0.1, cfg(), |_| {});

        assert_eq!(projectiles.len(), 1);
        assert_approx_eq!(projectiles[0].x, 184.0, 1e-3);
        assert_eq!(projectiles[0].y, 124.0);
        assert_approx_eq!(projectiles[0].vx, 700.0, 1e-3);
        assert_eq!(projectiles[0].vy, 0.0);
    }

    #[test]
    fn when_aimed_at_own_center_then_projectile_has_no_velocity() {
        let shooter = player(1, 100.0, 100.0, 100);
        let mut projectiles = Vec::new();
        let mut next_id = 1;

        spawn_projectile(&shooter, 114.0, 124.0, &mut projectiles, &mut next_id, cfg());

        assert_eq!(projectiles[0].vx, 0.0);
        assert_eq!(projectiles[0].vy, 0.0);
    }

    #[test]
    fn when_lifetime_runs_out_then_projectile_is_removed_even_without_collision() {
        let mut players = roster(vec![]);
        let mut blocks = BlockGrid::new();
        let mut projectiles = vec![bullet(1, 600.0, 400.0, 0.0, 0.0)];

        let mut last_life = f32::INFINITY;
        let mut ticks = 0;
        while let Some(p) = projectiles.first() {
            assert!(p.life < last_life);
            last_life = p.life;
            tick_projectiles(&mut players, &mut blocks, &mut projectiles, 0.1, cfg(), |_| {});
            ticks += 1;
            assert!(ticks <= 21, "projectile outlived its lifetime");
        }
        assert!(ticks >= 20);
    }

    #[test]
    fn when_projectile_leaves_the_map_margin_then_it_is_removed() {
        let mut players = roster(vec![]);
        let mut blocks = BlockGrid::new();
        let mut projectiles = vec![bullet(1, 1240.0, 400.0, 700.0, 0.0)];

        tick_projectiles(&mut players, &mut blocks, &mut projectiles, 0.1, cfg(), |_| {});

        assert!(projectiles.is_empty());
    }

    #[test]
    fn when_projectile_overlaps_a_non_owner_then_damage_is_applied_once() {
        let mut players = roster(vec![player(1, 0.0, 0.0, 100), player(2, 500.0, 500.0, 100)]);
        let mut blocks = BlockGrid::new();
        let mut projectiles = vec![bullet(1, 510.0, 520.0, 0.0, 0.0)];

        tick_projectiles(&mut players, &mut blocks, &mut projectiles, 0.05, cfg(), |_| {});

        assert!(projectiles.is_empty());
        assert_eq!(players[&2].health, 80);
        assert_eq!(players[&1].health, 100);
    }

    #[test]
    fn when_projectile_overlaps_its_owner_then_it_passes_through() {
        let mut players = roster(vec![player(1, 500.0, 500.0, 100)]);
        let mut blocks = BlockGrid::new();
        let mut projectiles = vec![bullet(1, 510.0, 520.0, 0.0, 0.0)];

        tick_projectiles(&mut players, &mut blocks, &mut projectiles, 0.05, cfg(), |_| {});

        assert_eq!(projectiles.len(), 1);
        assert_eq!(players[&1].health, 100);
    }

    #[test]
    fn when_hit_drops_health_to_zero_then_victim_is_respawned() {
        let mut players = roster(vec![player(2, 500.0, 500.0, 20)]);
        let mut blocks = BlockGrid::new();
        let mut projectiles = vec![bullet(1, 510.0, 520.0, 0.0, 0.0)];
        let mut respawned = Vec::new();

        tick_projectiles(&mut players, &mut blocks, &mut projectiles, 0.05, cfg(), |p| {
            respawned.push(p.id);
            p.respawn_at(300.0, 50.0, 100);
        });

        assert_eq!(respawned, vec![2]);
        assert_eq!(players[&2].health, 100);
        assert_eq!((players[&2].x, players[&2].y), (300.0, 50.0));
    }

    #[test]
    fn when_block_is_in_the_way_then_block_absorbs_the_shot() {
        let mut players = roster(vec![player(2, 500.0, 500.0, 100)]);
        let mut blocks = BlockGrid::new();
        // Cell (12, 12) spans 480..520 on both axes and overlaps the player box too.
        blocks
            .place(7, 3, GridCell { col: 12, row: 12 }, 40.0, [])
            .expect("placement");
        let mut projectiles = vec![bullet(1, 510.0, 510.0, 0.0, 0.0)];

        tick_projectiles(&mut players, &mut blocks, &mut projectiles, 0.05, cfg(), |_| {});

        assert!(projectiles.is_empty());
        assert!(blocks.is_empty());
        assert_eq!(players[&2].health, 100);
    }
}
