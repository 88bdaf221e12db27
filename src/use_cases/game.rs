use super::types::{GameEvent, JoinAccepted, WorldEvent, WorldUpdate};
use crate::domain::{GameTuning, PlayerId, PlayerSnapshot, World};
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Settings for spawning the world task.
#[derive(Debug, Clone)]
pub struct WorldSettings {
    /// Fixed tick interval for the game loop.
    pub tick_interval: Duration,
    /// Gameplay tuning handed to the world.
    pub tuning: GameTuning,
}

/// Owns the world and turns events and elapsed time into published updates.
pub struct Simulation {
    world: World,
    tick: u64,
    next_seq: u64,
    world_tx: broadcast::Sender<WorldUpdate>,
}

impl Simulation {
    pub fn new(world: World, world_tx: broadcast::Sender<WorldUpdate>) -> Self {
        Self {
            world,
            tick: 0,
            next_seq: 0,
            world_tx,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn handle_event(&mut self, ev: GameEvent) {
        match ev {
            GameEvent::Join { player_id, reply } => self.join(player_id, reply),
            GameEvent::Leave { player_id } => {
                if self.world.remove_player(player_id).is_some() {
                    info!(player_id, "player left");
                    self.publish(None, WorldEvent::PlayerLeft { player_id });
                }
            }
            GameEvent::Input {
                player_id,
                seq,
                input,
            } => {
                if !self.world.record_input(player_id, seq, input) {
                    debug!(player_id, "input for unknown player ignored");
                }
            }
            GameEvent::SetName { player_id, name } => {
                let Some(name) = self.world.rename(player_id, &name).map(str::to_owned) else {
                    debug!(player_id, "rename for unknown player ignored");
                    return;
                };
                info!(player_id, %name, "player renamed");
                self.publish(None, WorldEvent::NameChanged { player_id, name });
            }
        }
    }

    fn join(&mut self, player_id: PlayerId, reply: tokio::sync::oneshot::Sender<JoinAccepted>) {
        let joined = PlayerSnapshot::from(self.world.add_player(player_id));
        let accepted = JoinAccepted {
            player_id,
            map: self.world.map_size(),
            state: self.world.snapshot(),
            cursor: self.next_seq,
        };

        if reply.send(accepted).is_err() {
            // The connection is gone before it learned its id; nobody else has seen the player.
            self.world.remove_player(player_id);
            warn!(player_id, "join abandoned before init");
            return;
        }

        info!(player_id, x = joined.x, y = joined.y, name = %joined.name, "player joined");
        self.publish(Some(player_id), WorldEvent::PlayerJoined(joined));
    }

    /// Steps the world by the elapsed wall-clock time and publishes the resulting snapshot.
    pub fn advance(&mut self, elapsed: Duration) {
        self.world.step(elapsed.as_secs_f32());
        self.tick += 1;
        let snapshot = self.world.snapshot();
        self.publish(None, WorldEvent::Snapshot(snapshot));
    }

    fn publish(&mut self, skip: Option<PlayerId>, event: WorldEvent) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        // No receivers just means nobody is connected.
        let _ = self.world_tx.send(WorldUpdate {
            seq,
            tick: self.tick,
            skip,
            event,
        });
    }
}

pub async fn world_task(
    mut input_rx: mpsc::Receiver<GameEvent>,
    world_tx: broadcast::Sender<WorldUpdate>,
    settings: WorldSettings,
) {
    let mut sim = Simulation::new(World::new(settings.tuning), world_tx);

    // Drive the fixed-step game loop at the configured tick rate.
    let mut interval = tokio::time::interval(settings.tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_tick = Instant::now();

    info!(
        tick_ms = settings.tick_interval.as_millis() as u64,
        "world task started"
    );

    loop {
        interval.tick().await;

        // Connection events first, so this tick sees the latest inputs.
        loop {
            match input_rx.try_recv() {
                Ok(ev) => sim.handle_event(ev),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    info!(tick = sim.tick(), "input channel closed; world task exiting");
                    return;
                }
            }
        }

        let now = Instant::now();
        sim.advance(now - last_tick);
        last_tick = now;
    }
}
