// Use-case level inputs/outputs for the game loop.

use crate::domain::{MapSize, PlayerId, PlayerInput, PlayerSnapshot, WorldSnapshot};
use tokio::sync::oneshot;

#[derive(Debug)]
pub enum GameEvent {
    // A connection was accepted; the world answers on `reply` with the init payload.
    Join {
        player_id: PlayerId,
        reply: oneshot::Sender<JoinAccepted>,
    },
    Leave {
        player_id: PlayerId,
    },
    Input {
        player_id: PlayerId,
        seq: Option<u64>,
        input: PlayerInput,
    },
    SetName {
        player_id: PlayerId,
        name: String,
    },
}

/// Everything a freshly joined client needs before it starts following updates.
#[derive(Debug, Clone)]
pub struct JoinAccepted {
    pub player_id: PlayerId,
    pub map: MapSize,
    pub state: WorldSnapshot,
    /// Sequence number of the first update published after `state` was captured.
    pub cursor: u64,
}

#[derive(Debug, Clone)]
pub enum WorldEvent {
    Snapshot(WorldSnapshot),
    PlayerJoined(PlayerSnapshot),
    PlayerLeft { player_id: PlayerId },
    NameChanged { player_id: PlayerId, name: String },
}

/// One published update, in publication order.
#[derive(Debug, Clone)]
pub struct WorldUpdate {
    pub seq: u64,
    pub tick: u64,
    // Connection that must not receive this update (the subject of a join).
    pub skip: Option<PlayerId>,
    pub event: WorldEvent,
}
