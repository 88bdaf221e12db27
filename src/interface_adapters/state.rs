use crate::interface_adapters::net::OutboundFrame;
use crate::use_cases::GameEvent;
use axum::extract::ws::Utf8Bytes;
use tokio::sync::{broadcast, mpsc, watch};

#[derive(Clone)]
pub struct AppState {
    // Events flowing from connections into the world task.
    pub input_tx: mpsc::Sender<GameEvent>,
    // Serialized world updates, shared across all connections.
    pub world_bytes_tx: broadcast::Sender<OutboundFrame>,
    // Latest serialized snapshot for lag recovery.
    pub world_latest_tx: watch::Sender<Utf8Bytes>,
}
