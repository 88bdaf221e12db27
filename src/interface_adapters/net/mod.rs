// Network adapter for client WebSocket connections.

pub mod client;

pub use client::{OutboundFrame, world_update_serializer, ws_handler};
