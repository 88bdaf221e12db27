use crate::domain::{PlayerId, PlayerInput};
use crate::interface_adapters::protocol::{
    ClientMessage, InitDto, ServerMessage, is_input_frame, name_from_value,
};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::ids::next_player_id;
use crate::use_cases::{GameEvent, WorldEvent, WorldUpdate};

use axum::{
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::SinkExt;
use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{Instrument, debug, error, info, info_span, warn};

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_MESSAGES: u32 = 10;

#[derive(Debug)]
enum NetError {
    Ws(axum::Error),
    Serialization(serde_json::Error),
    InputClosed,
    JoinRejected,
    WorldUpdatesClosed,
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetError::Ws(e) => write!(f, "websocket error: {e}"),
            NetError::Serialization(e) => write!(f, "serialization error: {e}"),
            NetError::InputClosed => f.write_str("world input channel closed"),
            NetError::JoinRejected => f.write_str("world dropped the join request"),
            NetError::WorldUpdatesClosed => f.write_str("world update channel closed"),
        }
    }
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

/// A serialized world update shared by every connection.
#[derive(Debug, Clone)]
pub struct OutboundFrame {
    pub seq: u64,
    // Connection that must not forward this frame.
    pub skip: Option<PlayerId>,
    pub text: Utf8Bytes,
}

pub async fn world_update_serializer(
    mut world_rx: broadcast::Receiver<WorldUpdate>,
    world_bytes_tx: broadcast::Sender<OutboundFrame>,
    world_latest_tx: watch::Sender<Utf8Bytes>,
) {
    // Serialize each world update once and broadcast the shared bytes.
    loop {
        match world_rx.recv().await {
            Ok(WorldUpdate {
                seq, skip, event, ..
            }) => {
                let is_snapshot = matches!(event, WorldEvent::Snapshot(_));
                let text = match serde_json::to_string(&ServerMessage::from(event)) {
                    Ok(txt) => Utf8Bytes::from(txt),
                    Err(e) => {
                        error!(error = %e, seq, "failed to serialize world update");
                        continue;
                    }
                };

                if is_snapshot {
                    let _ = world_latest_tx.send(text.clone());
                }
                // No subscribers just means nobody is connected.
                let _ = world_bytes_tx.send(OutboundFrame { seq, skip, text });
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(missed = n, "world serializer lagged; skipping to latest update");
            }
            Err(broadcast::error::RecvError::Closed) => {
                info!("world updates channel closed; serializer exiting");
                break;
            }
        }
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    // The connection id doubles as the player id; there is no session resume.
    let player_id = next_player_id();
    let span = info_span!("conn", player_id);
    ws.on_upgrade(move |socket| handle_socket(socket, state, player_id).instrument(span))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, player_id: PlayerId) {
    let mut ctx = match bootstrap_connection(&mut socket, &state, player_id).await {
        Ok(ctx) => ctx,
        Err(e) => {
            error!(error = %e, "failed to bootstrap connection");
            let _ = send_close_with_reason(&mut socket, close_code::ERROR, "join failed").await;
            return;
        }
    };

    info!(player_id, "client connected");

    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = %e, "client loop exited with error");
    }
}

async fn bootstrap_connection(
    socket: &mut WebSocket,
    state: &AppState,
    player_id: PlayerId,
) -> Result<ConnCtx, NetError> {
    // Subscribe before joining so nothing published after the init state is missed.
    let world_bytes_rx = state.world_bytes_tx.subscribe();
    let world_latest_rx = state.world_latest_tx.subscribe();

    let (reply_tx, reply_rx) = oneshot::channel();
    state
        .input_tx
        .send(GameEvent::Join {
            player_id,
            reply: reply_tx,
        })
        .await
        .map_err(|_| NetError::InputClosed)?;
    let accepted = reply_rx.await.map_err(|_| NetError::JoinRejected)?;

    let mut ctx = ConnCtx::new(
        player_id,
        accepted.cursor,
        state.input_tx.clone(),
        world_bytes_rx,
        world_latest_rx,
    );

    let init = ServerMessage::Init(InitDto::from(accepted));
    match send_message(socket, &init).await {
        Ok(bytes) => {
            ctx.stats.record_out(bytes);
            Ok(ctx)
        }
        Err(e) => {
            // The player already exists in the world; take it out again.
            state
                .input_tx
                .send(GameEvent::Leave { player_id })
                .await
                .map_err(|_| NetError::InputClosed)?;
            Err(e)
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<usize, NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    socket.send(Message::Text(txt.into())).await?;
    Ok(bytes)
}

async fn send_close_with_reason(
    socket: &mut WebSocket,
    code: u16,
    reason: &'static str,
) -> Result<(), NetError> {
    socket
        .send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.into(),
        })))
        .await?;
    socket.close().await?;
    Ok(())
}

enum LoopControl {
    Continue,
    Disconnect,
}

/// Lets one warning through per `LOG_THROTTLE` window.
struct Throttle {
    last: Option<Instant>,
}

impl Throttle {
    fn new() -> Self {
        Self { last: None }
    }

    fn ready(&mut self) -> bool {
        let now = Instant::now();
        match self.last {
            Some(last) if now.duration_since(last) < LOG_THROTTLE => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

#[derive(Debug, Default)]
struct ConnStats {
    msgs_in: u64,
    msgs_out: u64,
    bytes_in: u64,
    bytes_out: u64,
    invalid_messages: u32,
    lag_recoveries: u64,
}

impl ConnStats {
    fn record_in(&mut self, bytes: usize) {
        self.msgs_in += 1;
        self.bytes_in += bytes as u64;
    }

    fn record_out(&mut self, bytes: usize) {
        self.msgs_out += 1;
        self.bytes_out += bytes as u64;
    }
}

struct ConnCtx {
    player_id: PlayerId,
    // Frames published before this sequence number predate the init state.
    cursor: u64,
    input_tx: mpsc::Sender<GameEvent>,
    world_bytes_rx: broadcast::Receiver<OutboundFrame>,
    world_latest_rx: watch::Receiver<Utf8Bytes>,
    stats: ConnStats,
    input_full_log: Throttle,
    world_lag_log: Throttle,
    invalid_log: Throttle,
    // Sent just before the socket is closed.
    close_frame: Option<CloseFrame>,
}

impl ConnCtx {
    fn new(
        player_id: PlayerId,
        cursor: u64,
        input_tx: mpsc::Sender<GameEvent>,
        world_bytes_rx: broadcast::Receiver<OutboundFrame>,
        world_latest_rx: watch::Receiver<Utf8Bytes>,
    ) -> Self {
        Self {
            player_id,
            cursor,
            input_tx,
            world_bytes_rx,
            world_latest_rx,
            stats: ConnStats::default(),
            input_full_log: Throttle::new(),
            world_lag_log: Throttle::new(),
            invalid_log: Throttle::new(),
            close_frame: None,
        }
    }

    fn wants(&self, frame: &OutboundFrame) -> bool {
        frame.seq >= self.cursor && frame.skip != Some(self.player_id)
    }

    fn close_with(&mut self, code: u16, reason: &'static str) -> LoopControl {
        self.close_frame = Some(CloseFrame {
            code,
            reason: reason.into(),
        });
        LoopControl::Disconnect
    }

    fn handle_incoming(
        &mut self,
        incoming: Option<Result<Message, axum::Error>>,
    ) -> Result<LoopControl, NetError> {
        match incoming {
            Some(Ok(Message::Text(text))) => {
                self.stats.record_in(text.len());
                self.handle_text(text.as_str())
            }
            Some(Ok(Message::Binary(_))) => Ok(self.close_with(
                close_code::UNSUPPORTED,
                "binary messages not supported",
            )),
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => Ok(LoopControl::Continue),
            Some(Ok(Message::Close(_))) => Ok(LoopControl::Disconnect),
            Some(Err(e)) => {
                warn!(player_id = self.player_id, error = %e, "websocket recv error");
                Ok(LoopControl::Disconnect)
            }
            None => {
                info!(player_id = self.player_id, "websocket closed");
                Ok(LoopControl::Disconnect)
            }
        }
    }

    fn handle_text(&mut self, text: &str) -> Result<LoopControl, NetError> {
        let player_id = self.player_id;
        match serde_json::from_str::<ClientMessage>(text) {
            Ok(ClientMessage::Input(msg)) => self.forward(GameEvent::Input {
                player_id,
                seq: msg.seq,
                input: PlayerInput::from(msg.inputs),
            }),
            Ok(ClientMessage::SetName(value)) => self.forward(GameEvent::SetName {
                player_id,
                name: name_from_value(value),
            }),
            Err(parse_err) => {
                if self.invalid_log.ready() {
                    warn!(
                        player_id,
                        bytes = text.len(),
                        error = %parse_err,
                        "failed to parse client message"
                    );
                }
                // A broken input frame counts as all keys released.
                if is_input_frame(text) {
                    self.forward(GameEvent::Input {
                        player_id,
                        seq: None,
                        input: PlayerInput::default(),
                    })?;
                }

                self.stats.invalid_messages += 1;
                if self.stats.invalid_messages > MAX_INVALID_MESSAGES {
                    return Ok(self.close_with(close_code::POLICY, "too many invalid messages"));
                }
                Ok(LoopControl::Continue)
            }
        }
    }

    fn forward(&mut self, event: GameEvent) -> Result<LoopControl, NetError> {
        match self.input_tx.try_send(event) {
            Ok(()) => Ok(LoopControl::Continue),
            Err(mpsc::error::TrySendError::Full(_)) => {
                if self.input_full_log.ready() {
                    warn!(player_id = self.player_id, "input channel full; dropping message");
                }
                Ok(LoopControl::Continue)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(NetError::InputClosed),
        }
    }

    async fn send_world_bytes(&mut self, socket: &mut WebSocket, text: Utf8Bytes) -> LoopControl {
        let bytes = text.len();
        match socket.send(Message::Text(text)).await {
            Ok(()) => {
                self.stats.record_out(bytes);
                LoopControl::Continue
            }
            Err(e) => {
                warn!(error = %e, "failed to send world update");
                LoopControl::Disconnect
            }
        }
    }

    // Missed frames are gone; the newest snapshot brings the client back in sync.
    async fn recover_from_lag(&mut self, socket: &mut WebSocket, missed: u64) -> LoopControl {
        if self.world_lag_log.ready() {
            warn!(missed, "world updates lagged; sending snapshot");
        }

        let latest = self.world_latest_rx.borrow().clone();
        if latest.is_empty() {
            return LoopControl::Continue;
        }
        self.stats.lag_recoveries += 1;
        debug!(
            bytes = latest.len(),
            count = self.stats.lag_recoveries,
            "sending lag recovery snapshot"
        );
        self.send_world_bytes(socket, latest).await
    }
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    let mut fatal: Option<NetError> = None;

    loop {
        let control = tokio::select! {
            incoming = socket.recv() => ctx.handle_incoming(incoming),

            world_msg = ctx.world_bytes_rx.recv() => match world_msg {
                Ok(frame) if ctx.wants(&frame) => Ok(ctx.send_world_bytes(socket, frame.text).await),
                Ok(_) => Ok(LoopControl::Continue),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    Ok(ctx.recover_from_lag(socket, n).await)
                }
                Err(broadcast::error::RecvError::Closed) => Err(NetError::WorldUpdatesClosed),
            },
        };

        match control {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Disconnect) => break,
            Err(e) => {
                fatal = Some(e);
                break;
            }
        }
    }

    if let Some(frame) = ctx.close_frame.take() {
        let _ = socket.send(Message::Close(Some(frame))).await;
    }
    if let Err(e) = socket.close().await {
        debug!(error = %e, "socket close error");
    }

    if let Err(e) = disconnect_cleanup(ctx).await {
        warn!(error = %e, "error during disconnect cleanup");
        fatal.get_or_insert(e);
    }

    fatal.map_or(Ok(()), Err)
}

async fn disconnect_cleanup(ctx: &ConnCtx) -> Result<(), NetError> {
    let player_id = ctx.player_id;
    // Despawn the player; its blocks go with it.
    ctx.input_tx
        .send(GameEvent::Leave { player_id })
        .await
        .map_err(|_| NetError::InputClosed)?;

    let stats = &ctx.stats;
    debug!(
        player_id,
        msgs_in = stats.msgs_in,
        msgs_out = stats.msgs_out,
        bytes_in = stats.bytes_in,
        bytes_out = stats.bytes_out,
        invalid_messages = stats.invalid_messages,
        lag_recoveries = stats.lag_recoveries,
        "connection stats"
    );
    info!(player_id, "client disconnected");
    Ok(())
}
