// Framework bootstrap for the game server runtime.

use crate::domain::GameTuning;
use crate::frameworks::config;
use crate::interface_adapters::net::{OutboundFrame, world_update_serializer, ws_handler};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{GameEvent, WorldSettings, WorldUpdate, world_task};

use axum::{Router, extract::ws::Utf8Bytes, routing::get};
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};
use tokio::sync::{broadcast, mpsc, watch};

fn init_runtime() {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state();
    // Start the Web Server
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::new(config::bind_ip(), config::http_port());

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn build_state() -> Arc<AppState> {
    // Setup Channels
    // input_tx/rx: every connection event goes to the single world task.
    let (input_tx, input_rx) = mpsc::channel::<GameEvent>(config::INPUT_CHANNEL_CAPACITY);

    // world_tx/rx: world updates, serialized once before fan-out.
    let (world_tx, world_rx) = broadcast::channel::<WorldUpdate>(config::WORLD_BROADCAST_CAPACITY);

    // world_bytes_tx/rx: serialized updates shared across all clients.
    let (world_bytes_tx, _world_bytes_rx) =
        broadcast::channel::<OutboundFrame>(config::WORLD_BROADCAST_CAPACITY);
    let (world_latest_tx, _world_latest_rx) = watch::channel::<Utf8Bytes>(Utf8Bytes::from(""));

    let settings = WorldSettings {
        tick_interval: config::tick_interval(),
        tuning: GameTuning::default(),
    };
    tracing::debug!(
        tick_ms = settings.tick_interval.as_millis() as u64,
        input_capacity = config::INPUT_CHANNEL_CAPACITY,
        broadcast_capacity = config::WORLD_BROADCAST_CAPACITY,
        "world configured"
    );

    // Spawn the Game Loop (World Task)
    tokio::spawn(world_task(input_rx, world_tx, settings));

    // Spawn the world update serializer task in the adapter layer.
    tokio::spawn(world_update_serializer(
        world_rx,
        world_bytes_tx.clone(),
        world_latest_tx.clone(),
    ));

    Arc::new(AppState {
        input_tx,
        world_bytes_tx,
        world_latest_tx,
    })
}
