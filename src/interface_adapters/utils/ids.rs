use std::{
    sync::{
        OnceLock,
        atomic::{AtomicU64, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};

fn seed_from_clock() -> u64 {
    // Ids differ across restarts.
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Hands out the id for a new connection.
///
/// Ids are process-unique and strictly increasing, so ordering players by id is join order.
pub fn next_player_id() -> u64 {
    static COUNTER: OnceLock<AtomicU64> = OnceLock::new();
    let counter = COUNTER.get_or_init(|| AtomicU64::new(seed_from_clock()));
    counter.fetch_add(1, Ordering::Relaxed)
}
