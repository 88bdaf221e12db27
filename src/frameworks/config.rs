use std::{env, net::IpAddr, time::Duration};

// Runtime/server constants (not gameplay tuning).

pub const DEFAULT_HTTP_PORT: u16 = 3000;
pub const DEFAULT_TICK_RATE_HZ: u32 = 30;

pub fn http_port() -> u16 {
    env::var("GAME_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_HTTP_PORT)
}

pub fn bind_ip() -> IpAddr {
    env::var("GAME_SERVER_HOST")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(IpAddr::from([127, 0, 0, 1]))
}

pub fn tick_rate_hz() -> u32 {
    parse_tick_rate(env::var("GAME_TICK_RATE").ok().as_deref())
}

pub fn tick_interval() -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(tick_rate_hz()))
}

fn parse_tick_rate(raw: Option<&str>) -> u32 {
    raw.and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|hz| *hz > 0)
        .unwrap_or(DEFAULT_TICK_RATE_HZ)
}

pub const INPUT_CHANNEL_CAPACITY: usize = 1024;
pub const WORLD_BROADCAST_CAPACITY: usize = 128;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_tick_rate_is_missing_or_invalid_then_default_is_used() {
        assert_eq!(parse_tick_rate(None), 30);
        assert_eq!(parse_tick_rate(Some("fast")), 30);
        assert_eq!(parse_tick_rate(Some("0")), 30);
    }

    #[test]
    fn when_tick_rate_is_set_then_it_is_parsed() {
        assert_eq!(parse_tick_rate(Some(" 60 ")), 60);
    }
}
