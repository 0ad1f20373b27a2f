mod code;
mod record;

pub use code::generate_lobby_code;
pub use record::{LOBBY_TTL_MS, LobbyRecord, TimerState};

/// Current wall-clock time in milliseconds since the epoch
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
