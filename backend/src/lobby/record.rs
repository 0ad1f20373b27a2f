use crate::draft::{GameState, Slot};
use serde::{Deserialize, Serialize};

/// Lobbies are garbage collected 24 hours after creation.
pub const LOBBY_TTL_MS: i64 = 24 * 60 * 60 * 1000;

/// Deadline for the current state. All-null and inactive outside the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    #[serde(default)]
    pub start_time: Option<i64>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub is_active: bool,
}

impl TimerState {
    pub fn running(start_time: i64, duration: i64) -> Self {
        Self {
            start_time: Some(start_time),
            duration: Some(duration),
            is_active: true,
        }
    }

    pub fn inactive() -> Self {
        Self::default()
    }

    /// Instant the current turn expires, if a deadline applies
    pub fn deadline(&self) -> Option<i64> {
        if !self.is_active {
            return None;
        }
        Some(self.start_time? + self.duration?)
    }
}

/// Persisted state of one draft lobby. Fields missing from older records
/// deserialize to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyRecord {
    pub lobby_code: String,
    #[serde(default)]
    pub organizer_name: String,
    #[serde(default)]
    pub player1: String,
    #[serde(default)]
    pub player2: String,
    #[serde(default)]
    pub player1_ready: bool,
    #[serde(default)]
    pub player2_ready: bool,
    #[serde(default)]
    pub game_state: GameState,
    #[serde(default)]
    pub picks: Vec<String>,
    #[serde(default)]
    pub bans: Vec<String>,
    #[serde(default)]
    pub timer_state: TimerState,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub ttl: i64,
}

impl LobbyRecord {
    pub fn new(lobby_code: impl Into<String>, organizer_name: impl Into<String>, now_ms: i64) -> Self {
        Self {
            lobby_code: lobby_code.into(),
            organizer_name: organizer_name.into(),
            player1: String::new(),
            player2: String::new(),
            player1_ready: false,
            player2_ready: false,
            game_state: GameState::Waiting,
            picks: Vec::new(),
            bans: Vec::new(),
            timer_state: TimerState::inactive(),
            created_at: now_ms,
            ttl: now_ms + LOBBY_TTL_MS,
        }
    }

    pub fn slot_name(&self, slot: Slot) -> &str {
        match slot {
            Slot::Player1 => &self.player1,
            Slot::Player2 => &self.player2,
        }
    }

    pub fn is_occupied(&self, slot: Slot) -> bool {
        !self.slot_name(slot).trim().is_empty()
    }

    pub fn both_slots_occupied(&self) -> bool {
        self.is_occupied(Slot::Player1) && self.is_occupied(Slot::Player2)
    }

    /// Slot currently holding `name`, compared without surrounding whitespace
    pub fn slot_of(&self, name: &str) -> Option<Slot> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        [Slot::Player1, Slot::Player2]
            .into_iter()
            .find(|&slot| self.slot_name(slot).trim() == name)
    }

    /// True if `value` was already picked or banned in this lobby
    pub fn is_selected(&self, value: &str) -> bool {
        self.picks.iter().chain(&self.bans).any(|v| v == value)
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.ttl > 0 && self.ttl <= now_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sparse_record_reads_with_defaults() {
        let record: LobbyRecord = serde_json::from_value(json!({
            "lobbyCode": "ab12-0042",
            "organizerName": "Alice",
        }))
        .unwrap();

        assert_eq!(record.game_state, GameState::Waiting);
        assert_eq!(record.player1, "");
        assert_eq!(record.player2, "");
        assert!(!record.player1_ready);
        assert!(record.picks.is_empty());
        assert!(record.bans.is_empty());
        assert_eq!(record.timer_state, TimerState::inactive());
    }

    #[test]
    fn serializes_with_flat_camel_case_keys() {
        let mut record = LobbyRecord::new("ABCD", "Alice", 1_000);
        record.game_state = GameState::Pick1P1Second;
        record.timer_state = TimerState::running(1_000, 30_000);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["lobbyCode"], "ABCD");
        assert_eq!(value["player1Ready"], false);
        assert_eq!(value["gameState"], "pick1_p1_2");
        assert_eq!(value["timerState"]["startTime"], 1_000);
        assert_eq!(value["timerState"]["isActive"], true);
        assert_eq!(value["ttl"], 1_000 + LOBBY_TTL_MS);
    }

    #[test]
    fn deadline_requires_an_active_timer() {
        assert_eq!(TimerState::running(5_000, 30_000).deadline(), Some(35_000));
        assert_eq!(TimerState::inactive().deadline(), None);
    }

    #[test]
    fn slot_lookup_ignores_surrounding_whitespace() {
        let mut record = LobbyRecord::new("ABCD", "Alice", 0);
        record.player2 = " Bob ".to_string();

        assert_eq!(record.slot_of("Bob"), Some(Slot::Player2));
        assert_eq!(record.slot_of(""), None);
        assert!(!record.is_occupied(Slot::Player1));
        assert!(!record.both_slots_occupied());
    }
}
