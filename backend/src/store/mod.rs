//! Read and conditional-write access to lobby records.

mod memory;
mod sqlite;

pub use memory::MemoryLobbyStore;
pub use sqlite::SqliteLobbyStore;

use crate::draft::{GameState, Slot};
use crate::error::DraftError;
use crate::lobby::{LobbyRecord, TimerState};
use std::future::Future;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Backend(#[from] sqlx::Error),
    #[error("corrupt lobby record {lobby_code}: {detail}")]
    Corrupt { lobby_code: String, detail: String },
}

impl From<StoreError> for DraftError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Backend(err) => DraftError::Transient(err.to_string()),
            err @ StoreError::Corrupt { .. } => DraftError::Fatal(err.to_string()),
        }
    }
}

/// Field-level `SET` expression. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LobbyUpdate {
    pub player1: Option<String>,
    pub player2: Option<String>,
    pub player1_ready: Option<bool>,
    pub player2_ready: Option<bool>,
    pub game_state: Option<GameState>,
    pub picks: Option<Vec<String>>,
    pub bans: Option<Vec<String>>,
    pub timer_state: Option<TimerState>,
}

impl LobbyUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn game_state(mut self, state: GameState) -> Self {
        self.game_state = Some(state);
        self
    }

    pub fn timer_state(mut self, timer: TimerState) -> Self {
        self.timer_state = Some(timer);
        self
    }

    pub fn picks(mut self, picks: Vec<String>) -> Self {
        self.picks = Some(picks);
        self
    }

    pub fn bans(mut self, bans: Vec<String>) -> Self {
        self.bans = Some(bans);
        self
    }

    pub fn slot(mut self, slot: Slot, name: impl Into<String>) -> Self {
        match slot {
            Slot::Player1 => self.player1 = Some(name.into()),
            Slot::Player2 => self.player2 = Some(name.into()),
        }
        self
    }

    pub fn ready(mut self, slot: Slot, ready: bool) -> Self {
        match slot {
            Slot::Player1 => self.player1_ready = Some(ready),
            Slot::Player2 => self.player2_ready = Some(ready),
        }
        self
    }

    /// Clears picks, bans, ready flags and the deadline.
    pub fn clear_draft(self) -> Self {
        self.picks(Vec::new())
            .bans(Vec::new())
            .ready(Slot::Player1, false)
            .ready(Slot::Player2, false)
            .timer_state(TimerState::inactive())
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(&self, record: &mut LobbyRecord) {
        if let Some(name) = &self.player1 {
            record.player1.clone_from(name);
        }
        if let Some(name) = &self.player2 {
            record.player2.clone_from(name);
        }
        if let Some(ready) = self.player1_ready {
            record.player1_ready = ready;
        }
        if let Some(ready) = self.player2_ready {
            record.player2_ready = ready;
        }
        if let Some(state) = self.game_state {
            record.game_state = state;
        }
        if let Some(picks) = &self.picks {
            record.picks.clone_from(picks);
        }
        if let Some(bans) = &self.bans {
            record.bans.clone_from(bans);
        }
        if let Some(timer) = self.timer_state {
            record.timer_state = timer;
        }
    }
}

/// Guard evaluated atomically with an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    Always,
    StateIs(GameState),
    SlotVacant(Slot),
}

impl Precondition {
    pub fn holds(&self, record: &LobbyRecord) -> bool {
        match *self {
            Precondition::Always => true,
            Precondition::StateIs(state) => record.game_state == state,
            Precondition::SlotVacant(slot) => !record.is_occupied(slot),
        }
    }
}

/// Result of a conditional write. A failed precondition is an expected
/// outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Updated(LobbyRecord),
    ConditionFailed,
    Missing,
}

pub trait LobbyStore: Send + Sync + 'static {
    /// `Ok(None)` when the lobby does not exist or has expired
    fn get(
        &self,
        lobby_code: &str,
    ) -> impl Future<Output = Result<Option<LobbyRecord>, StoreError>> + Send;

    /// Insert unless a record with the same code exists. Returns false on collision.
    fn insert(&self, record: &LobbyRecord) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn update(
        &self,
        lobby_code: &str,
        update: &LobbyUpdate,
        precondition: Precondition,
    ) -> impl Future<Output = Result<WriteOutcome, StoreError>> + Send;

    /// Returns false if there was nothing to delete
    fn delete(&self, lobby_code: &str) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Lobbies whose timer is running, used to re-arm deadlines on startup
    fn list_timed(&self) -> impl Future<Output = Result<Vec<LobbyRecord>, StoreError>> + Send;

    /// Remove records whose ttl has passed. Returns how many were removed.
    fn purge_expired(&self, now_ms: i64) -> impl Future<Output = Result<u64, StoreError>> + Send;
}
