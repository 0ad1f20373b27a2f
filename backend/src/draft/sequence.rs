//! The draft order: which slot acts in each state, what it does, and where
//! the draft goes next. Both the player path and the timeout path read this
//! table; nothing else encodes the order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Milliseconds a slot has to act in any active state.
pub const TURN_DURATION_MS: i64 = 30_000;

/// One of the two participant positions in a lobby
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Player1,
    Player2,
}

impl Slot {
    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Player1 => "player1",
            Slot::Player2 => "player2",
        }
    }

    #[cfg(test)]
    pub fn other(self) -> Slot {
        match self {
            Slot::Player1 => Slot::Player2,
            Slot::Player2 => Slot::Player1,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Ban,
    Pick,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionType::Ban => f.write_str("ban"),
            ActionType::Pick => f.write_str("pick"),
        }
    }
}

/// Phase of a lobby. `Waiting`, `ReadyCheck` and `Complete` sit outside the
/// draft order; every other variant has a row in [`DRAFT_SEQUENCE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    #[serde(rename = "waiting")]
    Waiting,
    #[serde(rename = "ready_check")]
    ReadyCheck,
    #[serde(rename = "ban1_p1")]
    Ban1P1,
    #[serde(rename = "ban1_p2")]
    Ban1P2,
    #[serde(rename = "pick1_p1")]
    Pick1P1,
    #[serde(rename = "pick1_p2")]
    Pick1P2,
    #[serde(rename = "pick1_p1_2")]
    Pick1P1Second,
    #[serde(rename = "pick1_p2_2")]
    Pick1P2Second,
    #[serde(rename = "ban2_p1")]
    Ban2P1,
    #[serde(rename = "ban2_p2")]
    Ban2P2,
    #[serde(rename = "pick2_p2")]
    Pick2P2,
    #[serde(rename = "pick2_p1")]
    Pick2P1,
    #[serde(rename = "complete")]
    Complete,
}

impl GameState {
    pub const ALL: [GameState; 13] = [
        GameState::Waiting,
        GameState::ReadyCheck,
        GameState::Ban1P1,
        GameState::Ban1P2,
        GameState::Pick1P1,
        GameState::Pick1P2,
        GameState::Pick1P1Second,
        GameState::Pick1P2Second,
        GameState::Ban2P1,
        GameState::Ban2P2,
        GameState::Pick2P2,
        GameState::Pick2P1,
        GameState::Complete,
    ];

    /// First state of the draft, entered once both slots are ready
    pub const FIRST_TURN: GameState = GameState::Ban1P1;

    pub fn as_str(self) -> &'static str {
        match self {
            GameState::Waiting => "waiting",
            GameState::ReadyCheck => "ready_check",
            GameState::Ban1P1 => "ban1_p1",
            GameState::Ban1P2 => "ban1_p2",
            GameState::Pick1P1 => "pick1_p1",
            GameState::Pick1P2 => "pick1_p2",
            GameState::Pick1P1Second => "pick1_p1_2",
            GameState::Pick1P2Second => "pick1_p2_2",
            GameState::Ban2P1 => "ban2_p1",
            GameState::Ban2P2 => "ban2_p2",
            GameState::Pick2P2 => "pick2_p2",
            GameState::Pick2P1 => "pick2_p1",
            GameState::Complete => "complete",
        }
    }

    /// The table row for this state, if it is an active draft state
    pub fn turn(self) -> Option<&'static Turn> {
        DRAFT_SEQUENCE.iter().find(|turn| turn.state == self)
    }

    pub fn is_active(self) -> bool {
        self.turn().is_some()
    }

    /// Slot expected to act in this state
    pub fn acting_slot(self) -> Option<Slot> {
        self.turn().map(|turn| turn.slot)
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown game state '{0}'")]
pub struct UnknownGameState(pub String);

impl FromStr for GameState {
    type Err = UnknownGameState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| UnknownGameState(s.to_string()))
    }
}

/// A single row of the draft order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Turn {
    pub state: GameState,
    pub slot: Slot,
    pub action: ActionType,
    pub next: GameState,
    pub duration_ms: i64,
}

const fn turn(state: GameState, slot: Slot, action: ActionType, next: GameState) -> Turn {
    Turn {
        state,
        slot,
        action,
        next,
        duration_ms: TURN_DURATION_MS,
    }
}

pub const DRAFT_SEQUENCE: [Turn; 10] = [
    turn(GameState::Ban1P1, Slot::Player1, ActionType::Ban, GameState::Ban1P2),
    turn(GameState::Ban1P2, Slot::Player2, ActionType::Ban, GameState::Pick1P1),
    turn(GameState::Pick1P1, Slot::Player1, ActionType::Pick, GameState::Pick1P2),
    turn(GameState::Pick1P2, Slot::Player2, ActionType::Pick, GameState::Pick1P1Second),
    turn(GameState::Pick1P1Second, Slot::Player1, ActionType::Pick, GameState::Pick1P2Second),
    turn(GameState::Pick1P2Second, Slot::Player2, ActionType::Pick, GameState::Ban2P1),
    turn(GameState::Ban2P1, Slot::Player1, ActionType::Ban, GameState::Ban2P2),
    turn(GameState::Ban2P2, Slot::Player2, ActionType::Ban, GameState::Pick2P2),
    turn(GameState::Pick2P2, Slot::Player2, ActionType::Pick, GameState::Pick2P1),
    turn(GameState::Pick2P1, Slot::Player1, ActionType::Pick, GameState::Complete),
];
