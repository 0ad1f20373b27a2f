//! Pure transitions over a lobby record. Nothing here touches the store or
//! the scheduler; callers persist the returned update.

use super::sequence::{ActionType, GameState, Slot};
use crate::error::{ConflictKind, DraftError, TurnRejection};
use crate::lobby::{LobbyRecord, TimerState};
use crate::store::LobbyUpdate;

/// Result of one accepted ban or pick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    pub record: LobbyRecord,
    pub action: ActionType,
    pub value: String,
    pub previous_state: GameState,
    pub next_state: GameState,
    pub next_slot: Option<Slot>,
}

impl Advance {
    /// Store update that turns the previous record into `self.record`
    pub fn update(&self) -> LobbyUpdate {
        let update = LobbyUpdate::new()
            .game_state(self.next_state)
            .timer_state(self.record.timer_state);
        match self.action {
            ActionType::Ban => update.bans(self.record.bans.clone()),
            ActionType::Pick => update.picks(self.record.picks.clone()),
        }
    }
}

fn timer_for(state: GameState, now_ms: i64) -> TimerState {
    match state.turn() {
        Some(turn) => TimerState::running(now_ms, turn.duration_ms),
        None => TimerState::inactive(),
    }
}

/// Apply `value` as `slot`'s action in the lobby's current state.
///
/// The action type comes from the draft order, so a player and a timeout
/// substitution acting in the same state produce identical records.
pub fn advance(
    lobby: &LobbyRecord,
    slot: Slot,
    value: &str,
    now_ms: i64,
) -> Result<Advance, DraftError> {
    if lobby.is_selected(value) {
        return Err(ConflictKind::AlreadySelected(value.to_string()).into());
    }

    let state = lobby.game_state;
    let Some(turn) = state.turn() else {
        return Err(TurnRejection::InvalidState(state).into());
    };
    if turn.slot != slot {
        return Err(TurnRejection::NotYourTurn { state }.into());
    }

    let mut record = lobby.clone();
    match turn.action {
        ActionType::Ban => record.bans.push(value.to_string()),
        ActionType::Pick => record.picks.push(value.to_string()),
    }
    record.game_state = turn.next;
    record.timer_state = timer_for(turn.next, now_ms);

    Ok(Advance {
        record,
        action: turn.action,
        value: value.to_string(),
        previous_state: state,
        next_state: turn.next,
        next_slot: turn.next.acting_slot(),
    })
}

/// End the draft without a selection. Used when nothing is left to choose.
pub fn force_complete(lobby: &LobbyRecord) -> (LobbyRecord, LobbyUpdate) {
    let mut record = lobby.clone();
    record.game_state = GameState::Complete;
    record.timer_state = TimerState::inactive();
    let update = LobbyUpdate::new()
        .game_state(GameState::Complete)
        .timer_state(TimerState::inactive());
    (record, update)
}

/// Both slots filled while still waiting: the lobby should move to the
/// ready check.
pub fn needs_ready_check(lobby: &LobbyRecord) -> bool {
    lobby.game_state == GameState::Waiting && lobby.both_slots_occupied()
}

/// Both players have confirmed during the ready check
pub fn ready_to_start(lobby: &LobbyRecord) -> bool {
    lobby.game_state == GameState::ReadyCheck && lobby.player1_ready && lobby.player2_ready
}

/// Update that opens the draft with the first turn's deadline
pub fn start_draft(now_ms: i64) -> LobbyUpdate {
    LobbyUpdate::new()
        .game_state(GameState::FIRST_TURN)
        .timer_state(timer_for(GameState::FIRST_TURN, now_ms))
}
