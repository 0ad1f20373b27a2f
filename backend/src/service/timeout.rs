use super::DraftService;
use crate::draft::{ActionType, GameState, ItemChooser, Scheduler, machine};
use crate::error::DraftError;
use crate::lobby::now_ms;
use crate::store::{LobbyStore, Precondition, WriteOutcome};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeoutOutcome {
    /// The turn was played on the player's behalf. `value` is `None` when
    /// nothing was left to choose and the draft was completed instead.
    Handled {
        action: ActionType,
        value: Option<String>,
        next_state: GameState,
    },
    IgnoredStale,
    LobbyMissing,
}

impl<S, K, C> DraftService<S, K, C>
where
    S: LobbyStore,
    K: Scheduler,
    C: ItemChooser,
{
    /// Handle a fired deadline for `expected` in `lobby_code`.
    ///
    /// Deliveries can be duplicated or late, so the lobby is only touched if
    /// it is still in `expected`, and the write itself is guarded by the same
    /// condition. Store failures surface as [`DraftError::Transient`] for the
    /// caller to retry; an empty item pool is [`DraftError::Fatal`].
    pub async fn on_timeout(
        &self,
        lobby_code: &str,
        expected: GameState,
    ) -> Result<TimeoutOutcome, DraftError> {
        let Some(lobby) = self.store.get(lobby_code).await? else {
            debug!(lobby_code, %expected, "Timeout for missing lobby ignored");
            return Ok(TimeoutOutcome::LobbyMissing);
        };

        if lobby.game_state != expected {
            debug!(lobby_code, %expected, actual = %lobby.game_state, "State already advanced, timeout ignored");
            return Ok(TimeoutOutcome::IgnoredStale);
        }
        let Some(turn) = expected.turn() else {
            warn!(lobby_code, %expected, "Timeout fired for a state without a deadline");
            return Ok(TimeoutOutcome::IgnoredStale);
        };

        if self.items.is_empty() {
            return Err(DraftError::Fatal("item pool is empty".into()));
        }

        let available = self.items.available(&lobby);
        let (update, value) = match self.chooser.choose(&available) {
            Some(choice) => {
                let advance = machine::advance(&lobby, turn.slot, choice, now_ms())?;
                (advance.update(), Some(advance.value))
            }
            None => {
                let (_, update) = machine::force_complete(&lobby);
                (update, None)
            }
        };

        let record = match self
            .store
            .update(lobby_code, &update, Precondition::StateIs(expected))
            .await?
        {
            WriteOutcome::Updated(record) => record,
            WriteOutcome::ConditionFailed => {
                debug!(lobby_code, %expected, "Lobby advanced while timeout was handled");
                return Ok(TimeoutOutcome::IgnoredStale);
            }
            WriteOutcome::Missing => return Ok(TimeoutOutcome::LobbyMissing),
        };

        match &value {
            Some(value) => info!(
                lobby_code,
                slot = %turn.slot,
                action = %turn.action,
                value,
                next_state = %record.game_state,
                "Turn timed out, random selection applied"
            ),
            None => info!(lobby_code, %expected, "Turn timed out with nothing left to choose, draft completed"),
        }
        self.rearm(lobby_code, expected, &record).await;

        Ok(TimeoutOutcome::Handled {
            action: turn.action,
            value,
            next_state: record.game_state,
        })
    }
}
