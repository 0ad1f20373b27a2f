//! The operations clients and the scheduler invoke. Every collaborator is
//! passed in at construction; nothing here reaches for globals.

mod membership;
mod timeout;

pub use membership::OrganizerSeat;
pub use timeout::TimeoutOutcome;

use crate::draft::{
    ActionType, ActorRef, GameState, ItemChooser, Scheduler, Slot, TimerController, machine, roles,
};
use crate::error::{ConflictKind, DraftError, TurnRejection};
use crate::items::ItemPool;
use crate::lobby::{LobbyRecord, now_ms};
use crate::store::{LobbyStore, LobbyUpdate, Precondition, WriteOutcome};
use tracing::{debug, error, info, warn};

/// What a successful ban or pick did to the lobby
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReceipt {
    pub action: ActionType,
    pub value: String,
    pub next_state: GameState,
    pub next_slot: Option<Slot>,
    pub lobby: LobbyRecord,
}

pub struct DraftService<S, K, C> {
    store: S,
    timer: TimerController<K>,
    items: ItemPool,
    chooser: C,
}

impl<S, K, C> DraftService<S, K, C>
where
    S: LobbyStore,
    K: Scheduler,
    C: ItemChooser,
{
    pub fn new(store: S, timer: TimerController<K>, items: ItemPool, chooser: C) -> Self {
        Self {
            store,
            timer,
            items,
            chooser,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn timer(&self) -> &TimerController<K> {
        &self.timer
    }

    async fn fetch(&self, lobby_code: &str) -> Result<LobbyRecord, DraftError> {
        self.store
            .get(lobby_code)
            .await?
            .ok_or_else(|| DraftError::NotFound(lobby_code.to_string()))
    }

    /// Read a lobby, moving it to the ready check if both slots have filled
    /// while it was still waiting.
    pub async fn get_lobby(&self, lobby_code: &str) -> Result<LobbyRecord, DraftError> {
        let lobby = self.fetch(lobby_code).await?;
        if !machine::needs_ready_check(&lobby) {
            return Ok(lobby);
        }
        self.open_ready_check(lobby_code).await
    }

    /// Conditional `waiting -> ready_check`. Losing the race means another
    /// reader already moved the lobby on, so the newer record is returned.
    async fn open_ready_check(&self, lobby_code: &str) -> Result<LobbyRecord, DraftError> {
        let update = LobbyUpdate::new().game_state(GameState::ReadyCheck);
        match self
            .store
            .update(lobby_code, &update, Precondition::StateIs(GameState::Waiting))
            .await?
        {
            WriteOutcome::Updated(record) => {
                info!(lobby_code, "Both slots filled, lobby moved to ready check");
                Ok(record)
            }
            WriteOutcome::ConditionFailed => {
                debug!(lobby_code, "Ready check already opened by another request");
                self.fetch(lobby_code).await
            }
            WriteOutcome::Missing => Err(DraftError::NotFound(lobby_code.to_string())),
        }
    }

    /// Ban or pick `value` on behalf of `actor`
    pub async fn submit_action(
        &self,
        lobby_code: &str,
        actor: ActorRef,
        value: &str,
    ) -> Result<ActionReceipt, DraftError> {
        if value.trim().is_empty() {
            return Err(DraftError::Invalid("missing pick or ban selection".into()));
        }

        let lobby = self.fetch(lobby_code).await?;
        let slot = roles::resolve(actor, &lobby)?;
        let advance = machine::advance(&lobby, slot, value, now_ms())?;

        let record = match self
            .store
            .update(
                lobby_code,
                &advance.update(),
                Precondition::StateIs(advance.previous_state),
            )
            .await?
        {
            WriteOutcome::Updated(record) => record,
            WriteOutcome::ConditionFailed => {
                warn!(lobby_code, %slot, state = %advance.previous_state, "Lobby advanced before action was saved");
                return Err(ConflictKind::ConcurrentTransition.into());
            }
            WriteOutcome::Missing => return Err(DraftError::NotFound(lobby_code.to_string())),
        };

        info!(
            lobby_code,
            %slot,
            action = %advance.action,
            value,
            next_state = %advance.next_state,
            "Draft action recorded"
        );
        self.rearm(lobby_code, advance.previous_state, &record).await;

        Ok(ActionReceipt {
            action: advance.action,
            value: advance.value,
            next_state: advance.next_state,
            next_slot: advance.next_slot,
            lobby: record,
        })
    }

    /// Set `actor`'s ready flag. When both players are ready the draft
    /// starts and the first deadline is armed.
    pub async fn submit_ready(
        &self,
        lobby_code: &str,
        actor: ActorRef,
        ready: bool,
    ) -> Result<LobbyRecord, DraftError> {
        let lobby = self.get_lobby(lobby_code).await?;
        let slot = roles::resolve(actor, &lobby)?;
        if lobby.game_state != GameState::ReadyCheck {
            return Err(TurnRejection::InvalidState(lobby.game_state).into());
        }

        let record = match self
            .store
            .update(
                lobby_code,
                &LobbyUpdate::new().ready(slot, ready),
                Precondition::StateIs(GameState::ReadyCheck),
            )
            .await?
        {
            WriteOutcome::Updated(record) => record,
            WriteOutcome::ConditionFailed => return Err(ConflictKind::ConcurrentTransition.into()),
            WriteOutcome::Missing => return Err(DraftError::NotFound(lobby_code.to_string())),
        };
        info!(lobby_code, %slot, ready, "Ready status updated");

        if !machine::ready_to_start(&record) {
            return Ok(record);
        }
        self.start_draft(lobby_code).await
    }

    async fn start_draft(&self, lobby_code: &str) -> Result<LobbyRecord, DraftError> {
        let update = machine::start_draft(now_ms());
        match self
            .store
            .update(lobby_code, &update, Precondition::StateIs(GameState::ReadyCheck))
            .await?
        {
            WriteOutcome::Updated(record) => {
                info!(lobby_code, "Both players ready, draft started");
                self.rearm(lobby_code, GameState::ReadyCheck, &record).await;
                Ok(record)
            }
            // The other player's ready request started it first
            WriteOutcome::ConditionFailed => self.fetch(lobby_code).await,
            WriteOutcome::Missing => Err(DraftError::NotFound(lobby_code.to_string())),
        }
    }

    /// Move the deadline from `previous` to the record's current state. The
    /// write has already succeeded, so a scheduling failure is only logged.
    async fn rearm(&self, lobby_code: &str, previous: GameState, record: &LobbyRecord) {
        if let Err(err) = self
            .timer
            .transition(lobby_code, previous, record.game_state, &record.timer_state)
            .await
        {
            error!(lobby_code, game_state = %record.game_state, %err, "Failed to schedule turn timeout");
        }
    }

    /// Re-issue the deadline of every lobby with a running timer. Used after
    /// a restart, when in-process schedules have been lost.
    pub async fn recover_deadlines(&self) -> Result<usize, DraftError> {
        let lobbies = self.store.list_timed().await?;
        let mut armed = 0;
        for lobby in &lobbies {
            match self
                .timer
                .arm(&lobby.lobby_code, lobby.game_state, &lobby.timer_state)
                .await
            {
                Ok(()) => armed += 1,
                Err(err) => {
                    error!(lobby_code = %lobby.lobby_code, %err, "Failed to re-arm deadline");
                }
            }
        }
        info!(armed, total = lobbies.len(), "Recovered turn deadlines");
        Ok(armed)
    }

    /// Delete lobbies whose ttl has passed
    pub async fn sweep_expired(&self) -> Result<u64, DraftError> {
        let removed = self.store.purge_expired(now_ms()).await?;
        if removed > 0 {
            info!(removed, "Purged expired lobbies");
        }
        Ok(removed)
    }
}
