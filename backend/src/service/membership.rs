use super::DraftService;
use crate::draft::{GameState, ItemChooser, Scheduler, Slot};
use crate::error::{ConflictKind, DraftError, ResolutionError};
use crate::lobby::{LobbyRecord, generate_lobby_code, now_ms};
use crate::store::{LobbyStore, LobbyUpdate, Precondition, WriteOutcome};
use tracing::{debug, info, warn};

const CODE_ATTEMPTS: usize = 3;

/// Slot the organizer was given by [`DraftService::organizer_join`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizerSeat {
    pub slot: Slot,
    pub lobby: LobbyRecord,
}

fn required_name(name: &str) -> Result<&str, DraftError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DraftError::Invalid("player name is required".into()));
    }
    Ok(name)
}

fn ensure_organizer(lobby: &LobbyRecord, player_name: &str) -> Result<(), DraftError> {
    let organizer = lobby.organizer_name.trim();
    if organizer.is_empty() || organizer != player_name.trim() {
        return Err(ResolutionError::NotOrganizer.into());
    }
    Ok(())
}

impl<S, K, C> DraftService<S, K, C>
where
    S: LobbyStore,
    K: Scheduler,
    C: ItemChooser,
{
    pub async fn create_lobby(&self, organizer_name: &str) -> Result<LobbyRecord, DraftError> {
        let organizer_name = required_name(organizer_name)?;

        for attempt in 1..=CODE_ATTEMPTS {
            let now = now_ms();
            let record = LobbyRecord::new(generate_lobby_code(now), organizer_name, now);
            if self.store.insert(&record).await? {
                info!(lobby_code = %record.lobby_code, organizer_name, "Created lobby");
                return Ok(record);
            }
            warn!(lobby_code = %record.lobby_code, attempt, "Lobby code collision");
        }
        Err(ConflictKind::CodeCollision.into())
    }

    /// Seat `player_name` in the first free slot. Returns the slot and the
    /// lobby after any ready check it triggered.
    pub async fn join_lobby(
        &self,
        lobby_code: &str,
        player_name: &str,
    ) -> Result<(Slot, LobbyRecord), DraftError> {
        let player_name = required_name(player_name)?;
        let lobby = self.fetch(lobby_code).await?;

        if lobby.slot_of(player_name).is_some() {
            return Err(ConflictKind::AlreadyInLobby.into());
        }
        let slot = [Slot::Player1, Slot::Player2]
            .into_iter()
            .find(|&slot| !lobby.is_occupied(slot))
            .ok_or(ConflictKind::LobbyFull)?;

        self.seat(lobby_code, slot, player_name).await?;
        info!(lobby_code, %slot, player_name, "Player joined lobby");

        let lobby = self.get_lobby(lobby_code).await?;
        Ok((slot, lobby))
    }

    /// Seat the organizer. Only the name the lobby was created with is
    /// accepted.
    pub async fn organizer_join(
        &self,
        lobby_code: &str,
        player_name: &str,
    ) -> Result<OrganizerSeat, DraftError> {
        let player_name = required_name(player_name)?;
        let lobby = self.fetch(lobby_code).await?;
        ensure_organizer(&lobby, player_name)?;

        if lobby.slot_of(player_name).is_some() {
            return Err(ConflictKind::AlreadyInLobby.into());
        }
        let slot = if !lobby.is_occupied(Slot::Player1) {
            Slot::Player1
        } else if !lobby.is_occupied(Slot::Player2) {
            Slot::Player2
        } else {
            return Err(ConflictKind::LobbyFull.into());
        };

        self.seat(lobby_code, slot, player_name).await?;
        info!(lobby_code, %slot, "Organizer joined lobby");

        let lobby = self.get_lobby(lobby_code).await?;
        Ok(OrganizerSeat { slot, lobby })
    }

    async fn seat(&self, lobby_code: &str, slot: Slot, player_name: &str) -> Result<(), DraftError> {
        match self
            .store
            .update(
                lobby_code,
                &LobbyUpdate::new().slot(slot, player_name),
                Precondition::SlotVacant(slot),
            )
            .await?
        {
            WriteOutcome::Updated(_) => Ok(()),
            WriteOutcome::ConditionFailed => Err(ConflictKind::SlotTaken(slot).into()),
            WriteOutcome::Missing => Err(DraftError::NotFound(lobby_code.to_string())),
        }
    }

    /// Empty `slot` and send the lobby back to waiting. Draft progress is
    /// discarded.
    pub async fn leave_lobby(&self, lobby_code: &str, slot: Slot) -> Result<LobbyRecord, DraftError> {
        let lobby = self.fetch(lobby_code).await?;
        if !lobby.is_occupied(slot) {
            return Err(ResolutionError::SlotEmpty(slot).into());
        }

        let update = LobbyUpdate::new()
            .slot(slot, "")
            .game_state(GameState::Waiting)
            .clear_draft();
        let record = match self.store.update(lobby_code, &update, Precondition::Always).await? {
            WriteOutcome::Updated(record) => record,
            WriteOutcome::ConditionFailed | WriteOutcome::Missing => {
                return Err(DraftError::NotFound(lobby_code.to_string()));
            }
        };

        info!(lobby_code, %slot, previous_state = %lobby.game_state, "Player left lobby");
        self.timer.disarm(lobby_code, lobby.game_state).await;
        Ok(record)
    }

    /// Restart the draft from the ready check, keeping both players seated
    pub async fn reset_lobby(
        &self,
        lobby_code: &str,
        player_name: &str,
    ) -> Result<LobbyRecord, DraftError> {
        let player_name = required_name(player_name)?;
        let lobby = self.fetch(lobby_code).await?;
        ensure_organizer(&lobby, player_name)?;

        let update = LobbyUpdate::new()
            .game_state(GameState::ReadyCheck)
            .clear_draft();
        let record = match self.store.update(lobby_code, &update, Precondition::Always).await? {
            WriteOutcome::Updated(record) => record,
            WriteOutcome::ConditionFailed | WriteOutcome::Missing => {
                return Err(DraftError::NotFound(lobby_code.to_string()));
            }
        };

        info!(lobby_code, previous_state = %lobby.game_state, "Lobby reset to ready check");
        self.timer.disarm(lobby_code, lobby.game_state).await;
        Ok(record)
    }

    pub async fn delete_lobby(&self, lobby_code: &str, player_name: &str) -> Result<(), DraftError> {
        let player_name = required_name(player_name)?;
        let lobby = self.fetch(lobby_code).await?;
        ensure_organizer(&lobby, player_name)?;

        if !self.store.delete(lobby_code).await? {
            debug!(lobby_code, "Lobby already deleted");
        }
        info!(lobby_code, "Lobby deleted");
        self.timer.disarm(lobby_code, lobby.game_state).await;
        Ok(())
    }
}
