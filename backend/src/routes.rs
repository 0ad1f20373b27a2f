use crate::AppState;
use crate::draft::{ActorRef, ItemChooser, Scheduler};
use crate::error::DraftError;
use crate::lobby::LobbyRecord;
use crate::messages::{
    Acknowledged, ActionApplied, LeaveRequest, LobbyCreated, LobbyJoined, LobbyUpdated,
    OrganizerJoined, PickRequest, PlayerNameRequest, ReadyRequest,
};
use crate::store::LobbyStore;
use axum::Json;
use axum::extract::{Path, State};
use tracing::debug;

fn parse_actor(player: &str) -> Result<ActorRef, DraftError> {
    if player.is_empty() {
        return Err(DraftError::Invalid("missing player role".into()));
    }
    Ok(player.parse::<ActorRef>()?)
}

pub async fn create_lobby<S, K, C>(
    State(state): State<AppState<S, K, C>>,
    Json(body): Json<PlayerNameRequest>,
) -> Result<Json<LobbyCreated>, DraftError>
where
    S: LobbyStore,
    K: Scheduler,
    C: ItemChooser,
{
    let lobby = state.service.create_lobby(&body.player_name).await?;
    Ok(Json(LobbyCreated {
        lobby_code: lobby.lobby_code,
        organizer_name: lobby.organizer_name,
    }))
}

pub async fn get_lobby<S, K, C>(
    State(state): State<AppState<S, K, C>>,
    Path(code): Path<String>,
) -> Result<Json<LobbyRecord>, DraftError>
where
    S: LobbyStore,
    K: Scheduler,
    C: ItemChooser,
{
    debug!(lobby_code = %code, "Fetching lobby");
    Ok(Json(state.service.get_lobby(&code).await?))
}

pub async fn join_lobby<S, K, C>(
    State(state): State<AppState<S, K, C>>,
    Path(code): Path<String>,
    Json(body): Json<PlayerNameRequest>,
) -> Result<Json<LobbyJoined>, DraftError>
where
    S: LobbyStore,
    K: Scheduler,
    C: ItemChooser,
{
    let (slot, lobby) = state.service.join_lobby(&code, &body.player_name).await?;
    Ok(Json(LobbyJoined::new(slot, lobby)))
}

pub async fn organizer_join<S, K, C>(
    State(state): State<AppState<S, K, C>>,
    Path(code): Path<String>,
    Json(body): Json<PlayerNameRequest>,
) -> Result<Json<OrganizerJoined>, DraftError>
where
    S: LobbyStore,
    K: Scheduler,
    C: ItemChooser,
{
    let seat = state.service.organizer_join(&code, &body.player_name).await?;
    Ok(Json(OrganizerJoined::new(seat.slot)))
}

pub async fn set_ready<S, K, C>(
    State(state): State<AppState<S, K, C>>,
    Path(code): Path<String>,
    Json(body): Json<ReadyRequest>,
) -> Result<Json<LobbyUpdated>, DraftError>
where
    S: LobbyStore,
    K: Scheduler,
    C: ItemChooser,
{
    let actor = parse_actor(&body.player)?;
    let ready = body
        .ready
        .ok_or_else(|| DraftError::Invalid("ready status is missing".into()))?;

    let lobby = state.service.submit_ready(&code, actor, ready).await?;
    Ok(Json(LobbyUpdated {
        message: "Ready status updated".into(),
        lobby_state: lobby,
    }))
}

pub async fn submit_pick<S, K, C>(
    State(state): State<AppState<S, K, C>>,
    Path(code): Path<String>,
    Json(body): Json<PickRequest>,
) -> Result<Json<ActionApplied>, DraftError>
where
    S: LobbyStore,
    K: Scheduler,
    C: ItemChooser,
{
    let actor = parse_actor(&body.player)?;
    let receipt = state.service.submit_action(&code, actor, &body.pick).await?;

    Ok(Json(ActionApplied {
        message: format!("{} successful", receipt.action),
        action: receipt.action,
        value: receipt.value,
        next_state: receipt.next_state,
        next_player: receipt.next_slot,
        lobby_state: receipt.lobby,
    }))
}

pub async fn leave_lobby<S, K, C>(
    State(state): State<AppState<S, K, C>>,
    Path(code): Path<String>,
    Json(body): Json<LeaveRequest>,
) -> Result<Json<LobbyUpdated>, DraftError>
where
    S: LobbyStore,
    K: Scheduler,
    C: ItemChooser,
{
    let ActorRef::Direct(slot) = parse_actor(&body.player)? else {
        return Err(DraftError::Invalid("leave requires player1 or player2".into()));
    };

    let lobby = state.service.leave_lobby(&code, slot).await?;
    Ok(Json(LobbyUpdated {
        message: format!("Removed {slot} and reset lobby state"),
        lobby_state: lobby,
    }))
}

pub async fn reset_lobby<S, K, C>(
    State(state): State<AppState<S, K, C>>,
    Path(code): Path<String>,
    Json(body): Json<PlayerNameRequest>,
) -> Result<Json<LobbyUpdated>, DraftError>
where
    S: LobbyStore,
    K: Scheduler,
    C: ItemChooser,
{
    let lobby = state.service.reset_lobby(&code, &body.player_name).await?;
    Ok(Json(LobbyUpdated {
        message: "Lobby reset to ready check".into(),
        lobby_state: lobby,
    }))
}

pub async fn delete_lobby<S, K, C>(
    State(state): State<AppState<S, K, C>>,
    Path(code): Path<String>,
    Json(body): Json<PlayerNameRequest>,
) -> Result<Json<Acknowledged>, DraftError>
where
    S: LobbyStore,
    K: Scheduler,
    C: ItemChooser,
{
    state.service.delete_lobby(&code, &body.player_name).await?;
    Ok(Json(Acknowledged {
        message: "Lobby deleted successfully".into(),
    }))
}
