use crate::draft::{GameState, Slot};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Why a write was refused because of what is already in the lobby
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConflictKind {
    #[error("'{0}' has already been picked or banned")]
    AlreadySelected(String),
    #[error("player is already in this lobby")]
    AlreadyInLobby,
    #[error("lobby is full")]
    LobbyFull,
    #[error("slot {0} was taken by another player")]
    SlotTaken(Slot),
    #[error("lobby changed while the request was processed")]
    ConcurrentTransition,
    #[error("could not allocate a unique lobby code")]
    CodeCollision,
}

/// Why an action was refused by the draft order
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnRejection {
    #[error("not your turn ({state})")]
    NotYourTurn { state: GameState },
    #[error("invalid game state for action: {0}")]
    InvalidState(GameState),
}

/// Why a logical actor could not be mapped onto a slot
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("invalid player role '{0}'")]
    UnknownRole(String),
    #[error("lobby has no organizer name")]
    OrganizerMissing,
    #[error("organizer does not occupy a player slot")]
    OrganizerNotSeated,
    #[error("{0} is not in the lobby")]
    SlotEmpty(Slot),
    #[error("player name does not match the organizer")]
    NotOrganizer,
}

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("lobby {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Conflict(#[from] ConflictKind),
    #[error(transparent)]
    InvalidTurn(#[from] TurnRejection),
    #[error(transparent)]
    ResolutionFailure(#[from] ResolutionError),
    #[error("invalid request: {0}")]
    Invalid(String),
    #[error("temporarily unavailable: {0}")]
    Transient(String),
    #[error("fatal: {0}")]
    Fatal(String),
}

impl DraftError {
    /// Stable code clients can branch on
    pub fn reason(&self) -> &'static str {
        match self {
            DraftError::NotFound(_) => "not-found",
            DraftError::Conflict(ConflictKind::AlreadySelected(_)) => "already-selected",
            DraftError::Conflict(_) => "conflict",
            DraftError::InvalidTurn(TurnRejection::NotYourTurn { .. }) => "not-your-turn",
            DraftError::InvalidTurn(TurnRejection::InvalidState(_)) => "invalid-state",
            DraftError::ResolutionFailure(_) => "resolution-failed",
            DraftError::Invalid(_) => "invalid-request",
            DraftError::Transient(_) => "unavailable",
            DraftError::Fatal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            DraftError::NotFound(_) => StatusCode::NOT_FOUND,
            DraftError::Conflict(_) => StatusCode::CONFLICT,
            DraftError::InvalidTurn(_) | DraftError::Invalid(_) => StatusCode::BAD_REQUEST,
            DraftError::ResolutionFailure(ResolutionError::NotOrganizer) => StatusCode::FORBIDDEN,
            DraftError::ResolutionFailure(_) => StatusCode::BAD_REQUEST,
            DraftError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
            DraftError::Fatal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, DraftError::Transient(_))
    }
}

impl IntoResponse for DraftError {
    fn into_response(self) -> Response {
        // Store and configuration details stay in the logs
        let message = match &self {
            DraftError::Transient(_) => "service temporarily unavailable".to_string(),
            DraftError::Fatal(_) => "an unexpected server error occurred".to_string(),
            other => other.to_string(),
        };
        let body = Json(json!({ "error": message, "reason": self.reason() }));
        (self.status(), body).into_response()
    }
}
