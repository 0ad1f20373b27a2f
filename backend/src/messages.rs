use crate::draft::{ActionType, GameState, ORGANIZER_ROLE, Slot};
use crate::lobby::LobbyRecord;
use serde::{Deserialize, Serialize};

// Requests. Missing fields deserialize empty and are rejected by the
// service with a readable reason.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerNameRequest {
    pub player_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReadyRequest {
    pub player: String,
    pub ready: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PickRequest {
    pub player: String,
    pub pick: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LeaveRequest {
    pub player: String,
}

// Responses

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyCreated {
    pub lobby_code: String,
    pub organizer_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyJoined {
    pub message: String,
    pub role: Slot,
    pub lobby_data: LobbyRecord,
}

impl LobbyJoined {
    /// The organizer's name is not shown to joining players
    pub fn new(role: Slot, mut lobby: LobbyRecord) -> Self {
        lobby.organizer_name.clear();
        Self {
            message: "Joined lobby successfully".into(),
            role,
            lobby_data: lobby,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerJoined {
    pub message: String,
    pub assigned_slot: Slot,
    pub new_role: String,
}

impl OrganizerJoined {
    pub fn new(assigned_slot: Slot) -> Self {
        Self {
            message: format!("Organizer joined successfully as {assigned_slot}"),
            assigned_slot,
            new_role: ORGANIZER_ROLE.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionApplied {
    pub message: String,
    pub action: ActionType,
    pub value: String,
    pub next_state: GameState,
    pub next_player: Option<Slot>,
    pub lobby_state: LobbyRecord,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyUpdated {
    pub message: String,
    pub lobby_state: LobbyRecord,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Acknowledged {
    pub message: String,
}
