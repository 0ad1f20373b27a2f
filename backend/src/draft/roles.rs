//! Maps the role a client claims onto a concrete slot.

use super::sequence::Slot;
use crate::error::ResolutionError;
use crate::lobby::LobbyRecord;
use std::str::FromStr;

/// Role name clients use for the organizer, whichever slot they sit in
pub const ORGANIZER_ROLE: &str = "organizer_player";

/// Who a request claims to act as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRef {
    Direct(Slot),
    OrganizerAlias,
}

impl FromStr for ActorRef {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "player1" => Ok(ActorRef::Direct(Slot::Player1)),
            "player2" => Ok(ActorRef::Direct(Slot::Player2)),
            ORGANIZER_ROLE => Ok(ActorRef::OrganizerAlias),
            other => Err(ResolutionError::UnknownRole(other.to_string())),
        }
    }
}

/// Resolve `actor` against the names stored in `lobby`.
///
/// A direct slot only resolves while somebody occupies it. The organizer
/// alias resolves to whichever slot holds the organizer's name; names are
/// compared with surrounding whitespace removed.
pub fn resolve(actor: ActorRef, lobby: &LobbyRecord) -> Result<Slot, ResolutionError> {
    match actor {
        ActorRef::Direct(slot) => {
            if lobby.is_occupied(slot) {
                Ok(slot)
            } else {
                Err(ResolutionError::SlotEmpty(slot))
            }
        }
        ActorRef::OrganizerAlias => {
            if lobby.organizer_name.trim().is_empty() {
                return Err(ResolutionError::OrganizerMissing);
            }
            lobby
                .slot_of(&lobby.organizer_name)
                .ok_or(ResolutionError::OrganizerNotSeated)
        }
    }
}
