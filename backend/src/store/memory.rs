use super::{LobbyStore, LobbyUpdate, Precondition, StoreError, WriteOutcome};
use crate::lobby::{LobbyRecord, now_ms};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Process-local store. Each update runs under the entry's shard lock, so
/// the precondition check and the write are atomic.
#[derive(Default)]
pub struct MemoryLobbyStore {
    lobbies: DashMap<String, LobbyRecord>,
}

impl MemoryLobbyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record as-is, replacing whatever was there
    pub fn put(&self, record: LobbyRecord) {
        self.lobbies.insert(record.lobby_code.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.lobbies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lobbies.is_empty()
    }
}

impl LobbyStore for MemoryLobbyStore {
    async fn get(&self, lobby_code: &str) -> Result<Option<LobbyRecord>, StoreError> {
        let now = now_ms();
        Ok(self
            .lobbies
            .get(lobby_code)
            .filter(|record| !record.is_expired(now))
            .map(|record| record.clone()))
    }

    async fn insert(&self, record: &LobbyRecord) -> Result<bool, StoreError> {
        match self.lobbies.entry(record.lobby_code.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(true)
            }
        }
    }

    async fn update(
        &self,
        lobby_code: &str,
        update: &LobbyUpdate,
        precondition: Precondition,
    ) -> Result<WriteOutcome, StoreError> {
        let now = now_ms();
        let Some(mut record) = self.lobbies.get_mut(lobby_code) else {
            return Ok(WriteOutcome::Missing);
        };
        if record.is_expired(now) {
            return Ok(WriteOutcome::Missing);
        }
        if !precondition.holds(&record) {
            return Ok(WriteOutcome::ConditionFailed);
        }
        update.apply_to(&mut record);
        Ok(WriteOutcome::Updated(record.clone()))
    }

    async fn delete(&self, lobby_code: &str) -> Result<bool, StoreError> {
        Ok(self.lobbies.remove(lobby_code).is_some())
    }

    async fn list_timed(&self) -> Result<Vec<LobbyRecord>, StoreError> {
        Ok(self
            .lobbies
            .iter()
            .filter(|record| record.timer_state.is_active)
            .map(|record| record.clone())
            .collect())
    }

    async fn purge_expired(&self, now_ms: i64) -> Result<u64, StoreError> {
        let before = self.lobbies.len();
        self.lobbies.retain(|_, record| !record.is_expired(now_ms));
        Ok(before.saturating_sub(self.lobbies.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{GameState, Slot};

    fn seated_lobby(code: &str) -> LobbyRecord {
        let mut record = LobbyRecord::new(code, "Alice", now_ms());
        record.player1 = "Alice".into();
        record.player2 = "Bob".into();
        record
    }

    #[tokio::test]
    async fn insert_refuses_existing_code() {
        let store = MemoryLobbyStore::new();
        let record = seated_lobby("ABCD");

        assert!(store.insert(&record).await.unwrap());
        assert!(!store.insert(&record).await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn conditional_update_reports_lost_race() {
        let store = MemoryLobbyStore::new();
        store.put(seated_lobby("ABCD"));
        let to_ready_check = LobbyUpdate::new().game_state(GameState::ReadyCheck);

        let first = store
            .update("ABCD", &to_ready_check, Precondition::StateIs(GameState::Waiting))
            .await
            .unwrap();
        assert!(matches!(first, WriteOutcome::Updated(ref r) if r.game_state == GameState::ReadyCheck));

        let second = store
            .update("ABCD", &to_ready_check, Precondition::StateIs(GameState::Waiting))
            .await
            .unwrap();
        assert_eq!(second, WriteOutcome::ConditionFailed);
    }

    #[tokio::test]
    async fn update_of_unknown_lobby_is_missing() {
        let store = MemoryLobbyStore::new();
        let outcome = store
            .update("NOPE", &LobbyUpdate::new().ready(Slot::Player1, true), Precondition::Always)
            .await
            .unwrap();
        assert_eq!(outcome, WriteOutcome::Missing);
    }

    #[tokio::test]
    async fn expired_lobbies_are_invisible_and_purged() {
        let store = MemoryLobbyStore::new();
        let mut record = seated_lobby("OLD1");
        record.ttl = 1;
        store.put(record);
        store.put(seated_lobby("NEW1"));

        assert_eq!(store.get("OLD1").await.unwrap(), None);
        assert_eq!(store.purge_expired(now_ms()).await.unwrap(), 1);
        assert!(store.get("NEW1").await.unwrap().is_some());
    }
}
