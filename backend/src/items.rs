use crate::lobby::LobbyRecord;
use crate::store::StoreError;
use sqlx::SqlitePool;
use std::sync::Arc;

/// The identifiers that can be picked or banned
#[derive(Debug, Clone, Default)]
pub struct ItemPool {
    ids: Arc<[String]>,
}

impl ItemPool {
    pub fn new(ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Identifiers not yet picked or banned in `lobby`, in pool order
    pub fn available(&self, lobby: &LobbyRecord) -> Vec<String> {
        self.ids
            .iter()
            .filter(|id| !lobby.is_selected(id))
            .cloned()
            .collect()
    }
}

#[derive(Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn load(&self) -> Result<ItemPool, StoreError> {
        let ids: Vec<(String,)> = sqlx::query_as("SELECT id FROM items ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(ItemPool::new(ids.into_iter().map(|(id,)| id)))
    }
}
