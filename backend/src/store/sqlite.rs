use super::{LobbyStore, LobbyUpdate, Precondition, StoreError, WriteOutcome};
use crate::draft::{GameState, Slot};
use crate::lobby::{LobbyRecord, TimerState, now_ms};
use sqlx::types::Json;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

/// Column layout of `lobbies`. Everything but the key is nullable; NULL
/// reads back as the record default.
#[derive(Debug, FromRow)]
struct LobbyRow {
    lobby_code: String,
    organizer_name: Option<String>,
    player1: Option<String>,
    player2: Option<String>,
    player1_ready: Option<bool>,
    player2_ready: Option<bool>,
    game_state: Option<String>,
    picks: Option<Json<Vec<String>>>,
    bans: Option<Json<Vec<String>>>,
    timer_start_time: Option<i64>,
    timer_duration: Option<i64>,
    timer_is_active: Option<bool>,
    created_at: Option<i64>,
    ttl: Option<i64>,
}

impl TryFrom<LobbyRow> for LobbyRecord {
    type Error = StoreError;

    fn try_from(row: LobbyRow) -> Result<Self, Self::Error> {
        let game_state = match row.game_state.as_deref() {
            None | Some("") => GameState::Waiting,
            Some(state) => state.parse().map_err(|err: crate::draft::UnknownGameState| {
                StoreError::Corrupt {
                    lobby_code: row.lobby_code.clone(),
                    detail: err.to_string(),
                }
            })?,
        };

        Ok(LobbyRecord {
            organizer_name: row.organizer_name.unwrap_or_default(),
            player1: row.player1.unwrap_or_default(),
            player2: row.player2.unwrap_or_default(),
            player1_ready: row.player1_ready.unwrap_or(false),
            player2_ready: row.player2_ready.unwrap_or(false),
            game_state,
            picks: row.picks.map(|Json(picks)| picks).unwrap_or_default(),
            bans: row.bans.map(|Json(bans)| bans).unwrap_or_default(),
            timer_state: TimerState {
                start_time: row.timer_start_time,
                duration: row.timer_duration,
                is_active: row.timer_is_active.unwrap_or(false),
            },
            created_at: row.created_at.unwrap_or_default(),
            ttl: row.ttl.unwrap_or_default(),
            lobby_code: row.lobby_code,
        })
    }
}

#[derive(Clone)]
pub struct SqliteLobbyStore {
    pool: SqlitePool,
}

impl SqliteLobbyStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn exists(&self, lobby_code: &str) -> Result<bool, StoreError> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM lobbies WHERE lobby_code = ? AND (ttl IS NULL OR ttl = 0 OR ttl > ?)",
        )
        .bind(lobby_code)
        .bind(now_ms())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }
}

fn slot_column(slot: Slot) -> &'static str {
    match slot {
        Slot::Player1 => "player1",
        Slot::Player2 => "player2",
    }
}

impl LobbyStore for SqliteLobbyStore {
    async fn get(&self, lobby_code: &str) -> Result<Option<LobbyRecord>, StoreError> {
        let row: Option<LobbyRow> = sqlx::query_as(
            "SELECT * FROM lobbies WHERE lobby_code = ? AND (ttl IS NULL OR ttl = 0 OR ttl > ?)",
        )
        .bind(lobby_code)
        .bind(now_ms())
        .fetch_optional(&self.pool)
        .await?;

        row.map(LobbyRecord::try_from).transpose()
    }

    async fn insert(&self, record: &LobbyRecord) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "INSERT INTO lobbies (lobby_code, organizer_name, player1, player2, player1_ready, \
             player2_ready, game_state, picks, bans, timer_start_time, timer_duration, \
             timer_is_active, created_at, ttl) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT (lobby_code) DO NOTHING",
        )
        .bind(&record.lobby_code)
        .bind(&record.organizer_name)
        .bind(&record.player1)
        .bind(&record.player2)
        .bind(record.player1_ready)
        .bind(record.player2_ready)
        .bind(record.game_state.as_str())
        .bind(Json(&record.picks))
        .bind(Json(&record.bans))
        .bind(record.timer_state.start_time)
        .bind(record.timer_state.duration)
        .bind(record.timer_state.is_active)
        .bind(record.created_at)
        .bind(record.ttl)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn update(
        &self,
        lobby_code: &str,
        update: &LobbyUpdate,
        precondition: Precondition,
    ) -> Result<WriteOutcome, StoreError> {
        if update.is_empty() {
            return Ok(match self.get(lobby_code).await? {
                Some(record) if precondition.holds(&record) => WriteOutcome::Updated(record),
                Some(_) => WriteOutcome::ConditionFailed,
                None => WriteOutcome::Missing,
            });
        }

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE lobbies SET ");
        let mut set = query.separated(", ");
        if let Some(name) = &update.player1 {
            set.push("player1 = ").push_bind_unseparated(name.clone());
        }
        if let Some(name) = &update.player2 {
            set.push("player2 = ").push_bind_unseparated(name.clone());
        }
        if let Some(ready) = update.player1_ready {
            set.push("player1_ready = ").push_bind_unseparated(ready);
        }
        if let Some(ready) = update.player2_ready {
            set.push("player2_ready = ").push_bind_unseparated(ready);
        }
        if let Some(state) = update.game_state {
            set.push("game_state = ").push_bind_unseparated(state.as_str());
        }
        if let Some(picks) = &update.picks {
            set.push("picks = ").push_bind_unseparated(Json(picks.clone()));
        }
        if let Some(bans) = &update.bans {
            set.push("bans = ").push_bind_unseparated(Json(bans.clone()));
        }
        if let Some(timer) = update.timer_state {
            set.push("timer_start_time = ").push_bind_unseparated(timer.start_time);
            set.push("timer_duration = ").push_bind_unseparated(timer.duration);
            set.push("timer_is_active = ").push_bind_unseparated(timer.is_active);
        }

        query.push(" WHERE lobby_code = ").push_bind(lobby_code.to_string());
        query
            .push(" AND (ttl IS NULL OR ttl = 0 OR ttl > ")
            .push_bind(now_ms())
            .push(")");
        match precondition {
            Precondition::Always => {}
            Precondition::StateIs(state) => {
                query
                    .push(" AND COALESCE(game_state, 'waiting') = ")
                    .push_bind(state.as_str());
            }
            Precondition::SlotVacant(slot) => {
                query.push(format!(
                    " AND TRIM(COALESCE({}, '')) = ''",
                    slot_column(slot)
                ));
            }
        }
        query.push(" RETURNING *");

        let row = query
            .build_query_as::<LobbyRow>()
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(WriteOutcome::Updated(row.try_into()?)),
            None if self.exists(lobby_code).await? => {
                debug!(lobby_code, ?precondition, "Conditional update rejected");
                Ok(WriteOutcome::ConditionFailed)
            }
            None => Ok(WriteOutcome::Missing),
        }
    }

    async fn delete(&self, lobby_code: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM lobbies WHERE lobby_code = ?")
            .bind(lobby_code)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_timed(&self) -> Result<Vec<LobbyRecord>, StoreError> {
        let rows: Vec<LobbyRow> = sqlx::query_as(
            "SELECT * FROM lobbies WHERE timer_is_active = 1 AND (ttl IS NULL OR ttl = 0 OR ttl > ?)",
        )
        .bind(now_ms())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(LobbyRecord::try_from).collect()
    }

    async fn purge_expired(&self, now_ms: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM lobbies WHERE ttl > 0 AND ttl <= ?")
            .bind(now_ms)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
