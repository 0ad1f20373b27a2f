//! Turn deadlines and the scheduling requests that enforce them.

use super::sequence::GameState;
use crate::error::DraftError;
use crate::lobby::TimerState;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Added to every deadline to absorb clock skew between hosts
pub const DEFAULT_SCHEDULE_BUFFER: Duration = Duration::from_secs(2);

const CREATE_ATTEMPTS: u32 = 3;
const CREATE_BACKOFF: Duration = Duration::from_millis(100);

/// What a fired deadline carries back to the timeout handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeoutPayload {
    pub lobby_code: String,
    pub expected_game_state: GameState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRequest {
    pub name: String,
    pub fire_at_ms: i64,
    pub payload: TimeoutPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    Created,
    AlreadyExists,
}

#[derive(Debug, Clone, Error)]
pub enum SchedulerError {
    #[error("scheduler unavailable: {0}")]
    Unavailable(String),
}

impl From<SchedulerError> for DraftError {
    fn from(err: SchedulerError) -> Self {
        DraftError::Transient(err.to_string())
    }
}

/// Delayed execution service. Deliveries are at-least-once and may be late.
pub trait Scheduler: Send + Sync + 'static {
    /// Creating a name that already exists is not an error
    fn create(
        &self,
        request: ScheduleRequest,
    ) -> impl Future<Output = Result<ScheduleOutcome, SchedulerError>> + Send;

    /// Returns false if no schedule had that name
    fn delete(&self, name: &str) -> impl Future<Output = Result<bool, SchedulerError>> + Send;
}

/// One schedule per lobby and state
pub fn schedule_name(lobby_code: &str, state: GameState) -> String {
    format!("timeout-{}-{}", lobby_code, state.as_str())
}

pub struct TimerController<K> {
    scheduler: K,
    buffer: Duration,
}

impl<K: Scheduler> TimerController<K> {
    pub fn new(scheduler: K) -> Self {
        Self {
            scheduler,
            buffer: DEFAULT_SCHEDULE_BUFFER,
        }
    }

    pub fn with_buffer(mut self, buffer: Duration) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn scheduler(&self) -> &K {
        &self.scheduler
    }

    /// The request that enforces `timer` for `state`, if the timer is running
    pub fn request_for(
        &self,
        lobby_code: &str,
        state: GameState,
        timer: &TimerState,
    ) -> Option<ScheduleRequest> {
        if !state.is_active() {
            return None;
        }
        let deadline = timer.deadline()?;
        Some(ScheduleRequest {
            name: schedule_name(lobby_code, state),
            fire_at_ms: deadline + self.buffer.as_millis() as i64,
            payload: TimeoutPayload {
                lobby_code: lobby_code.to_string(),
                expected_game_state: state,
            },
        })
    }

    /// Schedule the deadline for `state`. An existing schedule for the same
    /// lobby and state counts as success.
    pub async fn arm(
        &self,
        lobby_code: &str,
        state: GameState,
        timer: &TimerState,
    ) -> Result<(), DraftError> {
        let Some(request) = self.request_for(lobby_code, state, timer) else {
            return Ok(());
        };

        let mut attempt = 1;
        loop {
            match self.scheduler.create(request.clone()).await {
                Ok(ScheduleOutcome::Created) => {
                    info!(
                        lobby_code,
                        game_state = %state,
                        fire_at_ms = request.fire_at_ms,
                        "Scheduled turn timeout"
                    );
                    return Ok(());
                }
                Ok(ScheduleOutcome::AlreadyExists) => {
                    debug!(lobby_code, game_state = %state, "Timeout already scheduled");
                    return Ok(());
                }
                Err(err) if attempt < CREATE_ATTEMPTS => {
                    warn!(lobby_code, game_state = %state, attempt, %err, "Retrying schedule creation");
                    tokio::time::sleep(CREATE_BACKOFF * attempt).await;
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Best-effort removal of the schedule for a state the lobby has left.
    /// A late firing is neutralised by the staleness check anyway.
    pub async fn disarm(&self, lobby_code: &str, state: GameState) {
        if !state.is_active() {
            return;
        }
        let name = schedule_name(lobby_code, state);
        match self.scheduler.delete(&name).await {
            Ok(true) => debug!(lobby_code, game_state = %state, "Cancelled stale timeout"),
            Ok(false) => {}
            Err(err) => warn!(lobby_code, game_state = %state, %err, "Could not cancel stale timeout"),
        }
    }

    /// Cancel the deadline of `previous` and arm the one for `next`
    pub async fn transition(
        &self,
        lobby_code: &str,
        previous: GameState,
        next: GameState,
        timer: &TimerState,
    ) -> Result<(), DraftError> {
        if previous != next {
            self.disarm(lobby_code, previous).await;
        }
        self.arm(lobby_code, next, timer).await
    }
}
