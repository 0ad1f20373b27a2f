//! In-process deadline scheduling and the workers that consume it.

use crate::draft::{ItemChooser, ScheduleOutcome, ScheduleRequest, Scheduler, SchedulerError, TimeoutPayload};
use crate::lobby::now_ms;
use crate::service::DraftService;
use crate::store::LobbyStore;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};

const RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// One sleeping task per schedule name. A task removes its own entry when
/// it fires, then hands the payload to the timeout worker.
pub struct LocalScheduler {
    pending: Arc<DashMap<String, AbortHandle>>,
    fired: mpsc::UnboundedSender<TimeoutPayload>,
}

impl LocalScheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimeoutPayload>) {
        let (fired, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            pending: Arc::new(DashMap::new()),
            fired,
        };
        (scheduler, rx)
    }

    /// Schedules that have not fired or been cancelled yet
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl Scheduler for LocalScheduler {
    async fn create(&self, request: ScheduleRequest) -> Result<ScheduleOutcome, SchedulerError> {
        let vacant = match self.pending.entry(request.name.clone()) {
            Entry::Occupied(_) => return Ok(ScheduleOutcome::AlreadyExists),
            Entry::Vacant(vacant) => vacant,
        };

        let delay = Duration::from_millis((request.fire_at_ms - now_ms()).max(0) as u64);
        let pending = Arc::clone(&self.pending);
        let fired = self.fired.clone();
        let ScheduleRequest { name, payload, .. } = request;
        let task_name = name.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            pending.remove(&task_name);
            if fired.send(payload).is_err() {
                warn!(schedule = %task_name, "Timeout worker stopped, deadline dropped");
            }
        });
        vacant.insert(handle.abort_handle());
        debug!(schedule = %name, delay_ms = delay.as_millis() as u64, "Schedule created");
        Ok(ScheduleOutcome::Created)
    }

    async fn delete(&self, name: &str) -> Result<bool, SchedulerError> {
        match self.pending.remove(name) {
            Some((_, handle)) => {
                handle.abort();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Drain fired deadlines into [`DraftService::on_timeout`]. Transient
/// failures are retried so each deadline is handled at least once.
pub async fn run_timeout_worker<S, K, C>(
    service: Arc<DraftService<S, K, C>>,
    mut fired: mpsc::UnboundedReceiver<TimeoutPayload>,
    retry_attempts: u32,
) where
    S: LobbyStore,
    K: Scheduler,
    C: ItemChooser,
{
    info!("Timeout worker started");
    while let Some(payload) = fired.recv().await {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            deliver(&service, payload, retry_attempts).await;
        });
    }
    info!("Timeout worker stopped");
}

async fn deliver<S, K, C>(service: &DraftService<S, K, C>, payload: TimeoutPayload, retry_attempts: u32)
where
    S: LobbyStore,
    K: Scheduler,
    C: ItemChooser,
{
    let TimeoutPayload {
        lobby_code,
        expected_game_state,
    } = payload;

    let mut attempt = 1;
    loop {
        match service.on_timeout(&lobby_code, expected_game_state).await {
            Ok(outcome) => {
                debug!(%lobby_code, %expected_game_state, ?outcome, "Timeout delivered");
                return;
            }
            Err(err) if err.is_transient() && attempt < retry_attempts => {
                warn!(%lobby_code, %expected_game_state, attempt, %err, "Timeout handling failed, retrying");
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                attempt += 1;
            }
            Err(err) => {
                error!(%lobby_code, %expected_game_state, %err, "Timeout handling failed");
                return;
            }
        }
    }
}

/// Periodically delete expired lobbies
pub async fn run_expiry_sweeper<S, K, C>(service: Arc<DraftService<S, K, C>>, every: Duration)
where
    S: LobbyStore,
    K: Scheduler,
    C: ItemChooser,
{
    let mut ticks = tokio::time::interval(every);
    loop {
        ticks.tick().await;
        if let Err(err) = service.sweep_expired().await {
            warn!(%err, "Expiry sweep failed");
        }
    }
}
