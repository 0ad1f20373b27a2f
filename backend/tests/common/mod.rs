#![allow(dead_code)]

use pickban::draft::{
    ActorRef, ItemChooser, ScheduleOutcome, ScheduleRequest, Scheduler, SchedulerError, Slot,
    TimerController,
};
use pickban::items::ItemPool;
use pickban::lobby::{LobbyRecord, now_ms};
use pickban::service::DraftService;
use pickban::store::{
    LobbyStore, LobbyUpdate, MemoryLobbyStore, Precondition, StoreError, WriteOutcome,
};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Remembers every request instead of firing anything
#[derive(Default)]
pub struct RecordingScheduler {
    created: Mutex<Vec<ScheduleRequest>>,
    deleted: Mutex<Vec<String>>,
    failing: AtomicBool,
}

impl RecordingScheduler {
    pub fn created(&self) -> Vec<ScheduleRequest> {
        self.created.lock().unwrap().clone()
    }

    pub fn created_names(&self) -> Vec<String> {
        self.created().into_iter().map(|r| r.name).collect()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn fail_creates(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl Scheduler for RecordingScheduler {
    async fn create(&self, request: ScheduleRequest) -> Result<ScheduleOutcome, SchedulerError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SchedulerError::Unavailable("scheduler offline".into()));
        }
        let mut created = self.created.lock().unwrap();
        if created.iter().any(|r| r.name == request.name) {
            return Ok(ScheduleOutcome::AlreadyExists);
        }
        created.push(request);
        Ok(ScheduleOutcome::Created)
    }

    async fn delete(&self, name: &str) -> Result<bool, SchedulerError> {
        self.deleted.lock().unwrap().push(name.to_string());
        Ok(true)
    }
}

/// Always takes the first candidate, so timeouts are predictable
pub struct FirstChooser;

impl ItemChooser for FirstChooser {
    fn choose<'a>(&self, candidates: &'a [String]) -> Option<&'a String> {
        candidates.first()
    }
}

pub type TestService = DraftService<MemoryLobbyStore, RecordingScheduler, FirstChooser>;

/// Memory store where another writer can slip in between a request's read
/// and its conditional write
#[derive(Default)]
pub struct RacingStore {
    inner: MemoryLobbyStore,
    rival: Mutex<Option<(usize, LobbyUpdate)>>,
}

impl RacingStore {
    pub fn put(&self, record: LobbyRecord) {
        self.inner.put(record);
    }

    /// Apply `update` unconditionally right before the write that comes
    /// after `skip` other writes
    pub fn interfere(&self, skip: usize, update: LobbyUpdate) {
        *self.rival.lock().unwrap() = Some((skip, update));
    }

    fn take_rival(&self) -> Option<LobbyUpdate> {
        let mut rival = self.rival.lock().unwrap();
        let due = match rival.as_mut() {
            Some((skip, _)) if *skip > 0 => {
                *skip -= 1;
                false
            }
            Some(_) => true,
            None => false,
        };
        if due { rival.take().map(|(_, update)| update) } else { None }
    }
}

impl LobbyStore for RacingStore {
    async fn get(&self, lobby_code: &str) -> Result<Option<LobbyRecord>, StoreError> {
        self.inner.get(lobby_code).await
    }

    async fn insert(&self, record: &LobbyRecord) -> Result<bool, StoreError> {
        self.inner.insert(record).await
    }

    async fn update(
        &self,
        lobby_code: &str,
        update: &LobbyUpdate,
        precondition: Precondition,
    ) -> Result<WriteOutcome, StoreError> {
        if let Some(rival) = self.take_rival() {
            self.inner.update(lobby_code, &rival, Precondition::Always).await?;
        }
        self.inner.update(lobby_code, update, precondition).await
    }

    async fn delete(&self, lobby_code: &str) -> Result<bool, StoreError> {
        self.inner.delete(lobby_code).await
    }

    async fn list_timed(&self) -> Result<Vec<LobbyRecord>, StoreError> {
        self.inner.list_timed().await
    }

    async fn purge_expired(&self, now_ms: i64) -> Result<u64, StoreError> {
        self.inner.purge_expired(now_ms).await
    }
}

pub type RacingService = DraftService<RacingStore, RecordingScheduler, FirstChooser>;

pub fn racing_service() -> RacingService {
    DraftService::new(
        RacingStore::default(),
        TimerController::new(RecordingScheduler::default()).with_buffer(Duration::ZERO),
        ItemPool::new(item_ids(20)),
        FirstChooser,
    )
}

pub fn item_ids(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("R{i}")).collect()
}

pub fn service_with_items(ids: Vec<String>) -> TestService {
    DraftService::new(
        MemoryLobbyStore::new(),
        TimerController::new(RecordingScheduler::default()).with_buffer(Duration::ZERO),
        ItemPool::new(ids),
        FirstChooser,
    )
}

pub fn service() -> TestService {
    service_with_items(item_ids(20))
}

/// Alice (organizer) in player1, Bob in player2, in `state`
pub fn seated_record(code: &str) -> LobbyRecord {
    let mut record = LobbyRecord::new(code, "Alice", now_ms());
    record.player1 = "Alice".into();
    record.player2 = "Bob".into();
    record
}

/// Create a lobby through the membership operations and seat both players.
/// The lobby ends up in the ready check.
pub async fn seated_lobby(service: &TestService) -> String {
    let lobby = service.create_lobby("Alice").await.unwrap();
    service.organizer_join(&lobby.lobby_code, "Alice").await.unwrap();
    service.join_lobby(&lobby.lobby_code, "Bob").await.unwrap();
    lobby.lobby_code
}

/// A seated lobby with both players ready, sitting in the first ban
pub async fn drafting_lobby(service: &TestService) -> String {
    let code = seated_lobby(service).await;
    service
        .submit_ready(&code, ActorRef::OrganizerAlias, true)
        .await
        .unwrap();
    service
        .submit_ready(&code, ActorRef::Direct(Slot::Player2), true)
        .await
        .unwrap();
    code
}
