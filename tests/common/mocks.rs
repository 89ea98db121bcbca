use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use vigil::application::ports::{
    BatchPushOutcome, DueBound, PushOutcome, QueueCounts, RemoteApi, SyncQueueStore,
};
use vigil::domain::entities::{
    CheckpointVerification, LocationSample, Photo, Report, SyncQueueItem, TimeRecord,
};
use vigil::domain::value_objects::{
    EntityId, EntityKind, IdempotencyKey, QueueItemId, RemoteId,
};
use vigil::infrastructure::sync::SqliteSyncStore;
use vigil::shared::error::AppError;

/// One recorded remote call: which kind, with which idempotency key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub kind: EntityKind,
    pub idempotency_key: String,
}

/// Scriptable remote. Outcomes are popped per entity kind in FIFO order;
/// an empty script answers `Synced` with a key-derived remote id, which is
/// also what an idempotent server replay would converge on.
#[derive(Default)]
pub struct MockRemoteApi {
    push_scripts: Mutex<HashMap<EntityKind, VecDeque<PushOutcome>>>,
    update_scripts: Mutex<VecDeque<PushOutcome>>,
    batch_scripts: Mutex<VecDeque<BatchPushOutcome>>,
    calls: Mutex<Vec<RecordedCall>>,
    update_calls: Mutex<Vec<(String, String)>>,
    batch_calls: Mutex<Vec<Vec<String>>>,
    push_delay: Mutex<Option<std::time::Duration>>,
}

impl MockRemoteApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_push(&self, kind: EntityKind, outcome: PushOutcome) {
        self.push_scripts
            .lock()
            .unwrap()
            .entry(kind)
            .or_default()
            .push_back(outcome);
    }

    pub fn script_update(&self, outcome: PushOutcome) {
        self.update_scripts.lock().unwrap().push_back(outcome);
    }

    pub fn script_batch(&self, outcome: BatchPushOutcome) {
        self.batch_scripts.lock().unwrap().push_back(outcome);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, kind: EntityKind) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.kind == kind)
            .collect()
    }

    /// `(remote_id, idempotency_key)` pairs seen by `update_report`.
    pub fn update_calls(&self) -> Vec<(String, String)> {
        self.update_calls.lock().unwrap().clone()
    }

    /// Idempotency keys per batch call, in submission order.
    pub fn batch_calls(&self) -> Vec<Vec<String>> {
        self.batch_calls.lock().unwrap().clone()
    }

    /// Slow every remote call down, for overlap/coalescing tests.
    pub fn set_push_delay(&self, delay: std::time::Duration) {
        *self.push_delay.lock().unwrap() = Some(delay);
    }

    async fn maybe_delay(&self) {
        let delay = *self.push_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    pub fn default_remote_id(key: &IdempotencyKey) -> RemoteId {
        RemoteId::new(format!("srv-{}", &key.as_str()[..12])).expect("remote id")
    }

    fn push(&self, kind: EntityKind, key: &IdempotencyKey) -> PushOutcome {
        self.calls.lock().unwrap().push(RecordedCall {
            kind,
            idempotency_key: key.as_str().to_string(),
        });
        let scripted = self
            .push_scripts
            .lock()
            .unwrap()
            .get_mut(&kind)
            .and_then(|queue| queue.pop_front());
        scripted.unwrap_or_else(|| PushOutcome::Synced(Self::default_remote_id(key)))
    }
}

#[async_trait]
impl RemoteApi for MockRemoteApi {
    async fn push_time_record(&self, _record: &TimeRecord, key: &IdempotencyKey) -> PushOutcome {
        self.maybe_delay().await;
        self.push(EntityKind::TimeRecord, key)
    }

    async fn push_checkpoint_verification(
        &self,
        _record: &CheckpointVerification,
        key: &IdempotencyKey,
    ) -> PushOutcome {
        self.maybe_delay().await;
        self.push(EntityKind::CheckpointVerification, key)
    }

    async fn push_report(&self, _record: &Report, key: &IdempotencyKey) -> PushOutcome {
        self.maybe_delay().await;
        self.push(EntityKind::Report, key)
    }

    async fn update_report(
        &self,
        remote_id: &RemoteId,
        _record: &Report,
        key: &IdempotencyKey,
    ) -> PushOutcome {
        self.update_calls
            .lock()
            .unwrap()
            .push((remote_id.as_str().to_string(), key.as_str().to_string()));
        let scripted = self.update_scripts.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| PushOutcome::Synced(remote_id.clone()))
    }

    async fn push_photo(&self, _record: &Photo, key: &IdempotencyKey) -> PushOutcome {
        self.maybe_delay().await;
        self.push(EntityKind::Photo, key)
    }

    async fn push_location_batch(
        &self,
        _samples: &[LocationSample],
        keys: &[IdempotencyKey],
    ) -> BatchPushOutcome {
        self.maybe_delay().await;
        self.batch_calls
            .lock()
            .unwrap()
            .push(keys.iter().map(|key| key.as_str().to_string()).collect());
        let scripted = self.batch_scripts.lock().unwrap().pop_front();
        scripted.unwrap_or(BatchPushOutcome::Processed {
            failed_indices: Vec::new(),
        })
    }
}

/// Queue store that delegates to the real sqlite store but can be told to
/// fail `counts`, for exercising the status surface under store errors.
pub struct BrokenCountsStore {
    inner: Arc<SqliteSyncStore>,
    fail_counts: AtomicBool,
}

impl BrokenCountsStore {
    pub fn new(inner: Arc<SqliteSyncStore>) -> Self {
        Self {
            inner,
            fail_counts: AtomicBool::new(false),
        }
    }

    pub fn set_fail_counts(&self, fail: bool) {
        self.fail_counts.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SyncQueueStore for BrokenCountsStore {
    async fn schedulable_items(
        &self,
        scope: Option<EntityKind>,
        limit: u32,
        due: DueBound,
        now: DateTime<Utc>,
    ) -> Result<Vec<SyncQueueItem>, AppError> {
        self.inner.schedulable_items(scope, limit, due, now).await
    }

    async fn claim(&self, id: QueueItemId, now: DateTime<Utc>) -> Result<bool, AppError> {
        self.inner.claim(id, now).await
    }

    async fn complete_synced(
        &self,
        kind: EntityKind,
        entity_id: EntityId,
        remote_id: RemoteId,
    ) -> Result<(), AppError> {
        self.inner.complete_synced(kind, entity_id, remote_id).await
    }

    async fn fail_retryable(
        &self,
        id: QueueItemId,
        error: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.inner.fail_retryable(id, error, now).await
    }

    async fn fail_terminal(
        &self,
        id: QueueItemId,
        error: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.inner.fail_terminal(id, error, now).await
    }

    async fn release(&self, id: QueueItemId) -> Result<(), AppError> {
        self.inner.release(id).await
    }

    async fn recover_stalled(
        &self,
        stalled_before: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<u32, AppError> {
        self.inner.recover_stalled(stalled_before, now).await
    }

    async fn terminal_items(&self) -> Result<Vec<SyncQueueItem>, AppError> {
        self.inner.terminal_items().await
    }

    async fn dismiss_terminal(&self, id: QueueItemId) -> Result<(), AppError> {
        self.inner.dismiss_terminal(id).await
    }

    async fn counts(&self) -> Result<QueueCounts, AppError> {
        if self.fail_counts.load(Ordering::SeqCst) {
            return Err(AppError::Database("counts unavailable".to_string()));
        }
        self.inner.counts().await
    }
}
