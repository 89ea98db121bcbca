use crate::domain::entities::{
    CheckpointVerification, LocationSample, Photo, Report, TimeRecord,
};
use crate::domain::value_objects::{IdempotencyKey, RemoteId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Classified result of pushing one record. Remote failures never surface
/// as `Err`; adapters and the orchestrator branch on this enum so every
/// queue item ends in a defined status.
#[derive(Debug, Clone, PartialEq)]
pub enum PushOutcome {
    Synced(RemoteId),
    /// Network/timeout/5xx. Retried with backoff.
    Transient(String),
    /// Validation 4xx. Never retried.
    Permanent(String),
    /// The server already processed this idempotency key.
    Conflict(RemoteConflict),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteConflict {
    pub remote_id: RemoteId,
    /// Server-side version timestamp, present for mutable records (reports).
    pub server_updated_at: Option<DateTime<Utc>>,
}

/// Result of a location batch push. On `Processed`, samples at
/// `failed_indices` (positions within the submitted slice) were rejected;
/// everything else was accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchPushOutcome {
    Processed { failed_indices: Vec<usize> },
    Transient(String),
    Permanent(String),
}

/// Wire contract with the system-of-record. One endpoint per entity kind,
/// bearer credential, idempotency key in every payload.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn push_time_record(&self, record: &TimeRecord, key: &IdempotencyKey) -> PushOutcome;

    async fn push_checkpoint_verification(
        &self,
        record: &CheckpointVerification,
        key: &IdempotencyKey,
    ) -> PushOutcome;

    async fn push_report(&self, record: &Report, key: &IdempotencyKey) -> PushOutcome;

    /// Resubmit a conflicted report as an update to the existing remote
    /// record (last-writer-wins, local side won).
    async fn update_report(
        &self,
        remote_id: &RemoteId,
        record: &Report,
        key: &IdempotencyKey,
    ) -> PushOutcome;

    async fn push_photo(&self, record: &Photo, key: &IdempotencyKey) -> PushOutcome;

    /// Bounded batch endpoint; `keys` lines up index-for-index with
    /// `samples`.
    async fn push_location_batch(
        &self,
        samples: &[LocationSample],
        keys: &[IdempotencyKey],
    ) -> BatchPushOutcome;
}
