use crate::domain::entities::SyncQueueItem;
use crate::domain::value_objects::{EntityId, EntityKind, QueueItemId, RemoteId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Live row counts per queue status, for the UI status surface.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueueCounts {
    pub pending: u32,
    pub in_progress: u32,
    pub failed_retryable: u32,
    pub failed_terminal: u32,
}

impl QueueCounts {
    pub fn backlog(&self) -> u32 {
        self.pending + self.in_progress + self.failed_retryable
    }
}

/// Conservative backoff readiness bound, pushed into the store query so
/// rows deep inside their window do not occupy the fetch limit. Jitter and
/// millisecond precision stay with the in-process policy filter.
#[derive(Debug, Clone, Copy)]
pub struct DueBound {
    pub base_delay_secs: i64,
    pub max_delay_secs: i64,
}

/// Query and transition surface over the `sync_queue` table.
///
/// Enqueueing is deliberately absent: queue rows are only ever created
/// inside the record store's save transactions.
#[async_trait]
pub trait SyncQueueStore: Send + Sync {
    /// Pending and retryable items in priority-then-age order, restricted to
    /// rows whose conservative backoff window has elapsed by `now`. The
    /// caller still applies the exact jittered readiness check.
    async fn schedulable_items(
        &self,
        scope: Option<EntityKind>,
        limit: u32,
        due: DueBound,
        now: DateTime<Utc>,
    ) -> Result<Vec<SyncQueueItem>, AppError>;

    /// Atomically move an item to `in_progress`. Returns false when another
    /// pass already claimed it; the caller must then skip the item.
    async fn claim(&self, id: QueueItemId, now: DateTime<Utc>) -> Result<bool, AppError>;

    /// Terminal success: flip the domain record to synced with the assigned
    /// remote id and delete the queue row, in one transaction.
    async fn complete_synced(
        &self,
        kind: EntityKind,
        entity_id: EntityId,
        remote_id: RemoteId,
    ) -> Result<(), AppError>;

    /// Transient failure: bump the retry count and record the error.
    async fn fail_retryable(
        &self,
        id: QueueItemId,
        error: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Permanent failure: park the item for manual inspection.
    async fn fail_terminal(
        &self,
        id: QueueItemId,
        error: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Put a claimed item back to `pending` untouched, used when a local
    /// storage error prevented the attempt from producing an outcome.
    async fn release(&self, id: QueueItemId) -> Result<(), AppError>;

    /// Items stuck `in_progress` beyond the grace period are flipped back to
    /// `failed_retryable` without bumping the retry count. Run at startup.
    async fn recover_stalled(
        &self,
        stalled_before: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<u32, AppError>;

    /// Terminal failures awaiting operator attention, newest first.
    async fn terminal_items(&self) -> Result<Vec<SyncQueueItem>, AppError>;

    /// Drop a terminal item after the operator has dealt with it.
    async fn dismiss_terminal(&self, id: QueueItemId) -> Result<(), AppError>;

    async fn counts(&self) -> Result<QueueCounts, AppError>;
}
