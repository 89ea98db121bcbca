use crate::application::ports::{PushOutcome, RecordStore, RemoteApi};
use crate::application::services::adapters::EntitySyncAdapter;
use crate::domain::entities::SyncQueueItem;
use crate::domain::value_objects::{EntityKind, IdempotencyKey};
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::sync::Arc;

/// Clock-in/out submissions. Conflict policy is server-wins: a replayed
/// idempotency key adopts the server's record, local state is never pushed
/// over it.
pub struct TimeRecordAdapter {
    records: Arc<dyn RecordStore>,
    remote: Arc<dyn RemoteApi>,
}

impl TimeRecordAdapter {
    pub fn new(records: Arc<dyn RecordStore>, remote: Arc<dyn RemoteApi>) -> Self {
        Self { records, remote }
    }
}

#[async_trait]
impl EntitySyncAdapter for TimeRecordAdapter {
    fn kind(&self) -> EntityKind {
        EntityKind::TimeRecord
    }

    async fn push(&self, item: &SyncQueueItem) -> Result<PushOutcome, AppError> {
        let record = self.records.time_record(item.entity_id).await?;
        let key = IdempotencyKey::derive(EntityKind::TimeRecord, item.entity_id);

        Ok(match self.remote.push_time_record(&record, &key).await {
            PushOutcome::Conflict(conflict) => PushOutcome::Synced(conflict.remote_id),
            other => other,
        })
    }
}
