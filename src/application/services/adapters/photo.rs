use crate::application::ports::{PushOutcome, RecordStore, RemoteApi};
use crate::application::services::adapters::EntitySyncAdapter;
use crate::domain::entities::SyncQueueItem;
use crate::domain::value_objects::{EntityKind, IdempotencyKey};
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::sync::Arc;

/// Photo uploads. Server-wins on conflict, and a photo that already carries
/// a remote id is never re-uploaded; the bytes stay local.
pub struct PhotoAdapter {
    records: Arc<dyn RecordStore>,
    remote: Arc<dyn RemoteApi>,
}

impl PhotoAdapter {
    pub fn new(records: Arc<dyn RecordStore>, remote: Arc<dyn RemoteApi>) -> Self {
        Self { records, remote }
    }
}

#[async_trait]
impl EntitySyncAdapter for PhotoAdapter {
    fn kind(&self) -> EntityKind {
        EntityKind::Photo
    }

    async fn push(&self, item: &SyncQueueItem) -> Result<PushOutcome, AppError> {
        let record = self.records.photo(item.entity_id).await?;

        if let Some(remote_id) = record.remote_id.clone() {
            return Ok(PushOutcome::Synced(remote_id));
        }

        let key = IdempotencyKey::derive(EntityKind::Photo, item.entity_id);
        Ok(match self.remote.push_photo(&record, &key).await {
            PushOutcome::Conflict(conflict) => PushOutcome::Synced(conflict.remote_id),
            other => other,
        })
    }
}
