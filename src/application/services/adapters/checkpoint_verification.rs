use crate::application::ports::{PushOutcome, RecordStore, RemoteApi};
use crate::application::services::adapters::EntitySyncAdapter;
use crate::domain::entities::SyncQueueItem;
use crate::domain::value_objects::{EntityKind, IdempotencyKey};
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::sync::Arc;

/// Checkpoint verification submissions, server-wins on conflict like time
/// records.
pub struct CheckpointVerificationAdapter {
    records: Arc<dyn RecordStore>,
    remote: Arc<dyn RemoteApi>,
}

impl CheckpointVerificationAdapter {
    pub fn new(records: Arc<dyn RecordStore>, remote: Arc<dyn RemoteApi>) -> Self {
        Self { records, remote }
    }
}

#[async_trait]
impl EntitySyncAdapter for CheckpointVerificationAdapter {
    fn kind(&self) -> EntityKind {
        EntityKind::CheckpointVerification
    }

    async fn push(&self, item: &SyncQueueItem) -> Result<PushOutcome, AppError> {
        let record = self.records.checkpoint_verification(item.entity_id).await?;
        let key = IdempotencyKey::derive(EntityKind::CheckpointVerification, item.entity_id);

        Ok(
            match self.remote.push_checkpoint_verification(&record, &key).await {
                PushOutcome::Conflict(conflict) => PushOutcome::Synced(conflict.remote_id),
                other => other,
            },
        )
    }
}
