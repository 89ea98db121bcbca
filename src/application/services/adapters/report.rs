use crate::application::ports::{PushOutcome, RecordStore, RemoteApi};
use crate::application::services::adapters::EntitySyncAdapter;
use crate::domain::entities::SyncQueueItem;
use crate::domain::value_objects::{EntityKind, IdempotencyKey};
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Report submissions with last-writer-wins conflict resolution: when the
/// server already holds a version, the newer `updated_at` side wins. A local
/// win is resubmitted as an update to the existing remote record; a server
/// win adopts the remote version and discards the local change.
pub struct ReportAdapter {
    records: Arc<dyn RecordStore>,
    remote: Arc<dyn RemoteApi>,
}

impl ReportAdapter {
    pub fn new(records: Arc<dyn RecordStore>, remote: Arc<dyn RemoteApi>) -> Self {
        Self { records, remote }
    }
}

#[async_trait]
impl EntitySyncAdapter for ReportAdapter {
    fn kind(&self) -> EntityKind {
        EntityKind::Report
    }

    async fn push(&self, item: &SyncQueueItem) -> Result<PushOutcome, AppError> {
        let record = self.records.report(item.entity_id).await?;
        let key = IdempotencyKey::derive(EntityKind::Report, item.entity_id);

        let conflict = match self.remote.push_report(&record, &key).await {
            PushOutcome::Conflict(conflict) => conflict,
            other => return Ok(other),
        };

        // Missing server timestamp means we cannot prove the local edit is
        // newer, so the server version stands.
        let local_is_newer = conflict
            .server_updated_at
            .map(|server| record.updated_at > server)
            .unwrap_or(false);

        if !local_is_newer {
            debug!(
                target: "sync::adapter",
                entity_id = %item.entity_id,
                remote_id = %conflict.remote_id,
                "report conflict resolved server-side, adopting remote version"
            );
            return Ok(PushOutcome::Synced(conflict.remote_id));
        }

        debug!(
            target: "sync::adapter",
            entity_id = %item.entity_id,
            remote_id = %conflict.remote_id,
            "report conflict resolved locally, resubmitting as update"
        );
        Ok(
            match self
                .remote
                .update_report(&conflict.remote_id, &record, &key)
                .await
            {
                // A second conflict on the update path means the server moved
                // again underneath us; its version stands.
                PushOutcome::Conflict(second) => PushOutcome::Synced(second.remote_id),
                other => other,
            },
        )
    }
}
