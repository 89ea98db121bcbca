use crate::application::ports::{BatchPushOutcome, PushOutcome, RecordStore, RemoteApi};
use crate::application::services::adapters::BatchedItemOutcome;
use crate::domain::entities::SyncQueueItem;
use crate::domain::value_objects::{EntityId, EntityKind, IdempotencyKey, RemoteId};
use crate::shared::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Batch adapter for location samples. Samples are append-only and
/// deduplicated server-side on the idempotency key, which doubles as the
/// remote handle (the batch response carries no per-item ids).
pub struct LocationBatchAdapter {
    records: Arc<dyn RecordStore>,
    remote: Arc<dyn RemoteApi>,
}

impl LocationBatchAdapter {
    pub fn new(records: Arc<dyn RecordStore>, remote: Arc<dyn RemoteApi>) -> Self {
        Self { records, remote }
    }

    /// Push one bounded batch of claimed queue items. A partial failure
    /// reports per-item outcomes so the orchestrator re-queues only the
    /// rejected subset.
    pub async fn push_batch(
        &self,
        items: &[SyncQueueItem],
    ) -> Result<Vec<BatchedItemOutcome>, AppError> {
        let ids: Vec<EntityId> = items.iter().map(|item| item.entity_id).collect();
        let samples = self.records.location_samples(&ids).await?;
        let by_id: HashMap<i64, _> = samples
            .into_iter()
            .map(|sample| (sample.id.value(), sample))
            .collect();

        let mut outcomes = Vec::with_capacity(items.len());
        let mut batch = Vec::new();
        let mut keys = Vec::new();
        // Positions in `batch` mapped back to positions in `items`.
        let mut batch_to_item = Vec::new();

        for (index, item) in items.iter().enumerate() {
            match by_id.get(&item.entity_id.value()) {
                Some(sample) => {
                    batch.push(sample.clone());
                    keys.push(IdempotencyKey::derive(EntityKind::Location, item.entity_id));
                    batch_to_item.push(index);
                }
                None => {
                    warn!(
                        target: "sync::adapter",
                        entity_id = %item.entity_id,
                        "location queue item references a missing sample"
                    );
                    outcomes.push(BatchedItemOutcome {
                        queue_item_id: item.id,
                        entity_id: item.entity_id,
                        outcome: PushOutcome::Permanent("local record missing".to_string()),
                    });
                }
            }
        }

        if batch.is_empty() {
            return Ok(outcomes);
        }

        match self.remote.push_location_batch(&batch, &keys).await {
            BatchPushOutcome::Processed { failed_indices } => {
                for (batch_index, item_index) in batch_to_item.iter().enumerate() {
                    let item = &items[*item_index];
                    let outcome = if failed_indices.contains(&batch_index) {
                        PushOutcome::Transient("batch element not processed".to_string())
                    } else {
                        PushOutcome::Synced(remote_handle(&keys[batch_index]))
                    };
                    outcomes.push(BatchedItemOutcome {
                        queue_item_id: item.id,
                        entity_id: item.entity_id,
                        outcome,
                    });
                }
            }
            BatchPushOutcome::Transient(reason) => {
                for item_index in &batch_to_item {
                    let item = &items[*item_index];
                    outcomes.push(BatchedItemOutcome {
                        queue_item_id: item.id,
                        entity_id: item.entity_id,
                        outcome: PushOutcome::Transient(reason.clone()),
                    });
                }
            }
            BatchPushOutcome::Permanent(reason) => {
                for item_index in &batch_to_item {
                    let item = &items[*item_index];
                    outcomes.push(BatchedItemOutcome {
                        queue_item_id: item.id,
                        entity_id: item.entity_id,
                        outcome: PushOutcome::Permanent(reason.clone()),
                    });
                }
            }
        }

        Ok(outcomes)
    }
}

// Keys are 64 hex chars, so this cannot fail validation.
fn remote_handle(key: &IdempotencyKey) -> RemoteId {
    RemoteId::parse(key.as_str()).unwrap_or_else(|_| unreachable!("idempotency keys are non-empty"))
}
