use crate::application::ports::{PushOutcome, RecordStore, RemoteApi};
use crate::domain::entities::SyncQueueItem;
use crate::domain::value_objects::{EntityId, EntityKind, QueueItemId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

pub mod checkpoint_verification;
pub mod location_batch;
pub mod photo;
pub mod report;
pub mod time_record;

pub use checkpoint_verification::CheckpointVerificationAdapter;
pub use location_batch::LocationBatchAdapter;
pub use photo::PhotoAdapter;
pub use report::ReportAdapter;
pub use time_record::TimeRecordAdapter;

/// One push implementation per entity kind. `Err` is reserved for local
/// storage problems; every remote outcome, including the entity's resolved
/// conflict policy, comes back as a `PushOutcome`.
#[async_trait]
pub trait EntitySyncAdapter: Send + Sync {
    fn kind(&self) -> EntityKind;

    async fn push(&self, item: &SyncQueueItem) -> Result<PushOutcome, AppError>;
}

/// Outcome of one element of a location batch, keyed back to its queue row.
#[derive(Debug, Clone)]
pub struct BatchedItemOutcome {
    pub queue_item_id: QueueItemId,
    pub entity_id: EntityId,
    pub outcome: PushOutcome,
}

/// Lookup table over the adapters, built once at startup. Dispatch is by
/// `entity_kind` tag, no inheritance involved.
pub struct AdapterRegistry {
    single: HashMap<EntityKind, Arc<dyn EntitySyncAdapter>>,
    locations: Arc<LocationBatchAdapter>,
}

impl AdapterRegistry {
    pub fn build(records: Arc<dyn RecordStore>, remote: Arc<dyn RemoteApi>) -> Self {
        let mut single: HashMap<EntityKind, Arc<dyn EntitySyncAdapter>> = HashMap::new();
        single.insert(
            EntityKind::TimeRecord,
            Arc::new(TimeRecordAdapter::new(records.clone(), remote.clone())),
        );
        single.insert(
            EntityKind::CheckpointVerification,
            Arc::new(CheckpointVerificationAdapter::new(
                records.clone(),
                remote.clone(),
            )),
        );
        single.insert(
            EntityKind::Report,
            Arc::new(ReportAdapter::new(records.clone(), remote.clone())),
        );
        single.insert(
            EntityKind::Photo,
            Arc::new(PhotoAdapter::new(records.clone(), remote.clone())),
        );

        Self {
            single,
            locations: Arc::new(LocationBatchAdapter::new(records, remote)),
        }
    }

    pub fn single(&self, kind: EntityKind) -> Option<Arc<dyn EntitySyncAdapter>> {
        self.single.get(&kind).cloned()
    }

    pub fn locations(&self) -> Arc<LocationBatchAdapter> {
        self.locations.clone()
    }
}
