use crate::domain::value_objects::{EntityId, EntityKind, QueueItemId, QueueStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncQueueItem {
    pub id: QueueItemId,
    pub entity_kind: EntityKind,
    pub entity_id: EntityId,
    pub priority: i64,
    pub status: QueueStatus,
    pub retry_count: u32,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SyncQueueItem {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: QueueItemId,
        entity_kind: EntityKind,
        entity_id: EntityId,
        priority: i64,
        status: QueueStatus,
        retry_count: u32,
        last_attempt_at: Option<DateTime<Utc>>,
        last_error: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            entity_kind,
            entity_id,
            priority,
            status,
            retry_count,
            last_attempt_at,
            last_error,
            created_at,
            updated_at,
        }
    }
}
