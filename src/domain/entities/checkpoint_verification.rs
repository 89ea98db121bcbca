use crate::domain::value_objects::{EntityId, RemoteId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointVerificationDraft {
    pub worker_id: String,
    pub patrol_id: String,
    pub checkpoint_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub verified_at: DateTime<Utc>,
}

/// Proof that a worker reached a patrol checkpoint, produced by the upstream
/// geofence trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointVerification {
    pub id: EntityId,
    pub worker_id: String,
    pub patrol_id: String,
    pub checkpoint_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub verified_at: DateTime<Utc>,
    pub synced: bool,
    pub remote_id: Option<RemoteId>,
    pub created_at: DateTime<Utc>,
}
