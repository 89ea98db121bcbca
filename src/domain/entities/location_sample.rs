use crate::domain::value_objects::{EntityId, RemoteId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationSampleDraft {
    pub worker_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_m: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Immutable, timestamped position fix. Append-only by construction, so
/// conflicts cannot arise; the server deduplicates replays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationSample {
    pub id: EntityId,
    pub worker_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_m: f64,
    pub recorded_at: DateTime<Utc>,
    pub synced: bool,
    pub remote_id: Option<RemoteId>,
    pub created_at: DateTime<Utc>,
}
