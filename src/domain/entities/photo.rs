use crate::domain::value_objects::{EntityId, RemoteId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoDraft {
    pub worker_id: String,
    pub site_id: String,
    pub caption: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub taken_at: DateTime<Utc>,
}

/// Captured image stored locally until uploaded. Once a remote id exists the
/// bytes are never re-uploaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub id: EntityId,
    pub worker_id: String,
    pub site_id: String,
    pub caption: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub taken_at: DateTime<Utc>,
    pub synced: bool,
    pub remote_id: Option<RemoteId>,
    pub created_at: DateTime<Utc>,
}
