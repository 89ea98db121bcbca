use crate::domain::value_objects::{EntityId, RemoteId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDraft {
    pub worker_id: String,
    pub site_id: String,
    pub title: String,
    pub body: String,
    pub updated_at: DateTime<Utc>,
}

/// Incident/activity report. The only mutable record family: offline edits
/// bump `updated_at`, which drives last-writer-wins conflict resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: EntityId,
    pub worker_id: String,
    pub site_id: String,
    pub title: String,
    pub body: String,
    pub updated_at: DateTime<Utc>,
    pub synced: bool,
    pub remote_id: Option<RemoteId>,
    pub created_at: DateTime<Utc>,
}
