use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct SyncQueueItemRow {
    pub id: i64,
    pub entity_kind: String,
    pub entity_id: i64,
    pub priority: i64,
    pub status: String,
    pub retry_count: i64,
    pub last_attempt_at: Option<i64>,
    pub last_error: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct TimeRecordRow {
    pub id: i64,
    pub worker_id: String,
    pub site_id: String,
    pub kind: String,
    pub recorded_at: i64,
    pub synced: bool,
    pub remote_id: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct LocationSampleRow {
    pub id: i64,
    pub worker_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_m: f64,
    pub recorded_at: i64,
    pub synced: bool,
    pub remote_id: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct PhotoRow {
    pub id: i64,
    pub worker_id: String,
    pub site_id: String,
    pub caption: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub taken_at: i64,
    pub synced: bool,
    pub remote_id: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct ReportRow {
    pub id: i64,
    pub worker_id: String,
    pub site_id: String,
    pub title: String,
    pub body: String,
    pub updated_at: i64,
    pub synced: bool,
    pub remote_id: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct CheckpointVerificationRow {
    pub id: i64,
    pub worker_id: String,
    pub patrol_id: String,
    pub checkpoint_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub verified_at: i64,
    pub synced: bool,
    pub remote_id: Option<String>,
    pub created_at: i64,
}
