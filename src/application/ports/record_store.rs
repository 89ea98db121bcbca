use crate::domain::entities::{
    CheckpointVerification, CheckpointVerificationDraft, LocationSample, LocationSampleDraft,
    Photo, PhotoDraft, Report, ReportDraft, TimeRecord, TimeRecordDraft,
};
use crate::domain::value_objects::{EntityId, EntityKind};
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Durable storage for domain records.
///
/// Every `save_*` inserts the record and its sync queue item in one local
/// transaction, the sole write entry point into the queue. A crash after a
/// save therefore always leaves the queue item behind for the next pass.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn save_time_record(&self, draft: TimeRecordDraft) -> Result<TimeRecord, AppError>;
    async fn save_location_sample(
        &self,
        draft: LocationSampleDraft,
    ) -> Result<LocationSample, AppError>;
    async fn save_photo(&self, draft: PhotoDraft) -> Result<Photo, AppError>;
    async fn save_report(&self, draft: ReportDraft) -> Result<Report, AppError>;
    async fn save_checkpoint_verification(
        &self,
        draft: CheckpointVerificationDraft,
    ) -> Result<CheckpointVerification, AppError>;

    /// Offline edit of an existing report. Bumps `updated_at`, clears the
    /// synced flag and re-enqueues; a still-pending queue row is superseded
    /// in place so only the latest version ever reaches the server.
    async fn update_report(
        &self,
        id: EntityId,
        title: String,
        body: String,
        updated_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<Report, AppError>;

    async fn time_record(&self, id: EntityId) -> Result<TimeRecord, AppError>;
    async fn location_samples(&self, ids: &[EntityId]) -> Result<Vec<LocationSample>, AppError>;
    async fn photo(&self, id: EntityId) -> Result<Photo, AppError>;
    async fn report(&self, id: EntityId) -> Result<Report, AppError>;
    async fn checkpoint_verification(
        &self,
        id: EntityId,
    ) -> Result<CheckpointVerification, AppError>;

    /// Explicit user deletion of an unsynced record. Removes the record and
    /// its queue item in one transaction; refuses records already synced.
    async fn delete_unsynced(&self, kind: EntityKind, id: EntityId) -> Result<(), AppError>;
}
