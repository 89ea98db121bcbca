use crate::domain::entities::{
    CheckpointVerification, LocationSample, Photo, Report, SyncQueueItem, TimeRecord,
    TimeRecordKind,
};
use crate::domain::value_objects::{EntityId, EntityKind, QueueItemId, QueueStatus, RemoteId};
use crate::infrastructure::sync::rows::{
    CheckpointVerificationRow, LocationSampleRow, PhotoRow, ReportRow, SyncQueueItemRow,
    TimeRecordRow,
};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};

fn timestamp(value: i64, column: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::<Utc>::from_timestamp(value, 0).ok_or_else(|| {
        AppError::DeserializationError(format!("Invalid timestamp in column {column}: {value}"))
    })
}

fn opt_remote_id(value: Option<String>) -> Result<Option<RemoteId>, AppError> {
    value
        .map(|raw| RemoteId::new(raw).map_err(AppError::DeserializationError))
        .transpose()
}

pub fn queue_item_from_row(row: SyncQueueItemRow) -> Result<SyncQueueItem, AppError> {
    Ok(SyncQueueItem {
        id: QueueItemId::new(row.id).map_err(AppError::DeserializationError)?,
        entity_kind: EntityKind::parse(&row.entity_kind)
            .map_err(AppError::DeserializationError)?,
        entity_id: EntityId::new(row.entity_id).map_err(AppError::DeserializationError)?,
        priority: row.priority,
        status: QueueStatus::from(row.status.as_str()),
        retry_count: row.retry_count.try_into().map_err(|_| {
            AppError::DeserializationError(format!("Negative retry count: {}", row.retry_count))
        })?,
        last_attempt_at: row
            .last_attempt_at
            .map(|value| timestamp(value, "last_attempt_at"))
            .transpose()?,
        last_error: row.last_error,
        created_at: timestamp(row.created_at, "created_at")?,
        updated_at: timestamp(row.updated_at, "updated_at")?,
    })
}

pub fn time_record_from_row(row: TimeRecordRow) -> Result<TimeRecord, AppError> {
    Ok(TimeRecord {
        id: EntityId::new(row.id).map_err(AppError::DeserializationError)?,
        worker_id: row.worker_id,
        site_id: row.site_id,
        kind: TimeRecordKind::parse(&row.kind).map_err(AppError::DeserializationError)?,
        recorded_at: timestamp(row.recorded_at, "recorded_at")?,
        synced: row.synced,
        remote_id: opt_remote_id(row.remote_id)?,
        created_at: timestamp(row.created_at, "created_at")?,
    })
}

pub fn location_sample_from_row(row: LocationSampleRow) -> Result<LocationSample, AppError> {
    Ok(LocationSample {
        id: EntityId::new(row.id).map_err(AppError::DeserializationError)?,
        worker_id: row.worker_id,
        latitude: row.latitude,
        longitude: row.longitude,
        accuracy_m: row.accuracy_m,
        recorded_at: timestamp(row.recorded_at, "recorded_at")?,
        synced: row.synced,
        remote_id: opt_remote_id(row.remote_id)?,
        created_at: timestamp(row.created_at, "created_at")?,
    })
}

pub fn photo_from_row(row: PhotoRow) -> Result<Photo, AppError> {
    Ok(Photo {
        id: EntityId::new(row.id).map_err(AppError::DeserializationError)?,
        worker_id: row.worker_id,
        site_id: row.site_id,
        caption: row.caption,
        content_type: row.content_type,
        bytes: row.bytes,
        taken_at: timestamp(row.taken_at, "taken_at")?,
        synced: row.synced,
        remote_id: opt_remote_id(row.remote_id)?,
        created_at: timestamp(row.created_at, "created_at")?,
    })
}

pub fn report_from_row(row: ReportRow) -> Result<Report, AppError> {
    Ok(Report {
        id: EntityId::new(row.id).map_err(AppError::DeserializationError)?,
        worker_id: row.worker_id,
        site_id: row.site_id,
        title: row.title,
        body: row.body,
        updated_at: timestamp(row.updated_at, "updated_at")?,
        synced: row.synced,
        remote_id: opt_remote_id(row.remote_id)?,
        created_at: timestamp(row.created_at, "created_at")?,
    })
}

pub fn checkpoint_verification_from_row(
    row: CheckpointVerificationRow,
) -> Result<CheckpointVerification, AppError> {
    Ok(CheckpointVerification {
        id: EntityId::new(row.id).map_err(AppError::DeserializationError)?,
        worker_id: row.worker_id,
        patrol_id: row.patrol_id,
        checkpoint_id: row.checkpoint_id,
        latitude: row.latitude,
        longitude: row.longitude,
        verified_at: timestamp(row.verified_at, "verified_at")?,
        synced: row.synced,
        remote_id: opt_remote_id(row.remote_id)?,
        created_at: timestamp(row.created_at, "created_at")?,
    })
}
