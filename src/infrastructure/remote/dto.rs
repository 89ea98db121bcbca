use crate::domain::entities::{
    CheckpointVerification, LocationSample, Photo, Report, TimeRecord,
};
use crate::domain::value_objects::IdempotencyKey;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct TimeRecordPayload {
    pub idempotency_key: String,
    pub worker_id: String,
    pub site_id: String,
    pub kind: String,
    pub recorded_at: String,
}

impl TimeRecordPayload {
    pub fn from_record(record: &TimeRecord, key: &IdempotencyKey) -> Self {
        Self {
            idempotency_key: key.as_str().to_string(),
            worker_id: record.worker_id.clone(),
            site_id: record.site_id.clone(),
            kind: record.kind.as_str().to_string(),
            recorded_at: record.recorded_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckpointVerificationPayload {
    pub idempotency_key: String,
    pub worker_id: String,
    pub patrol_id: String,
    pub checkpoint_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub verified_at: String,
}

impl CheckpointVerificationPayload {
    pub fn from_record(record: &CheckpointVerification, key: &IdempotencyKey) -> Self {
        Self {
            idempotency_key: key.as_str().to_string(),
            worker_id: record.worker_id.clone(),
            patrol_id: record.patrol_id.clone(),
            checkpoint_id: record.checkpoint_id.clone(),
            latitude: record.latitude,
            longitude: record.longitude,
            verified_at: record.verified_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportPayload {
    pub idempotency_key: String,
    pub worker_id: String,
    pub site_id: String,
    pub title: String,
    pub body: String,
    pub updated_at: String,
}

impl ReportPayload {
    pub fn from_record(record: &Report, key: &IdempotencyKey) -> Self {
        Self {
            idempotency_key: key.as_str().to_string(),
            worker_id: record.worker_id.clone(),
            site_id: record.site_id.clone(),
            title: record.title.clone(),
            body: record.body.clone(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PhotoPayload {
    pub idempotency_key: String,
    pub worker_id: String,
    pub site_id: String,
    pub caption: Option<String>,
    pub content_type: String,
    /// Image bytes, base64 encoded.
    pub data: String,
    pub taken_at: String,
}

impl PhotoPayload {
    pub fn from_record(record: &Photo, key: &IdempotencyKey) -> Self {
        Self {
            idempotency_key: key.as_str().to_string(),
            worker_id: record.worker_id.clone(),
            site_id: record.site_id.clone(),
            caption: record.caption.clone(),
            content_type: record.content_type.clone(),
            data: BASE64.encode(&record.bytes),
            taken_at: record.taken_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationSamplePayload {
    pub idempotency_key: String,
    pub worker_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_m: f64,
    pub recorded_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationBatchPayload {
    pub samples: Vec<LocationSamplePayload>,
}

impl LocationBatchPayload {
    pub fn from_records(samples: &[LocationSample], keys: &[IdempotencyKey]) -> Self {
        let samples = samples
            .iter()
            .zip(keys)
            .map(|(sample, key)| LocationSamplePayload {
                idempotency_key: key.as_str().to_string(),
                worker_id: sample.worker_id.clone(),
                latitude: sample.latitude,
                longitude: sample.longitude,
                accuracy_m: sample.accuracy_m,
                recorded_at: sample.recorded_at.to_rfc3339(),
            })
            .collect();
        Self { samples }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedResponse {
    pub id: String,
}

/// Body of a 409: the server already holds this record.
#[derive(Debug, Clone, Deserialize)]
pub struct ConflictResponse {
    pub id: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchResponse {
    #[serde(default)]
    pub failed_indices: Vec<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
}
