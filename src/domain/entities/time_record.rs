use crate::domain::value_objects::{EntityId, RemoteId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRecordKind {
    ClockIn,
    ClockOut,
}

impl TimeRecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRecordKind::ClockIn => "clock_in",
            TimeRecordKind::ClockOut => "clock_out",
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "clock_in" => Ok(TimeRecordKind::ClockIn),
            "clock_out" => Ok(TimeRecordKind::ClockOut),
            other => Err(format!("Unknown time record kind: {other}")),
        }
    }
}

/// Fields supplied by the time tracking service when the user clocks in/out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeRecordDraft {
    pub worker_id: String,
    pub site_id: String,
    pub kind: TimeRecordKind,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeRecord {
    pub id: EntityId,
    pub worker_id: String,
    pub site_id: String,
    pub kind: TimeRecordKind,
    pub recorded_at: DateTime<Utc>,
    pub synced: bool,
    pub remote_id: Option<RemoteId>,
    pub created_at: DateTime<Utc>,
}

impl TimeRecord {
    /// `synced` implies a remote id; violated rows indicate a broken store.
    pub fn is_consistent(&self) -> bool {
        !self.synced || self.remote_id.is_some()
    }
}
