use serde::{Deserialize, Serialize};
use std::fmt;

/// The five record families the sync queue can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    TimeRecord,
    Location,
    Photo,
    Report,
    CheckpointVerification,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::CheckpointVerification,
        EntityKind::TimeRecord,
        EntityKind::Location,
        EntityKind::Report,
        EntityKind::Photo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::TimeRecord => "time_record",
            EntityKind::Location => "location",
            EntityKind::Photo => "photo",
            EntityKind::Report => "report",
            EntityKind::CheckpointVerification => "checkpoint_verification",
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "time_record" => Ok(EntityKind::TimeRecord),
            "location" => Ok(EntityKind::Location),
            "photo" => Ok(EntityKind::Photo),
            "report" => Ok(EntityKind::Report),
            "checkpoint_verification" => Ok(EntityKind::CheckpointVerification),
            other => Err(format!("Unknown entity kind: {other}")),
        }
    }

    /// Default queue priority, lower syncs first. Checkpoint verifications
    /// and time records carry operational evidence and go ahead of reports
    /// and photos.
    pub fn default_priority(&self) -> i64 {
        match self {
            EntityKind::CheckpointVerification => 10,
            EntityKind::TimeRecord => 20,
            EntityKind::Location => 30,
            EntityKind::Report => 40,
            EntityKind::Photo => 50,
        }
    }

    /// Photos carry binary payloads and may be held back on metered links.
    pub fn is_large_payload(&self) -> bool {
        matches!(self, EntityKind::Photo)
    }

    /// Locations go through the batch endpoint rather than one call per row.
    pub fn is_batched(&self) -> bool {
        matches!(self, EntityKind::Location)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
