use serde::{Deserialize, Serialize};
use std::fmt;

/// Local rowid of a domain record. The sync queue references records by this
/// id; it never copies payload out of the domain tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(i64);

impl EntityId {
    pub fn new(value: i64) -> Result<Self, String> {
        if value <= 0 {
            return Err("Entity id must be positive".to_string());
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<EntityId> for i64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}
