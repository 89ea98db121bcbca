use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueItemId(i64);

impl QueueItemId {
    pub fn new(value: i64) -> Result<Self, String> {
        if value <= 0 {
            return Err("Queue item id must be positive".to_string());
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for QueueItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<QueueItemId> for i64 {
    fn from(id: QueueItemId) -> Self {
        id.0
    }
}
