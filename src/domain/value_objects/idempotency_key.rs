use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use super::{EntityId, EntityKind};

/// Client-generated deduplication token carried in every remote submission.
///
/// Derived deterministically from the local identity of the record, so a
/// retry after a lost response produces the same token and the server can
/// answer with the original remote id instead of a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    pub fn derive(kind: EntityKind, entity_id: EntityId) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"vigil:");
        hasher.update(kind.as_str().as_bytes());
        hasher.update(b":");
        hasher.update(entity_id.value().to_be_bytes());
        let digest = hasher.finalize();

        let mut hex = String::with_capacity(digest.len() * 2);
        for byte in digest {
            use fmt::Write;
            let _ = write!(hex, "{byte:02x}");
        }
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
