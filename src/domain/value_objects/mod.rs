pub mod connectivity;
pub mod entity_id;
pub mod entity_kind;
pub mod idempotency_key;
pub mod queue_item_id;
pub mod queue_status;
pub mod remote_id;

pub use connectivity::Connectivity;
pub use entity_id::EntityId;
pub use entity_kind::EntityKind;
pub use idempotency_key::IdempotencyKey;
pub use queue_item_id::QueueItemId;
pub use queue_status::QueueStatus;
pub use remote_id::RemoteId;
