pub mod adapters;
pub mod metrics;
pub mod orchestrator;
pub mod retry_policy;

pub use adapters::{AdapterRegistry, EntitySyncAdapter};
pub use orchestrator::{
    CancelSignal, SyncEvent, SyncOrchestrator, SyncScope, SyncStatusSnapshot, SyncTrigger,
};
pub use retry_policy::RetryPolicy;
