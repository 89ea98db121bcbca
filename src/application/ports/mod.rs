pub mod network_monitor;
pub mod record_store;
pub mod remote_api;
pub mod sync_queue_store;

pub use network_monitor::NetworkMonitor;
pub use record_store::RecordStore;
pub use remote_api::{BatchPushOutcome, PushOutcome, RemoteApi, RemoteConflict};
pub use sync_queue_store::{DueBound, QueueCounts, SyncQueueStore};
