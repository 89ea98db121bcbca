use crate::domain::value_objects::Connectivity;
use tokio::sync::watch;

/// Connectivity classification source. The platform layer feeds it; the
/// orchestrator is its sole subscriber.
pub trait NetworkMonitor: Send + Sync {
    fn current(&self) -> Connectivity;

    /// Change feed; the receiver always holds the latest classification.
    fn subscribe(&self) -> watch::Receiver<Connectivity>;
}
