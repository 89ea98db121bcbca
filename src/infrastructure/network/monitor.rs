use crate::application::ports::NetworkMonitor;
use crate::domain::value_objects::Connectivity;
use tokio::sync::watch;
use tracing::info;

/// Watch-channel backed monitor. The host platform reports connectivity
/// changes through `set_state`; everything downstream observes the channel.
pub struct WatchNetworkMonitor {
    sender: watch::Sender<Connectivity>,
}

impl WatchNetworkMonitor {
    pub fn new(initial: Connectivity) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    /// Entry point for the platform connectivity callback.
    pub fn set_state(&self, connectivity: Connectivity) {
        let changed = *self.sender.borrow() != connectivity;
        if changed {
            info!(
                target: "sync::network",
                connectivity = connectivity.as_str(),
                "connectivity changed"
            );
        }
        // send_replace keeps the channel usable with no receivers around.
        self.sender.send_replace(connectivity);
    }
}

impl Default for WatchNetworkMonitor {
    fn default() -> Self {
        Self::new(Connectivity::Offline)
    }
}

impl NetworkMonitor for WatchNetworkMonitor {
    fn current(&self) -> Connectivity {
        *self.sender.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<Connectivity> {
        self.sender.subscribe()
    }
}
