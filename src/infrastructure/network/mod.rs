pub mod monitor;

pub use monitor::WatchNetworkMonitor;
