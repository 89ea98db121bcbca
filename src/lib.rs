//! Offline-first sync engine for field operations apps.
//!
//! Records captured in the field (clock in/out, GPS samples, photos,
//! reports, checkpoint verifications) are written to local SQLite together
//! with a sync queue item, then pushed to the system-of-record whenever
//! connectivity allows. The queue survives process death; retries back off
//! exponentially; conflicts resolve per entity kind.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

use crate::application::ports::{NetworkMonitor, RecordStore, RemoteApi, SyncQueueStore};
use crate::application::services::orchestrator::SyncOrchestrator;
use crate::infrastructure::database::ConnectionPool;
use crate::infrastructure::network::WatchNetworkMonitor;
use crate::infrastructure::remote::HttpRemoteApi;
use crate::infrastructure::sync::SqliteSyncStore;
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use std::sync::Arc;
use tracing::info;

pub use crate::application::services::orchestrator::{
    CancelSignal, SyncEvent, SyncScope, SyncStatusSnapshot, SyncTrigger,
};
pub use crate::domain::entities::SyncResult;
pub use crate::domain::value_objects::{Connectivity, EntityKind};

/// Fully wired engine: pool, stores, HTTP client, network monitor and
/// orchestrator. The host application holds one of these for its lifetime.
pub struct SyncEngine {
    pool: ConnectionPool,
    store: Arc<SqliteSyncStore>,
    network: Arc<WatchNetworkMonitor>,
    orchestrator: Arc<SyncOrchestrator>,
}

impl SyncEngine {
    /// Open (and migrate) the local database, wire the orchestrator, and
    /// requeue anything left `in_progress` by a previous run.
    pub async fn start(config: AppConfig) -> Result<Self, AppError> {
        config.validate().map_err(AppError::ConfigurationError)?;

        let pool = ConnectionPool::new(&config.database).await?;
        pool.migrate().await?;

        let store = Arc::new(SqliteSyncStore::new(&pool));
        let network = Arc::new(WatchNetworkMonitor::default());
        let remote = Arc::new(HttpRemoteApi::new(&config.remote)?);

        let orchestrator = SyncOrchestrator::new(
            store.clone() as Arc<dyn SyncQueueStore>,
            store.clone() as Arc<dyn RecordStore>,
            remote as Arc<dyn RemoteApi>,
            network.clone() as Arc<dyn NetworkMonitor>,
            config,
        );

        let recovered = orchestrator.recover_stalled().await?;
        let _ = orchestrator.spawn_periodic();
        let _ = orchestrator.spawn_connectivity_listener();

        info!(target: "sync::engine", recovered, "sync engine started");

        Ok(Self {
            pool,
            store,
            network,
            orchestrator,
        })
    }

    /// Record store handle for the capture surfaces (time clock, camera,
    /// report editor, location service).
    pub fn records(&self) -> Arc<dyn RecordStore> {
        self.store.clone()
    }

    pub fn orchestrator(&self) -> &Arc<SyncOrchestrator> {
        &self.orchestrator
    }

    /// Feed for the platform connectivity callback.
    pub fn network(&self) -> &Arc<WatchNetworkMonitor> {
        &self.network
    }

    pub async fn shutdown(self) {
        self.pool.close().await;
        info!(target: "sync::engine", "sync engine stopped");
    }
}
