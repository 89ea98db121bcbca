// Not every test binary uses every helper.
#![allow(dead_code)]

pub mod mocks;

use chrono::Utc;
use std::sync::Arc;
use vigil::application::ports::{NetworkMonitor, RecordStore, RemoteApi, SyncQueueStore};
use vigil::application::services::orchestrator::{
    CancelSignal, SyncOrchestrator, SyncScope,
};
use vigil::domain::entities::{
    CheckpointVerificationDraft, LocationSampleDraft, PhotoDraft, ReportDraft, SyncResult,
    TimeRecordDraft, TimeRecordKind,
};
use vigil::domain::value_objects::Connectivity;
use vigil::infrastructure::database::ConnectionPool;
use vigil::infrastructure::network::WatchNetworkMonitor;
use vigil::infrastructure::sync::SqliteSyncStore;
use vigil::shared::config::AppConfig;

use mocks::MockRemoteApi;

pub struct TestEngine {
    pub pool: ConnectionPool,
    pub store: Arc<SqliteSyncStore>,
    pub remote: Arc<MockRemoteApi>,
    pub network: Arc<WatchNetworkMonitor>,
    pub orchestrator: Arc<SyncOrchestrator>,
}

impl TestEngine {
    pub async fn pass(&self) -> SyncResult {
        self.orchestrator
            .run_pass(SyncScope::All, &CancelSignal::new())
            .await
            .expect("sync pass")
    }
}

/// Millisecond-scale backoff so retries become due within a test run.
pub fn test_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.sync.auto_sync = false;
    cfg.sync.batch_size = 10;
    cfg.retry.max_retries = 3;
    cfg.retry.base_delay_ms = 1;
    cfg.retry.jitter_ms = 0;
    cfg
}

pub async fn setup() -> TestEngine {
    setup_with(test_config()).await
}

pub async fn setup_with(config: AppConfig) -> TestEngine {
    let pool = ConnectionPool::from_memory().await.expect("in-memory sqlite");
    build(pool, config).await
}

pub async fn setup_on_disk(url: &str, config: AppConfig) -> TestEngine {
    let mut config = config;
    config.database.url = url.to_string();
    let pool = ConnectionPool::new(&config.database)
        .await
        .expect("on-disk sqlite");
    build(pool, config).await
}

async fn build(pool: ConnectionPool, config: AppConfig) -> TestEngine {
    pool.migrate().await.expect("migrations");

    let store = Arc::new(SqliteSyncStore::new(&pool));
    let remote = Arc::new(MockRemoteApi::new());
    let network = Arc::new(WatchNetworkMonitor::new(Connectivity::Unmetered));

    let orchestrator = SyncOrchestrator::new(
        store.clone() as Arc<dyn SyncQueueStore>,
        store.clone() as Arc<dyn RecordStore>,
        remote.clone() as Arc<dyn RemoteApi>,
        network.clone() as Arc<dyn NetworkMonitor>,
        config,
    );

    TestEngine {
        pool,
        store,
        remote,
        network,
        orchestrator,
    }
}

pub fn clock_in_draft() -> TimeRecordDraft {
    TimeRecordDraft {
        worker_id: "w-100".to_string(),
        site_id: "site-7".to_string(),
        kind: TimeRecordKind::ClockIn,
        recorded_at: Utc::now(),
    }
}

pub fn location_draft(seq: i64) -> LocationSampleDraft {
    LocationSampleDraft {
        worker_id: "w-100".to_string(),
        latitude: 35.6812 + seq as f64 * 0.0001,
        longitude: 139.7671,
        accuracy_m: 8.0,
        recorded_at: Utc::now(),
    }
}

pub fn photo_draft() -> PhotoDraft {
    PhotoDraft {
        worker_id: "w-100".to_string(),
        site_id: "site-7".to_string(),
        caption: Some("gate damage".to_string()),
        content_type: "image/jpeg".to_string(),
        bytes: vec![0xff, 0xd8, 0xff, 0xe0],
        taken_at: Utc::now(),
    }
}

pub fn report_draft() -> ReportDraft {
    ReportDraft {
        worker_id: "w-100".to_string(),
        site_id: "site-7".to_string(),
        title: "Night shift".to_string(),
        body: "No incidents.".to_string(),
        updated_at: Utc::now(),
    }
}

pub fn checkpoint_draft() -> CheckpointVerificationDraft {
    CheckpointVerificationDraft {
        worker_id: "w-100".to_string(),
        patrol_id: "patrol-3".to_string(),
        checkpoint_id: "cp-12".to_string(),
        latitude: 35.6812,
        longitude: 139.7671,
        verified_at: Utc::now(),
    }
}

/// Store-side readiness bound matching `test_config` (sub-second backoff
/// floors to zero, so nothing is held back by the query).
pub fn due_bound() -> vigil::application::ports::DueBound {
    vigil::application::ports::DueBound {
        base_delay_secs: 0,
        max_delay_secs: 300,
    }
}

/// Raw queue rows as `(entity_kind, entity_id, status, retry_count)`.
pub async fn queue_rows(engine: &TestEngine) -> Vec<(String, i64, String, i64)> {
    sqlx::query_as::<_, (String, i64, String, i64)>(
        "SELECT entity_kind, entity_id, status, retry_count FROM sync_queue ORDER BY id",
    )
    .fetch_all(engine.pool.get_pool())
    .await
    .expect("queue rows")
}

/// Push `last_attempt_at` into the past so backoff windows have elapsed.
pub async fn backdate_attempts(engine: &TestEngine, seconds: i64) {
    sqlx::query("UPDATE sync_queue SET last_attempt_at = last_attempt_at - ?1")
        .bind(seconds)
        .execute(engine.pool.get_pool())
        .await
        .expect("backdate");
}
