mod common;

use common::mocks::{BrokenCountsStore, MockRemoteApi};
use common::{clock_in_draft, photo_draft, queue_rows, setup, setup_with, test_config};
use std::sync::Arc;
use vigil::application::ports::{
    NetworkMonitor, PushOutcome, RecordStore, RemoteApi, RemoteConflict, SyncQueueStore,
};
use vigil::application::services::orchestrator::{
    CancelSignal, SyncEvent, SyncOrchestrator, SyncScope,
};
use vigil::domain::value_objects::{Connectivity, EntityKind, IdempotencyKey};
use vigil::infrastructure::database::ConnectionPool;
use vigil::infrastructure::network::WatchNetworkMonitor;
use vigil::infrastructure::sync::SqliteSyncStore;

#[tokio::test]
async fn offline_clock_in_syncs_after_reconnect() {
    let engine = setup().await;
    engine.network.set_state(Connectivity::Offline);

    let record = engine
        .store
        .save_time_record(clock_in_draft())
        .await
        .expect("save");
    assert!(!record.synced);

    // Offline pass: nothing leaves the device.
    let result = engine.pass().await;
    assert_eq!(result.synced_count, 0);
    assert_eq!(result.pending_count, 1);
    assert!(engine.remote.calls().is_empty());

    engine.network.set_state(Connectivity::Unmetered);
    let result = engine.pass().await;
    assert_eq!(result.synced_count, 1);

    let synced = engine.store.time_record(record.id).await.expect("reload");
    assert!(synced.synced);
    assert!(synced.remote_id.is_some());
    assert!(queue_rows(&engine).await.is_empty());
}

#[tokio::test]
async fn replayed_push_adopts_existing_remote_id() {
    let engine = setup().await;
    let record = engine
        .store
        .save_time_record(clock_in_draft())
        .await
        .expect("save");

    let key = IdempotencyKey::derive(EntityKind::TimeRecord, record.id);
    let existing = MockRemoteApi::default_remote_id(&key);
    engine.remote.script_push(
        EntityKind::TimeRecord,
        PushOutcome::Conflict(RemoteConflict {
            remote_id: existing.clone(),
            server_updated_at: None,
        }),
    );

    let result = engine.pass().await;
    assert_eq!(result.synced_count, 1);

    let synced = engine.store.time_record(record.id).await.expect("reload");
    assert_eq!(synced.remote_id, Some(existing));
    assert!(queue_rows(&engine).await.is_empty());
}

#[tokio::test]
async fn every_submission_carries_the_derived_idempotency_key() {
    let engine = setup().await;
    let record = engine
        .store
        .save_time_record(clock_in_draft())
        .await
        .expect("save");

    engine.pass().await;

    let key = IdempotencyKey::derive(EntityKind::TimeRecord, record.id);
    let calls = engine.remote.calls_for(EntityKind::TimeRecord);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].idempotency_key, key.as_str());
}

#[tokio::test]
async fn photos_wait_for_unmetered_network() {
    let engine = setup().await;
    engine.network.set_state(Connectivity::Metered);

    let photo = engine.store.save_photo(photo_draft()).await.expect("save");
    let record = engine
        .store
        .save_time_record(clock_in_draft())
        .await
        .expect("save");

    // On metered, the time record goes but the photo is deferred.
    let result = engine.pass().await;
    assert_eq!(result.synced_count, 1);
    assert_eq!(result.pending_count, 1);
    assert!(engine.remote.calls_for(EntityKind::Photo).is_empty());
    assert!(engine.store.time_record(record.id).await.expect("reload").synced);

    engine.network.set_state(Connectivity::Unmetered);
    let result = engine.pass().await;
    assert_eq!(result.synced_count, 1);
    assert!(engine.store.photo(photo.id).await.expect("reload").synced);
}

#[tokio::test]
async fn metered_photo_policy_can_be_disabled() {
    let mut config = test_config();
    config.sync.photos_on_metered = true;
    let engine = setup_with(config).await;
    engine.network.set_state(Connectivity::Metered);

    engine.store.save_photo(photo_draft()).await.expect("save");

    let result = engine.pass().await;
    assert_eq!(result.synced_count, 1);
    assert_eq!(engine.remote.calls_for(EntityKind::Photo).len(), 1);
}

#[tokio::test]
async fn pass_publishes_events_and_updates_status() {
    let engine = setup().await;
    let mut events = engine.orchestrator.subscribe_events();

    engine
        .store
        .save_time_record(clock_in_draft())
        .await
        .expect("save");
    let result = engine.pass().await;
    assert_eq!(result.synced_count, 1);

    let started = events.recv().await.expect("event");
    assert!(matches!(started, SyncEvent::PassStarted { .. }));
    let item = events.recv().await.expect("event");
    assert!(matches!(item, SyncEvent::ItemSynced { .. }));
    let completed = events.recv().await.expect("event");
    assert_eq!(completed, SyncEvent::PassCompleted(result));

    let status = engine.orchestrator.status().await;
    assert!(!status.is_syncing);
    assert_eq!(status.backlog, 0);
    assert_eq!(status.needs_attention, 0);
    assert!(status.last_pass_at.is_some());
}

#[tokio::test]
async fn status_keeps_last_known_backlog_when_counts_fail() {
    let pool = ConnectionPool::from_memory().await.expect("in-memory sqlite");
    pool.migrate().await.expect("migrations");

    let store = Arc::new(SqliteSyncStore::new(&pool));
    let queue = Arc::new(BrokenCountsStore::new(store.clone()));
    let remote = Arc::new(MockRemoteApi::new());
    let network = Arc::new(WatchNetworkMonitor::new(Connectivity::Unmetered));
    let orchestrator = SyncOrchestrator::new(
        queue.clone() as Arc<dyn SyncQueueStore>,
        store.clone() as Arc<dyn RecordStore>,
        remote.clone() as Arc<dyn RemoteApi>,
        network.clone() as Arc<dyn NetworkMonitor>,
        test_config(),
    );

    store.save_time_record(clock_in_draft()).await.expect("save");
    remote.script_push(
        EntityKind::TimeRecord,
        PushOutcome::Transient("timeout".to_string()),
    );
    orchestrator
        .run_pass(SyncScope::All, &CancelSignal::new())
        .await
        .expect("pass");
    assert_eq!(orchestrator.status().await.backlog, 1);

    // Counts break. The item stays behind a fresh transient failure, so the
    // real backlog is unchanged and the snapshot must not collapse to zero.
    queue.set_fail_counts(true);
    remote.script_push(
        EntityKind::TimeRecord,
        PushOutcome::Transient("timeout".to_string()),
    );
    sqlx::query("UPDATE sync_queue SET last_attempt_at = last_attempt_at - 600")
        .execute(pool.get_pool())
        .await
        .expect("backdate");
    let first_pass_at = orchestrator.status().await.last_pass_at;
    orchestrator
        .run_pass(SyncScope::All, &CancelSignal::new())
        .await
        .expect("pass");

    let status = orchestrator.status().await;
    assert_eq!(status.backlog, 1);
    assert!(status.last_pass_at >= first_pass_at);
}
