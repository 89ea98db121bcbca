mod common;

use chrono::{Duration, Utc};
use common::{
    checkpoint_draft, clock_in_draft, due_bound, photo_draft, queue_rows, report_draft, setup,
    setup_on_disk, test_config,
};
use vigil::application::ports::{RecordStore, SyncQueueStore};
use vigil::domain::value_objects::EntityKind;

#[tokio::test]
async fn schedulable_items_come_out_priority_then_age() {
    let engine = setup().await;
    // Insertion order deliberately inverts priority order.
    let photo = engine.store.save_photo(photo_draft()).await.expect("save");
    let report = engine.store.save_report(report_draft()).await.expect("save");
    let clock_in = engine
        .store
        .save_time_record(clock_in_draft())
        .await
        .expect("save");
    let checkpoint = engine
        .store
        .save_checkpoint_verification(checkpoint_draft())
        .await
        .expect("save");

    let items = engine
        .store
        .schedulable_items(None, 10, due_bound(), Utc::now())
        .await
        .expect("items");
    let order: Vec<(EntityKind, i64)> = items
        .iter()
        .map(|item| (item.entity_kind, item.entity_id.value()))
        .collect();
    assert_eq!(
        order,
        vec![
            (EntityKind::CheckpointVerification, checkpoint.id.value()),
            (EntityKind::TimeRecord, clock_in.id.value()),
            (EntityKind::Report, report.id.value()),
            (EntityKind::Photo, photo.id.value()),
        ]
    );
}

#[tokio::test]
async fn waiting_items_do_not_crowd_out_due_ones() {
    let engine = setup().await;
    let now = Utc::now();

    // Highest-priority item has just failed and sits inside its window.
    engine
        .store
        .save_checkpoint_verification(checkpoint_draft())
        .await
        .expect("save");
    let waiting = engine
        .store
        .schedulable_items(None, 1, due_bound(), now)
        .await
        .expect("items")[0]
        .clone();
    assert!(engine.store.claim(waiting.id, now).await.expect("claim"));
    engine
        .store
        .fail_retryable(waiting.id, "timeout", now)
        .await
        .expect("fail");

    let clock_in = engine
        .store
        .save_time_record(clock_in_draft())
        .await
        .expect("save");

    // With a whole-second backoff in force, a limit of one must not be
    // spent on the row that cannot run yet.
    let bound = vigil::application::ports::DueBound {
        base_delay_secs: 60,
        max_delay_secs: 300,
    };
    let items = engine
        .store
        .schedulable_items(None, 1, bound, now)
        .await
        .expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].entity_kind, EntityKind::TimeRecord);
    assert_eq!(items[0].entity_id.value(), clock_in.id.value());

    // Once the window elapses the checkpoint comes back first.
    let later = now + Duration::seconds(120);
    let items = engine
        .store
        .schedulable_items(None, 1, bound, later)
        .await
        .expect("items");
    assert_eq!(items[0].entity_kind, EntityKind::CheckpointVerification);
}

#[tokio::test]
async fn claim_is_atomic() {
    let engine = setup().await;
    engine
        .store
        .save_time_record(clock_in_draft())
        .await
        .expect("save");
    let item = engine
        .store
        .schedulable_items(None, 1, due_bound(), Utc::now())
        .await
        .expect("items")[0]
        .clone();

    assert!(engine.store.claim(item.id, Utc::now()).await.expect("claim"));
    // A second claim on the same row must lose.
    assert!(!engine.store.claim(item.id, Utc::now()).await.expect("claim"));

    // And a claimed row is no longer offered for scheduling.
    assert!(engine
        .store
        .schedulable_items(None, 10, due_bound(), Utc::now())
        .await
        .expect("items")
        .is_empty());
}

#[tokio::test]
async fn queue_rows_survive_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!("sqlite:{}", dir.path().join("vigil.db").display());

    let engine = setup_on_disk(&url, test_config()).await;
    let record = engine
        .store
        .save_time_record(clock_in_draft())
        .await
        .expect("save");
    engine.pool.close().await;
    drop(engine);

    let reopened = setup_on_disk(&url, test_config()).await;
    let rows = queue_rows(&reopened).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].1, record.id.value());
    assert_eq!(rows[0].2, "pending");

    // And the queued record still syncs.
    let result = reopened.pass().await;
    assert_eq!(result.synced_count, 1);
    assert!(reopened
        .store
        .time_record(record.id)
        .await
        .expect("reload")
        .synced);
}

#[tokio::test]
async fn stalled_in_progress_items_are_requeued_at_startup() {
    let engine = setup().await;
    engine
        .store
        .save_time_record(clock_in_draft())
        .await
        .expect("save");
    let item = engine
        .store
        .schedulable_items(None, 1, due_bound(), Utc::now())
        .await
        .expect("items")[0]
        .clone();

    // Simulate a crash mid-attempt: claimed long ago, never resolved.
    let stale = Utc::now() - Duration::hours(2);
    assert!(engine.store.claim(item.id, stale).await.expect("claim"));

    let recovered = engine.orchestrator.recover_stalled().await.expect("recover");
    assert_eq!(recovered, 1);

    let rows = queue_rows(&engine).await;
    assert_eq!(rows[0].2, "failed_retryable");
    // Interruption is not an attempt; the retry budget is untouched.
    assert_eq!(rows[0].3, 0);
}

#[tokio::test]
async fn fresh_in_progress_items_are_not_recovered() {
    let engine = setup().await;
    engine
        .store
        .save_time_record(clock_in_draft())
        .await
        .expect("save");
    let item = engine
        .store
        .schedulable_items(None, 1, due_bound(), Utc::now())
        .await
        .expect("items")[0]
        .clone();
    assert!(engine.store.claim(item.id, Utc::now()).await.expect("claim"));

    let recovered = engine.orchestrator.recover_stalled().await.expect("recover");
    assert_eq!(recovered, 0);
}

#[tokio::test]
async fn deleting_an_unsynced_record_drops_its_queue_item() {
    let engine = setup().await;
    let record = engine.store.save_report(report_draft()).await.expect("save");

    engine
        .store
        .delete_unsynced(EntityKind::Report, record.id)
        .await
        .expect("delete");
    assert!(queue_rows(&engine).await.is_empty());
    assert!(engine.store.report(record.id).await.is_err());
}

#[tokio::test]
async fn synced_records_refuse_deletion() {
    let engine = setup().await;
    let record = engine.store.save_report(report_draft()).await.expect("save");
    engine.pass().await;

    let err = engine
        .store
        .delete_unsynced(EntityKind::Report, record.id)
        .await
        .expect_err("must refuse");
    assert!(err.to_string().contains("already synced"));
}
