mod common;

use chrono::{Duration, Utc};
use common::{queue_rows, report_draft, setup};
use vigil::application::ports::{PushOutcome, RecordStore, RemoteConflict};
use vigil::domain::value_objects::{EntityKind, RemoteId};

#[tokio::test]
async fn offline_edit_supersedes_the_queued_version() {
    let engine = setup().await;
    let report = engine.store.save_report(report_draft()).await.expect("save");

    engine
        .store
        .update_report(
            report.id,
            "Night shift".to_string(),
            "No incidents. Gate 2 light out.".to_string(),
            Utc::now(),
        )
        .await
        .expect("update");

    // Still a single queue row, reset to a fresh pending state.
    let rows = queue_rows(&engine).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].2, "pending");
    assert_eq!(rows[0].3, 0);

    let result = engine.pass().await;
    assert_eq!(result.synced_count, 1);
    // Only the latest version was ever submitted.
    assert_eq!(engine.remote.calls_for(EntityKind::Report).len(), 1);

    let synced = engine.store.report(report.id).await.expect("reload");
    assert!(synced.synced);
    assert_eq!(synced.body, "No incidents. Gate 2 light out.");
}

#[tokio::test]
async fn newer_local_report_wins_the_conflict() {
    let engine = setup().await;
    let report = engine.store.save_report(report_draft()).await.expect("save");

    let remote_id = RemoteId::new("srv-report-9".to_string()).expect("remote id");
    engine.remote.script_push(
        EntityKind::Report,
        PushOutcome::Conflict(RemoteConflict {
            remote_id: remote_id.clone(),
            server_updated_at: Some(report.updated_at - Duration::hours(2)),
        }),
    );

    let result = engine.pass().await;
    assert_eq!(result.synced_count, 1);

    // Local side was newer, so it was resubmitted as an update.
    let updates = engine.remote.update_calls();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].0, "srv-report-9");

    let synced = engine.store.report(report.id).await.expect("reload");
    assert!(synced.synced);
    assert_eq!(synced.remote_id, Some(remote_id));
}

#[tokio::test]
async fn older_local_report_adopts_the_server_version() {
    let engine = setup().await;
    let report = engine.store.save_report(report_draft()).await.expect("save");

    let remote_id = RemoteId::new("srv-report-4".to_string()).expect("remote id");
    engine.remote.script_push(
        EntityKind::Report,
        PushOutcome::Conflict(RemoteConflict {
            remote_id: remote_id.clone(),
            server_updated_at: Some(report.updated_at + Duration::hours(2)),
        }),
    );

    let result = engine.pass().await;
    assert_eq!(result.synced_count, 1);
    assert!(engine.remote.update_calls().is_empty());

    let synced = engine.store.report(report.id).await.expect("reload");
    assert!(synced.synced);
    assert_eq!(synced.remote_id, Some(remote_id));
}

#[tokio::test]
async fn conflict_without_server_timestamp_defers_to_server() {
    let engine = setup().await;
    let report = engine.store.save_report(report_draft()).await.expect("save");

    let remote_id = RemoteId::new("srv-report-1".to_string()).expect("remote id");
    engine.remote.script_push(
        EntityKind::Report,
        PushOutcome::Conflict(RemoteConflict {
            remote_id: remote_id.clone(),
            server_updated_at: None,
        }),
    );

    let result = engine.pass().await;
    assert_eq!(result.synced_count, 1);
    assert!(engine.remote.update_calls().is_empty());
    assert_eq!(
        engine.store.report(report.id).await.expect("reload").remote_id,
        Some(remote_id)
    );
}
