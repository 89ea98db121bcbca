use crate::application::ports::{DueBound, QueueCounts, RecordStore, SyncQueueStore};
use crate::domain::entities::{
    CheckpointVerification, CheckpointVerificationDraft, LocationSample, LocationSampleDraft,
    Photo, PhotoDraft, Report, ReportDraft, SyncQueueItem, TimeRecord, TimeRecordDraft,
};
use crate::domain::value_objects::{EntityId, EntityKind, QueueItemId, RemoteId};
use crate::infrastructure::database::ConnectionPool;
use crate::infrastructure::sync::mappers;
use crate::infrastructure::sync::rows::{
    CheckpointVerificationRow, LocationSampleRow, PhotoRow, ReportRow, SyncQueueItemRow,
    TimeRecordRow,
};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

fn record_table(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::TimeRecord => "time_records",
        EntityKind::Location => "location_samples",
        EntityKind::Photo => "photos",
        EntityKind::Report => "reports",
        EntityKind::CheckpointVerification => "checkpoint_verifications",
    }
}

/// SQLite-backed store for both the domain records and the sync queue.
///
/// One type covers both ports so record writes and queue transitions can
/// share a transaction; the durable-enqueue guarantee depends on it.
#[derive(Clone)]
pub struct SqliteSyncStore {
    pool: SqlitePool,
}

impl SqliteSyncStore {
    pub fn new(connection: &ConnectionPool) -> Self {
        Self {
            pool: connection.get_pool().clone(),
        }
    }

    /// Upsert the queue row for a record inside an open transaction. A
    /// still-queued row for the same entity is reset to a fresh pending
    /// state, superseding the older version.
    async fn enqueue_tx(
        tx: &mut Transaction<'_, Sqlite>,
        kind: EntityKind,
        entity_id: i64,
        now: i64,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO sync_queue (
                entity_kind, entity_id, priority, status, retry_count,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, 'pending', 0, ?4, ?4)
            ON CONFLICT (entity_kind, entity_id) DO UPDATE SET
                status = 'pending',
                retry_count = 0,
                last_attempt_at = NULL,
                last_error = NULL,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(kind.as_str())
        .bind(entity_id)
        .bind(kind.default_priority())
        .bind(now)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl SyncQueueStore for SqliteSyncStore {
    async fn schedulable_items(
        &self,
        scope: Option<EntityKind>,
        limit: u32,
        due: DueBound,
        now: DateTime<Utc>,
    ) -> Result<Vec<SyncQueueItem>, AppError> {
        // The shift is capped at 30 so the expression never overflows; the
        // outer MIN caps the delay at the configured maximum anyway.
        let rows = match scope {
            Some(kind) => {
                sqlx::query_as::<_, SyncQueueItemRow>(
                    r#"
                    SELECT * FROM sync_queue
                    WHERE status IN ('pending', 'failed_retryable') AND entity_kind = ?1
                      AND (last_attempt_at IS NULL
                           OR last_attempt_at + MIN(?2, ?3 << MIN(retry_count, 30)) <= ?4)
                    ORDER BY priority ASC, created_at ASC, id ASC
                    LIMIT ?5
                    "#,
                )
                .bind(kind.as_str())
                .bind(due.max_delay_secs)
                .bind(due.base_delay_secs)
                .bind(now.timestamp())
                .bind(limit as i64)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, SyncQueueItemRow>(
                    r#"
                    SELECT * FROM sync_queue
                    WHERE status IN ('pending', 'failed_retryable')
                      AND (last_attempt_at IS NULL
                           OR last_attempt_at + MIN(?1, ?2 << MIN(retry_count, 30)) <= ?3)
                    ORDER BY priority ASC, created_at ASC, id ASC
                    LIMIT ?4
                    "#,
                )
                .bind(due.max_delay_secs)
                .bind(due.base_delay_secs)
                .bind(now.timestamp())
                .bind(limit as i64)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(mappers::queue_item_from_row).collect()
    }

    async fn claim(&self, id: QueueItemId, now: DateTime<Utc>) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE sync_queue
            SET status = 'in_progress', last_attempt_at = ?1, updated_at = ?1
            WHERE id = ?2 AND status IN ('pending', 'failed_retryable')
            "#,
        )
        .bind(now.timestamp())
        .bind(id.value())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn complete_synced(
        &self,
        kind: EntityKind,
        entity_id: EntityId,
        remote_id: RemoteId,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        // Only delete the row this pass claimed. A concurrent offline edit
        // may already have superseded it back to pending, in which case the
        // fresh version must stay queued.
        let deleted = sqlx::query(
            r#"
            DELETE FROM sync_queue
            WHERE entity_kind = ?1 AND entity_id = ?2 AND status = 'in_progress'
            "#,
        )
        .bind(kind.as_str())
        .bind(entity_id.value())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if deleted == 1 {
            let sql = format!(
                "UPDATE {} SET synced = 1, remote_id = ?1 WHERE id = ?2",
                record_table(kind)
            );
            sqlx::query(&sql)
                .bind(remote_id.as_str())
                .bind(entity_id.value())
                .execute(&mut *tx)
                .await?;
        } else {
            // Superseded mid-flight: the record stays unsynced, but it now
            // has a remote identity for the follow-up push to update.
            debug!(
                target: "sync::store",
                kind = %kind,
                entity_id = %entity_id,
                "queue row superseded during sync, keeping record unsynced"
            );
            let sql = format!(
                "UPDATE {} SET remote_id = ?1 WHERE id = ?2",
                record_table(kind)
            );
            sqlx::query(&sql)
                .bind(remote_id.as_str())
                .bind(entity_id.value())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn fail_retryable(
        &self,
        id: QueueItemId,
        error: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE sync_queue
            SET status = 'failed_retryable', retry_count = retry_count + 1,
                last_error = ?1, updated_at = ?2
            WHERE id = ?3 AND status = 'in_progress'
            "#,
        )
        .bind(error)
        .bind(now.timestamp())
        .bind(id.value())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn fail_terminal(
        &self,
        id: QueueItemId,
        error: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE sync_queue
            SET status = 'failed_terminal', retry_count = retry_count + 1,
                last_error = ?1, updated_at = ?2
            WHERE id = ?3 AND status = 'in_progress'
            "#,
        )
        .bind(error)
        .bind(now.timestamp())
        .bind(id.value())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn release(&self, id: QueueItemId) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE sync_queue
            SET status = 'pending'
            WHERE id = ?1 AND status = 'in_progress'
            "#,
        )
        .bind(id.value())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn recover_stalled(
        &self,
        stalled_before: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<u32, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE sync_queue
            SET status = 'failed_retryable',
                last_error = 'recovered: interrupted while in progress',
                updated_at = ?1
            WHERE status = 'in_progress'
              AND COALESCE(last_attempt_at, updated_at) < ?2
            "#,
        )
        .bind(now.timestamp())
        .bind(stalled_before.timestamp())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() as u32)
    }

    async fn terminal_items(&self) -> Result<Vec<SyncQueueItem>, AppError> {
        let rows = sqlx::query_as::<_, SyncQueueItemRow>(
            r#"
            SELECT * FROM sync_queue
            WHERE status = 'failed_terminal'
            ORDER BY updated_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(mappers::queue_item_from_row).collect()
    }

    async fn dismiss_terminal(&self, id: QueueItemId) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"DELETE FROM sync_queue WHERE id = ?1 AND status = 'failed_terminal'"#,
        )
        .bind(id.value())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "No terminal queue item with id {id}"
            )));
        }
        Ok(())
    }

    async fn counts(&self) -> Result<QueueCounts, AppError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"SELECT status, COUNT(*) FROM sync_queue GROUP BY status"#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut counts = QueueCounts::default();
        for (status, count) in rows {
            let count = count as u32;
            match status.as_str() {
                "pending" => counts.pending = count,
                "in_progress" => counts.in_progress = count,
                "failed_retryable" => counts.failed_retryable = count,
                "failed_terminal" => counts.failed_terminal = count,
                _ => {}
            }
        }
        Ok(counts)
    }
}

#[async_trait]
impl RecordStore for SqliteSyncStore {
    async fn save_time_record(&self, draft: TimeRecordDraft) -> Result<TimeRecord, AppError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query(
            r#"
            INSERT INTO time_records (worker_id, site_id, kind, recorded_at, synced, created_at)
            VALUES (?1, ?2, ?3, ?4, 0, ?5)
            "#,
        )
        .bind(&draft.worker_id)
        .bind(&draft.site_id)
        .bind(draft.kind.as_str())
        .bind(draft.recorded_at.timestamp())
        .bind(now.timestamp())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        Self::enqueue_tx(&mut tx, EntityKind::TimeRecord, id, now.timestamp()).await?;
        tx.commit().await?;

        Ok(TimeRecord {
            id: EntityId::new(id).map_err(AppError::Internal)?,
            worker_id: draft.worker_id,
            site_id: draft.site_id,
            kind: draft.kind,
            recorded_at: draft.recorded_at,
            synced: false,
            remote_id: None,
            created_at: now,
        })
    }

    async fn save_location_sample(
        &self,
        draft: LocationSampleDraft,
    ) -> Result<LocationSample, AppError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query(
            r#"
            INSERT INTO location_samples (
                worker_id, latitude, longitude, accuracy_m, recorded_at, synced, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)
            "#,
        )
        .bind(&draft.worker_id)
        .bind(draft.latitude)
        .bind(draft.longitude)
        .bind(draft.accuracy_m)
        .bind(draft.recorded_at.timestamp())
        .bind(now.timestamp())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        Self::enqueue_tx(&mut tx, EntityKind::Location, id, now.timestamp()).await?;
        tx.commit().await?;

        Ok(LocationSample {
            id: EntityId::new(id).map_err(AppError::Internal)?,
            worker_id: draft.worker_id,
            latitude: draft.latitude,
            longitude: draft.longitude,
            accuracy_m: draft.accuracy_m,
            recorded_at: draft.recorded_at,
            synced: false,
            remote_id: None,
            created_at: now,
        })
    }

    async fn save_photo(&self, draft: PhotoDraft) -> Result<Photo, AppError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query(
            r#"
            INSERT INTO photos (
                worker_id, site_id, caption, content_type, bytes, taken_at, synced, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)
            "#,
        )
        .bind(&draft.worker_id)
        .bind(&draft.site_id)
        .bind(&draft.caption)
        .bind(&draft.content_type)
        .bind(&draft.bytes)
        .bind(draft.taken_at.timestamp())
        .bind(now.timestamp())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        Self::enqueue_tx(&mut tx, EntityKind::Photo, id, now.timestamp()).await?;
        tx.commit().await?;

        Ok(Photo {
            id: EntityId::new(id).map_err(AppError::Internal)?,
            worker_id: draft.worker_id,
            site_id: draft.site_id,
            caption: draft.caption,
            content_type: draft.content_type,
            bytes: draft.bytes,
            taken_at: draft.taken_at,
            synced: false,
            remote_id: None,
            created_at: now,
        })
    }

    async fn save_report(&self, draft: ReportDraft) -> Result<Report, AppError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query(
            r#"
            INSERT INTO reports (worker_id, site_id, title, body, updated_at, synced, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)
            "#,
        )
        .bind(&draft.worker_id)
        .bind(&draft.site_id)
        .bind(&draft.title)
        .bind(&draft.body)
        .bind(draft.updated_at.timestamp())
        .bind(now.timestamp())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        Self::enqueue_tx(&mut tx, EntityKind::Report, id, now.timestamp()).await?;
        tx.commit().await?;

        Ok(Report {
            id: EntityId::new(id).map_err(AppError::Internal)?,
            worker_id: draft.worker_id,
            site_id: draft.site_id,
            title: draft.title,
            body: draft.body,
            updated_at: draft.updated_at,
            synced: false,
            remote_id: None,
            created_at: now,
        })
    }

    async fn save_checkpoint_verification(
        &self,
        draft: CheckpointVerificationDraft,
    ) -> Result<CheckpointVerification, AppError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query(
            r#"
            INSERT INTO checkpoint_verifications (
                worker_id, patrol_id, checkpoint_id, latitude, longitude, verified_at,
                synced, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)
            "#,
        )
        .bind(&draft.worker_id)
        .bind(&draft.patrol_id)
        .bind(&draft.checkpoint_id)
        .bind(draft.latitude)
        .bind(draft.longitude)
        .bind(draft.verified_at.timestamp())
        .bind(now.timestamp())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        Self::enqueue_tx(&mut tx, EntityKind::CheckpointVerification, id, now.timestamp())
            .await?;
        tx.commit().await?;

        Ok(CheckpointVerification {
            id: EntityId::new(id).map_err(AppError::Internal)?,
            worker_id: draft.worker_id,
            patrol_id: draft.patrol_id,
            checkpoint_id: draft.checkpoint_id,
            latitude: draft.latitude,
            longitude: draft.longitude,
            verified_at: draft.verified_at,
            synced: false,
            remote_id: None,
            created_at: now,
        })
    }

    async fn update_report(
        &self,
        id: EntityId,
        title: String,
        body: String,
        updated_at: DateTime<Utc>,
    ) -> Result<Report, AppError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // remote_id survives the edit so a later push can update in place.
        let updated = sqlx::query(
            r#"
            UPDATE reports
            SET title = ?1, body = ?2, updated_at = ?3, synced = 0
            WHERE id = ?4
            "#,
        )
        .bind(&title)
        .bind(&body)
        .bind(updated_at.timestamp())
        .bind(id.value())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AppError::NotFound(format!("No report with id {id}")));
        }

        Self::enqueue_tx(&mut tx, EntityKind::Report, id.value(), now.timestamp()).await?;
        tx.commit().await?;

        self.report(id).await
    }

    async fn time_record(&self, id: EntityId) -> Result<TimeRecord, AppError> {
        let row = sqlx::query_as::<_, TimeRecordRow>(
            r#"SELECT * FROM time_records WHERE id = ?1"#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No time record with id {id}")))?;

        mappers::time_record_from_row(row)
    }

    async fn location_samples(&self, ids: &[EntityId]) -> Result<Vec<LocationSample>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = ids
            .iter()
            .enumerate()
            .map(|(i, _)| format!("?{}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT * FROM location_samples WHERE id IN ({placeholders}) ORDER BY recorded_at ASC, id ASC"
        );

        let mut query = sqlx::query_as::<_, LocationSampleRow>(&sql);
        for id in ids {
            query = query.bind(id.value());
        }
        let rows = query.fetch_all(&self.pool).await?;

        rows.into_iter().map(mappers::location_sample_from_row).collect()
    }

    async fn photo(&self, id: EntityId) -> Result<Photo, AppError> {
        let row = sqlx::query_as::<_, PhotoRow>(r#"SELECT * FROM photos WHERE id = ?1"#)
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No photo with id {id}")))?;

        mappers::photo_from_row(row)
    }

    async fn report(&self, id: EntityId) -> Result<Report, AppError> {
        let row = sqlx::query_as::<_, ReportRow>(r#"SELECT * FROM reports WHERE id = ?1"#)
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No report with id {id}")))?;

        mappers::report_from_row(row)
    }

    async fn checkpoint_verification(
        &self,
        id: EntityId,
    ) -> Result<CheckpointVerification, AppError> {
        let row = sqlx::query_as::<_, CheckpointVerificationRow>(
            r#"SELECT * FROM checkpoint_verifications WHERE id = ?1"#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No checkpoint verification with id {id}"))
        })?;

        mappers::checkpoint_verification_from_row(row)
    }

    async fn delete_unsynced(&self, kind: EntityKind, id: EntityId) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let table = record_table(kind);
        let sql = format!("SELECT synced FROM {table} WHERE id = ?1");
        let synced: Option<bool> = sqlx::query_scalar(&sql)
            .bind(id.value())
            .fetch_optional(&mut *tx)
            .await?;

        match synced {
            None => {
                return Err(AppError::NotFound(format!("No {kind} record with id {id}")));
            }
            Some(true) => {
                return Err(AppError::InvalidInput(format!(
                    "Cannot delete {kind} record {id}: already synced"
                )));
            }
            Some(false) => {}
        }

        let sql = format!("DELETE FROM {table} WHERE id = ?1");
        sqlx::query(&sql).bind(id.value()).execute(&mut *tx).await?;

        sqlx::query(
            r#"DELETE FROM sync_queue WHERE entity_kind = ?1 AND entity_id = ?2"#,
        )
        .bind(kind.as_str())
        .bind(id.value())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
