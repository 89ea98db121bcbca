use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{LazyLock, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PassOutcomeStatus {
    Success,
    Failure,
}

/// Process-wide sync pass counters, snapshot-able for diagnostics.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncMetricsSnapshot {
    pub total_success: u64,
    pub total_failure: u64,
    pub consecutive_failure: u64,
    pub last_success_ms: Option<u64>,
    pub last_failure_ms: Option<u64>,
    pub last_outcome: Option<PassOutcomeStatus>,
    pub last_trigger: Option<String>,
    pub last_duration_ms: Option<u64>,
    pub last_synced_count: Option<u32>,
    pub last_failed_count: Option<u32>,
    pub last_timestamp_ms: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct PassOutcomeMetadata {
    pub trigger: Option<String>,
    pub duration_ms: Option<u64>,
    pub synced_count: Option<u32>,
    pub failed_count: Option<u32>,
}

#[derive(Default, Clone)]
struct LastPassMetadata {
    last_outcome: Option<PassOutcomeStatus>,
    trigger: Option<String>,
    duration_ms: Option<u64>,
    synced_count: Option<u32>,
    failed_count: Option<u32>,
    timestamp_ms: Option<u64>,
}

struct SyncPassMetrics {
    success: AtomicU64,
    failure: AtomicU64,
    consecutive_failure: AtomicU64,
    last_success_ms: AtomicU64,
    last_failure_ms: AtomicU64,
    metadata: Mutex<LastPassMetadata>,
}

impl SyncPassMetrics {
    fn new() -> Self {
        Self {
            success: AtomicU64::new(0),
            failure: AtomicU64::new(0),
            consecutive_failure: AtomicU64::new(0),
            last_success_ms: AtomicU64::new(0),
            last_failure_ms: AtomicU64::new(0),
            metadata: Mutex::new(LastPassMetadata::default()),
        }
    }

    fn record(&self, status: PassOutcomeStatus, meta: &PassOutcomeMetadata) {
        match status {
            PassOutcomeStatus::Success => {
                self.success.fetch_add(1, Ordering::Relaxed);
                self.last_success_ms
                    .store(current_unix_ms(), Ordering::Relaxed);
                self.consecutive_failure.store(0, Ordering::Relaxed);
            }
            PassOutcomeStatus::Failure => {
                self.failure.fetch_add(1, Ordering::Relaxed);
                self.last_failure_ms
                    .store(current_unix_ms(), Ordering::Relaxed);
                self.consecutive_failure.fetch_add(1, Ordering::Relaxed);
            }
        }

        if let Ok(mut guard) = self.metadata.lock() {
            guard.last_outcome = Some(status);
            guard.trigger = meta.trigger.clone();
            guard.duration_ms = meta.duration_ms;
            guard.synced_count = meta.synced_count;
            guard.failed_count = meta.failed_count;
            guard.timestamp_ms = Some(current_unix_ms());
        }
    }

    fn snapshot(&self) -> SyncMetricsSnapshot {
        let metadata = self
            .metadata
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|_| LastPassMetadata::default());

        SyncMetricsSnapshot {
            total_success: self.success.load(Ordering::Relaxed),
            total_failure: self.failure.load(Ordering::Relaxed),
            consecutive_failure: self.consecutive_failure.load(Ordering::Relaxed),
            last_success_ms: to_option(self.last_success_ms.load(Ordering::Relaxed)),
            last_failure_ms: to_option(self.last_failure_ms.load(Ordering::Relaxed)),
            last_outcome: metadata.last_outcome,
            last_trigger: metadata.trigger,
            last_duration_ms: metadata.duration_ms,
            last_synced_count: metadata.synced_count,
            last_failed_count: metadata.failed_count,
            last_timestamp_ms: metadata.timestamp_ms,
        }
    }
}

fn to_option(value: u64) -> Option<u64> {
    if value == 0 { None } else { Some(value) }
}

fn current_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or(0)
}

static SYNC_PASS_METRICS: LazyLock<SyncPassMetrics> = LazyLock::new(SyncPassMetrics::new);

pub fn record_pass(status: PassOutcomeStatus, metadata: &PassOutcomeMetadata) -> SyncMetricsSnapshot {
    SYNC_PASS_METRICS.record(status, metadata);
    SYNC_PASS_METRICS.snapshot()
}

pub fn snapshot() -> SyncMetricsSnapshot {
    SYNC_PASS_METRICS.snapshot()
}

#[cfg(test)]
mod tests {
    use super::{PassOutcomeMetadata, PassOutcomeStatus, snapshot};

    #[test]
    fn record_success_and_failure() {
        let meta = PassOutcomeMetadata {
            trigger: Some("manual".into()),
            duration_ms: Some(420),
            synced_count: Some(3),
            failed_count: Some(0),
        };

        super::record_pass(PassOutcomeStatus::Success, &meta);

        let snap = snapshot();
        assert!(snap.total_success >= 1);
        assert_eq!(snap.last_outcome, Some(PassOutcomeStatus::Success));
        assert_eq!(snap.last_trigger.as_deref(), Some("manual"));
        assert_eq!(snap.last_synced_count, Some(3));

        super::record_pass(
            PassOutcomeStatus::Failure,
            &PassOutcomeMetadata {
                trigger: Some("timer".into()),
                ..PassOutcomeMetadata::default()
            },
        );
        let snap = snapshot();
        assert!(snap.total_failure >= 1);
        assert_eq!(snap.last_outcome, Some(PassOutcomeStatus::Failure));
    }
}
