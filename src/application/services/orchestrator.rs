use crate::application::ports::{
    NetworkMonitor, PushOutcome, RecordStore, RemoteApi, SyncQueueStore,
};
use crate::application::services::adapters::{AdapterRegistry, EntitySyncAdapter};
use crate::application::services::metrics::{self, PassOutcomeMetadata, PassOutcomeStatus};
use crate::application::services::retry_policy::RetryPolicy;
use crate::domain::entities::{SyncQueueItem, SyncResult};
use crate::domain::value_objects::{Connectivity, EntityKind, QueueItemId, RemoteId};
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use chrono::{Duration as ChronoDuration, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Upper bound on rows pulled from the queue per pass.
const PASS_FETCH_LIMIT: u32 = 256;

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncScope {
    All,
    Entity(EntityKind),
}

impl SyncScope {
    fn kind(&self) -> Option<EntityKind> {
        match self {
            SyncScope::All => None,
            SyncScope::Entity(kind) => Some(*kind),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    Manual,
    Timer,
    ConnectivityRegained,
}

impl SyncTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncTrigger::Manual => "manual",
            SyncTrigger::Timer => "timer",
            SyncTrigger::ConnectivityRegained => "connectivity_regained",
        }
    }
}

/// Cooperative cancellation, observed between items only. An in-flight
/// network call always runs to completion so remote state stays unambiguous.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal(Arc<AtomicBool>);

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Status feed for the UI layer.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum SyncEvent {
    PassStarted {
        trigger: String,
    },
    ItemSynced {
        kind: EntityKind,
        entity_id: i64,
        remote_id: String,
    },
    ItemFailed {
        kind: EntityKind,
        entity_id: i64,
        terminal: bool,
        error: String,
    },
    PassCompleted(SyncResult),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusSnapshot {
    pub is_syncing: bool,
    pub connectivity: Connectivity,
    pub backlog: u32,
    pub needs_attention: u32,
    pub last_pass_at: Option<i64>,
    pub pass_errors: u32,
}

/// How one item ended up within a pass.
enum ItemDisposition {
    Synced,
    Retryable,
    Terminal,
    /// Not attempted: claim raced, cancellation, deferral, or a local
    /// storage error left it for the next pass.
    Pending,
}

/// The scheduler at the centre of the engine: decides when a pass runs,
/// what syncs first, and how partial failure is recorded.
///
/// One pass runs at a time; overlapping triggers coalesce into a single
/// "run again" request instead of parallel passes. Within a pass, groups of
/// different entity kinds run concurrently under a bounded limit, while
/// items of one kind proceed sequentially in priority-then-age order.
pub struct SyncOrchestrator {
    queue: Arc<dyn SyncQueueStore>,
    network: Arc<dyn NetworkMonitor>,
    adapters: AdapterRegistry,
    policy: RetryPolicy,
    config: AppConfig,
    pass_gate: Mutex<()>,
    rerun_requested: AtomicBool,
    status: RwLock<SyncStatusSnapshot>,
    events: broadcast::Sender<SyncEvent>,
}

impl SyncOrchestrator {
    pub fn new(
        queue: Arc<dyn SyncQueueStore>,
        records: Arc<dyn RecordStore>,
        remote: Arc<dyn RemoteApi>,
        network: Arc<dyn NetworkMonitor>,
        config: AppConfig,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let connectivity = network.current();
        Arc::new(Self {
            queue,
            network,
            adapters: AdapterRegistry::build(records, remote),
            policy: RetryPolicy::from_config(&config.retry),
            config,
            pass_gate: Mutex::new(()),
            rerun_requested: AtomicBool::new(false),
            status: RwLock::new(SyncStatusSnapshot {
                is_syncing: false,
                connectivity,
                backlog: 0,
                needs_attention: 0,
                last_pass_at: None,
                pass_errors: 0,
            }),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    pub async fn status(&self) -> SyncStatusSnapshot {
        self.status.read().await.clone()
    }

    /// Terminal failures awaiting operator review.
    pub async fn needs_attention(&self) -> Result<Vec<SyncQueueItem>, AppError> {
        self.queue.terminal_items().await
    }

    pub async fn dismiss_terminal(&self, id: QueueItemId) -> Result<(), AppError> {
        self.queue.dismiss_terminal(id).await
    }

    /// Startup liveness recovery: items left `in_progress` by a crash are
    /// requeued once they exceed the grace period.
    pub async fn recover_stalled(&self) -> Result<u32, AppError> {
        let now = Utc::now();
        let cutoff = now - ChronoDuration::seconds(self.config.retry.stalled_after_secs as i64);
        let recovered = self.queue.recover_stalled(cutoff, now).await?;
        if recovered > 0 {
            info!(
                target: "sync::pass",
                recovered,
                "requeued items stalled in progress"
            );
        }
        Ok(recovered)
    }

    /// Run a pass now, waiting for any pass in flight to finish first.
    pub async fn run_pass(
        &self,
        scope: SyncScope,
        cancel: &CancelSignal,
    ) -> Result<SyncResult, AppError> {
        let _guard = self.pass_gate.lock().await;
        self.run_pass_locked(scope, cancel, SyncTrigger::Manual).await
    }

    /// Trigger entry point for timers and connectivity events. If a pass is
    /// already running the request collapses into a rerun flag.
    pub async fn request_pass(self: &Arc<Self>, trigger: SyncTrigger) {
        let guard = match self.pass_gate.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                debug!(
                    target: "sync::pass",
                    trigger = trigger.as_str(),
                    "pass already running, coalescing trigger"
                );
                self.rerun_requested.store(true, Ordering::SeqCst);
                return;
            }
        };

        loop {
            if let Err(err) = self
                .run_pass_locked(SyncScope::All, &CancelSignal::new(), trigger)
                .await
            {
                error!(target: "sync::pass", error = %err, "sync pass failed");
                let mut status = self.status.write().await;
                status.pass_errors += 1;
            }
            if !self.rerun_requested.swap(false, Ordering::SeqCst) {
                break;
            }
            debug!(target: "sync::pass", "running coalesced follow-up pass");
        }

        drop(guard);
    }

    /// Periodic trigger loop. Does nothing when auto sync is off.
    pub fn spawn_periodic(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let orchestrator = Arc::clone(self);
        tokio::spawn(async move {
            if !orchestrator.config.sync.auto_sync {
                return;
            }
            let period = Duration::from_secs(orchestrator.config.sync.sync_interval.max(1));
            let mut interval = tokio::time::interval(period);
            // The first tick fires immediately; passes start one period in.
            interval.tick().await;
            loop {
                interval.tick().await;
                orchestrator.request_pass(SyncTrigger::Timer).await;
            }
        })
    }

    /// The orchestrator is the sole connectivity subscriber: offline→online
    /// transitions become pass requests, nothing else leaks out of the
    /// monitor.
    pub fn spawn_connectivity_listener(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let orchestrator = Arc::clone(self);
        let mut rx = self.network.subscribe();
        tokio::spawn(async move {
            let mut previous = *rx.borrow();
            while rx.changed().await.is_ok() {
                let current = *rx.borrow();
                {
                    let mut status = orchestrator.status.write().await;
                    status.connectivity = current;
                }
                if !previous.is_online() && current.is_online() {
                    info!(
                        target: "sync::pass",
                        connectivity = current.as_str(),
                        "connectivity regained, requesting sync pass"
                    );
                    orchestrator
                        .request_pass(SyncTrigger::ConnectivityRegained)
                        .await;
                }
                previous = current;
            }
        })
    }

    async fn run_pass_locked(
        &self,
        scope: SyncScope,
        cancel: &CancelSignal,
        trigger: SyncTrigger,
    ) -> Result<SyncResult, AppError> {
        let started = Instant::now();
        let pass_id = Uuid::new_v4();
        let connectivity = self.network.current();
        debug!(
            target: "sync::pass",
            %pass_id,
            trigger = trigger.as_str(),
            connectivity = connectivity.as_str(),
            "sync pass starting"
        );

        {
            let mut status = self.status.write().await;
            status.is_syncing = true;
            status.connectivity = connectivity;
        }
        self.publish(SyncEvent::PassStarted {
            trigger: trigger.as_str().to_string(),
        });

        let mut result = SyncResult::default();

        if !connectivity.is_online() {
            let counts = match self.queue.counts().await {
                Ok(counts) => counts,
                Err(err) => {
                    self.mark_idle().await;
                    return Err(err);
                }
            };
            result.pending_count = counts.pending + counts.failed_retryable;
            debug!(
                target: "sync::pass",
                pending = result.pending_count,
                "offline, skipping pass"
            );
            self.finish_pass(pass_id, &result, started, trigger, true).await;
            return Ok(result);
        }

        let now = Utc::now();
        let items = match self
            .queue
            .schedulable_items(scope.kind(), PASS_FETCH_LIMIT, self.policy.due_bound(), now)
            .await
        {
            Ok(items) => items,
            Err(err) => {
                self.mark_idle().await;
                return Err(err);
            }
        };

        let mut groups: HashMap<EntityKind, Vec<SyncQueueItem>> = HashMap::new();
        for item in items {
            if !self.policy.is_due(&item, now) {
                result.record_pending();
                continue;
            }
            if item.entity_kind.is_large_payload()
                && connectivity == Connectivity::Metered
                && !self.config.sync.photos_on_metered
            {
                result.record_pending();
                continue;
            }
            groups.entry(item.entity_kind).or_default().push(item);
        }

        // Kinds run concurrently; the queue order within a kind is preserved
        // by sequential processing inside each group.
        let concurrency = self.config.sync.max_concurrent_kinds.max(1) as usize;
        let partials: Vec<SyncResult> = stream::iter(groups.into_iter())
            .map(|(kind, group)| self.process_group(kind, group, cancel))
            .buffer_unordered(concurrency)
            .collect()
            .await;

        for partial in partials {
            result.synced_count += partial.synced_count;
            result.retryable_count += partial.retryable_count;
            result.terminal_count += partial.terminal_count;
            result.pending_count += partial.pending_count;
        }

        self.finish_pass(pass_id, &result, started, trigger, false).await;
        Ok(result)
    }

    /// Clear the syncing flag when a pass bails out before `finish_pass`.
    async fn mark_idle(&self) {
        self.status.write().await.is_syncing = false;
    }

    async fn finish_pass(
        &self,
        pass_id: Uuid,
        result: &SyncResult,
        started: Instant,
        trigger: SyncTrigger,
        skipped_offline: bool,
    ) {
        let counts = self.queue.counts().await;
        {
            let mut status = self.status.write().await;
            status.is_syncing = false;
            match counts {
                Ok(counts) => {
                    status.backlog = counts.backlog();
                    status.needs_attention = counts.failed_terminal;
                }
                // Keep the previous counts rather than reporting an
                // empty backlog on a store error.
                Err(e) => {
                    warn!(target: "sync::pass", %pass_id, error = %e, "queue counts unavailable");
                }
            }
            status.last_pass_at = Some(Utc::now().timestamp());
        }

        let duration_ms = started.elapsed().as_millis() as u64;
        if !skipped_offline {
            let failed = result.retryable_count + result.terminal_count;
            let status = if result.attempted() == 0 || failed < result.attempted() {
                PassOutcomeStatus::Success
            } else {
                PassOutcomeStatus::Failure
            };
            metrics::record_pass(
                status,
                &PassOutcomeMetadata {
                    trigger: Some(trigger.as_str().to_string()),
                    duration_ms: Some(duration_ms),
                    synced_count: Some(result.synced_count),
                    failed_count: Some(failed),
                },
            );
        }

        info!(
            target: "sync::pass",
            %pass_id,
            trigger = trigger.as_str(),
            synced = result.synced_count,
            retryable = result.retryable_count,
            terminal = result.terminal_count,
            pending = result.pending_count,
            duration_ms,
            "sync pass completed"
        );
        self.publish(SyncEvent::PassCompleted(result.clone()));
    }

    async fn process_group(
        &self,
        kind: EntityKind,
        items: Vec<SyncQueueItem>,
        cancel: &CancelSignal,
    ) -> SyncResult {
        if kind.is_batched() {
            return self.process_location_group(items, cancel).await;
        }

        let mut partial = SyncResult::default();
        let Some(adapter) = self.adapters.single(kind) else {
            warn!(target: "sync::pass", kind = %kind, "no adapter registered");
            partial.pending_count += items.len() as u32;
            return partial;
        };

        for item in items {
            if cancel.is_cancelled() {
                partial.record_pending();
                continue;
            }
            match self.process_item(adapter.as_ref(), &item).await {
                ItemDisposition::Synced => partial.record_synced(),
                ItemDisposition::Retryable => partial.record_retryable(),
                ItemDisposition::Terminal => partial.record_terminal(),
                ItemDisposition::Pending => partial.record_pending(),
            }
        }
        partial
    }

    async fn process_item(
        &self,
        adapter: &dyn EntitySyncAdapter,
        item: &SyncQueueItem,
    ) -> ItemDisposition {
        match self.queue.claim(item.id, Utc::now()).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(
                    target: "sync::pass",
                    queue_item = %item.id,
                    "claim lost, item already in progress"
                );
                return ItemDisposition::Pending;
            }
            Err(err) => {
                warn!(target: "sync::pass", queue_item = %item.id, error = %err, "claim failed");
                return ItemDisposition::Pending;
            }
        }

        match adapter.push(item).await {
            Ok(outcome) => self.apply_outcome(item, outcome).await,
            Err(err) => {
                // Local storage trouble is fatal to this item only; the row
                // goes back to pending for the next pass.
                error!(
                    target: "sync::pass",
                    queue_item = %item.id,
                    kind = %item.entity_kind,
                    error = %err,
                    "local error while pushing item"
                );
                if let Err(release_err) = self.queue.release(item.id).await {
                    error!(
                        target: "sync::pass",
                        queue_item = %item.id,
                        error = %release_err,
                        "failed to release item"
                    );
                }
                ItemDisposition::Pending
            }
        }
    }

    async fn apply_outcome(&self, item: &SyncQueueItem, outcome: PushOutcome) -> ItemDisposition {
        match outcome {
            PushOutcome::Synced(remote_id) => self.apply_synced(item, remote_id).await,
            // Adapters resolve conflicts; anything that still surfaces here
            // follows the server-wins default.
            PushOutcome::Conflict(conflict) => self.apply_synced(item, conflict.remote_id).await,
            PushOutcome::Transient(reason) => {
                let attempts_made = item.retry_count + 1;
                if self.policy.is_exhausted(attempts_made) {
                    self.apply_terminal(item, &format!("retry budget exhausted: {reason}"))
                        .await
                } else {
                    self.apply_retryable(item, &reason).await
                }
            }
            PushOutcome::Permanent(reason) => self.apply_terminal(item, &reason).await,
        }
    }

    async fn apply_synced(&self, item: &SyncQueueItem, remote_id: RemoteId) -> ItemDisposition {
        match self
            .queue
            .complete_synced(item.entity_kind, item.entity_id, remote_id.clone())
            .await
        {
            Ok(()) => {
                self.publish(SyncEvent::ItemSynced {
                    kind: item.entity_kind,
                    entity_id: item.entity_id.value(),
                    remote_id: remote_id.to_string(),
                });
                ItemDisposition::Synced
            }
            Err(err) => {
                error!(
                    target: "sync::pass",
                    queue_item = %item.id,
                    error = %err,
                    "failed to persist synced state"
                );
                let _ = self.queue.release(item.id).await;
                ItemDisposition::Pending
            }
        }
    }

    async fn apply_retryable(&self, item: &SyncQueueItem, reason: &str) -> ItemDisposition {
        if let Err(err) = self.queue.fail_retryable(item.id, reason, Utc::now()).await {
            error!(target: "sync::pass", queue_item = %item.id, error = %err, "failed to record retry");
            return ItemDisposition::Pending;
        }
        self.publish(SyncEvent::ItemFailed {
            kind: item.entity_kind,
            entity_id: item.entity_id.value(),
            terminal: false,
            error: reason.to_string(),
        });
        ItemDisposition::Retryable
    }

    async fn apply_terminal(&self, item: &SyncQueueItem, reason: &str) -> ItemDisposition {
        if let Err(err) = self.queue.fail_terminal(item.id, reason, Utc::now()).await {
            error!(target: "sync::pass", queue_item = %item.id, error = %err, "failed to record terminal failure");
            return ItemDisposition::Pending;
        }
        warn!(
            target: "sync::pass",
            queue_item = %item.id,
            kind = %item.entity_kind,
            entity_id = %item.entity_id,
            reason,
            "item failed terminally, needs attention"
        );
        self.publish(SyncEvent::ItemFailed {
            kind: item.entity_kind,
            entity_id: item.entity_id.value(),
            terminal: true,
            error: reason.to_string(),
        });
        ItemDisposition::Terminal
    }

    async fn process_location_group(
        &self,
        items: Vec<SyncQueueItem>,
        cancel: &CancelSignal,
    ) -> SyncResult {
        let mut partial = SyncResult::default();
        let adapter = self.adapters.locations();
        let batch_size = self.config.sync.batch_size.max(1) as usize;

        for chunk in items.chunks(batch_size) {
            if cancel.is_cancelled() {
                partial.pending_count += chunk.len() as u32;
                continue;
            }

            let mut claimed = Vec::with_capacity(chunk.len());
            for item in chunk {
                match self.queue.claim(item.id, Utc::now()).await {
                    Ok(true) => claimed.push(item.clone()),
                    Ok(false) => partial.record_pending(),
                    Err(err) => {
                        warn!(target: "sync::pass", queue_item = %item.id, error = %err, "claim failed");
                        partial.record_pending();
                    }
                }
            }
            if claimed.is_empty() {
                continue;
            }

            match adapter.push_batch(&claimed).await {
                Ok(outcomes) => {
                    let by_id: HashMap<i64, &SyncQueueItem> = claimed
                        .iter()
                        .map(|item| (item.id.value(), item))
                        .collect();
                    for batched in outcomes {
                        let Some(item) = by_id.get(&batched.queue_item_id.value()) else {
                            continue;
                        };
                        match self.apply_outcome(item, batched.outcome).await {
                            ItemDisposition::Synced => partial.record_synced(),
                            ItemDisposition::Retryable => partial.record_retryable(),
                            ItemDisposition::Terminal => partial.record_terminal(),
                            ItemDisposition::Pending => partial.record_pending(),
                        }
                    }
                }
                Err(err) => {
                    error!(target: "sync::pass", error = %err, "location batch failed locally");
                    for item in &claimed {
                        let _ = self.queue.release(item.id).await;
                        partial.record_pending();
                    }
                }
            }
        }
        partial
    }

    fn publish(&self, event: SyncEvent) {
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }
}
