use crate::application::ports::DueBound;
use crate::domain::entities::SyncQueueItem;
use crate::shared::config::RetryConfig;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// Exponential backoff with jitter, capped, plus the terminal retry budget.
///
/// Backoff state (`retry_count`, `last_attempt_at`) lives in the queue rows,
/// never in timers, so the schedule survives process death.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    base_delay_ms: u64,
    max_delay_ms: u64,
    jitter_ms: u64,
    max_retries: u32,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
            jitter_ms: config.jitter_ms,
            max_retries: config.max_retries,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// `min(cap, base * 2^retry_count)`, without jitter.
    pub fn base_backoff(&self, retry_count: u32) -> Duration {
        // Saturate rather than shift: a plain shift drops high bits and
        // would wrap the delay back toward zero at large retry counts.
        let factor = 1u64 << retry_count.min(62);
        let delay_ms = self
            .base_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms);
        Duration::milliseconds(delay_ms as i64)
    }

    /// Full delay before the next attempt: capped exponential plus a random
    /// jitter in `[0, jitter_ms]`.
    pub fn backoff(&self, retry_count: u32) -> Duration {
        self.base_backoff(retry_count) + self.sampled_jitter()
    }

    /// Whole-second floor of the backoff parameters, for the store-side
    /// readiness predicate. Flooring only ever admits rows earlier than the
    /// exact check, so [`RetryPolicy::is_due`] stays authoritative.
    pub fn due_bound(&self) -> DueBound {
        DueBound {
            base_delay_secs: (self.base_delay_ms / 1_000) as i64,
            max_delay_secs: (self.max_delay_ms / 1_000) as i64,
        }
    }

    /// A transient failure after this many prior attempts exhausts the
    /// budget and converts the item to failed-terminal.
    pub fn is_exhausted(&self, attempts_made: u32) -> bool {
        attempts_made >= self.max_retries
    }

    /// Whether the item's backoff window has elapsed. Never-attempted items
    /// are always due. Jitter here is derived from the queue row id so the
    /// answer is stable across repeated scheduling queries.
    pub fn is_due(&self, item: &SyncQueueItem, now: DateTime<Utc>) -> bool {
        let Some(last_attempt) = item.last_attempt_at else {
            return true;
        };
        let delay = self.base_backoff(item.retry_count) + self.stable_jitter(item.id.value());
        last_attempt + delay <= now
    }

    fn sampled_jitter(&self) -> Duration {
        if self.jitter_ms == 0 {
            return Duration::zero();
        }
        let ms = rand::thread_rng().gen_range(0..=self.jitter_ms);
        Duration::milliseconds(ms as i64)
    }

    fn stable_jitter(&self, seed: i64) -> Duration {
        if self.jitter_ms == 0 {
            return Duration::zero();
        }
        let hashed = (seed as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Duration::milliseconds((hashed % (self.jitter_ms + 1)) as i64)
    }
}
