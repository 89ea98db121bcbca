use serde::{Deserialize, Serialize};

/// Aggregate outcome of one orchestration pass. Transient, never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncResult {
    pub synced_count: u32,
    pub retryable_count: u32,
    pub terminal_count: u32,
    pub pending_count: u32,
}

impl SyncResult {
    pub fn new(
        synced_count: u32,
        retryable_count: u32,
        terminal_count: u32,
        pending_count: u32,
    ) -> Self {
        Self {
            synced_count,
            retryable_count,
            terminal_count,
            pending_count,
        }
    }

    pub fn record_synced(&mut self) {
        self.synced_count += 1;
    }

    pub fn record_retryable(&mut self) {
        self.retryable_count += 1;
    }

    pub fn record_terminal(&mut self) {
        self.terminal_count += 1;
    }

    pub fn record_pending(&mut self) {
        self.pending_count += 1;
    }

    pub fn attempted(&self) -> u32 {
        self.synced_count + self.retryable_count + self.terminal_count
    }
}
