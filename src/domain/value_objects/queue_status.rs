use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueStatus {
    Pending,
    InProgress,
    FailedRetryable,
    FailedTerminal,
    Unknown(String),
}

impl QueueStatus {
    pub fn as_str(&self) -> &str {
        match self {
            QueueStatus::Pending => "pending",
            QueueStatus::InProgress => "in_progress",
            QueueStatus::FailedRetryable => "failed_retryable",
            QueueStatus::FailedTerminal => "failed_terminal",
            QueueStatus::Unknown(value) => value.as_str(),
        }
    }

    /// Whether the orchestrator may still pick this item up.
    pub fn is_schedulable(&self) -> bool {
        matches!(self, QueueStatus::Pending | QueueStatus::FailedRetryable)
    }
}

impl From<&str> for QueueStatus {
    fn from(value: &str) -> Self {
        match value {
            "pending" => QueueStatus::Pending,
            "in_progress" => QueueStatus::InProgress,
            "failed_retryable" => QueueStatus::FailedRetryable,
            "failed_terminal" => QueueStatus::FailedTerminal,
            other => QueueStatus::Unknown(other.to_string()),
        }
    }
}
