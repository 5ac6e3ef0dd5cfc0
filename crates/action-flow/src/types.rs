//! Core types for batch orchestration

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Batch loop configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Hard ceiling on processed items
    pub max_attempts: u32,

    /// Pause after a successful submission so the list can re-render (milliseconds)
    pub success_settle_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 100,
            success_settle_ms: 1_000,
        }
    }
}

impl BatchConfig {
    pub fn success_settle(&self) -> Duration {
        Duration::from_millis(self.success_settle_ms)
    }
}

/// Counters accumulated by the orchestrator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub succeeded: u32,
    pub failed: u32,
    /// Iterations in which a head item was taken
    pub attempts: u32,
}

impl BatchResult {
    pub fn total(&self) -> u32 {
        self.succeeded + self.failed
    }
}

/// How the batch ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum BatchStatus {
    /// Extraction came back empty
    Drained,

    /// The iteration ceiling was hit
    AttemptsExhausted,

    /// The table was unreachable and no completion banner was shown
    ExtractionFailed(String),
}

impl BatchStatus {
    /// Normal-exit outcomes
    pub fn is_normal(&self) -> bool {
        !matches!(self, BatchStatus::ExtractionFailed(_))
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchStatus::Drained => f.write_str("drained"),
            BatchStatus::AttemptsExhausted => f.write_str("attempts exhausted"),
            BatchStatus::ExtractionFailed(reason) => write!(f, "extraction failed: {}", reason),
        }
    }
}

/// Final, immutable outcome of one batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub result: BatchResult,
    pub status: BatchStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Where recovery left the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryOutcome {
    WentBack,
    Renavigated,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_totals() {
        let result = BatchResult {
            succeeded: 2,
            failed: 1,
            attempts: 3,
        };
        assert_eq!(result.total(), 3);
    }

    #[test]
    fn status_display() {
        assert_eq!(BatchStatus::Drained.to_string(), "drained");
        assert!(BatchStatus::AttemptsExhausted.is_normal());
        let failed = BatchStatus::ExtractionFailed("table missing".into());
        assert!(!failed.is_normal());
        assert_eq!(failed.to_string(), "extraction failed: table missing");
    }

    #[test]
    fn default_config() {
        let config = BatchConfig::default();
        assert_eq!(config.max_attempts, 100);
        assert_eq!(config.success_settle(), Duration::from_secs(1));
    }
}
