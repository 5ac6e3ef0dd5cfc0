//! Error types for locator system

use thiserror::Error;

/// Locator error enumeration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocatorError {
    /// Every candidate was tried and none satisfied the condition in time
    #[error(
        "No candidate of '{set}' became {condition} within {timeout_ms}ms (tried: {})",
        .candidates.join(", ")
    )]
    Exhausted {
        set: String,
        candidates: Vec<String>,
        condition: String,
        timeout_ms: u64,
    },

    /// The candidate set has no queries at all
    #[error("Candidate set '{0}' is empty")]
    EmptyCandidates(String),

    /// A query could not be evaluated by the session
    #[error("Invalid query in '{set}': {reason}")]
    InvalidQuery { set: String, reason: String },
}

impl LocatorError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, LocatorError::Exhausted { .. })
    }

    /// Get error severity (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            LocatorError::InvalidQuery { .. } | LocatorError::EmptyCandidates(_) => 2,
            LocatorError::Exhausted { .. } => 1,
        }
    }
}
