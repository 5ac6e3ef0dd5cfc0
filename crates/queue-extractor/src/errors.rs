//! Error types for work item extraction

use thiserror::Error;

/// Extraction error enumeration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// Table container could not be resolved and no completion banner is shown
    #[error("Work item table unreachable: {0}")]
    TableUnreachable(String),

    /// The item's row or its action control is no longer on the page
    #[error("Action control for '{item}' not found: {reason}")]
    ActionNotFound { item: String, reason: String },
}

impl ExtractionError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExtractionError::ActionNotFound { .. })
    }

    /// Get error severity (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            ExtractionError::TableUnreachable(_) => 3,
            ExtractionError::ActionNotFound { .. } => 1,
        }
    }
}
