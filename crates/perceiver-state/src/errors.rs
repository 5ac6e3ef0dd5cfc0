//! Error types for page state detection

use thiserror::Error;

/// Errors that can occur while detecting page state
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DetectorError {
    /// Neither the URL nor any structural indicator confirmed the view
    #[error("{view} not reached within {timeout_ms}ms (url: {url})")]
    ArrivalTimeout {
        view: String,
        url: String,
        timeout_ms: u64,
    },

    /// The view has no URL keywords and no indicators to check
    #[error("No signals configured for {0}")]
    NoSignals(String),
}

impl DetectorError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, DetectorError::ArrivalTimeout { .. })
    }
}
