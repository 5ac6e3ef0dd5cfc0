//! Error types for action primitives

use thiserror::Error;

/// Errors raised by browser session and element operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// Navigation timed out waiting for page load
    #[error("Navigation timeout: {0}")]
    NavTimeout(String),

    /// Wait operation timed out
    #[error("Wait timeout: {0}")]
    WaitTimeout(String),

    /// The element reference no longer points into the live document
    #[error("Stale element: {0}")]
    StaleElement(String),

    /// Element rejected direct interaction (obscured, detached overlay, ...)
    #[error("Element not interactable: {0}")]
    NotInteractable(String),

    /// Query could not be evaluated by the session
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Script evaluation inside the page failed
    #[error("Script error: {0}")]
    Script(String),

    /// Transport or protocol error talking to the browser
    #[error("Session I/O error: {0}")]
    SessionIo(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ActionError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ActionError::WaitTimeout(_)
                | ActionError::NotInteractable(_)
                | ActionError::StaleElement(_)
                | ActionError::SessionIo(_)
        )
    }

    /// Get error severity level (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            ActionError::Internal(_) => 3,
            ActionError::NavTimeout(_) | ActionError::SessionIo(_) | ActionError::Script(_) => 2,
            ActionError::WaitTimeout(_)
            | ActionError::StaleElement(_)
            | ActionError::InvalidQuery(_) => 1,
            ActionError::NotInteractable(_) => 0,
        }
    }
}
