//! Application-level errors
//!
//! Component failures keep their own types; this enum covers what ends a
//! run before or around the batch.

use action_flow::NavigationError;
use action_primitives::ActionError;
use cdp_adapter::AdapterError;
use perceiver_state::PageState;
use queue_extractor::ExtractionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded or is unusable
    #[error("configuration error: {0}")]
    Config(String),

    /// Browser could not be launched or attached
    #[error("browser unavailable: {0}")]
    Browser(#[from] AdapterError),

    /// Session operation failed outside the batch loop
    #[error(transparent)]
    Session(#[from] ActionError),

    /// The login gate did not pass
    #[error("not logged in (page state: {state}); log in manually in the browser and rerun")]
    NotAuthenticated { state: PageState },

    /// List view could not be reached before the batch
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    /// Queue listing failed
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

impl AppError {
    /// Get error severity (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            AppError::Config(_) | AppError::Browser(_) => 3,
            AppError::NotAuthenticated { .. } | AppError::Navigation(_) => 2,
            AppError::Extraction(err) => err.severity(),
            AppError::Session(err) => err.severity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_message_tells_user_what_to_do() {
        let err = AppError::NotAuthenticated {
            state: PageState::Unauthenticated,
        };
        let message = err.to_string();
        assert!(message.contains("log in manually"));
        assert_eq!(err.severity(), 2);
    }

    #[test]
    fn config_errors_are_critical() {
        assert_eq!(AppError::Config("bad".into()).severity(), 3);
    }
}
