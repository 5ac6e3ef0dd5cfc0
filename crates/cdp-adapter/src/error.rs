//! Adapter errors and their mapping onto session errors

use action_primitives::ActionError;
use chromiumoxide::error::CdpError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// High-level error categories surfaced by the adapter.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdapterErrorKind {
    #[error("browser launch failed")]
    Launch,
    #[error("browser connection failed")]
    Connect,
    #[error("navigation timed out")]
    NavTimeout,
    #[error("cdp i/o failure")]
    CdpIo,
    #[error("script evaluation failed")]
    Script,
    #[error("internal error")]
    Internal,
}

/// Enriched error metadata passed back to higher layers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterError {
    pub kind: AdapterErrorKind,
    pub hint: Option<String>,
    pub retriable: bool,
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(hint) = &self.hint {
            write!(f, ": {}", hint)?;
        }
        Ok(())
    }
}

impl std::error::Error for AdapterError {}

impl AdapterError {
    pub fn new(kind: AdapterErrorKind) -> Self {
        Self {
            kind,
            hint: None,
            retriable: false,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn retriable(mut self, flag: bool) -> Self {
        self.retriable = flag;
        self
    }
}

impl From<CdpError> for AdapterError {
    fn from(err: CdpError) -> Self {
        match err {
            CdpError::Timeout => AdapterError::new(AdapterErrorKind::NavTimeout).retriable(true),
            CdpError::JavascriptException(details) => {
                AdapterError::new(AdapterErrorKind::Script).with_hint(details.text.clone())
            }
            other => AdapterError::new(AdapterErrorKind::CdpIo)
                .with_hint(other.to_string())
                .retriable(true),
        }
    }
}

impl From<AdapterError> for ActionError {
    fn from(err: AdapterError) -> Self {
        let message = err.to_string();
        match err.kind {
            AdapterErrorKind::NavTimeout => ActionError::NavTimeout(message),
            AdapterErrorKind::Script => ActionError::Script(message),
            AdapterErrorKind::Launch | AdapterErrorKind::Connect | AdapterErrorKind::CdpIo => {
                ActionError::SessionIo(message)
            }
            AdapterErrorKind::Internal => ActionError::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_hint() {
        let err = AdapterError::new(AdapterErrorKind::Connect).with_hint("refused");
        assert_eq!(err.to_string(), "browser connection failed: refused");
    }

    #[test]
    fn maps_onto_session_errors() {
        let err: ActionError = AdapterError::new(AdapterErrorKind::NavTimeout).into();
        assert!(matches!(err, ActionError::NavTimeout(_)));

        let err: ActionError = AdapterError::new(AdapterErrorKind::Script)
            .with_hint("x is not defined")
            .into();
        assert_eq!(
            err,
            ActionError::Script("script evaluation failed: x is not defined".into())
        );
    }

    #[test]
    fn timeouts_are_retriable() {
        let err = AdapterError::from(CdpError::Timeout);
        assert_eq!(err.kind, AdapterErrorKind::NavTimeout);
        assert!(err.retriable);
    }
}
