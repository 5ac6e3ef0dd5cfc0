//! Flow execution error types

use std::fmt;

use queue_extractor::ExtractionError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tool_fill_form::FormError;

/// Which navigation was attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationStage {
    /// Home/menu state to the list view
    ListEntry,
    /// List view to one item's form
    DetailEntry,
    /// One step back in history
    Back,
    /// Reload of the portal followed by list entry
    Renavigate,
}

impl fmt::Display for NavigationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NavigationStage::ListEntry => "list entry",
            NavigationStage::DetailEntry => "detail entry",
            NavigationStage::Back => "back navigation",
            NavigationStage::Renavigate => "re-navigation",
        })
    }
}

/// Navigation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// Trigger not found, not activatable, or arrival not confirmed
    #[error("{stage} failed: {reason} (attempted: {})", .attempted.join(", "))]
    Failed {
        stage: NavigationStage,
        attempted: Vec<String>,
        reason: String,
    },
}

impl NavigationError {
    pub fn failed(stage: NavigationStage, attempted: Vec<String>, reason: impl ToString) -> Self {
        NavigationError::Failed {
            stage,
            attempted,
            reason: reason.to_string(),
        }
    }

    pub fn stage(&self) -> NavigationStage {
        match self {
            NavigationError::Failed { stage, .. } => *stage,
        }
    }
}

/// Per-item failure inside one batch iteration
#[derive(Debug, Error)]
pub enum FlowError {
    /// The item's action control could not be re-resolved
    #[error(transparent)]
    Relocation(#[from] ExtractionError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error(transparent)]
    Form(#[from] FormError),
}

impl FlowError {
    /// Whether the failure left the session somewhere other than the list
    pub fn needs_recovery(&self) -> bool {
        !matches!(self, FlowError::Relocation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_error_lists_attempts() {
        let err = NavigationError::failed(
            NavigationStage::ListEntry,
            vec!["xpath://a[1]".into(), "xpath://a[2]".into()],
            "menu not clickable",
        );
        assert_eq!(
            err.to_string(),
            "list entry failed: menu not clickable (attempted: xpath://a[1], xpath://a[2])"
        );
        assert_eq!(err.stage(), NavigationStage::ListEntry);
    }

    #[test]
    fn relocation_failures_need_no_recovery() {
        let err = FlowError::from(ExtractionError::ActionNotFound {
            item: "Algorithms - Dr. X".into(),
            reason: "row gone".into(),
        });
        assert!(!err.needs_recovery());
    }
}
