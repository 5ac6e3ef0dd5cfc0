//! Work item data model

use action_primitives::Element;
use serde::Serialize;
use std::fmt;

/// Weak, single-use reference to a row's action control.
///
/// Valid only until the next DOM mutation. It is never cached across a
/// navigation boundary: callers re-resolve the control from the live page
/// before activating it.
#[derive(Clone, Default)]
pub struct ActionHandle(Option<Element>);

impl ActionHandle {
    pub fn new(element: Option<Element>) -> Self {
        Self(element)
    }

    pub fn empty() -> Self {
        Self(None)
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }

    /// Whether the control is present and rendered right now.
    /// A handle that went stale counts as not visible.
    pub async fn is_visible(&self) -> bool {
        match &self.0 {
            Some(element) => element.is_visible().await.unwrap_or(false),
            None => false,
        }
    }

    /// Consume the reference; a handle can be used at most once
    pub fn take(&mut self) -> Option<Element> {
        self.0.take()
    }
}

impl fmt::Debug for ActionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(element) => write!(f, "ActionHandle({})", element.describe()),
            None => f.write_str("ActionHandle(none)"),
        }
    }
}

/// One row of the pending-work table.
///
/// Constructed fresh on every extraction pass and discarded after at most
/// one use. Equality ignores the action handle.
#[derive(Debug, Clone, Serialize)]
pub struct WorkItem {
    /// Display ordinal, not a stable identity
    pub sequence_label: String,

    /// Organisational grouping (teaching department)
    pub group_label: String,

    /// Course name
    pub subject_name: String,

    /// Teacher name
    pub counterparty_name: String,

    /// Credits, display only
    pub weight: String,

    /// Teaching weeks, display only
    pub period: String,

    #[serde(skip)]
    pub action: ActionHandle,
}

impl WorkItem {
    /// True iff the action control is present and currently visible
    pub async fn needs_action(&self) -> bool {
        self.action.is_visible().await
    }

    /// `subject - counterparty (group)`
    pub fn summary(&self) -> String {
        format!(
            "{} - {} ({})",
            self.subject_name, self.counterparty_name, self.group_label
        )
    }
}

impl PartialEq for WorkItem {
    fn eq(&self, other: &Self) -> bool {
        self.sequence_label == other.sequence_label
            && self.group_label == other.group_label
            && self.subject_name == other.subject_name
            && self.counterparty_name == other.counterparty_name
            && self.weight == other.weight
            && self.period == other.period
    }
}

impl Eq for WorkItem {}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} - {} ({} credits, weeks {})",
            self.sequence_label, self.subject_name, self.counterparty_name, self.weight, self.period
        )
    }
}
