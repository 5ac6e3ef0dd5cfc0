//! Data models for page state detection

use serde::{Deserialize, Serialize};
use std::fmt;

/// Application state as observed at one instant.
///
/// Mutually exclusive at observation time and never cached: every caller
/// re-derives it from the live page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageState {
    Authenticated,
    Unauthenticated,
    ListView,
    DetailView,
    QueueExhausted,
    Unknown,
}

impl PageState {
    pub fn name(&self) -> &'static str {
        match self {
            PageState::Authenticated => "authenticated",
            PageState::Unauthenticated => "unauthenticated",
            PageState::ListView => "list_view",
            PageState::DetailView => "detail_view",
            PageState::QueueExhausted => "queue_exhausted",
            PageState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Navigable views whose arrival can be awaited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// The pending work-item table
    List,

    /// One item's form
    Detail,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::List => f.write_str("list view"),
            View::Detail => f.write_str("detail view"),
        }
    }
}

/// Which tier confirmed an arrival
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrivalSignal {
    /// URL carried an expected keyword
    Url(String),

    /// A structural indicator appeared
    Indicator(String),
}

/// Troubleshooting snapshot emitted when detection is inconclusive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDiagnostics {
    pub url: String,
    pub title: String,

    /// Bounded sample of short interactive element labels
    pub interactive: Vec<String>,
}

impl fmt::Display for PageDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "url={} title={:?}", self.url, self.title)?;
        if !self.interactive.is_empty() {
            write!(f, " interactive=[{}]", self.interactive.join(" | "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_display() {
        let diagnostics = PageDiagnostics {
            url: "https://portal.test/login".into(),
            title: "Sign in".into(),
            interactive: vec!["Login".into(), "Help".into()],
        };
        assert_eq!(
            diagnostics.to_string(),
            "url=https://portal.test/login title=\"Sign in\" interactive=[Login | Help]"
        );
    }

    #[test]
    fn state_names() {
        assert_eq!(PageState::QueueExhausted.to_string(), "queue_exhausted");
        assert_eq!(View::Detail.to_string(), "detail view");
    }
}
