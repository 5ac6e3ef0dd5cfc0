//! Core data types for action primitives

use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural description of how to find an element.
///
/// Candidate lists of queries are authored most-specific-first; the
/// locator walks them in order. Three shapes are supported:
/// - CSS selector
/// - XPath expression (relative expressions start with `.`)
/// - Tag whose text content contains every needle
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    /// CSS selector
    Css(String),

    /// XPath expression
    #[serde(rename = "xpath")]
    XPath(String),

    /// Element with the given tag whose text contains all needles
    TextContains { tag: String, needles: Vec<String> },
}

impl Query {
    pub fn css(selector: impl Into<String>) -> Self {
        Query::Css(selector.into())
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        Query::XPath(expression.into())
    }

    pub fn text_contains<I, S>(tag: impl Into<String>, needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Query::TextContains {
            tag: tag.into(),
            needles: needles.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the query carries anything to evaluate
    pub fn is_empty(&self) -> bool {
        match self {
            Query::Css(s) | Query::XPath(s) => s.trim().is_empty(),
            Query::TextContains { tag, .. } => tag.trim().is_empty(),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Css(s) => write!(f, "css:{}", s),
            Query::XPath(s) => write!(f, "xpath:{}", s),
            Query::TextContains { tag, needles } => {
                write!(f, "text:{}[{}]", tag, needles.join(" & "))
            }
        }
    }
}

/// Condition an element must satisfy before a locator accepts it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PresenceCondition {
    /// Attached to the document
    #[default]
    Present,

    /// Attached and rendered
    Visible,

    /// Visible and not disabled
    Clickable,
}

impl PresenceCondition {
    pub fn name(&self) -> &'static str {
        match self {
            PresenceCondition::Present => "present",
            PresenceCondition::Visible => "visible",
            PresenceCondition::Clickable => "clickable",
        }
    }
}

impl fmt::Display for PresenceCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How an element was finally activated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationMethod {
    /// Native click dispatched by the browser
    Direct,

    /// Script-level `element.click()` after the direct click was rejected
    Synthetic,
}

/// Report returned by the activation primitive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationReport {
    /// Which path succeeded
    pub method: ActivationMethod,

    /// Error that made the direct click fall back, if any
    pub direct_error: Option<String>,

    /// Total latency in milliseconds
    pub latency_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_display() {
        assert_eq!(Query::css("#postTrigger").to_string(), "css:#postTrigger");
        assert_eq!(
            Query::xpath("//*[@id='sheetTable']").to_string(),
            "xpath://*[@id='sheetTable']"
        );
        assert_eq!(
            Query::text_contains("tr", ["Algorithms", "Dr. X"]).to_string(),
            "text:tr[Algorithms & Dr. X]"
        );
    }

    #[test]
    fn empty_queries_are_detected() {
        assert!(Query::css("  ").is_empty());
        assert!(!Query::xpath(".//tr").is_empty());
    }

    #[test]
    fn condition_default_is_present() {
        assert_eq!(PresenceCondition::default(), PresenceCondition::Present);
        assert_eq!(PresenceCondition::Clickable.to_string(), "clickable");
    }
}
