//! Core types for locator system

use action_primitives::{Element, Query};
use serde::{Deserialize, Serialize};

/// Ordered fallback chain of structural queries for one use site.
///
/// Queries are authored most-specific-first: precision decreases down the
/// list while robustness increases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSet {
    /// Use-site label, reported in diagnostics
    pub name: String,

    /// Candidate queries in priority order
    pub queries: Vec<Query>,
}

impl CandidateSet {
    pub fn new(name: impl Into<String>, queries: impl IntoIterator<Item = Query>) -> Self {
        Self {
            name: name.into(),
            queries: queries.into_iter().collect(),
        }
    }

    /// Convenience constructor for XPath-only sets
    pub fn xpaths<I, S>(name: impl Into<String>, expressions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, expressions.into_iter().map(Query::xpath))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Query> {
        self.queries.iter()
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Display form of every candidate, in order
    pub fn describe(&self) -> Vec<String> {
        self.queries.iter().map(ToString::to_string).collect()
    }
}

/// Outcome of a successful resolution
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The matched live element
    pub element: Element,

    /// Query that produced the match
    pub query: Query,

    /// Position of that query in the candidate set
    pub index: usize,

    /// Time spent resolving, all candidates included (milliseconds)
    pub elapsed_ms: u64,
}

impl Resolution {
    /// Whether the most specific candidate matched
    pub fn is_primary(&self) -> bool {
        self.index == 0
    }

    pub fn into_element(self) -> Element {
        self.element
    }
}

/// Why a single candidate did not produce an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFound {
    pub query: Query,
    pub reason: String,

    /// The session rejected the query itself
    pub invalid: bool,
}

impl std::fmt::Display for NotFound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.query, self.reason)
    }
}
