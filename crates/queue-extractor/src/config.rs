//! Extractor configuration

use action_locator::CandidateSet;
use action_primitives::Query;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Values substituted for missing or blank cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellDefaults {
    pub group: String,
    pub subject: String,
    pub counterparty: String,
    pub weight: String,
    pub period: String,
}

impl Default for CellDefaults {
    fn default() -> Self {
        Self {
            group: "unknown group".to_string(),
            subject: "unknown subject".to_string(),
            counterparty: "unknown counterparty".to_string(),
            weight: "0.00".to_string(),
            period: "unknown".to_string(),
        }
    }
}

/// Fixed-position cell queries, relative to a row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowLayout {
    pub sequence: Query,
    pub group: Query,
    /// "subject - counterparty" cell
    pub combined: Query,
    pub weight: Query,
    pub period: Query,
    /// Cell holding the action control
    pub action_cell: Query,
}

impl Default for RowLayout {
    fn default() -> Self {
        Self {
            sequence: Query::xpath("./td[1]"),
            group: Query::xpath("./td[2]"),
            combined: Query::xpath("./td[3]"),
            weight: Query::xpath("./td[4]"),
            period: Query::xpath("./td[5]"),
            action_cell: Query::xpath("./td[6]"),
        }
    }
}

/// Work item extractor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Table container, most specific first
    pub table: CandidateSet,

    /// Data-row queries relative to the table; the first one yielding rows wins
    pub rows: CandidateSet,

    pub layout: RowLayout,

    /// Action control queries relative to the action cell (or the row)
    pub action: CandidateSet,

    /// Separator inside the combined cell
    pub delimiter: String,

    pub defaults: CellDefaults,

    /// Tag used to find an item's row again by its text
    pub row_tag: String,

    /// Wait for the table container (milliseconds)
    pub table_timeout_ms: u64,

    /// Wait for an item's row during re-resolution (milliseconds)
    pub relocate_timeout_ms: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            table: CandidateSet::new("table", Vec::<Query>::new()),
            rows: CandidateSet::xpaths("rows", [".//tbody/tr | .//tr[position() > 1]"]),
            layout: RowLayout::default(),
            action: CandidateSet::new("action", Vec::<Query>::new()),
            delimiter: " - ".to_string(),
            defaults: CellDefaults::default(),
            row_tag: "tr".to_string(),
            table_timeout_ms: 10_000,
            relocate_timeout_ms: 10_000,
        }
    }
}

impl ExtractorConfig {
    pub fn table_timeout(&self) -> Duration {
        Duration::from_millis(self.table_timeout_ms)
    }

    pub fn relocate_timeout(&self) -> Duration {
        Duration::from_millis(self.relocate_timeout_ms)
    }
}
