//! Detector configuration

use action_locator::CandidateSet;
use action_primitives::Query;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Signals confirming that a view is displayed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSignals {
    /// Strong tier: any keyword in the URL (case-insensitive)
    #[serde(default)]
    pub url_keywords: Vec<String>,

    /// Keywords that veto the URL tier (a detail URL often extends the list one)
    #[serde(default)]
    pub url_excludes: Vec<String>,

    /// Weak tier: structural elements present on the view
    pub indicators: CandidateSet,
}

impl ViewSignals {
    pub fn new(name: &str) -> Self {
        Self {
            url_keywords: Vec::new(),
            url_excludes: Vec::new(),
            indicators: CandidateSet::new(name, Vec::<Query>::new()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.url_keywords.is_empty() && self.indicators.is_empty()
    }
}

/// Page state detector configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Strong authentication signals, highest confidence first
    pub login_success: CandidateSet,

    /// Login-page signals, checked without waiting
    pub login_page: CandidateSet,

    /// Completion banner shown once no work item is left
    pub queue_exhausted: CandidateSet,

    pub list_view: ViewSignals,

    pub detail_view: ViewSignals,

    /// Elements sampled for the diagnostic snapshot
    pub interactive_sample: CandidateSet,

    /// Per-candidate wait for strong signals (milliseconds)
    pub signal_timeout_ms: u64,

    /// Maximum number of labels in a diagnostic snapshot
    pub sample_limit: usize,

    /// Labels this long or longer are left out of the snapshot
    pub max_label_chars: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            login_success: CandidateSet::new("login_success", Vec::<Query>::new()),
            login_page: CandidateSet::new("login_page", Vec::<Query>::new()),
            queue_exhausted: CandidateSet::new("queue_exhausted", Vec::<Query>::new()),
            list_view: ViewSignals::new("list_view"),
            detail_view: ViewSignals::new("detail_view"),
            interactive_sample: CandidateSet::xpaths("interactive_sample", ["//a | //button"]),
            signal_timeout_ms: 2_000,
            sample_limit: 10,
            max_label_chars: 20,
        }
    }
}

impl DetectorConfig {
    pub fn signal_timeout(&self) -> Duration {
        Duration::from_millis(self.signal_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = r##"
queue_exhausted:
  name: queue_exhausted
  queries:
    - css: ".systemNotice"
detail_view:
  url_keywords: [evaluateResponse]
  indicators:
    name: detail_view
    queries:
      - css: "#sheetTable"
"##;
        let config: DetectorConfig =
            serde_yaml::with::singleton_map_recursive::deserialize(serde_yaml::Deserializer::from_str(yaml))
                .unwrap();
        assert_eq!(config.queue_exhausted.len(), 1);
        assert_eq!(config.detail_view.url_keywords, vec!["evaluateResponse"]);
        assert!(config.detail_view.url_excludes.is_empty());
        assert_eq!(config.signal_timeout(), Duration::from_secs(2));
        assert!(config.list_view.is_empty());
    }
}
