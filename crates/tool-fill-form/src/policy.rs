use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use action_locator::CandidateSet;
use action_primitives::Query;

/// Which answer each question group receives
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerPolicyConfig {
    /// The same preferred choice for every question
    Preferred { choices: CandidateSet },

    /// Choice picked by the question's kind, read from an attribute of the group
    PerKind {
        kind_attribute: String,
        #[serde(default)]
        kinds: BTreeMap<String, CandidateSet>,
        fallback: CandidateSet,
    },
}

impl Default for AnswerPolicyConfig {
    fn default() -> Self {
        AnswerPolicyConfig::Preferred {
            choices: CandidateSet::new("preferred_choice", Vec::<Query>::new()),
        }
    }
}

/// Signals that the page left the detail form after submission
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReturnSignals {
    pub url_keywords: Vec<String>,
    /// Detail-view marker that must be gone from the URL
    pub url_excludes: Vec<String>,
    pub list_container: CandidateSet,
}

impl Default for ReturnSignals {
    fn default() -> Self {
        Self {
            url_keywords: Vec::new(),
            url_excludes: Vec::new(),
            list_container: CandidateSet::new("list_container", Vec::<Query>::new()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormTimeouts {
    /// Wait for the form root container
    pub form_ms: u64,
    /// Wait for the free-text field and the submit control
    pub element_ms: u64,
    /// Pause after each answer activation
    pub answer_pause_ms: u64,
    /// Wait for the post-submit confirmation
    pub confirm_ms: u64,
}

impl FormTimeouts {
    pub fn form(&self) -> Duration {
        Duration::from_millis(self.form_ms)
    }

    pub fn element(&self) -> Duration {
        Duration::from_millis(self.element_ms)
    }

    pub fn answer_pause(&self) -> Duration {
        Duration::from_millis(self.answer_pause_ms)
    }

    pub fn confirm(&self) -> Duration {
        Duration::from_millis(self.confirm_ms)
    }
}

impl Default for FormTimeouts {
    fn default() -> Self {
        Self {
            form_ms: 10_000,
            element_ms: 10_000,
            answer_pause_ms: 500,
            confirm_ms: 10_000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Form root container
    pub form_root: CandidateSet,
    /// One match per question; the first query yielding groups wins
    pub question_groups: CandidateSet,
    pub answers: AnswerPolicyConfig,
    pub comment_field: CandidateSet,
    /// Fixed free-text value
    pub comment_text: String,
    pub submit: CandidateSet,
    /// Attribute gating the submit control
    pub disabled_attribute: String,
    pub return_signals: ReturnSignals,
    pub timeouts: FormTimeouts,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            form_root: CandidateSet::new("form_root", Vec::<Query>::new()),
            question_groups: CandidateSet::new("question_groups", Vec::<Query>::new()),
            answers: AnswerPolicyConfig::default(),
            comment_field: CandidateSet::new("comment_field", Vec::<Query>::new()),
            comment_text: "无".to_string(),
            submit: CandidateSet::new("submit", Vec::<Query>::new()),
            disabled_attribute: "disabled".to_string(),
            return_signals: ReturnSignals::default(),
            timeouts: FormTimeouts::default(),
        }
    }
}
