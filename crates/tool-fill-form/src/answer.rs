//! Answer policies
//!
//! Which choice a question receives is a business rule, so it sits behind a
//! trait. The policy only names candidate choices; resolving and activating
//! them stays with the filler.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use action_locator::CandidateSet;
use action_primitives::Element;
use tracing::debug;

use crate::policy::AnswerPolicyConfig;

#[async_trait]
pub trait AnswerPolicy: Send + Sync {
    /// Candidate choices for one question group, most preferred first
    async fn choices_for(&self, group: &Element) -> CandidateSet;
}

/// Build the policy described by `config`
pub fn from_config(config: &AnswerPolicyConfig) -> Arc<dyn AnswerPolicy> {
    match config {
        AnswerPolicyConfig::Preferred { choices } => {
            Arc::new(PreferredChoicePolicy::new(choices.clone()))
        }
        AnswerPolicyConfig::PerKind {
            kind_attribute,
            kinds,
            fallback,
        } => Arc::new(PerKindPolicy::new(
            kind_attribute.clone(),
            kinds.clone(),
            fallback.clone(),
        )),
    }
}

/// Same preferred choice for every question
#[derive(Debug, Clone)]
pub struct PreferredChoicePolicy {
    choices: CandidateSet,
}

impl PreferredChoicePolicy {
    pub fn new(choices: CandidateSet) -> Self {
        Self { choices }
    }
}

#[async_trait]
impl AnswerPolicy for PreferredChoicePolicy {
    async fn choices_for(&self, _group: &Element) -> CandidateSet {
        self.choices.clone()
    }
}

/// Choice keyed by the question kind found in an attribute of the group
#[derive(Debug, Clone)]
pub struct PerKindPolicy {
    kind_attribute: String,
    kinds: BTreeMap<String, CandidateSet>,
    fallback: CandidateSet,
}

impl PerKindPolicy {
    pub fn new(
        kind_attribute: String,
        kinds: BTreeMap<String, CandidateSet>,
        fallback: CandidateSet,
    ) -> Self {
        Self {
            kind_attribute,
            kinds,
            fallback,
        }
    }
}

#[async_trait]
impl AnswerPolicy for PerKindPolicy {
    async fn choices_for(&self, group: &Element) -> CandidateSet {
        let kind = group.attribute(&self.kind_attribute).await.ok().flatten();
        match kind.as_deref().and_then(|kind| self.kinds.get(kind)) {
            Some(choices) => choices.clone(),
            None => {
                debug!(group = %group.describe(), ?kind, "No choices for question kind, using fallback");
                self.fallback.clone()
            }
        }
    }
}
