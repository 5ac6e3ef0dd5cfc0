use std::sync::Arc;

use async_trait::async_trait;

use action_locator::{DefaultElementResolver, ElementResolver};
use action_primitives::{BrowserSession, WaitSettings};

use crate::answer::{self, AnswerPolicy};
use crate::errors::FormError;
use crate::model::FillReport;
use crate::policy::FormConfig;

#[async_trait]
pub trait FormSubmitter: Send + Sync {
    /// Fill the detail form currently displayed and submit it
    async fn fill_and_submit(&self, session: &dyn BrowserSession) -> Result<FillReport, FormError>;
}

/// Form filler over a live detail page
pub struct FormFiller {
    pub(crate) config: FormConfig,
    pub(crate) resolver: Arc<dyn ElementResolver>,
    pub(crate) policy: Arc<dyn AnswerPolicy>,
    pub(crate) settings: WaitSettings,
}

impl FormFiller {
    pub fn builder(config: FormConfig) -> FormFillerBuilder {
        FormFillerBuilder::new(config)
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }
}

#[async_trait]
impl FormSubmitter for FormFiller {
    async fn fill_and_submit(&self, session: &dyn BrowserSession) -> Result<FillReport, FormError> {
        self.run(session).await
    }
}

pub struct FormFillerBuilder {
    config: FormConfig,
    resolver: Option<Arc<dyn ElementResolver>>,
    policy: Option<Arc<dyn AnswerPolicy>>,
    settings: WaitSettings,
}

impl FormFillerBuilder {
    pub fn new(config: FormConfig) -> Self {
        Self {
            config,
            resolver: None,
            policy: None,
            settings: WaitSettings::default(),
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn ElementResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Override the policy described by the configuration
    pub fn with_policy(mut self, policy: Arc<dyn AnswerPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn with_settings(mut self, settings: WaitSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> Result<FormFiller, FormError> {
        for (name, set) in [
            ("form_root", &self.config.form_root),
            ("question_groups", &self.config.question_groups),
            ("comment_field", &self.config.comment_field),
            ("submit", &self.config.submit),
        ] {
            if set.is_empty() {
                return Err(FormError::Misconfigured(format!("{} has no candidates", name)));
            }
        }

        let policy = self
            .policy
            .unwrap_or_else(|| answer::from_config(&self.config.answers));
        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(DefaultElementResolver::new(self.settings)));

        Ok(FormFiller {
            config: self.config,
            resolver,
            policy,
            settings: self.settings,
        })
    }
}
