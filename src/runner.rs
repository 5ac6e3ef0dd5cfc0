//! Run pipeline: portal load, login gate, list entry, batch

use std::sync::Arc;

use action_flow::{
    BatchOrchestrator, BatchReport, DefaultRecoveryHandler, Navigation, Navigator,
};
use action_locator::{DefaultElementResolver, ElementResolver};
use action_primitives::{navigate_and_settle, BrowserSession};
use perceiver_state::{PageState, PageStateDetector, StateDetector};
use queue_extractor::{WorkItem, WorkItemExtractor, WorkQueue};
use tool_fill_form::FormFiller;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::errors::AppError;

/// Components wired from one [`AppConfig`]
pub struct Pipeline {
    config: AppConfig,
    detector: Arc<PageStateDetector>,
    navigator: Arc<Navigator>,
    extractor: Arc<WorkItemExtractor>,
    form: Arc<FormFiller>,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let resolver: Arc<dyn ElementResolver> =
            Arc::new(DefaultElementResolver::new(config.wait));
        let detector = Arc::new(PageStateDetector::new(
            config.detector.clone(),
            resolver.clone(),
            config.wait,
        ));
        let navigator = Arc::new(Navigator::new(
            config.navigator.clone(),
            resolver.clone(),
            detector.clone(),
        ));
        let extractor = Arc::new(WorkItemExtractor::new(
            config.extractor.clone(),
            resolver.clone(),
            detector.clone(),
        ));
        let form = FormFiller::builder(config.form.clone())
            .with_resolver(resolver)
            .with_settings(config.wait)
            .build()
            .map_err(|err| AppError::Config(err.to_string()))?;

        Ok(Self {
            config,
            detector,
            navigator,
            extractor,
            form: Arc::new(form),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Load the portal home page and wait for the first render
    pub async fn open_portal(&self, session: &dyn BrowserSession) -> Result<(), AppError> {
        navigate_and_settle(
            session,
            &self.config.portal.home_url,
            self.config.portal.initial_settle(),
        )
        .await?;
        Ok(())
    }

    /// Login gate. `Unknown` passes only when `assume_authenticated` is set.
    pub async fn check_login(
        &self,
        session: &dyn BrowserSession,
        assume_authenticated: bool,
    ) -> Result<PageState, AppError> {
        let state = self.detector.detect_authentication(session).await;
        match state {
            PageState::Authenticated => {
                info!("Login confirmed");
                Ok(state)
            }
            PageState::Unknown if assume_authenticated => {
                warn!("Login state unknown, continuing as requested");
                Ok(state)
            }
            _ => Err(AppError::NotAuthenticated { state }),
        }
    }

    /// Enter the list view and extract the pending queue once
    pub async fn list_queue(&self, session: &dyn BrowserSession) -> Result<Vec<WorkItem>, AppError> {
        self.navigator.enter_list_view(session).await?;
        Ok(self.extractor.extract(session).await?)
    }

    /// Enter the list view and run the batch to a terminal status
    pub async fn run_batch(&self, session: &dyn BrowserSession) -> Result<BatchReport, AppError> {
        self.navigator.enter_list_view(session).await?;

        let orchestrator = BatchOrchestrator::new(
            self.config.batch.clone(),
            self.extractor.clone(),
            self.navigator.clone(),
            self.form.clone(),
            Arc::new(DefaultRecoveryHandler::new()),
        );
        Ok(orchestrator.run(session).await)
    }

    /// Full unattended run: portal, login gate, batch
    pub async fn run(
        &self,
        session: &dyn BrowserSession,
        assume_authenticated: bool,
    ) -> Result<BatchReport, AppError> {
        self.open_portal(session).await?;
        self.check_login(session, assume_authenticated).await?;
        self.run_batch(session).await
    }
}
