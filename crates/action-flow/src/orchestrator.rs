//! Batch orchestrator - the bounded per-item control loop
//!
//! Every iteration extracts the queue from scratch and works only on its
//! head item. The list re-renders after each submission, so nothing taken
//! from a previous extraction is trusted.

use crate::errors::FlowError;
use crate::navigator::Navigation;
use crate::strategies::RecoveryHandler;
use crate::types::{BatchConfig, BatchReport, BatchResult, BatchStatus, RecoveryOutcome};
use action_primitives::{settle, BrowserSession};
use chrono::Utc;
use queue_extractor::{WorkItem, WorkQueue};
use std::sync::Arc;
use tool_fill_form::{FillReport, FormSubmitter};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Drives extraction, navigation, form filling and recovery until the
/// queue drains or the iteration ceiling is hit
pub struct BatchOrchestrator {
    config: BatchConfig,
    queue: Arc<dyn WorkQueue>,
    navigator: Arc<dyn Navigation>,
    form: Arc<dyn FormSubmitter>,
    recovery: Arc<dyn RecoveryHandler>,
}

impl BatchOrchestrator {
    pub fn new(
        config: BatchConfig,
        queue: Arc<dyn WorkQueue>,
        navigator: Arc<dyn Navigation>,
        form: Arc<dyn FormSubmitter>,
        recovery: Arc<dyn RecoveryHandler>,
    ) -> Self {
        Self {
            config,
            queue,
            navigator,
            form,
            recovery,
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Run the batch to a terminal status. Item failures never abort it.
    pub async fn run(&self, session: &dyn BrowserSession) -> BatchReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let span = info_span!("batch", run_id = %run_id);

        let (result, status) = self.drive(session).instrument(span).await;

        BatchReport {
            run_id,
            result,
            status,
            started_at,
            finished_at: Utc::now(),
        }
    }

    async fn drive(&self, session: &dyn BrowserSession) -> (BatchResult, BatchStatus) {
        let mut result = BatchResult::default();
        info!(max_attempts = self.config.max_attempts, "Batch started");

        let status = loop {
            if result.attempts >= self.config.max_attempts {
                warn!(attempts = result.attempts, "Iteration ceiling reached");
                break BatchStatus::AttemptsExhausted;
            }

            let items = match self.queue.extract(session).await {
                Ok(items) => items,
                Err(err) => {
                    error!(error = %err, "Extraction failed, ending batch");
                    break BatchStatus::ExtractionFailed(err.to_string());
                }
            };
            let Some(head) = items.into_iter().next() else {
                info!("Queue drained");
                break BatchStatus::Drained;
            };

            result.attempts += 1;
            info!(
                attempt = result.attempts,
                subject = %head.subject_name,
                counterparty = %head.counterparty_name,
                "Processing item"
            );

            match self.process(session, &head).await {
                Ok(report) => {
                    result.succeeded += 1;
                    info!(
                        answered = report.answered,
                        questions = report.questions,
                        confirmed = report.confirmed,
                        "Item submitted"
                    );
                    settle(self.config.success_settle()).await;
                }
                Err(err) => {
                    result.failed += 1;
                    warn!(subject = %head.subject_name, error = %err, "Item failed");
                    if err.needs_recovery() {
                        let outcome = self.recovery.recover(session, self.navigator.as_ref()).await;
                        if outcome == RecoveryOutcome::Failed {
                            warn!("Continuing without recovery");
                        }
                    }
                }
            }
        };

        info!(
            succeeded = result.succeeded,
            failed = result.failed,
            attempts = result.attempts,
            status = %status,
            "Batch finished"
        );
        (result, status)
    }

    async fn process(
        &self,
        session: &dyn BrowserSession,
        item: &WorkItem,
    ) -> Result<FillReport, FlowError> {
        let control = self.queue.relocate_action(session, item).await?;
        self.navigator.open_detail(session, &control).await?;
        Ok(self.form.fill_and_submit(session).await?)
    }
}
