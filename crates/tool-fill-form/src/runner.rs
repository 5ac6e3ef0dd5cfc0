use tracing::{debug, info, warn};

use action_primitives::{
    activate, fill_text, force_enable, settle, wait_for_url, ActivationMethod, BrowserSession,
    Element, PresenceCondition, SearchRoot,
};

use crate::api::FormFiller;
use crate::errors::FormError;
use crate::model::{FillReport, FormStep};

impl FormFiller {
    pub(crate) async fn run(&self, session: &dyn BrowserSession) -> Result<FillReport, FormError> {
        info!("Filling detail form");

        self.wait_for_form(session).await?;
        let (questions, answered) = self.answer_questions(session).await;
        self.fill_comment(session).await?;
        let (submit_forced, activation) = self.submit(session).await?;
        let confirmed = self.confirm_return(session).await;

        Ok(FillReport {
            questions,
            answered,
            submit_forced,
            activation,
            confirmed,
        })
    }

    async fn wait_for_form(&self, session: &dyn BrowserSession) -> Result<(), FormError> {
        let resolution = self
            .resolver
            .resolve(
                session,
                SearchRoot::Document,
                &self.config.form_root,
                PresenceCondition::Present,
                self.config.timeouts.form(),
            )
            .await
            .map_err(|err| FormError::at(FormStep::FormRoot, err))?;
        debug!(candidate = %resolution.query, "Form root present");
        Ok(())
    }

    async fn question_groups(&self, session: &dyn BrowserSession) -> Vec<Element> {
        for query in self.config.question_groups.iter() {
            match SearchRoot::Document.find_all(session, query).await {
                Ok(groups) if !groups.is_empty() => return groups,
                Ok(_) => {}
                Err(err) => debug!(query = %query, error = %err, "Question group query failed"),
            }
        }
        Vec::new()
    }

    /// Answer every group; returns (groups found, groups answered)
    async fn answer_questions(&self, session: &dyn BrowserSession) -> (usize, usize) {
        let groups = self.question_groups(session).await;
        let total = groups.len();
        if total == 0 {
            warn!("No question groups found in the form");
            return (0, 0);
        }
        info!(questions = total, "Answering questions");

        let mut answered = 0usize;
        for (index, group) in groups.iter().enumerate() {
            let choices = self.policy.choices_for(group).await;
            let outcome = match self
                .resolver
                .resolve_now(session, SearchRoot::Element(group), &choices, PresenceCondition::Present)
                .await
            {
                Ok(resolution) => activate(&resolution.element)
                    .await
                    .map_err(|err| err.to_string()),
                Err(err) => Err(err.to_string()),
            };

            match outcome {
                Ok(report) => {
                    answered += 1;
                    debug!(question = index + 1, method = ?report.method, "Answered");
                    settle(self.config.timeouts.answer_pause()).await;
                }
                Err(reason) => {
                    warn!(question = index + 1, reason = %reason, "Question could not be answered, skipping");
                }
            }
        }

        info!("{} of {} filled", answered, total);
        (total, answered)
    }

    async fn fill_comment(&self, session: &dyn BrowserSession) -> Result<(), FormError> {
        let field = self
            .resolver
            .resolve(
                session,
                SearchRoot::Document,
                &self.config.comment_field,
                PresenceCondition::Present,
                self.config.timeouts.element(),
            )
            .await
            .map_err(|err| FormError::at(FormStep::Comment, err))?
            .element;
        fill_text(&field, &self.config.comment_text)
            .await
            .map_err(|err| FormError::at(FormStep::Comment, err))?;
        info!(text = %self.config.comment_text, "Free-text field filled");
        Ok(())
    }

    async fn submit(
        &self,
        session: &dyn BrowserSession,
    ) -> Result<(bool, ActivationMethod), FormError> {
        let control = self
            .resolver
            .resolve(
                session,
                SearchRoot::Document,
                &self.config.submit,
                PresenceCondition::Present,
                self.config.timeouts.element(),
            )
            .await
            .map_err(|err| FormError::at(FormStep::Submit, err))?
            .element;

        let forced = force_enable(&control, &self.config.disabled_attribute)
            .await
            .map_err(|err| FormError::at(FormStep::Submit, err))?;
        let report = activate(&control)
            .await
            .map_err(|err| FormError::at(FormStep::Submit, err))?;
        info!(method = ?report.method, forced, "Submit control activated");
        Ok((forced, report.method))
    }

    /// Best-effort: the submission already happened, so a missing
    /// confirmation is only logged.
    async fn confirm_return(&self, session: &dyn BrowserSession) -> bool {
        let signals = &self.config.return_signals;
        let timeout = self.config.timeouts.confirm();

        if !signals.url_keywords.is_empty() {
            if let Some(url) = wait_for_url(
                session,
                &signals.url_keywords,
                &signals.url_excludes,
                timeout,
                self.settings.poll_interval(),
            )
            .await
            {
                info!(url = %url, "Returned to the list view");
                return true;
            }
        }

        if !signals.list_container.is_empty()
            && self
                .resolver
                .resolve(
                    session,
                    SearchRoot::Document,
                    &signals.list_container,
                    PresenceCondition::Present,
                    timeout,
                )
                .await
                .is_ok()
        {
            info!("List container reappeared");
            return true;
        }

        warn!("Return to the list view not confirmed, continuing");
        false
    }
}
