//! Wait primitive - Condition checks and URL waits

use crate::{
    errors::ActionError,
    session::{BrowserSession, Element},
    types::PresenceCondition,
    waiting::poll_until,
};
use std::time::Duration;
use tracing::debug;

/// Check whether `element` currently satisfies `condition`
pub async fn satisfies(element: &Element, condition: PresenceCondition) -> Result<bool, ActionError> {
    match condition {
        PresenceCondition::Present => Ok(true),
        PresenceCondition::Visible => element.is_visible().await,
        PresenceCondition::Clickable => {
            Ok(element.is_visible().await? && element.is_enabled().await?)
        }
    }
}

/// URL keyword test: any `includes` keyword present and no `excludes`
/// keyword present, compared case-insensitively.
pub fn url_matches(url: &str, includes: &[String], excludes: &[String]) -> bool {
    let url = url.to_lowercase();
    let included = includes
        .iter()
        .any(|keyword| url.contains(&keyword.to_lowercase()));
    let excluded = excludes
        .iter()
        .any(|keyword| url.contains(&keyword.to_lowercase()));
    included && !excluded
}

/// Poll the current URL until it passes [`url_matches`].
///
/// Returns the matching URL, or `None` once `timeout` elapsed.
pub async fn wait_for_url(
    session: &dyn BrowserSession,
    includes: &[String],
    excludes: &[String],
    timeout: Duration,
    interval: Duration,
) -> Option<String> {
    if includes.is_empty() {
        return None;
    }
    debug!(?includes, ?excludes, timeout_ms = timeout.as_millis() as u64, "Waiting for URL");
    poll_until(timeout, interval, move || async move {
        match session.current_url().await {
            Ok(url) if url_matches(&url, includes, excludes) => Some(url),
            _ => None,
        }
    })
    .await
}
