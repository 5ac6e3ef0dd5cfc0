//! Click primitive - Activate element with synthetic fallback

use crate::{
    errors::ActionError,
    session::Element,
    types::{ActivationMethod, ActivationReport},
};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Activate an element.
///
/// A native click is tried first. When the browser rejects it (overlay,
/// occlusion, interception) the element is activated through a script-level
/// click instead. Both failing is reported as `NotInteractable`.
pub async fn activate(element: &Element) -> Result<ActivationReport, ActionError> {
    let start_instant = Instant::now();
    let target = element.describe();

    debug!(target = %target, "Activating element");

    let direct_error = match element.click().await {
        Ok(()) => {
            return Ok(ActivationReport {
                method: ActivationMethod::Direct,
                direct_error: None,
                latency_ms: start_instant.elapsed().as_millis() as u64,
            });
        }
        Err(err) => err,
    };

    warn!(target = %target, error = %direct_error, "Direct click rejected, using synthetic activation");

    match element.synthetic_click().await {
        Ok(()) => {
            let latency_ms = start_instant.elapsed().as_millis() as u64;
            info!(target = %target, latency_ms, "Synthetic activation succeeded");
            Ok(ActivationReport {
                method: ActivationMethod::Synthetic,
                direct_error: Some(direct_error.to_string()),
                latency_ms,
            })
        }
        Err(ActionError::StaleElement(reason)) => Err(ActionError::StaleElement(reason)),
        Err(synthetic_error) => Err(ActionError::NotInteractable(format!(
            "{}: direct click failed ({}), synthetic click failed ({})",
            target, direct_error, synthetic_error
        ))),
    }
}

/// Remove `attribute` (typically `disabled`) when present.
///
/// Returns whether the attribute had to be removed.
pub async fn force_enable(element: &Element, attribute: &str) -> Result<bool, ActionError> {
    match element.attribute(attribute).await? {
        Some(_) => {
            info!(
                target = %element.describe(),
                attribute,
                "Control is gated, removing attribute"
            );
            element.remove_attribute(attribute).await?;
            Ok(true)
        }
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeDom, NodeSpec};
    use crate::{BrowserSession, Query};

    #[tokio::test]
    async fn direct_click_preferred() {
        let dom = FakeDom::new("https://portal.test/home");
        let button = dom.append(dom.root(), NodeSpec::new("a").label(Query::css("#go")));
        let element = dom.find(&Query::css("#go")).await.unwrap().unwrap();

        let report = activate(&element).await.unwrap();
        assert_eq!(report.method, ActivationMethod::Direct);
        assert!(report.direct_error.is_none());
        assert_eq!(dom.direct_clicks(button), 1);
        assert_eq!(dom.synthetic_clicks(button), 0);
    }

    #[tokio::test]
    async fn occluded_element_falls_back_to_synthetic() {
        let dom = FakeDom::new("https://portal.test/home");
        let button = dom.append(
            dom.root(),
            NodeSpec::new("button").label(Query::css("#submit")).occluded(),
        );
        let element = dom.find(&Query::css("#submit")).await.unwrap().unwrap();

        let report = activate(&element).await.unwrap();
        assert_eq!(report.method, ActivationMethod::Synthetic);
        assert!(report.direct_error.is_some());
        assert_eq!(dom.synthetic_clicks(button), 1);
    }

    #[tokio::test]
    async fn stale_element_is_reported_as_stale() {
        let dom = FakeDom::new("https://portal.test/home");
        let button = dom.append(dom.root(), NodeSpec::new("a").label(Query::css("#go")));
        let element = dom.find(&Query::css("#go")).await.unwrap().unwrap();
        dom.remove(button);

        let err = activate(&element).await.unwrap_err();
        assert!(matches!(err, ActionError::StaleElement(_)));
    }

    #[tokio::test]
    async fn force_enable_strips_disabled() {
        let dom = FakeDom::new("https://portal.test/form");
        let submit = dom.append(
            dom.root(),
            NodeSpec::new("button").label(Query::css("#postTrigger")).disabled(),
        );
        let element = dom.find(&Query::css("#postTrigger")).await.unwrap().unwrap();

        assert!(!element.is_enabled().await.unwrap());
        assert!(force_enable(&element, "disabled").await.unwrap());
        assert!(element.is_enabled().await.unwrap());
        assert!(!force_enable(&element, "disabled").await.unwrap());
        assert!(dom.attribute_of(submit, "disabled").is_none());
    }
}
