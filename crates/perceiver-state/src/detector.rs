//! Tiered page state detection

use crate::{
    config::{DetectorConfig, ViewSignals},
    errors::DetectorError,
    models::{ArrivalSignal, PageDiagnostics, PageState, View},
};
use action_locator::{CandidateSet, ElementResolver};
use action_primitives::{
    poll_until, url_matches, wait_for_url, BrowserSession, PresenceCondition, SearchRoot,
    WaitSettings,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Page state detection operations
#[async_trait]
pub trait StateDetector: Send + Sync {
    /// Authentication check: strong signals with a short wait, then
    /// login-page signals without waiting, then `Unknown` with a logged
    /// diagnostic snapshot.
    async fn detect_authentication(&self, session: &dyn BrowserSession) -> PageState;

    /// Full zero-wait classification of the current page
    async fn detect(&self, session: &dyn BrowserSession) -> PageState;

    /// Whether the completion banner is displayed
    async fn is_queue_exhausted(&self, session: &dyn BrowserSession) -> bool;

    /// Wait until `view` is displayed: URL keywords first, structural
    /// indicators second.
    async fn await_view(
        &self,
        session: &dyn BrowserSession,
        view: View,
        timeout: Duration,
    ) -> Result<ArrivalSignal, DetectorError>;

    /// Troubleshooting snapshot of the current page
    async fn snapshot(&self, session: &dyn BrowserSession) -> PageDiagnostics;
}

/// Default detector driven by a [`DetectorConfig`]
pub struct PageStateDetector {
    config: DetectorConfig,
    resolver: Arc<dyn ElementResolver>,
    settings: WaitSettings,
}

impl PageStateDetector {
    pub fn new(
        config: DetectorConfig,
        resolver: Arc<dyn ElementResolver>,
        settings: WaitSettings,
    ) -> Self {
        Self {
            config,
            resolver,
            settings,
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    fn signals(&self, view: View) -> &ViewSignals {
        match view {
            View::List => &self.config.list_view,
            View::Detail => &self.config.detail_view,
        }
    }

    async fn any_visible(&self, session: &dyn BrowserSession, set: &CandidateSet) -> bool {
        if set.is_empty() {
            return false;
        }
        match self
            .resolver
            .resolve_now(session, SearchRoot::Document, set, PresenceCondition::Visible)
            .await
        {
            Ok(resolution) => {
                debug!(set = %set.name, candidate = %resolution.query, "Signal present");
                true
            }
            Err(_) => false,
        }
    }

    /// Zero-wait check of both tiers of a view
    async fn shows(&self, session: &dyn BrowserSession, signals: &ViewSignals) -> bool {
        if let Ok(url) = session.current_url().await {
            if url_matches(&url, &signals.url_keywords, &signals.url_excludes) {
                return true;
            }
        }
        if signals.indicators.is_empty() {
            return false;
        }
        self.resolver
            .resolve_now(
                session,
                SearchRoot::Document,
                &signals.indicators,
                PresenceCondition::Present,
            )
            .await
            .is_ok()
    }
}

#[async_trait]
impl StateDetector for PageStateDetector {
    async fn detect_authentication(&self, session: &dyn BrowserSession) -> PageState {
        info!("Verifying login state");

        if !self.config.login_success.is_empty() {
            if let Ok(resolution) = self
                .resolver
                .resolve(
                    session,
                    SearchRoot::Document,
                    &self.config.login_success,
                    PresenceCondition::Visible,
                    self.config.signal_timeout(),
                )
                .await
            {
                info!(indicator = %resolution.query, "Login indicator found");
                return PageState::Authenticated;
            }
        }

        let diagnostics = self.snapshot(session).await;
        if self.any_visible(session, &self.config.login_page).await {
            warn!(%diagnostics, "Login page detected, the session is not authenticated");
            return PageState::Unauthenticated;
        }

        warn!(
            %diagnostics,
            "Neither login indicators nor login page found; network delay or changed page structure"
        );
        PageState::Unknown
    }

    async fn detect(&self, session: &dyn BrowserSession) -> PageState {
        let state = if self.shows(session, &self.config.detail_view).await {
            PageState::DetailView
        } else if self.is_queue_exhausted(session).await {
            PageState::QueueExhausted
        } else if self.shows(session, &self.config.list_view).await {
            PageState::ListView
        } else if self.any_visible(session, &self.config.login_success).await {
            PageState::Authenticated
        } else if self.any_visible(session, &self.config.login_page).await {
            PageState::Unauthenticated
        } else {
            let diagnostics = self.snapshot(session).await;
            warn!(%diagnostics, "Page state could not be classified");
            PageState::Unknown
        };
        debug!(state = %state, "Detected page state");
        state
    }

    async fn is_queue_exhausted(&self, session: &dyn BrowserSession) -> bool {
        self.any_visible(session, &self.config.queue_exhausted).await
    }

    async fn await_view(
        &self,
        session: &dyn BrowserSession,
        view: View,
        timeout: Duration,
    ) -> Result<ArrivalSignal, DetectorError> {
        let signals = self.signals(view);
        if signals.is_empty() {
            return Err(DetectorError::NoSignals(view.to_string()));
        }

        // One deadline for both tiers; the URL gets half when indicators can back it up
        let deadline = Instant::now() + timeout;
        let url_budget = if signals.indicators.is_empty() {
            timeout
        } else {
            timeout / 2
        };
        if let Some(url) = wait_for_url(
            session,
            &signals.url_keywords,
            &signals.url_excludes,
            url_budget,
            self.settings.poll_interval(),
        )
        .await
        {
            info!(view = %view, url = %url, "Arrival confirmed by URL");
            return Ok(ArrivalSignal::Url(url));
        }

        if !signals.indicators.is_empty() {
            if !signals.url_keywords.is_empty() {
                debug!(view = %view, "URL lacks expected keywords, checking page indicators");
            }
            let resolver = &self.resolver;
            let indicators = &signals.indicators;
            let remaining = deadline.saturating_duration_since(Instant::now());
            let found = poll_until(remaining, self.settings.poll_interval(), move || async move {
                resolver
                    .resolve_now(session, SearchRoot::Document, indicators, PresenceCondition::Present)
                    .await
                    .ok()
            })
            .await;
            if let Some(resolution) = found {
                info!(view = %view, indicator = %resolution.query, "Arrival confirmed by indicator");
                return Ok(ArrivalSignal::Indicator(resolution.query.to_string()));
            }
        }

        let url = session
            .current_url()
            .await
            .unwrap_or_else(|err| format!("<unavailable: {}>", err));
        Err(DetectorError::ArrivalTimeout {
            view: view.to_string(),
            url,
            timeout_ms: timeout.as_millis() as u64,
        })
    }

    async fn snapshot(&self, session: &dyn BrowserSession) -> PageDiagnostics {
        let url = session
            .current_url()
            .await
            .unwrap_or_else(|err| format!("<unavailable: {}>", err));
        let title = session
            .title()
            .await
            .unwrap_or_else(|err| format!("<unavailable: {}>", err));

        let mut interactive = Vec::new();
        'sample: for query in self.config.interactive_sample.iter() {
            let Ok(elements) = session.find_all(query).await else {
                continue;
            };
            for element in elements {
                let Ok(text) = element.text().await else {
                    continue;
                };
                let text = text.trim();
                if text.is_empty() || text.chars().count() >= self.config.max_label_chars {
                    continue;
                }
                interactive.push(text.to_string());
                if interactive.len() >= self.config.sample_limit {
                    break 'sample;
                }
            }
        }

        PageDiagnostics {
            url,
            title,
            interactive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_locator::DefaultElementResolver;
    use action_primitives::testing::{FakeDom, NodeSpec};
    use action_primitives::Query;

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn config() -> DetectorConfig {
        DetectorConfig {
            login_success: CandidateSet::new(
                "login_success",
                [Query::css("#navAccountLink"), Query::css("a.logout")],
            ),
            login_page: CandidateSet::new(
                "login_page",
                [Query::css("#username"), Query::css("input[type=password]")],
            ),
            queue_exhausted: CandidateSet::new("queue_exhausted", [Query::css(".systemNotice")]),
            list_view: ViewSignals {
                url_keywords: words(&["evaluate"]),
                url_excludes: words(&["evaluateresponse"]),
                indicators: CandidateSet::new("list_view", [Query::css("#Questionnaire")]),
            },
            detail_view: ViewSignals {
                url_keywords: words(&["evaluateResponse"]),
                url_excludes: Vec::new(),
                indicators: CandidateSet::new("detail_view", [Query::css("#sheetTable")]),
            },
            interactive_sample: CandidateSet::new("interactive", [Query::css("a")]),
            signal_timeout_ms: 20,
            sample_limit: 2,
            max_label_chars: 20,
        }
    }

    fn detector() -> PageStateDetector {
        PageStateDetector::new(
            config(),
            Arc::new(DefaultElementResolver::new(WaitSettings { poll_interval_ms: 5 })),
            WaitSettings { poll_interval_ms: 5 },
        )
    }

    #[tokio::test]
    async fn authenticated_when_strong_signal_visible() {
        let dom = FakeDom::new("https://portal.test/home");
        dom.append(dom.root(), NodeSpec::new("a").label(Query::css("a.logout")));
        assert_eq!(
            detector().detect_authentication(&dom).await,
            PageState::Authenticated
        );
    }

    #[tokio::test]
    async fn hidden_strong_signal_does_not_count() {
        let dom = FakeDom::new("https://portal.test/home");
        dom.append(
            dom.root(),
            NodeSpec::new("a").label(Query::css("#navAccountLink")).hidden(),
        );
        dom.append(dom.root(), NodeSpec::new("input").label(Query::css("#username")));
        assert_eq!(
            detector().detect_authentication(&dom).await,
            PageState::Unauthenticated
        );
    }

    #[tokio::test]
    async fn unknown_when_no_signal() {
        let dom = FakeDom::new("https://portal.test/maintenance");
        assert_eq!(detector().detect_authentication(&dom).await, PageState::Unknown);
    }

    #[tokio::test]
    async fn snapshot_is_bounded_and_skips_long_labels() {
        let dom = FakeDom::new("https://portal.test/maintenance");
        dom.set_title("Down for maintenance");
        dom.append(dom.root(), NodeSpec::new("a").label(Query::css("a")).text("Home"));
        dom.append(
            dom.root(),
            NodeSpec::new("a")
                .label(Query::css("a"))
                .text("A very long link label that is noise"),
        );
        dom.append(dom.root(), NodeSpec::new("a").label(Query::css("a")));
        dom.append(dom.root(), NodeSpec::new("a").label(Query::css("a")).text("Help"));
        dom.append(dom.root(), NodeSpec::new("a").label(Query::css("a")).text("Status"));

        let diagnostics = detector().snapshot(&dom).await;
        assert_eq!(diagnostics.url, "https://portal.test/maintenance");
        assert_eq!(diagnostics.title, "Down for maintenance");
        assert_eq!(diagnostics.interactive, vec!["Home", "Help"]);
    }

    #[tokio::test]
    async fn detect_prefers_detail_then_exhaustion_then_list() {
        let dom = FakeDom::new("https://portal.test/index.cfm?event=evaluate");
        dom.append(dom.root(), NodeSpec::new("a").label(Query::css("a.logout")));
        let detector = detector();
        assert_eq!(detector.detect(&dom).await, PageState::ListView);

        let banner = dom.append(dom.root(), NodeSpec::new("div").label(Query::css(".systemNotice")));
        assert_eq!(detector.detect(&dom).await, PageState::QueueExhausted);

        dom.set_url("https://portal.test/index.cfm?event=evaluateResponse");
        assert_eq!(detector.detect(&dom).await, PageState::DetailView);

        dom.remove(banner);
        dom.set_url("https://portal.test/home");
        assert_eq!(detector.detect(&dom).await, PageState::Authenticated);
    }

    #[tokio::test]
    async fn await_view_by_url() {
        let dom = FakeDom::new("https://portal.test/home");
        let later = dom.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            later.set_url("https://portal.test/index.cfm?event=evaluateResponse:DEFAULT");
        });
        let signal = detector()
            .await_view(&dom, View::Detail, Duration::from_millis(500))
            .await
            .unwrap();
        assert!(matches!(signal, ArrivalSignal::Url(url) if url.contains("evaluateResponse")));
    }

    #[tokio::test]
    async fn await_view_falls_back_to_indicators() {
        let dom = FakeDom::new("https://portal.test/index.cfm?event=portal");
        dom.append(dom.root(), NodeSpec::new("div").label(Query::css("#Questionnaire")));
        let signal = detector()
            .await_view(&dom, View::List, Duration::from_millis(30))
            .await
            .unwrap();
        assert_eq!(signal, ArrivalSignal::Indicator("css:#Questionnaire".into()));
    }

    #[tokio::test]
    async fn await_view_excluded_url_times_out() {
        let dom = FakeDom::new("https://portal.test/index.cfm?event=evaluateResponse");
        let err = detector()
            .await_view(&dom, View::List, Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, DetectorError::ArrivalTimeout { timeout_ms: 20, .. }));
    }

    #[tokio::test]
    async fn await_view_shares_one_deadline() {
        let mut config = config();
        config.detail_view.indicators = CandidateSet::new(
            "detail_view",
            [
                Query::css("#sheetTable"),
                Query::css("form[name=evaluate]"),
                Query::css("textarea.comment"),
            ],
        );
        let detector = PageStateDetector::new(
            config,
            Arc::new(DefaultElementResolver::new(WaitSettings { poll_interval_ms: 5 })),
            WaitSettings { poll_interval_ms: 5 },
        );
        let dom = FakeDom::new("https://portal.test/home");

        let started = Instant::now();
        let err = detector
            .await_view(&dom, View::Detail, Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, DetectorError::ArrivalTimeout { timeout_ms: 100, .. }));
        assert!(started.elapsed() < Duration::from_millis(250), "took {:?}", started.elapsed());
    }

    #[tokio::test]
    async fn await_view_sees_late_indicator() {
        let dom = FakeDom::new("https://portal.test/index.cfm?event=portal");
        let later = dom.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(40)).await;
            later.append(later.root(), NodeSpec::new("table").label(Query::css("#sheetTable")));
        });
        let signal = detector()
            .await_view(&dom, View::Detail, Duration::from_millis(300))
            .await
            .unwrap();
        assert_eq!(signal, ArrivalSignal::Indicator("css:#sheetTable".into()));
    }
}
