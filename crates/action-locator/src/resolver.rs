//! Element resolver with ordered fallback chain

use crate::{errors::LocatorError, types::*};
use action_primitives::{
    poll_until, satisfies, ActionError, BrowserSession, Element, PresenceCondition, Query,
    SearchRoot, WaitSettings,
};
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Element resolver trait
#[async_trait]
pub trait ElementResolver: Send + Sync {
    /// Resolve the first candidate that satisfies `condition` within `timeout`.
    ///
    /// Candidates are tried strictly in order and each one gets the full
    /// timeout. Fails with [`LocatorError::Exhausted`] when none matched.
    async fn resolve(
        &self,
        session: &dyn BrowserSession,
        root: SearchRoot<'_>,
        candidates: &CandidateSet,
        condition: PresenceCondition,
        timeout: Duration,
    ) -> Result<Resolution, LocatorError>;

    /// Zero-wait existence check over the same chain
    async fn resolve_now(
        &self,
        session: &dyn BrowserSession,
        root: SearchRoot<'_>,
        candidates: &CandidateSet,
        condition: PresenceCondition,
    ) -> Result<Resolution, LocatorError> {
        self.resolve(session, root, candidates, condition, Duration::ZERO)
            .await
    }
}

/// Default element resolver implementation
#[derive(Debug, Clone, Default)]
pub struct DefaultElementResolver {
    settings: WaitSettings,
}

impl DefaultElementResolver {
    pub fn new(settings: WaitSettings) -> Self {
        Self { settings }
    }

    /// Wait for one candidate. Invalid queries fail immediately instead of
    /// burning the timeout.
    async fn attempt(
        &self,
        session: &dyn BrowserSession,
        root: SearchRoot<'_>,
        query: &Query,
        condition: PresenceCondition,
        timeout: Duration,
    ) -> Result<Element, NotFound> {
        let hit = poll_until(timeout, self.settings.poll_interval(), move || async move {
            match root.find_all(session, query).await {
                Ok(elements) => {
                    for element in elements {
                        if satisfies(&element, condition).await.unwrap_or(false) {
                            return Some(Ok(element));
                        }
                    }
                    None
                }
                Err(ActionError::InvalidQuery(reason)) => Some(Err(reason)),
                Err(err) => {
                    trace!(query = %query, error = %err, "Lookup failed, polling again");
                    None
                }
            }
        })
        .await;

        match hit {
            Some(Ok(element)) => Ok(element),
            Some(Err(reason)) => Err(NotFound {
                query: query.clone(),
                reason,
                invalid: true,
            }),
            None => Err(NotFound {
                query: query.clone(),
                reason: format!("not {} after {}ms", condition, timeout.as_millis()),
                invalid: false,
            }),
        }
    }
}

#[async_trait]
impl ElementResolver for DefaultElementResolver {
    async fn resolve(
        &self,
        session: &dyn BrowserSession,
        root: SearchRoot<'_>,
        candidates: &CandidateSet,
        condition: PresenceCondition,
        timeout: Duration,
    ) -> Result<Resolution, LocatorError> {
        if candidates.is_empty() {
            return Err(LocatorError::EmptyCandidates(candidates.name.clone()));
        }

        let start_instant = Instant::now();
        let mut misses: Vec<NotFound> = Vec::with_capacity(candidates.len());

        for (index, query) in candidates.iter().enumerate() {
            match self.attempt(session, root, query, condition, timeout).await {
                Ok(element) => {
                    debug!(
                        set = %candidates.name,
                        candidate = %query,
                        index,
                        root = %root.describe(),
                        "Resolved element"
                    );
                    return Ok(Resolution {
                        element,
                        query: query.clone(),
                        index,
                        elapsed_ms: start_instant.elapsed().as_millis() as u64,
                    });
                }
                Err(miss) if miss.invalid => {
                    warn!(set = %candidates.name, candidate = %query, "Skipping invalid candidate");
                    misses.push(miss);
                }
                Err(miss) => {
                    trace!(set = %candidates.name, miss = %miss, "Candidate missed");
                    misses.push(miss);
                }
            }
        }

        if misses.iter().all(|miss| miss.invalid) {
            return Err(LocatorError::InvalidQuery {
                set: candidates.name.clone(),
                reason: misses
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            });
        }

        debug!(
            set = %candidates.name,
            tried = misses.len(),
            condition = %condition,
            "All candidates exhausted"
        );
        Err(LocatorError::Exhausted {
            set: candidates.name.clone(),
            candidates: candidates.describe(),
            condition: condition.name().to_string(),
            timeout_ms: timeout.as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_primitives::testing::{FakeDom, NodeSpec};

    fn resolver() -> DefaultElementResolver {
        DefaultElementResolver::new(WaitSettings { poll_interval_ms: 5 })
    }

    #[tokio::test]
    async fn first_matching_candidate_wins_in_order() {
        let dom = FakeDom::new("https://portal.test");
        let b = dom.append(dom.root(), NodeSpec::new("div").label(Query::css("#b")));
        dom.append(dom.root(), NodeSpec::new("div").label(Query::css("#c")));
        let set = CandidateSet::new(
            "abc",
            [Query::css("#a"), Query::css("#b"), Query::css("#c")],
        );

        let resolution = resolver()
            .resolve(
                &dom,
                SearchRoot::Document,
                &set,
                PresenceCondition::Present,
                Duration::from_millis(20),
            )
            .await
            .unwrap();

        assert_eq!(resolution.index, 1);
        assert_eq!(resolution.query, Query::css("#b"));
        assert!(!resolution.is_primary());
        assert_eq!(resolution.element.describe(), format!("<div#{}>", b));
    }

    #[tokio::test]
    async fn exhausted_reports_every_candidate() {
        let dom = FakeDom::new("https://portal.test");
        let set = CandidateSet::new("menu", [Query::css("#x"), Query::xpath("//y")]);

        let err = resolver()
            .resolve(
                &dom,
                SearchRoot::Document,
                &set,
                PresenceCondition::Visible,
                Duration::from_millis(10),
            )
            .await
            .unwrap_err();

        assert_eq!(
            err,
            LocatorError::Exhausted {
                set: "menu".into(),
                candidates: vec!["css:#x".into(), "xpath://y".into()],
                condition: "visible".into(),
                timeout_ms: 10,
            }
        );
    }

    #[tokio::test]
    async fn condition_filters_matches() {
        let dom = FakeDom::new("https://portal.test");
        dom.append(
            dom.root(),
            NodeSpec::new("a").label(Query::css("a.go")).hidden(),
        );
        let visible = dom.append(dom.root(), NodeSpec::new("a").label(Query::css("a.go")));
        let set = CandidateSet::new("go", [Query::css("a.go")]);

        let resolution = resolver()
            .resolve_now(&dom, SearchRoot::Document, &set, PresenceCondition::Visible)
            .await
            .unwrap();
        assert_eq!(resolution.element.describe(), format!("<a#{}>", visible));
    }

    #[tokio::test]
    async fn waits_for_late_elements() {
        let dom = FakeDom::new("https://portal.test");
        let late = dom.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            late.append(late.root(), NodeSpec::new("table").label(Query::css("table")));
        });
        let set = CandidateSet::new("table", [Query::css("table")]);

        let resolution = resolver()
            .resolve(
                &dom,
                SearchRoot::Document,
                &set,
                PresenceCondition::Present,
                Duration::from_millis(1_000),
            )
            .await
            .unwrap();
        assert!(resolution.elapsed_ms >= 20);
    }

    #[tokio::test]
    async fn scoped_root_limits_search() {
        let dom = FakeDom::new("https://portal.test");
        dom.append(dom.root(), NodeSpec::new("tr").label(Query::css("tr")));
        dom.append(dom.root(), NodeSpec::new("a").label(Query::xpath(".//a")));
        let set = CandidateSet::xpaths("action", [".//a"]);

        let row = dom.find(&Query::css("tr")).await.unwrap().unwrap();
        let err = resolver()
            .resolve_now(&dom, SearchRoot::Element(&row), &set, PresenceCondition::Present)
            .await
            .unwrap_err();
        assert!(matches!(err, LocatorError::Exhausted { .. }));
    }

    #[tokio::test]
    async fn empty_and_invalid_sets() {
        let dom = FakeDom::new("https://portal.test");
        let empty = CandidateSet::new("nothing", Vec::<Query>::new());
        assert_eq!(
            resolver()
                .resolve_now(&dom, SearchRoot::Document, &empty, PresenceCondition::Present)
                .await
                .unwrap_err(),
            LocatorError::EmptyCandidates("nothing".into())
        );

        let invalid = CandidateSet::new("blank", [Query::css("  ")]);
        assert!(matches!(
            resolver()
                .resolve(
                    &dom,
                    SearchRoot::Document,
                    &invalid,
                    PresenceCondition::Present,
                    Duration::from_secs(5),
                )
                .await,
            Err(LocatorError::InvalidQuery { .. })
        ));
    }
}
