//! Recovery strategies after a failed item

use crate::navigator::Navigation;
use crate::types::RecoveryOutcome;
use action_primitives::BrowserSession;
use async_trait::async_trait;
use tracing::{error, info, warn};

/// Brings the session back to the list view after an item failed
#[async_trait]
pub trait RecoveryHandler: Send + Sync {
    async fn recover(
        &self,
        session: &dyn BrowserSession,
        navigator: &dyn Navigation,
    ) -> RecoveryOutcome;
}

/// One history step back, then a full re-navigation, then give up.
///
/// Giving up only ends the current iteration; the next extraction decides
/// whether the batch can continue.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRecoveryHandler;

impl DefaultRecoveryHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RecoveryHandler for DefaultRecoveryHandler {
    async fn recover(
        &self,
        session: &dyn BrowserSession,
        navigator: &dyn Navigation,
    ) -> RecoveryOutcome {
        let back_error = match navigator.go_back(session).await {
            Ok(()) => {
                info!("Recovered by going back");
                return RecoveryOutcome::WentBack;
            }
            Err(err) => err,
        };

        warn!(error = %back_error, "Back navigation failed, re-navigating to the list view");
        match navigator.renavigate_to_list(session).await {
            Ok(()) => {
                info!("Recovered by re-navigation");
                RecoveryOutcome::Renavigated
            }
            Err(err) => {
                error!(error = %err, "Recovery failed");
                RecoveryOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{NavigationError, NavigationStage};
    use action_primitives::testing::FakeDom;
    use action_primitives::Element;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct ScriptedNavigation {
        back_ok: bool,
        renavigate_ok: bool,
        backs: AtomicU32,
        renavigations: AtomicU32,
    }

    #[async_trait]
    impl Navigation for ScriptedNavigation {
        async fn enter_list_view(&self, _: &dyn BrowserSession) -> Result<(), NavigationError> {
            Ok(())
        }

        async fn open_detail(
            &self,
            _: &dyn BrowserSession,
            _: &Element,
        ) -> Result<(), NavigationError> {
            Ok(())
        }

        async fn go_back(&self, _: &dyn BrowserSession) -> Result<(), NavigationError> {
            self.backs.fetch_add(1, Ordering::SeqCst);
            if self.back_ok {
                Ok(())
            } else {
                Err(NavigationError::failed(NavigationStage::Back, Vec::new(), "refused"))
            }
        }

        async fn renavigate_to_list(
            &self,
            _: &dyn BrowserSession,
        ) -> Result<(), NavigationError> {
            self.renavigations.fetch_add(1, Ordering::SeqCst);
            if self.renavigate_ok {
                Ok(())
            } else {
                Err(NavigationError::failed(
                    NavigationStage::Renavigate,
                    Vec::new(),
                    "menu missing",
                ))
            }
        }
    }

    #[tokio::test]
    async fn back_is_tried_first() {
        let dom = FakeDom::new("https://portal.test/detail");
        let nav = ScriptedNavigation {
            back_ok: true,
            ..Default::default()
        };

        let outcome = DefaultRecoveryHandler::new().recover(&dom, &nav).await;
        assert_eq!(outcome, RecoveryOutcome::WentBack);
        assert_eq!(nav.renavigations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn renavigates_when_back_fails() {
        let dom = FakeDom::new("https://portal.test/detail");
        let nav = ScriptedNavigation {
            renavigate_ok: true,
            ..Default::default()
        };

        let outcome = DefaultRecoveryHandler::new().recover(&dom, &nav).await;
        assert_eq!(outcome, RecoveryOutcome::Renavigated);
        assert_eq!(nav.backs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_both_fail() {
        let dom = FakeDom::new("https://portal.test/detail");
        let nav = ScriptedNavigation::default();

        let outcome = DefaultRecoveryHandler::new().recover(&dom, &nav).await;
        assert_eq!(outcome, RecoveryOutcome::Failed);
        assert_eq!(nav.renavigations.load(Ordering::SeqCst), 1);
    }
}
