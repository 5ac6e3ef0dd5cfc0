//! Navigator - trigger, activate, confirm arrival

use crate::errors::{NavigationError, NavigationStage};
use action_locator::{CandidateSet, ElementResolver};
use action_primitives::{
    activate, go_back_and_settle, navigate_and_settle, settle, BrowserSession, Element,
    PresenceCondition, SearchRoot,
};
use async_trait::async_trait;
use perceiver_state::{StateDetector, View};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Navigation between the portal's views
#[async_trait]
pub trait Navigation: Send + Sync {
    /// From the home/menu state into the pending-items list
    async fn enter_list_view(&self, session: &dyn BrowserSession) -> Result<(), NavigationError>;

    /// Activate one item's action control and confirm the form opened
    async fn open_detail(
        &self,
        session: &dyn BrowserSession,
        control: &Element,
    ) -> Result<(), NavigationError>;

    /// Single history step back
    async fn go_back(&self, session: &dyn BrowserSession) -> Result<(), NavigationError>;

    /// Reload the portal and enter the list view again
    async fn renavigate_to_list(&self, session: &dyn BrowserSession)
        -> Result<(), NavigationError>;
}

/// Navigator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Menu entries leading to the list view, most specific first
    pub menu: CandidateSet,

    /// Portal landing page used by re-navigation
    pub home_url: Option<String>,

    /// Wait for the menu entry to become clickable (milliseconds)
    pub menu_timeout_ms: u64,

    /// Wait for arrival signals after activation (milliseconds)
    pub arrival_timeout_ms: u64,

    /// Settle delay after a history step (milliseconds)
    pub back_settle_ms: u64,

    /// Settle delay after loading the landing page (milliseconds)
    pub load_settle_ms: u64,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            menu: CandidateSet::new("menu", []),
            home_url: None,
            menu_timeout_ms: 10_000,
            arrival_timeout_ms: 10_000,
            back_settle_ms: 2_000,
            load_settle_ms: 3_000,
        }
    }
}

impl NavigatorConfig {
    pub fn menu_timeout(&self) -> Duration {
        Duration::from_millis(self.menu_timeout_ms)
    }

    pub fn arrival_timeout(&self) -> Duration {
        Duration::from_millis(self.arrival_timeout_ms)
    }

    pub fn back_settle(&self) -> Duration {
        Duration::from_millis(self.back_settle_ms)
    }

    pub fn load_settle(&self) -> Duration {
        Duration::from_millis(self.load_settle_ms)
    }
}

/// Default [`Navigation`] implementation
pub struct Navigator {
    config: NavigatorConfig,
    resolver: Arc<dyn ElementResolver>,
    detector: Arc<dyn StateDetector>,
}

impl Navigator {
    pub fn new(
        config: NavigatorConfig,
        resolver: Arc<dyn ElementResolver>,
        detector: Arc<dyn StateDetector>,
    ) -> Self {
        Self {
            config,
            resolver,
            detector,
        }
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    async fn confirm(
        &self,
        session: &dyn BrowserSession,
        view: View,
        stage: NavigationStage,
        attempted: Vec<String>,
    ) -> Result<(), NavigationError> {
        match self
            .detector
            .await_view(session, view, self.config.arrival_timeout())
            .await
        {
            Ok(signal) => {
                debug!(view = %view, signal = ?signal, "Arrived");
                Ok(())
            }
            Err(err) => Err(NavigationError::failed(stage, attempted, err)),
        }
    }
}

#[async_trait]
impl Navigation for Navigator {
    async fn enter_list_view(&self, session: &dyn BrowserSession) -> Result<(), NavigationError> {
        let attempted = self.config.menu.describe();
        let resolution = self
            .resolver
            .resolve(
                session,
                SearchRoot::Document,
                &self.config.menu,
                PresenceCondition::Clickable,
                self.config.menu_timeout(),
            )
            .await
            .map_err(|err| NavigationError::failed(NavigationStage::ListEntry, attempted.clone(), err))?;

        info!(candidate = %resolution.query, "Opening list view");
        activate(&resolution.element)
            .await
            .map_err(|err| NavigationError::failed(NavigationStage::ListEntry, attempted.clone(), err))?;

        self.confirm(session, View::List, NavigationStage::ListEntry, attempted)
            .await
    }

    async fn open_detail(
        &self,
        session: &dyn BrowserSession,
        control: &Element,
    ) -> Result<(), NavigationError> {
        let attempted = vec![control.describe()];
        debug!(control = %control.describe(), "Opening detail view");
        activate(control)
            .await
            .map_err(|err| NavigationError::failed(NavigationStage::DetailEntry, attempted.clone(), err))?;

        self.confirm(session, View::Detail, NavigationStage::DetailEntry, attempted)
            .await
    }

    async fn go_back(&self, session: &dyn BrowserSession) -> Result<(), NavigationError> {
        go_back_and_settle(session, self.config.back_settle())
            .await
            .map_err(|err| NavigationError::failed(NavigationStage::Back, Vec::new(), err))
    }

    async fn renavigate_to_list(
        &self,
        session: &dyn BrowserSession,
    ) -> Result<(), NavigationError> {
        match &self.config.home_url {
            Some(url) => navigate_and_settle(session, url, self.config.load_settle())
                .await
                .map_err(|err| {
                    NavigationError::failed(NavigationStage::Renavigate, vec![url.clone()], err)
                })?,
            None => {
                warn!("No home URL configured, re-entering list view from the current page");
                settle(self.config.load_settle()).await;
            }
        }

        self.enter_list_view(session).await.map_err(|err| match err {
            NavigationError::Failed {
                attempted, reason, ..
            } => NavigationError::Failed {
                stage: NavigationStage::Renavigate,
                attempted,
                reason,
            },
        })
    }
}
