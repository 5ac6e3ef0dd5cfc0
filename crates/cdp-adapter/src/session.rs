//! Browser session over the DevTools protocol

use crate::config::BrowserSettings;
use crate::error::{AdapterError, AdapterErrorKind};
use crate::scripts::{self, ClickTarget, ElementOutcome, FindOutcome};
use action_primitives::{ActionError, BrowserSession, DomElement, Element, Query};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::Handler;
use chromiumoxide::layout::Point;
use chromiumoxide::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Evaluate `script` in `page` and decode its by-value result
async fn evaluate<T: DeserializeOwned>(page: &Page, script: String) -> Result<T, ActionError> {
    let result = page
        .evaluate(script)
        .await
        .map_err(|err| ActionError::from(AdapterError::from(err)))?;
    result
        .into_value::<T>()
        .map_err(|err| ActionError::Script(format!("unexpected script result: {}", err)))
}

fn spawn_handler(mut handler: Handler) -> JoinHandle<()> {
    tokio::spawn(async move { while handler.next().await.is_some() {} })
}

/// One page of a launched or attached browser
pub struct CdpSession {
    browser: Mutex<Browser>,
    page: Page,
    handler: JoinHandle<()>,
    launched: bool,
}

impl CdpSession {
    /// Attach to an already running browser and open a fresh tab
    pub async fn connect(url: &str) -> Result<Self, AdapterError> {
        info!(url, "Connecting to browser");
        let (browser, handler) = Browser::connect(url).await.map_err(|err| {
            AdapterError::new(AdapterErrorKind::Connect).with_hint(err.to_string())
        })?;
        let handler = spawn_handler(handler);
        Self::with_page(browser, handler, false).await
    }

    /// Launch a browser with the configured profile
    pub async fn launch(settings: &BrowserSettings) -> Result<Self, AdapterError> {
        let mut builder = BrowserConfig::builder()
            .launch_timeout(settings.launch_timeout())
            .request_timeout(settings.request_timeout());
        if !settings.headless {
            builder = builder.with_head();
        }

        let executable = settings.resolve_executable();
        if let Some(path) = &executable {
            builder = builder.chrome_executable(path);
        }

        match &settings.user_data_dir {
            Some(dir) => builder = builder.user_data_dir(dir),
            None => warn!("No user data directory configured, the portal login will not persist"),
        }

        for arg in settings.launch_args() {
            builder = builder.arg(arg);
        }

        let config = builder.build().map_err(|err| {
            AdapterError::new(AdapterErrorKind::Launch).with_hint(err.to_string())
        })?;

        info!(
            headless = settings.headless,
            executable = ?executable,
            profile = ?settings.profile_directory,
            "Launching browser"
        );
        let (browser, handler) = Browser::launch(config).await.map_err(|err| {
            AdapterError::new(AdapterErrorKind::Launch).with_hint(err.to_string())
        })?;
        let handler = spawn_handler(handler);
        Self::with_page(browser, handler, true).await
    }

    /// Connect when a DevTools endpoint is configured, launch otherwise
    pub async fn open(settings: &BrowserSettings) -> Result<Self, AdapterError> {
        match &settings.connect_url {
            Some(url) => Self::connect(url).await,
            None => Self::launch(settings).await,
        }
    }

    async fn with_page(
        browser: Browser,
        handler: JoinHandle<()>,
        launched: bool,
    ) -> Result<Self, AdapterError> {
        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(err) => {
                handler.abort();
                return Err(AdapterError::from(err));
            }
        };
        debug!(launched, "Browser page ready");
        Ok(Self {
            browser: Mutex::new(browser),
            page,
            handler,
            launched,
        })
    }

    /// Whether this process started the browser
    pub fn is_launched(&self) -> bool {
        self.launched
    }

    /// Close the browser if it was launched here; attached browsers stay up
    pub async fn close(&self) -> Result<(), AdapterError> {
        if !self.launched {
            debug!("Leaving attached browser running");
            return Ok(());
        }
        let mut browser = self.browser.lock().await;
        browser.close().await.map_err(AdapterError::from)?;
        if let Err(err) = browser.wait().await {
            warn!(error = %err, "Browser process did not exit cleanly");
        }
        info!("Browser closed");
        Ok(())
    }

    fn element(&self, node: scripts::NodeRef) -> Element {
        Arc::new(CdpElement {
            page: self.page.clone(),
            reference: node.reference,
            label: node.label,
        })
    }
}

impl Drop for CdpSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

impl fmt::Debug for CdpSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CdpSession")
            .field("launched", &self.launched)
            .finish()
    }
}

async fn find_refs(
    page: &Page,
    scope: Option<&str>,
    query: &Query,
) -> Result<Vec<scripts::NodeRef>, ActionError> {
    let outcome: FindOutcome = evaluate(page, scripts::find_all(scope, query)).await?;
    if let Some(reason) = outcome.invalid {
        return Err(ActionError::InvalidQuery(format!("{}: {}", query, reason)));
    }
    if outcome.stale {
        return Err(ActionError::StaleElement(format!(
            "search root {} is gone",
            scope.unwrap_or("document")
        )));
    }
    Ok(outcome.refs)
}

#[async_trait]
impl BrowserSession for CdpSession {
    async fn navigate(&self, url: &str) -> Result<(), ActionError> {
        self.page
            .goto(url)
            .await
            .map_err(|err| ActionError::from(AdapterError::from(err)))?;
        Ok(())
    }

    async fn go_back(&self) -> Result<(), ActionError> {
        let moved: bool = evaluate(&self.page, scripts::GO_BACK.to_string()).await?;
        if !moved {
            return Err(ActionError::SessionIo("no history entry to go back to".into()));
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String, ActionError> {
        let url = self
            .page
            .url()
            .await
            .map_err(|err| ActionError::from(AdapterError::from(err)))?;
        Ok(url.unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn title(&self) -> Result<String, ActionError> {
        let title = self
            .page
            .get_title()
            .await
            .map_err(|err| ActionError::from(AdapterError::from(err)))?;
        Ok(title.unwrap_or_default())
    }

    async fn find_all(&self, query: &Query) -> Result<Vec<Element>, ActionError> {
        let refs = find_refs(&self.page, None, query).await?;
        Ok(refs.into_iter().map(|node| self.element(node)).collect())
    }
}

/// Element handle resolved through its reference attribute
pub struct CdpElement {
    page: Page,
    reference: String,
    label: String,
}

impl CdpElement {
    async fn run<T: DeserializeOwned>(&self, script: String) -> Result<Option<T>, ActionError> {
        let outcome: ElementOutcome<T> = evaluate(&self.page, script).await?;
        if outcome.stale {
            debug!(
                reference = %self.reference,
                document = scripts::reference_document(&self.reference).unwrap_or("-"),
                "Element handle is stale"
            );
            return Err(ActionError::StaleElement(self.describe()));
        }
        Ok(outcome.value)
    }

    async fn run_required<T: DeserializeOwned>(&self, script: String) -> Result<T, ActionError> {
        self.run(script).await?.ok_or_else(|| {
            ActionError::Script(format!("{} returned no value", self.describe()))
        })
    }
}

impl fmt::Debug for CdpElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CdpElement({}, ref={})", self.label, self.reference)
    }
}

#[async_trait]
impl DomElement for CdpElement {
    fn describe(&self) -> String {
        format!("<{}>", self.label)
    }

    async fn text(&self) -> Result<String, ActionError> {
        self.run_required(scripts::text(&self.reference)).await
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, ActionError> {
        self.run(scripts::attribute(&self.reference, name)).await
    }

    async fn is_visible(&self) -> Result<bool, ActionError> {
        self.run_required(scripts::is_visible(&self.reference)).await
    }

    async fn is_enabled(&self) -> Result<bool, ActionError> {
        self.run_required(scripts::is_enabled(&self.reference)).await
    }

    async fn click(&self) -> Result<(), ActionError> {
        let target: ClickTarget = self
            .run_required(scripts::click_target(&self.reference))
            .await?;
        if !target.hit {
            return Err(ActionError::NotInteractable(format!(
                "{} covered by <{}>",
                self.describe(),
                target.blocker.as_deref().unwrap_or("nothing")
            )));
        }
        self.page
            .click(Point::new(target.x, target.y))
            .await
            .map_err(|err| ActionError::from(AdapterError::from(err)))?;
        Ok(())
    }

    async fn synthetic_click(&self) -> Result<(), ActionError> {
        let _: bool = self
            .run_required(scripts::synthetic_click(&self.reference))
            .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), ActionError> {
        let _: bool = self.run_required(scripts::clear(&self.reference)).await?;
        Ok(())
    }

    async fn set_text(&self, value: &str) -> Result<(), ActionError> {
        let _: bool = self
            .run_required(scripts::set_text(&self.reference, value))
            .await?;
        Ok(())
    }

    async fn remove_attribute(&self, name: &str) -> Result<(), ActionError> {
        let _: bool = self
            .run_required(scripts::remove_attribute(&self.reference, name))
            .await?;
        Ok(())
    }

    async fn find_all(&self, query: &Query) -> Result<Vec<Element>, ActionError> {
        let refs = find_refs(&self.page, Some(&self.reference), query).await?;
        Ok(refs
            .into_iter()
            .map(|node| -> Element {
                Arc::new(CdpElement {
                    page: self.page.clone(),
                    reference: node.reference,
                    label: node.label,
                })
            })
            .collect())
    }
}
