use anyhow::Result;
use cdp_adapter::CdpSession;
use evalfill_cli::{AppConfig, AppError};
use tracing::{info, warn};

use super::env::CliArgs;
use super::output::OutputFormat;

/// Effective configuration plus the global switches every command shares
pub struct CliContext {
    config: AppConfig,
    output: OutputFormat,
}

impl CliContext {
    /// Load the layered configuration and apply the browser flags on top
    pub fn from_args(args: &CliArgs) -> Result<Self> {
        let mut config = AppConfig::load(args.config.as_deref())?;
        if let Some(url) = &args.connect {
            config.browser.connect_url = Some(url.clone());
        }
        if args.headless {
            config.browser.headless = true;
        }
        Ok(Self {
            config,
            output: args.output,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut AppConfig {
        &mut self.config
    }

    pub fn output(&self) -> OutputFormat {
        self.output
    }

    pub async fn open_session(&self) -> Result<CdpSession> {
        let session = CdpSession::open(&self.config.browser)
            .await
            .map_err(AppError::from)?;
        Ok(session)
    }

    /// Close the session when configured to; attached browsers are left alone
    pub async fn finish_session(&self, session: CdpSession) {
        if !self.config.browser.close_on_exit {
            info!("Leaving the browser open");
            return;
        }
        if let Err(err) = session.close().await {
            warn!(error = %err, "Failed to close the browser");
        }
    }
}
