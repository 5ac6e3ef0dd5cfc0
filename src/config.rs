//! Application configuration
//!
//! Layers, lowest priority first:
//! 1. the embedded default profile (`config/default.yaml`)
//! 2. a user file (`--config`, or `<config_dir>/evalfill/config.yaml`)
//! 3. `EVALFILL_<SECTION>__<KEY>` environment variables

use action_flow::{BatchConfig, NavigatorConfig};
use action_primitives::WaitSettings;
use cdp_adapter::BrowserSettings;
use config::{Config, Environment, File, FileFormat};
use perceiver_state::DetectorConfig;
use queue_extractor::ExtractorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tool_fill_form::FormConfig;
use tracing::{debug, info};
use url::Url;

use crate::errors::AppError;

/// Embedded default profile
pub const DEFAULT_PROFILE: &str = include_str!("../config/default.yaml");

/// Environment variable prefix
pub const ENV_PREFIX: &str = "EVALFILL";

/// Target portal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Landing page opened at start and on re-navigation
    pub home_url: String,

    /// One-off delay after the first load (milliseconds)
    pub initial_settle_ms: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            home_url: String::new(),
            initial_settle_ms: 3_000,
        }
    }
}

impl PortalConfig {
    pub fn initial_settle(&self) -> Duration {
        Duration::from_millis(self.initial_settle_ms)
    }
}

/// Everything a run needs, one section per component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub portal: PortalConfig,
    pub browser: BrowserSettings,
    pub wait: WaitSettings,
    pub detector: DetectorConfig,
    pub navigator: NavigatorConfig,
    pub extractor: ExtractorConfig,
    pub form: FormConfig,
    pub batch: BatchConfig,
}

impl AppConfig {
    /// Load the layered configuration. An explicit `path` must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_PROFILE, FileFormat::Yaml));

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "configuration file not found: {}",
                        path.display()
                    )));
                }
                info!("Loading configuration from: {}", path.display());
                builder = builder.add_source(File::from(path.to_path_buf()).required(true));
            }
            None => {
                if let Some(default_path) = Self::default_path().filter(|p| p.exists()) {
                    info!("Loading configuration from: {}", default_path.display());
                    builder = builder.add_source(File::from(default_path).required(false));
                } else {
                    debug!("No user configuration file, using the embedded profile");
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .and_then(|config| config.try_deserialize::<AppConfig>())
            .map_err(|err| AppError::Config(err.to_string()))?;
        Ok(config.normalized())
    }

    /// Parse the embedded profile alone
    pub fn embedded() -> Result<Self, AppError> {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(DEFAULT_PROFILE, FileFormat::Yaml))
            .build()
            .and_then(|config| config.try_deserialize::<AppConfig>())
            .map_err(|err| AppError::Config(err.to_string()))?;
        Ok(config.normalized())
    }

    /// `<config_dir>/evalfill/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("evalfill").join("config.yaml"))
    }

    /// The navigator re-navigates to the portal home unless told otherwise
    fn normalized(mut self) -> Self {
        if self.navigator.home_url.is_none() && !self.portal.home_url.trim().is_empty() {
            self.navigator.home_url = Some(self.portal.home_url.clone());
        }
        self
    }

    /// Reject configurations no run could succeed with
    pub fn validate(&self) -> Result<(), AppError> {
        Url::parse(&self.portal.home_url).map_err(|err| {
            AppError::Config(format!(
                "portal.home_url '{}' is not a valid URL: {}",
                self.portal.home_url, err
            ))
        })?;

        if self.batch.max_attempts == 0 {
            return Err(AppError::Config("batch.max_attempts must be at least 1".into()));
        }

        let required = [
            ("detector.login_success", self.detector.login_success.is_empty()),
            ("detector.queue_exhausted", self.detector.queue_exhausted.is_empty()),
            ("detector.list_view", self.detector.list_view.is_empty()),
            ("detector.detail_view", self.detector.detail_view.is_empty()),
            ("navigator.menu", self.navigator.menu.is_empty()),
            ("extractor.table", self.extractor.table.is_empty()),
            ("extractor.rows", self.extractor.rows.is_empty()),
            ("extractor.action", self.extractor.action.is_empty()),
            ("form.form_root", self.form.form_root.is_empty()),
            ("form.question_groups", self.form.question_groups.is_empty()),
            ("form.comment_field", self.form.comment_field.is_empty()),
            ("form.submit", self.form.submit.is_empty()),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, empty)| *empty)
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(AppError::Config(format!(
                "empty candidate sets: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }
}
