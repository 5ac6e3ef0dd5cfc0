//! Browser session settings

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Environment override for the browser executable
pub const CHROME_ENV: &str = "EVALFILL_CHROME";

/// Browser binaries tried in order; bare names are looked up on `PATH`
#[cfg(target_os = "windows")]
const BROWSER_CANDIDATES: &[&str] = &[
    "chrome.exe",
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
    "msedge.exe",
];

#[cfg(target_os = "macos")]
const BROWSER_CANDIDATES: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "google-chrome",
];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const BROWSER_CANDIDATES: &[&str] = &[
    "google-chrome-stable",
    "google-chrome",
    "chromium",
    "chromium-browser",
];

/// How to obtain the browser session.
///
/// With `connect_url` set the adapter attaches to a running browser;
/// otherwise it launches one. Launching against the user's own profile
/// directory keeps the portal login alive between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// DevTools endpoint of an already running browser (`ws://` or `http://`)
    pub connect_url: Option<String>,

    /// Browser executable; discovered when unset
    pub executable: Option<PathBuf>,

    /// Chrome user data directory holding the logged-in profile
    pub user_data_dir: Option<PathBuf>,

    /// Profile inside the user data directory, e.g. `Default`
    pub profile_directory: Option<String>,

    pub headless: bool,

    /// Additional command line switches
    pub extra_args: Vec<String>,

    /// Wait for the launched browser to expose its endpoint (milliseconds)
    pub launch_timeout_ms: u64,

    /// Per-command protocol timeout (milliseconds)
    pub request_timeout_ms: u64,

    /// Close a launched browser once the run is over
    pub close_on_exit: bool,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            connect_url: None,
            executable: None,
            user_data_dir: None,
            profile_directory: None,
            headless: false,
            extra_args: Vec::new(),
            launch_timeout_ms: 20_000,
            request_timeout_ms: 30_000,
            close_on_exit: false,
        }
    }
}

impl BrowserSettings {
    pub fn launch_timeout(&self) -> Duration {
        Duration::from_millis(self.launch_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Executable to launch: the configured path, then `EVALFILL_CHROME`,
    /// then the first known browser present on this machine. `None` leaves
    /// the choice to the launcher.
    pub fn resolve_executable(&self) -> Option<PathBuf> {
        let from_env = env::var_os(CHROME_ENV)
            .map(PathBuf::from)
            .filter(|path| !path.as_os_str().is_empty());
        self.executable
            .iter()
            .cloned()
            .chain(from_env)
            .find(|path| path.is_file())
            .or_else(|| {
                BROWSER_CANDIDATES
                    .iter()
                    .find_map(|candidate| which::which(candidate).ok())
            })
    }

    /// Switches passed on top of the launcher defaults
    pub fn launch_args(&self) -> Vec<String> {
        let mut args = vec![
            "--disable-blink-features=AutomationControlled".to_string(),
            "--disable-infobars".to_string(),
            "--no-first-run".to_string(),
        ];
        if let Some(profile) = &self.profile_directory {
            args.push(format!("--profile-directory={}", profile));
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }
}
