//! Smoke run configuration
//!
//! Loaded from an optional TOML file; a missing file means defaults. CLI
//! flags are applied on top by the binary.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use imdb_smoke_common::DEFAULT_RESULTS_PATH;

use crate::error::{E2eError, E2eResult};
use crate::runner::RunnerOptions;
use crate::server::DriverProcessConfig;
use crate::session::WaitOptions;
use crate::suite::IMDB_BASE_URL;
use crate::webdriver::{Browser, SessionConfig};

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmokeConfig {
    /// Site under test
    pub base_url: String,

    /// Cumulative results sheet
    pub results_path: PathBuf,

    /// Directory for the run summary
    pub output_dir: PathBuf,

    /// Extra check specs; when unset the built-in suite runs
    pub specs_dir: Option<PathBuf>,

    /// Browser / WebDriver configuration
    pub webdriver: WebDriverConfig,

    /// Element wait configuration
    pub wait: WaitConfig,
}

impl Default for SmokeConfig {
    fn default() -> Self {
        Self {
            base_url: IMDB_BASE_URL.to_string(),
            results_path: PathBuf::from(DEFAULT_RESULTS_PATH),
            output_dir: PathBuf::from("test-results"),
            specs_dir: None,
            webdriver: WebDriverConfig::default(),
            wait: WaitConfig::default(),
        }
    }
}

/// Browser and driver settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebDriverConfig {
    /// External WebDriver server; when unset a driver process is spawned
    pub url: Option<String>,

    /// Driver executable; defaults to geckodriver/chromedriver from PATH
    pub driver_path: Option<PathBuf>,

    pub browser: Browser,

    pub headless: bool,

    pub implicit_wait_ms: u64,

    pub page_load_timeout_ms: u64,

    pub startup_timeout_ms: u64,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            url: None,
            driver_path: None,
            browser: Browser::Firefox,
            headless: false,
            implicit_wait_ms: 5_000,
            page_load_timeout_ms: 30_000,
            startup_timeout_ms: 20_000,
        }
    }
}

/// Polling settings for `wait` steps
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    pub timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            poll_interval_ms: 250,
        }
    }
}

impl SmokeConfig {
    /// Load configuration from file, or defaults if it does not exist.
    ///
    /// Values are not validated here; callers apply command-line overrides
    /// first and then call [`validate`](Self::validate).
    pub fn load(path: &Path) -> E2eResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)
                .map_err(|e| E2eError::Config(format!("{}: {}", path.display(), e)))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> E2eResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| E2eError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> E2eResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(E2eError::Config(format!(
                "base_url must be an http(s) URL, got {}",
                self.base_url
            )));
        }
        if self.wait.poll_interval_ms == 0 {
            return Err(E2eError::Config("wait.poll_interval_ms must be > 0".to_string()));
        }
        Ok(())
    }

    pub fn runner_options(&self) -> RunnerOptions {
        RunnerOptions {
            base_url: self.base_url.clone(),
            wait: WaitOptions {
                timeout: Duration::from_millis(self.wait.timeout_ms),
                interval: Duration::from_millis(self.wait.poll_interval_ms),
            },
        }
    }

    /// Settings for a spawned driver process
    pub fn driver_process(&self) -> DriverProcessConfig {
        let binary_path = self
            .webdriver
            .driver_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.webdriver.browser.default_driver()));
        DriverProcessConfig {
            binary_path,
            port: None,
            startup_timeout: Duration::from_millis(self.webdriver.startup_timeout_ms),
        }
    }

    /// Session settings against the given WebDriver server
    pub fn session(&self, server_url: &str) -> SessionConfig {
        SessionConfig {
            server_url: server_url.to_string(),
            browser: self.webdriver.browser,
            headless: self.webdriver.headless,
            implicit_wait: Duration::from_millis(self.webdriver.implicit_wait_ms),
            page_load_timeout: Duration::from_millis(self.webdriver.page_load_timeout_ms),
        }
    }
}
