//! Error types for the smoke checks

use thiserror::Error;

use crate::selector::Selector;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("WebDriver failed to start: {0}")]
    DriverStartup(String),

    #[error("WebDriver health check failed after {0} attempts")]
    DriverHealthCheck(usize),

    #[error("Driver executable not found: {0}")]
    DriverNotFound(String),

    #[error("Could not open browser session: {0}")]
    SessionOpen(String),

    #[error("Browser session already closed")]
    SessionClosed,

    #[error("WebDriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    #[error("Check spec parse error: {0}")]
    SpecParse(String),

    #[error("Invalid selector '{0}'")]
    InvalidSelector(String),

    #[error("Element not found: {0}")]
    ElementNotFound(Selector),

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Timeout after {timeout_ms} ms waiting for: {what}")]
    Timeout { what: String, timeout_ms: u64 },

    #[error("Cancelled while waiting for: {0}")]
    Cancelled(String),

    #[error("Results store error: {0}")]
    Store(#[from] imdb_smoke_common::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;
