//! WebDriver-backed browser sessions

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thirtyfour::common::capabilities::desiredcapabilities::Capabilities;
use thirtyfour::prelude::*;
use thirtyfour::ChromiumLikeCapabilities;
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};
use crate::selector::{Selector, Strategy};
use crate::session::{DriverSession, Key, SessionProvider};

/// Browser to drive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Firefox,
    Chrome,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Firefox => "firefox",
            Browser::Chrome => "chrome",
        }
    }

    /// Driver executable looked up in PATH by default
    pub fn default_driver(&self) -> &'static str {
        match self {
            Browser::Firefox => "geckodriver",
            Browser::Chrome => "chromedriver",
        }
    }
}

impl std::str::FromStr for Browser {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "firefox" => Ok(Browser::Firefox),
            "chrome" | "chromium" => Ok(Browser::Chrome),
            other => Err(format!("unknown browser: {}", other)),
        }
    }
}

/// Session settings applied when a session opens
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// WebDriver server URL, e.g. `http://127.0.0.1:4444`
    pub server_url: String,
    pub browser: Browser,
    pub headless: bool,
    pub implicit_wait: Duration,
    pub page_load_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:4444".to_string(),
            browser: Browser::Firefox,
            headless: false,
            implicit_wait: Duration::from_secs(5),
            page_load_timeout: Duration::from_secs(30),
        }
    }
}

/// Opens sessions against a running WebDriver server
#[derive(Debug, Clone)]
pub struct WebDriverProvider {
    config: SessionConfig,
}

impl WebDriverProvider {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn capabilities(&self) -> E2eResult<Capabilities> {
        let caps: Capabilities = match self.config.browser {
            Browser::Firefox => {
                let mut caps = DesiredCapabilities::firefox();
                if self.config.headless {
                    caps.set_headless()?;
                }
                caps.into()
            }
            Browser::Chrome => {
                let mut caps = DesiredCapabilities::chrome();
                if self.config.headless {
                    caps.set_headless()?;
                }
                caps.into()
            }
        };
        Ok(caps)
    }
}

#[async_trait]
impl SessionProvider for WebDriverProvider {
    type Session = WebDriverSession;

    async fn open(&self) -> E2eResult<WebDriverSession> {
        let caps = self.capabilities()?;

        debug!(
            "Opening {} session at {} (headless: {})",
            self.config.browser.as_str(),
            self.config.server_url,
            self.config.headless
        );

        let driver = WebDriver::new(self.config.server_url.as_str(), caps)
            .await
            .map_err(|e| E2eError::SessionOpen(e.to_string()))?;

        let timeouts = TimeoutConfiguration::new(
            None,
            Some(self.config.page_load_timeout),
            Some(self.config.implicit_wait),
        );
        if let Err(e) = driver.update_timeouts(timeouts).await {
            warn!("Failed to set session timeouts: {}", e);
        }

        info!("Browser session opened ({})", self.config.browser.as_str());
        Ok(WebDriverSession {
            driver: Some(driver),
        })
    }
}

/// A live WebDriver session
pub struct WebDriverSession {
    driver: Option<WebDriver>,
}

impl WebDriverSession {
    fn driver(&self) -> E2eResult<&WebDriver> {
        self.driver.as_ref().ok_or(E2eError::SessionClosed)
    }
}

fn by(selector: &Selector) -> By {
    let value = selector.value.as_str();
    match selector.strategy {
        Strategy::Id => By::Id(value),
        Strategy::Name => By::Name(value),
        Strategy::XPath => By::XPath(value),
        Strategy::Css => By::Css(value),
        Strategy::LinkText => By::LinkText(value),
        Strategy::ClassName => By::ClassName(value),
        Strategy::Tag => By::Tag(value),
    }
}

fn webdriver_key(key: Key) -> thirtyfour::Key {
    match key {
        Key::Enter => thirtyfour::Key::Enter,
        Key::Return => thirtyfour::Key::Return,
        Key::Tab => thirtyfour::Key::Tab,
        Key::Escape => thirtyfour::Key::Escape,
    }
}

#[async_trait]
impl DriverSession for WebDriverSession {
    type Element = WebElement;

    async fn navigate(&mut self, url: &str) -> E2eResult<()> {
        debug!("Navigating to {}", url);
        self.driver()?.goto(url).await?;
        Ok(())
    }

    async fn title(&mut self) -> E2eResult<String> {
        Ok(self.driver()?.title().await?)
    }

    async fn locate(&mut self, selector: &Selector) -> E2eResult<Option<WebElement>> {
        // find_all yields an empty list instead of a NoSuchElement error
        let mut found = self.driver()?.find_all(by(selector)).await?;
        if found.is_empty() {
            Ok(None)
        } else {
            Ok(Some(found.swap_remove(0)))
        }
    }

    async fn click(&mut self, element: &WebElement) -> E2eResult<()> {
        element.click().await?;
        Ok(())
    }

    async fn send_keys(&mut self, element: &WebElement, text: &str) -> E2eResult<()> {
        element.send_keys(text).await?;
        Ok(())
    }

    async fn press(&mut self, element: &WebElement, key: Key) -> E2eResult<()> {
        element.send_keys(webdriver_key(key)).await?;
        Ok(())
    }

    async fn text(&mut self, element: &WebElement) -> E2eResult<String> {
        Ok(element.text().await?)
    }

    async fn is_displayed(&mut self, element: &WebElement) -> E2eResult<bool> {
        Ok(element.is_displayed().await?)
    }

    async fn close(&mut self) -> E2eResult<()> {
        if let Some(driver) = self.driver.take() {
            driver.quit().await?;
            info!("Browser session closed");
        }
        Ok(())
    }
}
