//! Browser session boundary
//!
//! The checks only talk to a browser through [`DriverSession`]. Sessions are
//! produced by a [`SessionProvider`], which the runner calls once per check
//! and whose session it closes afterwards whatever the check's outcome.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::{E2eError, E2eResult};
use crate::selector::Selector;

/// Special keys that checks can press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Enter,
    Return,
    Tab,
    Escape,
}

/// A live, navigable browser session
#[async_trait]
pub trait DriverSession: Send {
    type Element: Send + Sync;

    async fn navigate(&mut self, url: &str) -> E2eResult<()>;

    async fn title(&mut self) -> E2eResult<String>;

    /// Look an element up; `Ok(None)` when nothing matches
    async fn locate(&mut self, selector: &Selector) -> E2eResult<Option<Self::Element>>;

    async fn click(&mut self, element: &Self::Element) -> E2eResult<()>;

    async fn send_keys(&mut self, element: &Self::Element, text: &str) -> E2eResult<()>;

    async fn press(&mut self, element: &Self::Element, key: Key) -> E2eResult<()>;

    async fn text(&mut self, element: &Self::Element) -> E2eResult<String>;

    async fn is_displayed(&mut self, element: &Self::Element) -> E2eResult<bool>;

    /// End the session. Closing twice is a no-op.
    async fn close(&mut self) -> E2eResult<()>;

    /// Like [`locate`](Self::locate), but a missing element is an error
    async fn find(&mut self, selector: &Selector) -> E2eResult<Self::Element> {
        self.locate(selector)
            .await?
            .ok_or_else(|| E2eError::ElementNotFound(selector.clone()))
    }
}

/// Opens browser sessions with a fixed configuration
#[async_trait]
pub trait SessionProvider: Send + Sync {
    type Session: DriverSession;

    async fn open(&self) -> E2eResult<Self::Session>;
}

/// Polling parameters for [`wait_for`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub interval: Duration,
}

impl WaitOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            interval: Duration::from_millis(250),
        }
    }
}

/// Poll until `selector` resolves to an element.
///
/// The lookup is retried every `options.interval` until `options.timeout`
/// elapses or `cancel` fires. Both also interrupt a lookup that is still in
/// flight, so a slow driver cannot stretch the wait past its deadline.
/// Lookup errors other than "not found" end the wait immediately.
pub async fn wait_for<S>(
    session: &mut S,
    selector: &Selector,
    options: WaitOptions,
    cancel: &CancellationToken,
) -> E2eResult<S::Element>
where
    S: DriverSession,
{
    let deadline = Instant::now() + options.timeout;
    let mut attempts = 0usize;

    loop {
        if cancel.is_cancelled() {
            return Err(E2eError::Cancelled(selector.to_string()));
        }

        attempts += 1;
        let found = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(E2eError::Cancelled(selector.to_string()));
            }
            found = session.locate(selector) => found?,
            _ = tokio::time::sleep_until(deadline) => {
                return Err(timeout_error(selector, &options));
            }
        };
        if let Some(element) = found {
            debug!("{} resolved after {} attempt(s)", selector, attempts);
            return Ok(element);
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(timeout_error(selector, &options));
        }

        trace!("{} not present yet (attempt {})", selector, attempts);
        let nap = options.interval.min(deadline - now);
        tokio::select! {
            _ = cancel.cancelled() => {
                return Err(E2eError::Cancelled(selector.to_string()));
            }
            _ = tokio::time::sleep(nap) => {}
        }
    }
}

fn timeout_error(selector: &Selector, options: &WaitOptions) -> E2eError {
    E2eError::Timeout {
        what: selector.to_string(),
        timeout_ms: options.timeout.as_millis() as u64,
    }
}
