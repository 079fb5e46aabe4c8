//! Scripted in-memory browser for runner tests
//!
//! A `FakeSite` maps URLs to pages; each page holds elements keyed by their
//! selector text. Pressing Enter on an element with `submits_to` navigates
//! to that URL, which is enough to model a search box.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use imdb_smoke_e2e::{DriverSession, E2eError, E2eResult, Key, Selector, SessionProvider};

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub text: String,
    pub displayed: bool,
    /// Number of failed lookups before the element shows up
    pub appears_after: usize,
    pub submits_to: Option<String>,
}

impl FakeElement {
    pub fn visible(text: &str) -> Self {
        Self {
            text: text.to_string(),
            displayed: true,
            ..Default::default()
        }
    }

    pub fn hidden(text: &str) -> Self {
        Self {
            text: text.to_string(),
            displayed: false,
            ..Default::default()
        }
    }

    pub fn appearing_after(mut self, lookups: usize) -> Self {
        self.appears_after = lookups;
        self
    }

    pub fn submitting_to(mut self, url: &str) -> Self {
        self.submits_to = Some(url.to_string());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub title: String,
    pub elements: HashMap<String, FakeElement>,
}

impl FakePage {
    pub fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            elements: HashMap::new(),
        }
    }

    pub fn with(mut self, selector: &str, element: FakeElement) -> Self {
        let key = selector.parse::<Selector>().unwrap().to_string();
        self.elements.insert(key, element);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeSite {
    pub pages: HashMap<String, FakePage>,
    /// How long a lookup that finds nothing blocks, like a driver's
    /// implicit wait
    pub miss_delay: Duration,
}

impl FakeSite {
    pub fn with_page(mut self, url: &str, page: FakePage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn with_miss_delay(mut self, delay: Duration) -> Self {
        self.miss_delay = delay;
        self
    }
}

/// Shared action log, one entry per browser call
pub type ActionLog = Arc<Mutex<Vec<String>>>;

pub struct FakeProvider {
    site: Arc<FakeSite>,
    pub log: ActionLog,
    pub fail_open: bool,
}

impl FakeProvider {
    pub fn new(site: FakeSite) -> Self {
        Self {
            site: Arc::new(site),
            log: Arc::new(Mutex::new(Vec::new())),
            fail_open: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_open: true,
            ..Self::new(FakeSite::default())
        }
    }

    pub fn actions(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.log.lock().iter().filter(|a| a.starts_with(prefix)).count()
    }
}

#[async_trait]
impl SessionProvider for FakeProvider {
    type Session = FakeSession;

    async fn open(&self) -> E2eResult<FakeSession> {
        if self.fail_open {
            return Err(E2eError::SessionOpen("connection refused".to_string()));
        }
        self.log.lock().push("open".to_string());
        Ok(FakeSession {
            site: self.site.clone(),
            log: self.log.clone(),
            url: None,
            lookups: HashMap::new(),
            typed: HashMap::new(),
            closed: false,
        })
    }
}

pub struct FakeSession {
    site: Arc<FakeSite>,
    log: ActionLog,
    url: Option<String>,
    lookups: HashMap<String, usize>,
    typed: HashMap<String, String>,
    closed: bool,
}

impl FakeSession {
    fn page(&self) -> E2eResult<&FakePage> {
        if self.closed {
            return Err(E2eError::SessionClosed);
        }
        let url = self
            .url
            .as_ref()
            .ok_or_else(|| E2eError::AssertionFailed("no page loaded".to_string()))?;
        self.site
            .pages
            .get(url)
            .ok_or_else(|| E2eError::AssertionFailed(format!("404 {}", url)))
    }

    fn element(&self, key: &str) -> E2eResult<&FakeElement> {
        self.page()?
            .elements
            .get(key)
            .ok_or_else(|| E2eError::AssertionFailed(format!("stale element {}", key)))
    }
}

#[async_trait]
impl DriverSession for FakeSession {
    type Element = String;

    async fn navigate(&mut self, url: &str) -> E2eResult<()> {
        self.log.lock().push(format!("navigate {}", url));
        self.url = Some(url.to_string());
        self.lookups.clear();
        Ok(())
    }

    async fn title(&mut self) -> E2eResult<String> {
        Ok(self.page()?.title.clone())
    }

    async fn locate(&mut self, selector: &Selector) -> E2eResult<Option<String>> {
        let key = selector.to_string();
        let appears_after = match self.page()?.elements.get(&key) {
            Some(element) => element.appears_after,
            None => {
                tokio::time::sleep(self.site.miss_delay).await;
                return Ok(None);
            }
        };

        let seen = self.lookups.entry(key.clone()).or_insert(0);
        if *seen < appears_after {
            *seen += 1;
            tokio::time::sleep(self.site.miss_delay).await;
            return Ok(None);
        }
        Ok(Some(key))
    }

    async fn click(&mut self, element: &String) -> E2eResult<()> {
        self.element(element)?;
        self.log.lock().push(format!("click {}", element));
        Ok(())
    }

    async fn send_keys(&mut self, element: &String, text: &str) -> E2eResult<()> {
        self.element(element)?;
        self.log.lock().push(format!("type {} {}", element, text));
        self.typed.entry(element.clone()).or_default().push_str(text);
        Ok(())
    }

    async fn press(&mut self, element: &String, key: Key) -> E2eResult<()> {
        let target = self.element(element)?.submits_to.clone();
        self.log.lock().push(format!("press {} {:?}", element, key));
        if matches!(key, Key::Enter | Key::Return) {
            if let Some(url) = target {
                self.url = Some(url);
                self.lookups.clear();
            }
        }
        Ok(())
    }

    async fn text(&mut self, element: &String) -> E2eResult<String> {
        Ok(self.element(element)?.text.clone())
    }

    async fn is_displayed(&mut self, element: &String) -> E2eResult<bool> {
        Ok(self.element(element)?.displayed)
    }

    async fn close(&mut self) -> E2eResult<()> {
        if !self.closed {
            self.closed = true;
            self.log.lock().push("close".to_string());
        }
        Ok(())
    }
}

pub const NONSENSE_TERM: &str = "ajsdhfjksdhfkjashdfkljashdf";

/// A small IMDb-like site covering every built-in check: homepage with a
/// header search box, a `name=q` box for the nonsense search, the menu
/// drawer and footer, plus the two search result pages.
pub fn imdb_like_site() -> FakeSite {
    FakeSite::default()
        .with_page(
            "https://www.imdb.com/",
            FakePage::titled("IMDb: Ratings, Reviews, and Where to Watch the Best Movies & TV Shows")
                .with(
                    "id=suggestion-search",
                    FakeElement::visible("").submitting_to("https://www.imdb.com/find/?q=Inception"),
                )
                .with(
                    "name=q",
                    FakeElement::visible("").submitting_to(&format!(
                        "https://www.imdb.com/find/?q={}",
                        NONSENSE_TERM
                    )),
                )
                .with("id=imdbHeader-navDrawerOpen", FakeElement::visible("Menu"))
                // Drawer links render shortly after the menu button is clicked
                .with(
                    "//a[contains(@href, '/chart/top')]",
                    FakeElement::visible("Top 250 Movies").appearing_after(1),
                )
                .with("tag=footer", FakeElement::visible("Help Site Index Conditions of Use"))
                .with(
                    "//a[contains(@href, '/registration/signin')]",
                    FakeElement::visible("Sign In"),
                ),
        )
        .with_page(
            "https://www.imdb.com/find/?q=Inception",
            FakePage::titled("Find - IMDb")
                .with(
                    "//section[@data-testid='find-results-section-title']",
                    FakeElement::visible("Titles").appearing_after(2),
                )
                .with(
                    "//section[@data-testid='find-results-section-title']//h3[contains(text(), 'Titles')]",
                    FakeElement::visible("Titles"),
                )
                .with(
                    "//ul[contains(@class, 'ipc-metadata-list')]/li[1]//a",
                    FakeElement::visible("Inception"),
                ),
        )
        .with_page(
            &format!("https://www.imdb.com/find/?q={}", NONSENSE_TERM),
            FakePage::titled("Find - IMDb").with(
                "//*[contains(text(), 'No results found')]",
                FakeElement::visible("No results found for \"ajsdhfjksdhfkjashdfkljashdf\""),
            ),
        )
}
