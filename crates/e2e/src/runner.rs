//! Check runner: drives each check through a fresh browser session and
//! records its outcome

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use imdb_smoke_common::{Outcome, ResultRecorder, StorePort, TestCaseRecord};

use crate::error::{E2eError, E2eResult};
use crate::session::{wait_for, DriverSession, SessionProvider, WaitOptions};
use crate::spec::{CheckSpec, CheckStep};
use crate::suite::IMDB_BASE_URL;

/// Result of running a single check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub record: TestCaseRecord,
    pub duration_ms: u64,
    pub steps_completed: usize,
}

impl CheckResult {
    pub fn passed(&self) -> bool {
        self.record.status.is_pass()
    }
}

/// Result of running a list of checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<CheckResult>,
}

impl SuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }
}

/// Runner settings
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Base URL that relative `navigate` targets are joined to
    pub base_url: String,

    /// Timeout used by `wait` steps that do not set their own
    pub wait: WaitOptions,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            base_url: IMDB_BASE_URL.to_string(),
            wait: WaitOptions::default(),
        }
    }
}

/// Runs checks sequentially, one browser session per check.
///
/// A failing step fails only its own check; the failure text becomes the
/// record's actual result. Failing to open a session or to write the results
/// store aborts the run.
pub struct CheckRunner<P: SessionProvider, S: StorePort> {
    provider: P,
    recorder: ResultRecorder<S>,
    options: RunnerOptions,
    cancel: CancellationToken,
}

impl<P: SessionProvider, S: StorePort> CheckRunner<P, S> {
    pub fn new(provider: P, recorder: ResultRecorder<S>, options: RunnerOptions) -> Self {
        Self {
            provider,
            recorder,
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned token, e.g. one cancelled on Ctrl-C
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn recorder(&self) -> &ResultRecorder<S> {
        &self.recorder
    }

    /// Run a list of checks in order
    pub async fn run_checks(&self, specs: &[CheckSpec]) -> E2eResult<SuiteResult> {
        let start = Instant::now();
        let mut results = Vec::new();
        let mut passed = 0;
        let mut failed = 0;
        let mut skipped = 0;

        info!("Running {} check(s) against {}", specs.len(), self.options.base_url);

        for spec in specs {
            if self.cancel.is_cancelled() {
                warn!("Run cancelled; skipping {}", spec.id);
                skipped += 1;
                continue;
            }

            let result = self.run_check(spec).await?;
            if result.passed() {
                passed += 1;
                info!("✓ {} ({} ms)", result.record.id, result.duration_ms);
            } else {
                failed += 1;
                error!("✗ {} - {}", result.record.id, result.record.actual);
            }
            results.push(result);
        }

        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Check results: {} passed, {} failed, {} skipped ({} ms)",
            passed, failed, skipped, duration_ms
        );

        Ok(SuiteResult {
            total: specs.len(),
            passed,
            failed,
            skipped,
            duration_ms,
            results,
        })
    }

    /// Run a single check and record its outcome
    pub async fn run_check(&self, spec: &CheckSpec) -> E2eResult<CheckResult> {
        let start = Instant::now();
        let case = spec.test_case();
        debug!("Running check: {} ({})", spec.id, spec.description);

        let mut session = self.provider.open().await?;

        let (outcome, steps_completed) = self.execute(&mut session, spec).await;

        // The session is released whatever the outcome
        if let Err(e) = session.close().await {
            warn!("Failed to close session for {}: {}", spec.id, e);
        }

        let record = case.conclude(&outcome);
        self.recorder.record(&record)?;

        Ok(CheckResult {
            record,
            duration_ms: start.elapsed().as_millis() as u64,
            steps_completed,
        })
    }

    /// Execute the steps of a check, stopping at the first failure
    async fn execute(&self, session: &mut P::Session, spec: &CheckSpec) -> (Outcome, usize) {
        let mut observed: Option<String> = None;

        for (index, step) in spec.steps.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return (
                    Outcome::fail(format!("Cancelled before step {}", step.label())),
                    index,
                );
            }

            debug!("{} step {}: {}", spec.id, index + 1, step.label());
            match self.execute_step(session, step).await {
                Ok(Some(observation)) => observed = Some(observation),
                Ok(None) => {}
                Err(e) => {
                    debug!("{} failed at {}: {}", spec.id, step.label(), e);
                    return (Outcome::fail(failure_text(e)), index);
                }
            }
        }

        let observed = observed.unwrap_or_else(|| "All steps completed".to_string());
        (Outcome::pass(observed), spec.steps.len())
    }

    /// Execute one step; assertions return what they observed
    async fn execute_step(
        &self,
        session: &mut P::Session,
        step: &CheckStep,
    ) -> E2eResult<Option<String>> {
        match step {
            CheckStep::Navigate { url } => {
                let url = resolve_url(&self.options.base_url, url);
                session.navigate(&url).await?;
                Ok(None)
            }
            CheckStep::Fill { selector, value } => {
                let element = session.find(selector).await?;
                session.send_keys(&element, value).await?;
                Ok(None)
            }
            CheckStep::Press { selector, key } => {
                let element = session.find(selector).await?;
                session.press(&element, *key).await?;
                Ok(None)
            }
            CheckStep::Click { selector } => {
                let element = session.find(selector).await?;
                session.click(&element).await?;
                Ok(None)
            }
            CheckStep::Wait { selector, timeout_ms } => {
                let options = match timeout_ms {
                    Some(ms) => WaitOptions {
                        timeout: Duration::from_millis(*ms),
                        ..self.options.wait
                    },
                    None => self.options.wait,
                };
                wait_for(session, selector, options, &self.cancel).await?;
                Ok(None)
            }
            CheckStep::Sleep { ms } => {
                tokio::select! {
                    _ = self.cancel.cancelled() => {
                        Err(E2eError::Cancelled(format!("sleep {} ms", ms)))
                    }
                    _ = tokio::time::sleep(Duration::from_millis(*ms)) => Ok(None),
                }
            }
            CheckStep::AssertTitle { contains, message } => {
                let title = session.title().await?;
                if title.contains(contains.as_str()) {
                    Ok(Some(format!("Title \"{}\" contains \"{}\"", title, contains)))
                } else {
                    Err(E2eError::AssertionFailed(message.clone().unwrap_or_else(|| {
                        format!("Title \"{}\" does not contain \"{}\"", title, contains)
                    })))
                }
            }
            CheckStep::AssertVisible { selector, message } => {
                let element = session.find(selector).await?;
                if session.is_displayed(&element).await? {
                    Ok(Some(format!("{} is displayed", selector)))
                } else {
                    Err(E2eError::AssertionFailed(
                        message
                            .clone()
                            .unwrap_or_else(|| format!("{} is not displayed", selector)),
                    ))
                }
            }
            CheckStep::AssertText {
                selector,
                contains,
                message,
            } => {
                let element = session.find(selector).await?;
                let text = session.text(&element).await?;
                if text.contains(contains.as_str()) {
                    Ok(Some(format!("{} text contains \"{}\"", selector, contains)))
                } else {
                    Err(E2eError::AssertionFailed(message.clone().unwrap_or_else(|| {
                        format!("{} text \"{}\" does not contain \"{}\"", selector, text, contains)
                    })))
                }
            }
            CheckStep::Log { message } => {
                info!("[CHECK LOG] {}", message);
                Ok(None)
            }
        }
    }
}

/// Text written to the results sheet for a failed step. Assertion messages
/// are written as-is; other errors use their display form.
fn failure_text(error: E2eError) -> String {
    match error {
        E2eError::AssertionFailed(message) => message,
        other => other.to_string(),
    }
}

/// Join a relative URL onto `base`; absolute URLs pass through
pub fn resolve_url(base: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            url.trim_start_matches('/')
        )
    }
}
