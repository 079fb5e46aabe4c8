//! Runner tests against a scripted in-memory browser

mod common;

use std::time::Duration;

use common::{imdb_like_site, FakeElement, FakePage, FakeProvider, FakeSite, NONSENSE_TERM};
use imdb_smoke_common::{MemoryStore, Outcome, ResultRecorder, Status, TestCase};
use imdb_smoke_e2e::suite::builtin_checks;
use imdb_smoke_e2e::{
    CheckRunner, CheckSpec, E2eError, RunnerOptions, SessionProvider, WaitOptions,
};
use tokio_util::sync::CancellationToken;

fn fast_options() -> RunnerOptions {
    RunnerOptions {
        base_url: "https://www.imdb.com".to_string(),
        wait: WaitOptions {
            timeout: Duration::from_millis(200),
            interval: Duration::from_millis(5),
        },
    }
}

fn runner(provider: FakeProvider, store: MemoryStore) -> CheckRunner<FakeProvider, MemoryStore> {
    CheckRunner::new(provider, ResultRecorder::new(store), fast_options())
}

fn check(yaml: &str) -> CheckSpec {
    CheckSpec::from_yaml(yaml).unwrap()
}

const TITLE_CHECK: &str = r#"
id: TC001
description: Verify the IMDb homepage loads
expected: Page title contains "IMDb"
steps:
  - action: navigate
    url: /
  - action: assert_title
    contains: IMDb
    message: IMDb homepage did not load!
"#;

const MISSING_ELEMENT_CHECK: &str = r#"
id: TC099
description: Verify X
expected: Y should hold
steps:
  - action: navigate
    url: /
  - action: click
    selector: id=does-not-exist
"#;

#[tokio::test]
async fn passing_check_records_pass_with_observation() {
    let runner = runner(FakeProvider::new(imdb_like_site()), MemoryStore::new());

    let result = runner.run_check(&check(TITLE_CHECK)).await.unwrap();

    assert!(result.passed());
    let rows = runner.recorder().records().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, "TC001");
    assert_eq!(rows[0].status, Status::Pass);
    assert!(rows[0].actual.contains("IMDb"));
}

#[tokio::test]
async fn failed_step_records_fail_and_run_continues() {
    let runner = runner(FakeProvider::new(imdb_like_site()), MemoryStore::new());
    let checks = vec![check(MISSING_ELEMENT_CHECK), check(TITLE_CHECK)];

    let suite = runner.run_checks(&checks).await.unwrap();

    assert_eq!((suite.passed, suite.failed, suite.skipped), (1, 1, 0));
    assert!(!suite.success());

    let rows = runner.recorder().records().unwrap();
    let expected_fail = TestCase::new("TC099", "Verify X", "Y should hold")
        .conclude(&Outcome::fail("Element not found: id=does-not-exist"));
    assert_eq!(rows[0], expected_fail);
    assert_eq!(rows[1].id, "TC001");
    assert_eq!(rows[1].status, Status::Pass);
}

#[tokio::test]
async fn assertion_message_becomes_actual_result() {
    let site = FakeSite::default().with_page(
        "https://www.imdb.com/",
        FakePage::titled("Service Unavailable"),
    );
    let runner = runner(FakeProvider::new(site), MemoryStore::new());

    let result = runner.run_check(&check(TITLE_CHECK)).await.unwrap();

    assert_eq!(result.record.status, Status::Fail);
    assert_eq!(result.record.actual, "IMDb homepage did not load!");
    assert_eq!(result.steps_completed, 1);
}

#[tokio::test]
async fn hidden_element_fails_visibility_assertion() {
    let site = FakeSite::default().with_page(
        "https://www.imdb.com/",
        FakePage::titled("IMDb").with("id=suggestion-search", FakeElement::hidden("")),
    );
    let runner = runner(FakeProvider::new(site), MemoryStore::new());
    let spec = check(
        r#"
id: TC002
description: Search box
expected: displayed
steps:
  - action: navigate
    url: /
  - action: assert_visible
    selector: id=suggestion-search
"#,
    );

    let result = runner.run_check(&spec).await.unwrap();
    assert_eq!(result.record.actual, "id=suggestion-search is not displayed");
}

#[tokio::test]
async fn session_is_closed_after_every_check() {
    let provider = FakeProvider::new(imdb_like_site());
    let log = provider.log.clone();
    let runner = runner(provider, MemoryStore::new());
    let checks = vec![check(TITLE_CHECK), check(MISSING_ELEMENT_CHECK), check(TITLE_CHECK)];

    runner.run_checks(&checks).await.unwrap();

    let actions = log.lock().clone();
    let opens = actions.iter().filter(|a| *a == "open").count();
    let closes = actions.iter().filter(|a| *a == "close").count();
    assert_eq!(opens, 3);
    assert_eq!(closes, 3);
    assert_eq!(actions.last().map(String::as_str), Some("close"));
}

#[tokio::test]
async fn session_open_failure_aborts_the_run() {
    let runner = runner(FakeProvider::failing(), MemoryStore::new());

    let err = runner.run_checks(&[check(TITLE_CHECK)]).await.unwrap_err();

    assert!(matches!(err, E2eError::SessionOpen(_)));
    assert!(runner.recorder().port().snapshot().is_none());
}

#[tokio::test]
async fn existing_rows_are_kept_ahead_of_new_ones() {
    let earlier = TestCase::new("TC000", "Earlier run", "ok").conclude(&Outcome::pass("ok"));
    let runner = runner(
        FakeProvider::new(imdb_like_site()),
        MemoryStore::seeded(vec![earlier.clone()]),
    );

    runner.run_checks(&[check(TITLE_CHECK), check(TITLE_CHECK)]).await.unwrap();

    let rows = runner.recorder().records().unwrap();
    let ids: Vec<_> = rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["TC000", "TC001", "TC001"]);
    assert_eq!(rows[0], earlier);
}

#[tokio::test]
async fn cancelled_run_skips_remaining_checks() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let runner = runner(FakeProvider::new(imdb_like_site()), MemoryStore::new())
        .with_cancellation(cancel);

    let suite = runner.run_checks(&[check(TITLE_CHECK), check(TITLE_CHECK)]).await.unwrap();

    assert_eq!(suite.skipped, 2);
    assert!(suite.results.is_empty());
    assert!(runner.recorder().port().snapshot().is_none());
}

#[tokio::test]
async fn cancel_during_wait_fails_current_check_and_skips_the_rest() {
    let site = imdb_like_site().with_page(
        "https://www.imdb.com/slow",
        FakePage::titled("IMDb").with(
            "id=never",
            FakeElement::visible("never").appearing_after(usize::MAX),
        ),
    );
    let cancel = CancellationToken::new();
    let runner = runner(FakeProvider::new(site), MemoryStore::new())
        .with_cancellation(cancel.clone());
    let stuck = check(
        r#"
id: TC050
description: Waits on an element that never shows up
expected: Element appears
steps:
  - action: navigate
    url: /slow
  - action: wait
    selector: id=never
    timeout_ms: 10000
"#,
    );

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        trigger.cancel();
    });

    let suite = runner.run_checks(&[stuck, check(TITLE_CHECK)]).await.unwrap();

    assert_eq!((suite.passed, suite.failed, suite.skipped), (0, 1, 1));
    let rows = runner.recorder().records().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, "TC050");
    assert_eq!(rows[0].status, Status::Fail);
    assert_eq!(rows[0].actual, "Cancelled while waiting for: id=never");
}

#[tokio::test]
async fn cancel_during_sleep_is_recorded_as_failure() {
    let cancel = CancellationToken::new();
    let runner = runner(FakeProvider::new(imdb_like_site()), MemoryStore::new())
        .with_cancellation(cancel.clone());
    let napping = check(
        r#"
id: TC051
description: Sleeps for a long time
expected: Wakes up
steps:
  - action: sleep
    ms: 10000
"#,
    );

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let result = runner.run_check(&napping).await.unwrap();

    assert_eq!(result.record.status, Status::Fail);
    assert_eq!(result.record.actual, "Cancelled while waiting for: sleep 10000 ms");
    assert_eq!(result.steps_completed, 0);
}

#[tokio::test]
async fn check_started_after_cancel_fails_before_first_step() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let provider = FakeProvider::new(imdb_like_site());
    let log = provider.log.clone();
    let runner = runner(provider, MemoryStore::new()).with_cancellation(cancel);

    let result = runner.run_check(&check(TITLE_CHECK)).await.unwrap();

    assert_eq!(result.record.actual, "Cancelled before step navigate:/");
    assert_eq!(result.steps_completed, 0);
    assert_eq!(*log.lock(), ["open", "close"]);
    assert_eq!(runner.recorder().records().unwrap().len(), 1);
}

#[tokio::test]
async fn builtin_suite_passes_on_matching_pages() {
    let provider = FakeProvider::new(imdb_like_site());
    let log = provider.log.clone();
    let runner = runner(provider, MemoryStore::new());

    let checks = builtin_checks().unwrap();
    assert_eq!(checks.len(), 7);
    let suite = runner.run_checks(&checks).await.unwrap();

    for result in &suite.results {
        assert!(result.passed(), "{} failed: {}", result.record.id, result.record.actual);
    }
    assert_eq!(suite.passed, 7);
    assert!(suite.success());

    let actions = log.lock().clone();
    assert!(actions.iter().any(|a| a == "type id=suggestion-search Inception"));
    assert!(actions
        .iter()
        .any(|a| a == &format!("type name=q {}", NONSENSE_TERM)));
    assert!(actions.iter().any(|a| a == "click id=imdbHeader-navDrawerOpen"));

    let ids: Vec<_> = runner
        .recorder()
        .records()
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, ["TC001", "TC002", "TC003", "TC004", "TC005", "TC006", "TC007"]);
}

#[tokio::test]
async fn invalid_search_without_message_times_out_as_failure() {
    let runner = runner(FakeProvider::new(imdb_like_site()), MemoryStore::new());
    let spec = check(
        r#"
id: TC004
description: Invalid search
expected: No results message
steps:
  - action: navigate
    url: /
  - action: wait
    selector: "//*[contains(text(), 'No results found')]"
    timeout_ms: 30
"#,
    );

    let result = runner.run_check(&spec).await.unwrap();

    assert_eq!(result.record.status, Status::Fail);
    assert_eq!(
        result.record.actual,
        "Timeout after 30 ms waiting for: xpath=//*[contains(text(), 'No results found')]"
    );
}

#[tokio::test]
async fn provider_opens_independent_sessions() {
    let provider = FakeProvider::new(imdb_like_site());
    let _first = provider.open().await.unwrap();
    let _second = provider.open().await.unwrap();
    assert_eq!(provider.count("open"), 2);
}
