//! imdb-smoke E2E checks
//!
//! This crate drives a real browser against IMDb and records each check in
//! the cumulative results sheet:
//! - Spawns geckodriver (or uses an external WebDriver server)
//! - Opens one browser session per check and always closes it
//! - Parses declarative YAML check specs (a built-in IMDb suite is embedded)
//! - Converts each check's outcome into a Pass/Fail row via the recorder
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   CheckRunner<P, S>                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  P: SessionProvider ──open()──► DriverSession               │
//! │       navigate / title / locate / click / send_keys / close │
//! │  wait_for(selector, timeout, cancel)  (condition polling)   │
//! │  S: StorePort ──► ResultRecorder ──► test_results.csv       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CheckSpec (YAML)                                           │
//! │    ├── id, description, expected, tags                      │
//! │    └── steps: navigate | fill | press | click | wait |      │
//! │               sleep | assert_title | assert_visible |       │
//! │               assert_text | log                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod report;
pub mod runner;
pub mod selector;
pub mod server;
pub mod session;
pub mod spec;
pub mod suite;
pub mod webdriver;

pub use config::SmokeConfig;
pub use error::{E2eError, E2eResult};
pub use runner::{CheckResult, CheckRunner, RunnerOptions, SuiteResult};
pub use selector::{Selector, Strategy};
pub use session::{wait_for, DriverSession, Key, SessionProvider, WaitOptions};
pub use spec::{CheckSpec, CheckStep};
