//! imdb-smoke Common Library
//!
//! Test case records, the result store port and the recorder that appends
//! check outcomes to the cumulative results sheet.

pub mod error;
pub mod record;
pub mod recorder;
pub mod store;

// Re-export commonly used types
pub use error::{Error, Result};
pub use record::{Outcome, Status, TestCase, TestCaseRecord, COLUMNS};
pub use recorder::ResultRecorder;
pub use store::{CsvFileStore, MemoryStore, StorePort};

/// imdb-smoke version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default results sheet, relative to the working directory
pub const DEFAULT_RESULTS_PATH: &str = "test_results.csv";
