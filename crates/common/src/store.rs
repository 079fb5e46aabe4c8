//! Result store ports
//!
//! The recorder never touches the filesystem directly; it reads and writes
//! through a [`StorePort`]. [`CsvFileStore`] is the results sheet on disk,
//! [`MemoryStore`] keeps rows in memory for tests.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::record::{TestCaseRecord, COLUMNS};

/// Read/write access to a persisted sequence of records
pub trait StorePort: Send + Sync {
    /// Load all records in stored order.
    ///
    /// Returns `Ok(None)` when no store exists yet. That is the normal
    /// first-run condition, not an error.
    fn load(&self) -> Result<Option<Vec<TestCaseRecord>>>;

    /// Replace the stored contents with `records`, in order
    fn save(&self, records: &[TestCaseRecord]) -> Result<()>;

    /// Human-readable location, used in logs
    fn location(&self) -> String;
}

/// Results sheet stored as a CSV file with a header row
#[derive(Debug, Clone)]
pub struct CsvFileStore {
    path: PathBuf,
}

impl CsvFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorePort for CsvFileStore {
    fn load(&self) -> Result<Option<Vec<TestCaseRecord>>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No results sheet at {} yet", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(file);

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            // Zero-byte file
            return Ok(Some(Vec::new()));
        }
        if !headers.iter().eq(COLUMNS.iter().copied()) {
            return Err(Error::UnexpectedHeader {
                path: self.path.display().to_string(),
                found: headers.iter().collect::<Vec<_>>().join(", "),
            });
        }

        let mut records = Vec::new();
        for row in reader.deserialize() {
            let record: TestCaseRecord = row?;
            records.push(record);
        }

        debug!("Loaded {} record(s) from {}", records.len(), self.path.display());
        Ok(Some(records))
    }

    fn save(&self, records: &[TestCaseRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.path)?;

        writer.write_record(COLUMNS)?;
        for record in records {
            writer.write_record(record.fields())?;
        }
        writer.flush()?;

        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory store; starts absent unless seeded
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<Option<Vec<TestCaseRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `records`
    pub fn seeded(records: Vec<TestCaseRecord>) -> Self {
        Self {
            rows: Mutex::new(Some(records)),
        }
    }

    /// Current rows, or `None` if nothing was ever saved
    pub fn snapshot(&self) -> Option<Vec<TestCaseRecord>> {
        self.rows.lock().clone()
    }
}

impl StorePort for MemoryStore {
    fn load(&self) -> Result<Option<Vec<TestCaseRecord>>> {
        Ok(self.rows.lock().clone())
    }

    fn save(&self, records: &[TestCaseRecord]) -> Result<()> {
        *self.rows.lock() = Some(records.to_vec());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
