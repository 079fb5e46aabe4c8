//! Result recorder: appends concluded test cases to the results store

use tracing::{debug, info};

use crate::error::Result;
use crate::record::TestCaseRecord;
use crate::store::StorePort;

/// Appends records to a store through read-modify-write.
///
/// Existing rows keep their position and new rows go after them. Identifiers
/// are not deduplicated, so rerunning a check adds another row. There is no
/// locking: two recorders writing the same store concurrently can lose rows.
pub struct ResultRecorder<P: StorePort> {
    port: P,
}

impl<P: StorePort> ResultRecorder<P> {
    pub fn new(port: P) -> Self {
        Self { port }
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    /// Append one record
    pub fn record(&self, record: &TestCaseRecord) -> Result<()> {
        self.record_all(std::slice::from_ref(record))
    }

    /// Append several records, keeping their order
    pub fn record_all(&self, new_records: &[TestCaseRecord]) -> Result<()> {
        let mut records = self.port.load()?.unwrap_or_default();
        let existing = records.len();
        records.extend_from_slice(new_records);

        self.port.save(&records)?;

        for record in new_records {
            info!(
                id = %record.id,
                status = %record.status,
                "Recorded test case to {}",
                self.port.location()
            );
        }
        debug!("Store now holds {} row(s) ({} existing)", records.len(), existing);
        Ok(())
    }

    /// All stored records; an absent store reads as empty
    pub fn records(&self) -> Result<Vec<TestCaseRecord>> {
        Ok(self.port.load()?.unwrap_or_default())
    }
}
