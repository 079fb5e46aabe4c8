//! Run report: console table and JSON summary

use std::path::{Path, PathBuf};

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use tracing::info;

use crate::error::E2eResult;
use crate::runner::SuiteResult;

/// Summary file name inside the output directory
pub const SUMMARY_FILE: &str = "run-summary.json";

/// Render per-check results as a table
pub fn render_table(suite: &SuiteResult) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec!["ID", "Description", "Status", "Actual Result", "Duration"]);
    for result in &suite.results {
        let record = &result.record;
        table.add_row(vec![
            record.id.clone(),
            record.description.clone(),
            record.status.to_string(),
            record.actual.clone(),
            format!("{} ms", result.duration_ms),
        ]);
    }

    format!(
        "{table}\n{} passed, {} failed, {} skipped ({} ms)",
        suite.passed, suite.failed, suite.skipped, suite.duration_ms
    )
}

/// Write the suite result as pretty JSON
pub fn write_summary(suite: &SuiteResult, output_dir: &Path) -> E2eResult<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let path = output_dir.join(SUMMARY_FILE);
    let json = serde_json::to_string_pretty(suite)?;
    std::fs::write(&path, json)?;

    info!("Run summary written to: {}", path.display());
    Ok(path)
}
