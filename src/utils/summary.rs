use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use serde_json::json;

use crate::models::{FileOutcome, RunResult};

/// Create a JSON summary of an archival run.
///
/// # Example Output
///
/// ```json
/// {
///   "run_timestamp": "20240115-143052",
///   "bucket": "archive-bucket",
///   "prefix": "uploads",
///   "success": false,
///   "totals": { "files": 3, "retired": 1, "retained": 1, "failed": 1, "bytes_uploaded": 5120 },
///   "files": [...]
/// }
/// ```
pub fn create_run_summary(result: &RunResult, bucket: &str, prefix: &str) -> Result<String> {
    let summary = json!({
        "run_timestamp": result.run_timestamp,
        "bucket": bucket,
        "prefix": prefix,
        "archiver_version": env!("CARGO_PKG_VERSION"),
        "success": result.is_success(),
        "totals": {
            "files": result.files.len(),
            "retired": result.count(FileOutcome::Retired),
            "retained": result.count(FileOutcome::Retained),
            "failed": result.failure_count(),
            "bytes_uploaded": result.bytes_uploaded(),
        },
        "files": result.files,
    });

    serde_json::to_string_pretty(&summary).context("Failed to serialize run summary to JSON")
}

/// Write the run summary to `path`.
pub fn write_run_summary(path: &Path, result: &RunResult, bucket: &str, prefix: &str) -> Result<()> {
    let summary = create_run_summary(result, bucket, prefix)?;
    fs::write(path, summary)
        .context(format!("Failed to write run summary to {}", path.display()))?;
    info!("Wrote run summary to {}", path.display());
    Ok(())
}

/// Log the end-of-run totals.
pub fn log_run_totals(result: &RunResult) {
    info!(
        "Run {} finished: {} files, {} retired, {} retained, {} failed, {} bytes uploaded",
        result.run_timestamp,
        result.files.len(),
        result.count(FileOutcome::Retired),
        result.count(FileOutcome::Retained),
        result.failure_count(),
        result.bytes_uploaded()
    );

    for report in result.files.iter().filter(|r| r.outcome.is_failure()) {
        warn!(
            "  {} ended in {:?}: {}",
            report.relative_path,
            report.outcome,
            report.error.as_deref().unwrap_or("no detail")
        );
    }
}
