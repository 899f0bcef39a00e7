use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

use crate::constants::{ARCHIVE_EXTENSION, RUN_TIMESTAMP_FORMAT, SECONDS_PER_DAY};

/// A regular file discovered under the source root.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Path relative to the source root, `/`-separated
    pub relative_path: String,
    pub modified: DateTime<Utc>,
    pub size: u64,
}

impl SourceFile {
    /// Base name of the file, used as the single archive entry.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.relative_path.clone())
    }

    /// Whole days since last modification, rounded down.
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.modified).num_seconds().div_euclid(SECONDS_PER_DAY)
    }
}

/// Timestamp shared by every key written during one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTimestamp(String);

impl RunTimestamp {
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(time: DateTime<Utc>) -> Self {
        RunTimestamp(time.format(RUN_TIMESTAMP_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Destination key for one archive: `<prefix>/<run-timestamp>/<relative-path>.zip`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    key: String,
}

impl UploadTarget {
    pub fn new(prefix: &str, run: &RunTimestamp, file: &SourceFile) -> Self {
        let prefix = prefix.trim_matches('/');
        let relative = file.relative_path.trim_start_matches('/');
        let key = if prefix.is_empty() {
            format!("{}/{}.{}", run.as_str(), relative, ARCHIVE_EXTENSION)
        } else {
            format!("{}/{}/{}.{}", prefix, run.as_str(), relative, ARCHIVE_EXTENSION)
        };
        UploadTarget { key }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Terminal state of one file in a run.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FileOutcome {
    /// Uploaded and the original deleted
    Retired,
    /// Uploaded and the original kept because it is too young
    Retained,
    ArchiveFailed,
    UploadFailed,
    /// Uploaded but the original could not be deleted
    RetireFailed,
}

impl FileOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            FileOutcome::ArchiveFailed | FileOutcome::UploadFailed | FileOutcome::RetireFailed
        )
    }
}

/// What happened to one file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub relative_path: String,
    pub outcome: FileOutcome,
    pub key: Option<String>,
    pub bytes_uploaded: u64,
    pub age_days: Option<i64>,
    pub error: Option<String>,
}

/// Aggregate result of a run.
///
/// The failure flag is only ever set, never cleared.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub run_timestamp: String,
    pub files: Vec<FileReport>,
    failed: bool,
}

impl RunResult {
    pub fn new(run: &RunTimestamp) -> Self {
        RunResult {
            run_timestamp: run.as_str().to_string(),
            files: Vec::new(),
            failed: false,
        }
    }

    pub fn record(&mut self, report: FileReport) {
        self.failed |= report.outcome.is_failure();
        self.files.push(report);
    }

    pub fn is_success(&self) -> bool {
        !self.failed
    }

    pub fn count(&self, outcome: FileOutcome) -> usize {
        self.files.iter().filter(|f| f.outcome == outcome).count()
    }

    pub fn failure_count(&self) -> usize {
        self.files.iter().filter(|f| f.outcome.is_failure()).count()
    }

    pub fn bytes_uploaded(&self) -> u64 {
        self.files.iter().map(|f| f.bytes_uploaded).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn source(relative: &str, modified: DateTime<Utc>) -> SourceFile {
        SourceFile {
            path: PathBuf::from("/data/files").join(relative),
            relative_path: relative.to_string(),
            modified,
            size: 10,
        }
    }

    fn report(outcome: FileOutcome) -> FileReport {
        FileReport {
            relative_path: "a.log".to_string(),
            outcome,
            key: None,
            bytes_uploaded: 100,
            age_days: None,
            error: None,
        }
    }

    #[test]
    fn test_upload_target_key_format() {
        let run = RunTimestamp::at(Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 52).unwrap());
        let file = source("logs/app/server.log", Utc::now());

        assert_eq!(run.as_str(), "20240115-143052");
        assert_eq!(
            UploadTarget::new("uploads", &run, &file).key(),
            "uploads/20240115-143052/logs/app/server.log.zip"
        );
        assert_eq!(
            UploadTarget::new("/backups/db/", &run, &file).key(),
            "backups/db/20240115-143052/logs/app/server.log.zip"
        );
        assert_eq!(
            UploadTarget::new("", &run, &file).key(),
            "20240115-143052/logs/app/server.log.zip"
        );
    }

    #[test]
    fn test_age_days_floors() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        let file = source("a", now - Duration::days(10) + Duration::seconds(1));
        assert_eq!(file.age_days(now), 9);

        let file = source("a", now - Duration::days(10));
        assert_eq!(file.age_days(now), 10);

        // Modification times in the future count as negative age
        let file = source("a", now + Duration::hours(1));
        assert_eq!(file.age_days(now), -1);
    }

    #[test]
    fn test_file_name_is_base_name() {
        let file = source("nested/dir/report.csv", Utc::now());
        assert_eq!(file.file_name(), "report.csv");
    }

    #[test]
    fn test_run_result_failure_is_sticky() {
        let run = RunTimestamp::now();
        let mut result = RunResult::new(&run);
        assert!(result.is_success());

        result.record(report(FileOutcome::Retained));
        assert!(result.is_success());

        result.record(report(FileOutcome::UploadFailed));
        result.record(report(FileOutcome::Retired));
        assert!(!result.is_success());

        assert_eq!(result.count(FileOutcome::Retired), 1);
        assert_eq!(result.failure_count(), 1);
        assert_eq!(result.bytes_uploaded(), 300);
    }

    #[test]
    fn test_outcome_serializes_snake_case() {
        let json = serde_json::to_string(&FileOutcome::ArchiveFailed).unwrap();
        assert_eq!(json, "\"archive_failed\"");
    }
}
