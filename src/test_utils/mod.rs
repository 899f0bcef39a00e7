//! Test utilities shared by unit tests.

#![cfg(test)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

use crate::constants::SECONDS_PER_DAY;

/// Creates a temporary directory that is automatically cleaned up
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates `root/relative` with `content`, backdated by `age` from now.
pub fn create_file_with_age(root: &Path, relative: &str, content: &[u8], age: Duration) -> Result<PathBuf> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, content)?;

    let modified = SystemTime::now() - age;
    fs::File::options().write(true).open(&path)?.set_modified(modified)?;
    Ok(path)
}

/// Creates `root/relative` last modified `days` whole days ago, plus an hour
/// of slack so the age does not straddle a day boundary during the test.
pub fn create_aged_file(root: &Path, relative: &str, content: &[u8], days: u64) -> Result<PathBuf> {
    let age = Duration::from_secs(days * SECONDS_PER_DAY as u64 + 3600);
    create_file_with_age(root, relative, content, age)
}

/// Test data generators for common types
pub mod generators {
    use chrono::{DateTime, Utc};
    use std::path::Path;

    use crate::models::SourceFile;

    /// A `SourceFile` under `/data/files` with the given modification time
    pub fn source_file(relative: &str, modified: DateTime<Utc>) -> SourceFile {
        SourceFile {
            path: Path::new("/data/files").join(relative),
            relative_path: relative.to_string(),
            modified,
            size: 1024,
        }
    }
}
