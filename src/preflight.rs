//! One-time checks that gate a run.
//!
//! Nothing here touches source files. Every check must pass before the
//! pipeline starts.

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::cloud::store::ObjectStore;
use crate::config::Settings;
use crate::error::PreflightError;
use crate::security::scrub_credentials;

/// Verify credentials, bucket and scratch directory, returning the caller identity.
pub async fn run_preflight(settings: &Settings, store: &dyn ObjectStore) -> Result<String, PreflightError> {
    let identity = store
        .identity()
        .await
        .map_err(|e| PreflightError::Credentials(scrub_credentials(&format!("{:#}", e))))?;
    info!("Authenticated as {}", identity);

    match store.bucket_exists().await {
        Ok(true) => info!("Bucket {} is reachable", store.bucket()),
        Ok(false) => return Err(PreflightError::BucketMissing(store.bucket().to_string())),
        Err(e) => {
            return Err(PreflightError::BucketUnreachable {
                bucket: store.bucket().to_string(),
                reason: scrub_credentials(&format!("{:#}", e)),
            })
        }
    }

    check_scratch_outside_source(&settings.temp_dir, &settings.source_dir)?;
    check_scratch_dir(&settings.temp_dir)?;
    info!("Scratch directory {} is writable", settings.temp_dir.display());
    Ok(identity)
}

/// Refuse a scratch directory that is the source directory or lies below it.
///
/// Neither path has to exist yet. Both are compared after resolving symlinks
/// on the part of each path that does exist.
pub fn check_scratch_outside_source(scratch: &Path, source: &Path) -> Result<(), PreflightError> {
    let scratch_dir = resolve(scratch);
    let source_dir = resolve(source);
    if scratch_dir.starts_with(&source_dir) {
        return Err(PreflightError::ScratchInsideSource { scratch_dir, source_dir });
    }
    Ok(())
}

fn resolve(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    loop {
        if let Ok(canonical) = fs::canonicalize(existing) {
            return missing.iter().rev().fold(canonical, |acc, part| acc.join(part));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return absolute,
        }
    }
}

/// Create the scratch directory if needed and prove a file can be written there.
pub fn check_scratch_dir(dir: &Path) -> Result<(), PreflightError> {
    let scratch_error = |source| PreflightError::ScratchDir {
        path: dir.to_path_buf(),
        source,
    };

    fs::create_dir_all(dir).map_err(scratch_error)?;

    let probe = dir.join(format!(".s3-archiver-probe-{}", std::process::id()));
    let written = fs::File::create(&probe).and_then(|mut file| {
        file.write_all(b"probe")?;
        file.sync_all()
    });
    let removed = fs::remove_file(&probe);
    written.map_err(scratch_error)?;
    removed.map_err(scratch_error)?;

    debug!("Scratch probe {} written and removed", probe.display());
    Ok(())
}
