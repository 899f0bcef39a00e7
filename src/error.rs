//! Error taxonomy for an archival run.
//!
//! `ConfigError`, `PreflightError` and `RunError` are fatal: they stop the
//! run before any file is archived. `ArchiveError` and `UploadError` are
//! per-file and are folded into the run result by the pipeline driver.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required setting {0}")]
    MissingSetting(&'static str),

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidSetting {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to load settings file {path}: {reason}")]
    SettingsFile { path: PathBuf, reason: String },
}

#[derive(Error, Debug)]
pub enum PreflightError {
    #[error("Credential check failed: {0}")]
    Credentials(String),

    #[error("Bucket '{0}' does not exist")]
    BucketMissing(String),

    #[error("Bucket '{bucket}' is unreachable: {reason}")]
    BucketUnreachable { bucket: String, reason: String },

    #[error("Scratch directory {path} is not usable: {source}")]
    ScratchDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Scratch directory {scratch_dir} is inside source directory {source_dir}")]
    ScratchInsideSource {
        scratch_dir: PathBuf,
        source_dir: PathBuf,
    },
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Source directory {0} does not exist")]
    NotFound(PathBuf),

    #[error("Source path {0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("Source directory {0} contains no regular files")]
    EmptySource(PathBuf),

    #[error("Failed to read source directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that end a run before any file is processed.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Failed to create run scratch directory under {path}: {source}")]
    Scratch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
#[error("Failed to archive {path}: {reason}")]
pub struct ArchiveError {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Error, Debug)]
pub enum UploadError {
    /// No body bytes left the machine.
    #[error("Upload of {key} never started: {reason}")]
    NotStarted { key: String, reason: String },

    /// Some bytes were sent before the transfer failed.
    #[error("Upload of {key} interrupted after {bytes_sent} bytes: {reason}")]
    Interrupted {
        key: String,
        bytes_sent: u64,
        reason: String,
    },

    #[error("Upload of {key} could not be verified: {reason}")]
    VerificationFailed { key: String, reason: String },
}

impl UploadError {
    pub fn key(&self) -> &str {
        match self {
            UploadError::NotStarted { key, .. }
            | UploadError::Interrupted { key, .. }
            | UploadError::VerificationFailed { key, .. } => key,
        }
    }

    /// Short label used in logs and the run summary.
    pub fn stage(&self) -> &'static str {
        match self {
            UploadError::NotStarted { .. } => "not_started",
            UploadError::Interrupted { .. } => "interrupted",
            UploadError::VerificationFailed { .. } => "verification",
        }
    }
}
