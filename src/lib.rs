//! # s3-archiver
//!
//! Scheduled archival of local files to Amazon S3.
//!
//! ## Overview
//!
//! Each run walks a source directory oldest file first. Every file is zipped on
//! its own into a scratch directory, streamed to S3 through a bandwidth
//! throttle under `<prefix>/<run-timestamp>/<relative-path>.zip`, and, once
//! the upload is confirmed, the original is deleted if it is at least
//! `MIN_FILE_AGE_DAYS` old. A failure on one file never stops the run; it only
//! makes the run as a whole fail at the end.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use s3_archiver::cloud::s3::S3ObjectStore;
//! use s3_archiver::config::Settings;
//! use s3_archiver::pipeline::Pipeline;
//! use s3_archiver::preflight::run_preflight;
//! use s3_archiver::utils::compress::ZipCompressor;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let settings = Settings::from_env()?;
//! let store = Arc::new(S3ObjectStore::new(&settings)?);
//! run_preflight(&settings, store.as_ref()).await?;
//!
//! let pipeline = Pipeline::new(&settings, store, Arc::new(ZipCompressor));
//! let result = pipeline.run().await?;
//! println!("run succeeded: {}", result.is_success());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`cli`]: Command-line interface definitions
//! - [`config`]: Settings from the environment and bandwidth parsing
//! - [`models`]: Source files, upload targets and run results
//! - [`pipeline`]: Enumeration, archiving, throttled upload and retention
//! - [`cloud`]: Object store trait and the S3 implementation
//! - [`preflight`]: Startup checks gating a run
//! - [`utils`]: Compression, hashing, throttling and run summaries
//! - [`security`]: Credential scrubbing for logs
//! - [`error`]: Error taxonomy
//! - [`constants`]: Application-wide constants

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Core data models and structures used throughout the application
pub mod models;

/// Utility functions for compression, hashing, and throttling
pub mod utils;

/// Object storage integration
pub mod cloud;

/// Settings loading and validation
pub mod config;

/// The per-file archival pipeline
pub mod pipeline;

/// Startup checks
pub mod preflight;

/// Error types for fatal and per-file failures
pub mod error;

/// Application constants and configuration values
pub mod constants;

/// Security utilities for credential protection
pub mod security;

/// Test utilities and helpers
#[cfg(test)]
pub mod test_utils;
