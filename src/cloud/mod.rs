//! Object storage integration for archive uploads.
//!
//! The pipeline only talks to storage through the [`store::ObjectStore`]
//! trait. [`s3::S3ObjectStore`] is the production implementation; tests swap
//! in in-memory fakes or mocks.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │ Scratch archive │────▶│ ThrottledReader │────▶│   ObjectStore   │
//! └─────────────────┘     └─────────────────┘     └────────┬────────┘
//!                                                          │
//!                                            ┌─────────────┴─────────────┐
//!                                            │                           │
//!                                      ┌─────▼──────┐           ┌────────▼───────┐
//!                                      │ PutObject  │           │ Multipart      │
//!                                      │ (≤ 50 MiB) │           │ (8 MiB parts)  │
//!                                      └────────────┘           └────────────────┘
//! ```
//!
//! ## Usage Example
//!
//! ```no_run
//! use s3_archiver::cloud::s3::S3ObjectStore;
//! use s3_archiver::cloud::store::ObjectStore;
//! use s3_archiver::config::Settings;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let settings = Settings::from_env()?;
//! let store = S3ObjectStore::new(&settings)?;
//! if !store.bucket_exists().await? {
//!     anyhow::bail!("bucket {} is missing", store.bucket());
//! }
//! # Ok(())
//! # }
//! ```

/// Object store capability trait and request types
pub mod store;

/// Amazon S3 implementation of the object store
pub mod s3;

/// Client construction for AWS services
pub mod client;
