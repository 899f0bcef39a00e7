//! Building blocks shared by the archival pipeline.
//!
//! ## Components
//!
//! - **Compression**: single-entry ZIP archives behind the [`compress::Compressor`] trait
//! - **Hashing**: SHA-256 of finished archives for upload verification
//! - **Throttle**: token-bucket rate limiting applied to a byte stream
//! - **Summary**: end-of-run totals and the JSON run report
//!
//! ### Rate limiting a reader
//!
//! ```no_run
//! use s3_archiver::config::Bandwidth;
//! use s3_archiver::utils::throttle::ThrottledReader;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let file = tokio::fs::File::open("/tmp/archive.zip").await?;
//! let bandwidth: Bandwidth = "2Mb/s".parse().map_err(anyhow::Error::msg)?;
//! let reader = ThrottledReader::new(file, bandwidth);
//! println!("{} bytes read so far", reader.bytes_read());
//! # Ok(())
//! # }
//! ```

/// Run summary generation and reporting
pub mod summary;

/// File compression and ZIP archive creation
pub mod compress;

/// Cryptographic hash calculation utilities
pub mod hash;

/// Token-bucket bandwidth throttling
pub mod throttle;
