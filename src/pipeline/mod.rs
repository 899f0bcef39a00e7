//! The per-file archival pipeline.
//!
//! ```text
//! Discovered ──archive──▶ Archived ──upload──▶ Uploaded ──retention──▶ Retired
//!     │                      │                    │
//!     ▼                      ▼                    ├──▶ Retained
//! ArchiveFailed         UploadFailed              └──▶ RetireFailed
//! ```

/// Source directory walk, oldest first
pub mod enumerate;

/// Single-file ZIP archives in the scratch directory
pub mod archive;

/// Throttled, optionally verified upload of one archive
pub mod upload;

/// Age-based deletion rule for originals
pub mod retention;

/// Run loop tying the stages together
pub mod driver;

pub use archive::{Archiver, ScratchArchive};
pub use driver::Pipeline;
pub use enumerate::enumerate_source;
pub use retention::{RetentionDecision, RetentionPolicy};
pub use upload::{ThrottledUploader, UploadReceipt};
