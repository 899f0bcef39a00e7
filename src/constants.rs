//! Global constants for the s3-archiver application.
//!
//! This module centralizes all hardcoded values to improve maintainability
//! and make configuration changes easier.

// Buffer size constants
/// Chunk size for compression operations (512KB)
pub const COMPRESSION_CHUNK_SIZE: usize = 512 * 1024;

/// Buffer size for streaming reads into upload bodies (64KB)
pub const STREAMING_BUFFER_SIZE: usize = 64 * 1024;

/// Buffer size used while hashing archives (1MB)
pub const HASH_BUFFER_SIZE: usize = 1024 * 1024;

// Cloud storage constants
/// S3 upload part size (8MB, S3 minimum is 5MB)
pub const S3_UPLOAD_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Large file threshold for multipart uploads (50MB)
pub const LARGE_FILE_THRESHOLD: u64 = 50 * 1024 * 1024;

/// Object metadata key holding the archive's SHA-256 digest
pub const SHA256_METADATA_KEY: &str = "sha256";

/// Content type sent with every archive
pub const ARCHIVE_CONTENT_TYPE: &str = "application/zip";

// Throttle constants
/// Smallest burst the token bucket will grant in one read
pub const THROTTLE_MIN_BURST: u64 = 512;

/// Largest burst the token bucket will grant in one read
pub const THROTTLE_MAX_BURST: u64 = STREAMING_BUFFER_SIZE as u64;

// Large file threshold for compression decisions (100MB)
pub const LARGE_FILE_COMPRESSION_THRESHOLD: u64 = 100 * 1024 * 1024;

// Configuration defaults
/// Default destination prefix inside the bucket
pub const DEFAULT_S3_PREFIX: &str = "uploads";

/// Default source directory name, resolved beside the executable
pub const DEFAULT_SOURCE_SUBDIR: &str = "files";

/// Default minimum age before an uploaded original is deleted
pub const DEFAULT_MIN_FILE_AGE_DAYS: u32 = 10;

/// Default upload bandwidth cap
pub const DEFAULT_MAX_BANDWIDTH: &str = "2Mb/s";

/// Default settings file name, resolved beside the executable
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Format of the per-run timestamp used in destination keys
pub const RUN_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Extension appended to every archive
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Name prefix of the per-run subdirectory created under `TEMP_DIR`
pub const RUN_SCRATCH_PREFIX: &str = "s3-archiver-";

/// Seconds in one day, used for file age computations
pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

// Common file extensions
pub const COMPRESSED_EXTENSIONS: &[&str] = &[
    "zip", "gz", "xz", "bz2", "7z", "rar", "jpg", "jpeg", "png", "gif", "mp3", "mp4", "avi", "mov",
    "mpg", "mpeg",
];
