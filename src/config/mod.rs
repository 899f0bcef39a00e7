// Re-export all items from the submodules
mod bandwidth;
mod settings;

// Re-export bandwidth parsing
pub use bandwidth::Bandwidth;

// Re-export settings and the names of the variables they are read from
pub use settings::{
    AwsCredentials,
    Settings,
    load_settings_file,
    AWS_ACCESS_KEY_ID,
    AWS_SECRET_ACCESS_KEY,
    AWS_DEFAULT_REGION,
    S3_BUCKET,
    S3_ENDPOINT,
    S3_PREFIX,
    S3_STORAGE_CLASS,
    SOURCE_DIR,
    VERIFY_UPLOAD,
    MIN_FILE_AGE_DAYS,
    TEMP_DIR,
    MAX_BANDWIDTH,
};
