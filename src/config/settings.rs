use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info};
use rusoto_core::Region;

use crate::cloud::store::StorageClass;
use crate::config::bandwidth::Bandwidth;
use crate::constants::{
    DEFAULT_ENV_FILE, DEFAULT_MAX_BANDWIDTH, DEFAULT_MIN_FILE_AGE_DAYS, DEFAULT_S3_PREFIX,
    DEFAULT_SOURCE_SUBDIR,
};
use crate::error::ConfigError;

pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";
pub const S3_BUCKET: &str = "S3_BUCKET";
pub const S3_ENDPOINT: &str = "S3_ENDPOINT";
pub const S3_PREFIX: &str = "S3_PREFIX";
pub const S3_STORAGE_CLASS: &str = "S3_STORAGE_CLASS";
pub const SOURCE_DIR: &str = "SOURCE_DIR";
pub const VERIFY_UPLOAD: &str = "VERIFY_UPLOAD";
pub const MIN_FILE_AGE_DAYS: &str = "MIN_FILE_AGE_DAYS";
pub const TEMP_DIR: &str = "TEMP_DIR";
pub const MAX_BANDWIDTH: &str = "MAX_BANDWIDTH";

/// Static AWS credentials. The secret never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<REDACTED>")
            .finish()
    }
}

/// Validated configuration for one archival run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: AwsCredentials,
    pub region: Region,
    pub bucket: String,
    pub source_dir: PathBuf,
    pub prefix: String,
    pub storage_class: StorageClass,
    pub verify_upload: bool,
    pub min_file_age_days: u32,
    pub temp_dir: PathBuf,
    pub max_bandwidth: Bandwidth,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &'static str| get(key).ok_or(ConfigError::MissingSetting(key));

        let credentials = AwsCredentials {
            access_key_id: required(AWS_ACCESS_KEY_ID)?,
            secret_access_key: required(AWS_SECRET_ACCESS_KEY)?,
        };
        let region_name = required(AWS_DEFAULT_REGION)?;
        let bucket = required(S3_BUCKET)?;

        let region = match get(S3_ENDPOINT) {
            Some(endpoint) => Region::Custom {
                name: region_name,
                endpoint,
            },
            None => region_name
                .parse::<Region>()
                .map_err(|e| ConfigError::InvalidSetting {
                    key: AWS_DEFAULT_REGION,
                    value: region_name.clone(),
                    reason: e.to_string(),
                })?,
        };

        let source_dir = match get(SOURCE_DIR) {
            Some(dir) => PathBuf::from(dir),
            None => beside_executable(DEFAULT_SOURCE_SUBDIR),
        };

        let prefix = get(S3_PREFIX).unwrap_or_else(|| DEFAULT_S3_PREFIX.to_string());

        let storage_class = match get(S3_STORAGE_CLASS) {
            Some(value) => value.parse().map_err(|reason| ConfigError::InvalidSetting {
                key: S3_STORAGE_CLASS,
                value,
                reason,
            })?,
            None => StorageClass::default(),
        };

        let verify_upload = match get(VERIFY_UPLOAD) {
            Some(value) => parse_bool(&value).ok_or_else(|| ConfigError::InvalidSetting {
                key: VERIFY_UPLOAD,
                value,
                reason: "expected true or false".to_string(),
            })?,
            None => true,
        };

        let min_file_age_days = match get(MIN_FILE_AGE_DAYS) {
            Some(value) => value.parse::<u32>().map_err(|_| ConfigError::InvalidSetting {
                key: MIN_FILE_AGE_DAYS,
                value,
                reason: "expected a whole number of days".to_string(),
            })?,
            None => DEFAULT_MIN_FILE_AGE_DAYS,
        };

        let temp_dir = get(TEMP_DIR).map(PathBuf::from).unwrap_or_else(env::temp_dir);

        let bandwidth_str = get(MAX_BANDWIDTH).unwrap_or_else(|| DEFAULT_MAX_BANDWIDTH.to_string());
        let max_bandwidth = bandwidth_str
            .parse::<Bandwidth>()
            .map_err(|reason| ConfigError::InvalidSetting {
                key: MAX_BANDWIDTH,
                value: bandwidth_str.clone(),
                reason,
            })?;

        let settings = Settings {
            credentials,
            region,
            bucket,
            source_dir,
            prefix,
            storage_class,
            verify_upload,
            min_file_age_days,
            temp_dir,
            max_bandwidth,
        };
        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    /// Log the effective configuration, one line per concern.
    pub fn log_summary(&self) {
        info!("Bucket: s3://{}/{} ({})", self.bucket, self.prefix, self.region.name());
        info!("Source directory: {}", self.source_dir.display());
        info!("Scratch directory: {}", self.temp_dir.display());
        info!(
            "Bandwidth cap: {}, storage class: {}, verify uploads: {}",
            self.max_bandwidth, self.storage_class, self.verify_upload
        );
        info!("Originals older than {} days are deleted after upload", self.min_file_age_days);
    }
}

/// Load a dotenv settings file into the process environment.
///
/// Variables already present in the environment keep their values. Without an
/// explicit path, a `.env` beside the executable is loaded if it exists.
pub fn load_settings_file(path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let candidate = beside_executable(DEFAULT_ENV_FILE);
            if !candidate.is_file() {
                return Ok(None);
            }
            candidate
        }
    };

    dotenvy::from_path(&path).map_err(|e| ConfigError::SettingsFile {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    Ok(Some(path))
}

fn beside_executable(name: &str) -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(name)))
        .unwrap_or_else(|| PathBuf::from(name))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}
