use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use async_trait::async_trait;
use tokio::io::AsyncRead;

/// Boxed byte source handed to an object store.
pub type ByteSource = Box<dyn AsyncRead + Send + Unpin>;

/// S3 storage classes accepted for archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageClass {
    Standard,
    #[default]
    StandardIa,
    OnezoneIa,
    IntelligentTiering,
    Glacier,
    GlacierIr,
    DeepArchive,
}

impl StorageClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageClass::Standard => "STANDARD",
            StorageClass::StandardIa => "STANDARD_IA",
            StorageClass::OnezoneIa => "ONEZONE_IA",
            StorageClass::IntelligentTiering => "INTELLIGENT_TIERING",
            StorageClass::Glacier => "GLACIER",
            StorageClass::GlacierIr => "GLACIER_IR",
            StorageClass::DeepArchive => "DEEP_ARCHIVE",
        }
    }
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STANDARD" => Ok(StorageClass::Standard),
            "STANDARD_IA" => Ok(StorageClass::StandardIa),
            "ONEZONE_IA" => Ok(StorageClass::OnezoneIa),
            "INTELLIGENT_TIERING" => Ok(StorageClass::IntelligentTiering),
            "GLACIER" => Ok(StorageClass::Glacier),
            "GLACIER_IR" => Ok(StorageClass::GlacierIr),
            "DEEP_ARCHIVE" => Ok(StorageClass::DeepArchive),
            other => Err(format!("unknown storage class '{}'", other)),
        }
    }
}

/// A single streamed object write.
///
/// `body` must yield exactly `content_length` bytes.
pub struct PutObjectStream {
    pub key: String,
    pub body: ByteSource,
    pub content_length: u64,
    pub storage_class: StorageClass,
    pub metadata: HashMap<String, String>,
}

impl fmt::Debug for PutObjectStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PutObjectStream")
            .field("key", &self.key)
            .field("content_length", &self.content_length)
            .field("storage_class", &self.storage_class)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// What the store reports about an existing object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub content_length: u64,
    pub metadata: HashMap<String, String>,
}

/// Capabilities the archival pipeline needs from an object store.
///
/// An implementation is bound to a single bucket.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Bucket this store writes to
    fn bucket(&self) -> &str;

    /// Resolve the principal behind the configured credentials
    async fn identity(&self) -> Result<String>;

    /// Whether the bucket exists and is accessible
    async fn bucket_exists(&self) -> Result<bool>;

    /// Stream a body into `request.key`
    async fn put_object_stream(&self, request: PutObjectStream) -> Result<()>;

    /// Look up an object, `None` if it does not exist
    async fn head_object(&self, key: &str) -> Result<Option<ObjectInfo>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_class_round_trips_through_names() {
        for class in [
            StorageClass::Standard,
            StorageClass::StandardIa,
            StorageClass::OnezoneIa,
            StorageClass::IntelligentTiering,
            StorageClass::Glacier,
            StorageClass::GlacierIr,
            StorageClass::DeepArchive,
        ] {
            assert_eq!(class.as_str().parse::<StorageClass>().unwrap(), class);
        }
    }

    #[test]
    fn test_storage_class_default_is_infrequent_access() {
        assert_eq!(StorageClass::default(), StorageClass::StandardIa);
        assert_eq!("standard_ia".parse::<StorageClass>().unwrap(), StorageClass::StandardIa);
        assert!("REDUCED".parse::<StorageClass>().is_err());
    }
}
