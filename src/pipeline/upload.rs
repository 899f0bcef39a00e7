use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::cloud::store::{ObjectStore, PutObjectStream, StorageClass};
use crate::config::Bandwidth;
use crate::constants::SHA256_METADATA_KEY;
use crate::error::UploadError;
use crate::models::UploadTarget;
use crate::pipeline::archive::ScratchArchive;
use crate::security::scrub_credentials;
use crate::utils::hash::calculate_sha256;
use crate::utils::throttle::ThrottledReader;

/// Proof that an archive reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub key: String,
    pub bytes_sent: u64,
    pub sha256: Option<String>,
    pub elapsed: Duration,
}

/// Streams scratch archives to an object store at a capped rate.
pub struct ThrottledUploader {
    store: Arc<dyn ObjectStore>,
    bandwidth: Bandwidth,
    storage_class: StorageClass,
    verify: bool,
}

impl ThrottledUploader {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        bandwidth: Bandwidth,
        storage_class: StorageClass,
        verify: bool,
    ) -> Self {
        ThrottledUploader {
            store,
            bandwidth,
            storage_class,
            verify,
        }
    }

    /// Upload `archive` to `target`, consuming the archive.
    ///
    /// The scratch file is removed once the attempt is over, whatever the
    /// outcome. A failure with zero body bytes read is reported as
    /// [`UploadError::NotStarted`], anything later as
    /// [`UploadError::Interrupted`].
    pub async fn upload(
        &self,
        archive: ScratchArchive,
        target: &UploadTarget,
    ) -> Result<UploadReceipt, UploadError> {
        let outcome = self.transfer(&archive, target).await;

        let archive_path = archive.path().to_path_buf();
        match archive.discard() {
            Ok(()) => debug!("Removed scratch archive {}", archive_path.display()),
            Err(e) => warn!("Failed to remove scratch archive {}: {}", archive_path.display(), e),
        }
        outcome
    }

    async fn transfer(
        &self,
        archive: &ScratchArchive,
        target: &UploadTarget,
    ) -> Result<UploadReceipt, UploadError> {
        let key = target.key().to_string();
        let not_started = |reason: String| UploadError::NotStarted {
            key: key.clone(),
            reason,
        };

        let sha256 = if self.verify {
            let path = archive.path().to_path_buf();
            let digest = tokio::task::spawn_blocking(move || calculate_sha256(&path))
                .await
                .map_err(|e| not_started(format!("hashing task failed: {}", e)))?
                .map_err(|e| not_started(format!("failed to hash archive: {}", e)))?;
            Some(digest)
        } else {
            None
        };

        let file = tokio::fs::File::open(archive.path())
            .await
            .map_err(|e| not_started(format!("failed to open archive: {}", e)))?;
        let reader = ThrottledReader::new(file, self.bandwidth);
        let counter = reader.counter();

        let mut metadata = HashMap::new();
        if let Some(digest) = &sha256 {
            metadata.insert(SHA256_METADATA_KEY.to_string(), digest.clone());
        }

        info!(
            "Uploading {} bytes to s3://{}/{} at {}",
            archive.size(),
            self.store.bucket(),
            key,
            self.bandwidth
        );
        let start = Instant::now();
        let request = PutObjectStream {
            key: key.clone(),
            body: Box::new(reader),
            content_length: archive.size(),
            storage_class: self.storage_class,
            metadata,
        };

        if let Err(e) = self.store.put_object_stream(request).await {
            let bytes_sent = counter.load(Ordering::SeqCst);
            let reason = scrub_credentials(&format!("{:#}", e));
            return Err(if bytes_sent == 0 {
                UploadError::NotStarted { key, reason }
            } else {
                UploadError::Interrupted {
                    key,
                    bytes_sent,
                    reason,
                }
            });
        }

        let elapsed = start.elapsed();
        let bytes_sent = counter.load(Ordering::SeqCst);
        if let Some(digest) = &sha256 {
            self.verify_object(&key, archive.size(), digest).await?;
        }

        Ok(UploadReceipt {
            key,
            bytes_sent,
            sha256,
            elapsed,
        })
    }

    async fn verify_object(&self, key: &str, size: u64, sha256: &str) -> Result<(), UploadError> {
        let failed = |reason: String| UploadError::VerificationFailed {
            key: key.to_string(),
            reason,
        };

        let info = self
            .store
            .head_object(key)
            .await
            .map_err(|e| failed(scrub_credentials(&format!("{:#}", e))))?
            .ok_or_else(|| failed("object not found after upload".to_string()))?;

        if info.content_length != size {
            return Err(failed(format!(
                "size mismatch: sent {} bytes, store reports {}",
                size, info.content_length
            )));
        }
        match info.metadata.get(SHA256_METADATA_KEY) {
            Some(stored) if stored == sha256 => {
                debug!("Verified {} ({} bytes, sha256 {})", key, size, sha256);
                Ok(())
            }
            Some(stored) => Err(failed(format!(
                "checksum mismatch: sent {}, store reports {}",
                sha256, stored
            ))),
            None => Err(failed("stored object carries no checksum".to_string())),
        }
    }
}
