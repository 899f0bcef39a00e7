use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context as TaskContext, Poll};
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use log::{debug, warn};
use rusoto_core::{ByteStream, RusotoError};
use rusoto_s3::{
    AbortMultipartUploadRequest, CompleteMultipartUploadRequest, CompletedMultipartUpload,
    CompletedPart, CreateMultipartUploadRequest, HeadBucketError, HeadBucketRequest,
    HeadObjectError, HeadObjectRequest, PutObjectRequest, S3Client, UploadPartRequest, S3,
};
use rusoto_sts::{GetCallerIdentityRequest, Sts, StsClient};
use tokio::io::ReadBuf;

use crate::cloud::client::{create_s3_client, create_sts_client};
use crate::cloud::store::{ByteSource, ObjectInfo, ObjectStore, PutObjectStream};
use crate::config::Settings;
use crate::constants::{
    ARCHIVE_CONTENT_TYPE, LARGE_FILE_THRESHOLD, S3_UPLOAD_CHUNK_SIZE as UPLOAD_CHUNK_SIZE,
    STREAMING_BUFFER_SIZE,
};

/// Object store backed by Amazon S3 (or an S3-compatible endpoint).
///
/// Bodies are streamed straight from the caller's reader. Archives up to
/// `LARGE_FILE_THRESHOLD` go out as one `PutObject`; larger ones use a
/// sequential multipart upload fed from the same reader, so any throttling
/// wrapped around the reader applies to every part.
pub struct S3ObjectStore {
    client: Arc<S3Client>,
    sts: Arc<StsClient>,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(S3ObjectStore {
            client: create_s3_client(settings)?,
            sts: create_sts_client(settings)?,
            bucket: settings.bucket.clone(),
        })
    }

    async fn put_single(&self, request: PutObjectStream) -> Result<()> {
        let PutObjectStream { key, body, content_length, storage_class, metadata } = request;
        let length = i64::try_from(content_length)
            .context(format!("Archive for {} is too large", key))?;
        let source = Arc::new(Mutex::new(body));

        let put = PutObjectRequest {
            bucket: self.bucket.clone(),
            key: key.clone(),
            body: Some(part_stream(&source, content_length)),
            content_length: Some(length),
            content_type: Some(ARCHIVE_CONTENT_TYPE.to_string()),
            storage_class: Some(storage_class.as_str().to_string()),
            metadata: Some(metadata),
            ..Default::default()
        };

        self.client
            .put_object(put)
            .await
            .map_err(|e| anyhow!("PutObject failed for s3://{}/{}: {}", self.bucket, key, e))?;
        Ok(())
    }

    async fn put_multipart(&self, request: PutObjectStream) -> Result<()> {
        let PutObjectStream { key, body, content_length, storage_class, metadata } = request;

        let created = self
            .client
            .create_multipart_upload(CreateMultipartUploadRequest {
                bucket: self.bucket.clone(),
                key: key.clone(),
                content_type: Some(ARCHIVE_CONTENT_TYPE.to_string()),
                storage_class: Some(storage_class.as_str().to_string()),
                metadata: Some(metadata),
                ..Default::default()
            })
            .await
            .map_err(|e| anyhow!("Failed to initialize multipart upload for {}: {}", key, e))?;

        let upload_id = created
            .upload_id
            .ok_or_else(|| anyhow!("No upload ID returned from S3"))?;
        debug!("Started multipart upload {} for {}", upload_id, key);

        let source = Arc::new(Mutex::new(body));
        match self.upload_parts(&key, &upload_id, &source, content_length).await {
            Ok(parts) => {
                self.client
                    .complete_multipart_upload(CompleteMultipartUploadRequest {
                        bucket: self.bucket.clone(),
                        key: key.clone(),
                        upload_id: upload_id.clone(),
                        multipart_upload: Some(CompletedMultipartUpload { parts: Some(parts) }),
                        ..Default::default()
                    })
                    .await
                    .map_err(|e| anyhow!("Failed to complete multipart upload for {}: {}", key, e))?;
                debug!("Completed multipart upload for {}", key);
                Ok(())
            }
            Err(e) => {
                let abort = self
                    .client
                    .abort_multipart_upload(AbortMultipartUploadRequest {
                        bucket: self.bucket.clone(),
                        key: key.clone(),
                        upload_id: upload_id.clone(),
                        ..Default::default()
                    })
                    .await;
                if let Err(abort_err) = abort {
                    warn!("Failed to abort multipart upload {} for {}: {}", upload_id, key, abort_err);
                }
                Err(e.context("Part upload failed, multipart upload aborted"))
            }
        }
    }

    async fn upload_parts(
        &self,
        key: &str,
        upload_id: &str,
        source: &Arc<Mutex<ByteSource>>,
        content_length: u64,
    ) -> Result<Vec<CompletedPart>> {
        let sizes = part_sizes(content_length, UPLOAD_CHUNK_SIZE as u64);
        let mut completed = Vec::with_capacity(sizes.len());

        for (index, size) in sizes.into_iter().enumerate() {
            let part_number = index as i64 + 1;
            let output = self
                .client
                .upload_part(UploadPartRequest {
                    bucket: self.bucket.clone(),
                    key: key.to_string(),
                    upload_id: upload_id.to_string(),
                    part_number,
                    content_length: Some(size as i64),
                    body: Some(part_stream(source, size)),
                    ..Default::default()
                })
                .await
                .map_err(|e| anyhow!("Failed to upload part {} of {}: {}", part_number, key, e))?;

            let e_tag = output
                .e_tag
                .ok_or_else(|| anyhow!("No ETag in upload part response"))?;
            completed.push(CompletedPart {
                e_tag: Some(e_tag),
                part_number: Some(part_number),
            });
        }
        Ok(completed)
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn identity(&self) -> Result<String> {
        let response = self
            .sts
            .get_caller_identity(GetCallerIdentityRequest {})
            .await
            .map_err(|e| anyhow!("GetCallerIdentity failed: {}", e))?;

        response
            .arn
            .or(response.user_id)
            .ok_or_else(|| anyhow!("GetCallerIdentity returned no principal"))
    }

    async fn bucket_exists(&self) -> Result<bool> {
        let request = HeadBucketRequest {
            bucket: self.bucket.clone(),
            ..Default::default()
        };
        match self.client.head_bucket(request).await {
            Ok(_) => Ok(true),
            Err(RusotoError::Service(HeadBucketError::NoSuchBucket(_))) => Ok(false),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(anyhow!("HeadBucket failed for {}: {}", self.bucket, e)),
        }
    }

    async fn put_object_stream(&self, request: PutObjectStream) -> Result<()> {
        let start = Instant::now();
        let key = request.key.clone();
        let content_length = request.content_length;

        if content_length > LARGE_FILE_THRESHOLD {
            self.put_multipart(request).await?;
        } else {
            self.put_single(request).await?;
        }

        debug!(
            "Uploaded {} bytes to s3://{}/{} in {:?}",
            content_length, self.bucket, key, start.elapsed()
        );
        Ok(())
    }

    async fn head_object(&self, key: &str) -> Result<Option<ObjectInfo>> {
        let request = HeadObjectRequest {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            ..Default::default()
        };
        match self.client.head_object(request).await {
            Ok(output) => Ok(Some(ObjectInfo {
                content_length: output.content_length.unwrap_or(0).max(0) as u64,
                metadata: output.metadata.unwrap_or_default(),
            })),
            Err(RusotoError::Service(HeadObjectError::NoSuchKey(_))) => Ok(None),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(anyhow!("HeadObject failed for s3://{}/{}: {}", self.bucket, key, e)),
        }
    }
}

// HEAD responses carry no body, so a missing resource surfaces as a bare 404
fn is_not_found<E>(err: &RusotoError<E>) -> bool {
    matches!(err, RusotoError::Unknown(response) if response.status.as_u16() == 404)
}

/// Split `total` bytes into multipart part sizes of at most `chunk`.
fn part_sizes(total: u64, chunk: u64) -> Vec<u64> {
    let mut sizes = Vec::with_capacity(total.div_ceil(chunk) as usize);
    let mut remaining = total;
    while remaining > 0 {
        let size = remaining.min(chunk);
        sizes.push(size);
        remaining -= size;
    }
    sizes
}

fn part_stream(source: &Arc<Mutex<ByteSource>>, length: u64) -> ByteStream {
    let body = PartBody::new(Arc::clone(source), length);
    ByteStream::new_with_size(body, length as usize)
}

/// Exactly `remaining` bytes pulled from a shared reader.
///
/// The reader sits behind a mutex because rusoto requires request bodies to be
/// `Sync`. Parts are sent one after another, so the lock is never contended.
struct PartBody {
    source: Arc<Mutex<ByteSource>>,
    remaining: u64,
    buffer: Vec<u8>,
}

impl PartBody {
    fn new(source: Arc<Mutex<ByteSource>>, remaining: u64) -> Self {
        let capacity = remaining.min(STREAMING_BUFFER_SIZE as u64) as usize;
        PartBody {
            source,
            remaining,
            buffer: vec![0u8; capacity],
        }
    }
}

impl Stream for PartBody {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.remaining == 0 {
            return Poll::Ready(None);
        }

        let mut source = match this.source.lock() {
            Ok(guard) => guard,
            Err(_) => {
                return Poll::Ready(Some(Err(io::Error::new(
                    io::ErrorKind::Other,
                    "upload body source poisoned",
                ))))
            }
        };

        let want = this.remaining.min(this.buffer.len() as u64) as usize;
        let mut chunk = ReadBuf::new(&mut this.buffer[..want]);
        match Pin::new(&mut **source).poll_read(cx, &mut chunk) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Err(e)) => Poll::Ready(Some(Err(e))),
            Poll::Ready(Ok(())) => {
                let filled = chunk.filled();
                if filled.is_empty() {
                    return Poll::Ready(Some(Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("upload body ended {} bytes early", this.remaining),
                    ))));
                }
                this.remaining -= filled.len() as u64;
                Poll::Ready(Some(Ok(Bytes::copy_from_slice(filled))))
            }
        }
    }
}
