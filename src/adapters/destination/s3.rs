//! S3 bucket destination
//!
//! Granules are fetched over HTTP and uploaded as objects. The checkpoint is
//! the object `<prefix>/.update` in the same bucket.

use super::http::{fetch, stream_to_file};
use super::traits::{CheckpointStore, Destination, Transfer, TransferTarget, CHECKPOINT_NAME};
use crate::adapters::earthdata::EarthdataSession;
use crate::core::layout::RelativeTarget;
use crate::core::state::Checkpoint;
use crate::domain::{Result, SyncError, TransferError};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::{ByteStream, Length};
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_sdk_s3::Client;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Split `s3://bucket/some/prefix` (scheme optional) into bucket and prefix
pub fn parse_bucket_path(path: &str) -> Result<(String, String)> {
    let trimmed = path.trim().trim_start_matches("s3://").trim_matches('/');
    let (bucket, prefix) = match trimmed.split_once('/') {
        Some((bucket, prefix)) => (bucket, prefix),
        None => (trimmed, ""),
    };
    if bucket.is_empty() {
        return Err(SyncError::Configuration(format!(
            "'{path}' does not name an S3 bucket"
        )));
    }
    Ok((bucket.to_string(), prefix.to_string()))
}

/// Join key components, dropping empty segments and stray slashes
pub fn object_key<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(|p| p.trim_matches('/'))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// A destination bucket and key prefix
#[derive(Clone)]
pub struct S3Bucket {
    client: Arc<Client>,
    bucket: String,
    prefix: String,
}

impl S3Bucket {
    /// Connect using the default AWS credential chain
    ///
    /// `path` is the bucket, optionally with a key prefix; `prefix` is
    /// appended to it.
    pub async fn connect(path: &str, prefix: &str) -> Result<Self> {
        info!("Initializing S3 destination");

        let (bucket, path_prefix) = parse_bucket_path(path)?;
        let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let client = Client::new(&aws_config);

        Ok(Self {
            client: Arc::new(client),
            bucket,
            prefix: object_key([path_prefix.as_str(), prefix]),
        })
    }

    pub fn client(&self) -> Arc<Client> {
        Arc::clone(&self.client)
    }

    fn checkpoint_key(&self) -> String {
        object_key([self.prefix.as_str(), CHECKPOINT_NAME])
    }
}

#[async_trait]
impl CheckpointStore for S3Bucket {
    async fn load(&self) -> Result<Option<Checkpoint>> {
        let key = self.checkpoint_key();
        debug!(bucket = %self.bucket, key = %key, "Loading checkpoint");

        match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(output) => {
                let bytes = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| SyncError::State(format!("Failed to read checkpoint: {e}")))?
                    .into_bytes();
                let text = String::from_utf8_lossy(&bytes);
                Checkpoint::parse(&text).map(Some).map_err(|e| {
                    SyncError::State(format!(
                        "Corrupt checkpoint at {}: {e}",
                        CheckpointStore::location(self)
                    ))
                })
            }
            Err(err) => {
                let service = err.into_service_error();
                if service.is_no_such_key() {
                    Ok(None)
                } else {
                    Err(SyncError::State(format!(
                        "Failed to load checkpoint {}: {}",
                        CheckpointStore::location(self),
                        DisplayErrorContext(&service)
                    )))
                }
            }
        }
    }

    async fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        let body = checkpoint.to_string().into_bytes();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(self.checkpoint_key())
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| {
                SyncError::State(format!(
                    "Failed to save checkpoint {}: {}",
                    CheckpointStore::location(self),
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(())
    }

    fn location(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.checkpoint_key())
    }
}

impl Destination for S3Bucket {
    fn plan(&self, target: &RelativeTarget) -> TransferTarget {
        TransferTarget::Object {
            bucket: self.bucket.clone(),
            key: object_key(std::iter::once(self.prefix.as_str()).chain(target.components())),
        }
    }

    fn prepare(&self, target: &RelativeTarget) -> Result<TransferTarget> {
        Ok(self.plan(target))
    }

    fn location(&self) -> String {
        if self.prefix.is_empty() {
            format!("s3://{}", self.bucket)
        } else {
            format!("s3://{}/{}", self.bucket, self.prefix)
        }
    }
}

/// Objects up to this size are sent with a single `PutObject`
pub const MULTIPART_THRESHOLD: u64 = 64 * 1024 * 1024;

/// Preferred multipart part size
pub const PART_SIZE: u64 = 64 * 1024 * 1024;

/// Most parts S3 accepts in one multipart upload
pub const MAX_PARTS: u64 = 10_000;

/// How a spooled granule of a given size is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPlan {
    /// One `PutObject` of the whole file
    Single,
    /// A multipart upload of `part_size` parts; the last part may be shorter
    Multipart { part_size: u64, parts: u64 },
}

impl UploadPlan {
    /// Choose the upload strategy for `size` bytes
    ///
    /// Parts grow beyond [`PART_SIZE`] only when the file would otherwise
    /// need more than [`MAX_PARTS`] of them.
    pub fn for_size(size: u64) -> Self {
        if size <= MULTIPART_THRESHOLD {
            return UploadPlan::Single;
        }
        let part_size = PART_SIZE.max(size.div_ceil(MAX_PARTS));
        UploadPlan::Multipart {
            part_size,
            parts: size.div_ceil(part_size),
        }
    }
}

/// Fetches granules over HTTP and uploads them to S3
///
/// The body is spooled to a temporary file first so memory use does not
/// grow with granule size.
pub struct S3Uploader {
    session: EarthdataSession,
    client: Arc<Client>,
}

impl S3Uploader {
    pub fn new(session: EarthdataSession, client: Arc<Client>) -> Self {
        Self { session, client }
    }

    async fn put_single(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        target: &TransferTarget,
    ) -> std::result::Result<(), TransferError> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| storage_error(target, e))?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| storage_error(target, DisplayErrorContext(&e)))?;
        Ok(())
    }

    async fn put_multipart(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        size: u64,
        part_size: u64,
        target: &TransferTarget,
    ) -> std::result::Result<(), TransferError> {
        let created = self
            .client
            .create_multipart_upload()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| storage_error(target, DisplayErrorContext(&e)))?;
        let upload_id = created
            .upload_id()
            .ok_or_else(|| storage_error(target, "no upload id returned"))?
            .to_string();

        match self
            .upload_parts(bucket, key, &upload_id, path, size, part_size, target)
            .await
        {
            Ok(parts) => {
                self.client
                    .complete_multipart_upload()
                    .bucket(bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .multipart_upload(
                        CompletedMultipartUpload::builder()
                            .set_parts(Some(parts))
                            .build(),
                    )
                    .send()
                    .await
                    .map_err(|e| storage_error(target, DisplayErrorContext(&e)))?;
                Ok(())
            }
            Err(e) => {
                if let Err(abort) = self
                    .client
                    .abort_multipart_upload()
                    .bucket(bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .send()
                    .await
                {
                    warn!(
                        target = %target,
                        error = %DisplayErrorContext(&abort),
                        "Failed to abort multipart upload"
                    );
                }
                Err(e)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn upload_parts(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        path: &Path,
        size: u64,
        part_size: u64,
        target: &TransferTarget,
    ) -> std::result::Result<Vec<CompletedPart>, TransferError> {
        let mut parts = Vec::new();
        let mut offset = 0u64;
        let mut part_number = 1i32;

        while offset < size {
            let length = part_size.min(size - offset);
            let body = ByteStream::read_from()
                .path(path)
                .offset(offset)
                .length(Length::Exact(length))
                .build()
                .await
                .map_err(|e| storage_error(target, e))?;

            let uploaded = self
                .client
                .upload_part()
                .bucket(bucket)
                .key(key)
                .upload_id(upload_id)
                .part_number(part_number)
                .body(body)
                .send()
                .await
                .map_err(|e| storage_error(target, DisplayErrorContext(&e)))?;

            parts.push(
                CompletedPart::builder()
                    .set_e_tag(uploaded.e_tag().map(str::to_string))
                    .part_number(part_number)
                    .build(),
            );
            debug!(target = %target, part = part_number, bytes = length, "Uploaded part");

            offset += length;
            part_number += 1;
        }

        Ok(parts)
    }
}

fn storage_error(target: &TransferTarget, err: impl std::fmt::Display) -> TransferError {
    TransferError::Storage {
        target: target.to_string(),
        message: err.to_string(),
    }
}

#[async_trait]
impl Transfer for S3Uploader {
    async fn transfer(
        &self,
        url: &str,
        target: &TransferTarget,
    ) -> std::result::Result<u64, TransferError> {
        let TransferTarget::Object { bucket, key } = target else {
            return Err(storage_error(target, "S3 uploads need an object target"));
        };

        let resp = fetch(&self.session, url).await?;

        // Removed when dropped, whatever the outcome
        let spool = NamedTempFile::new().map_err(|e| TransferError::Write {
            target: "temporary spool file".to_string(),
            message: e.to_string(),
        })?;
        let bytes = stream_to_file(resp, url, spool.path()).await?;

        match UploadPlan::for_size(bytes) {
            UploadPlan::Single => self.put_single(bucket, key, spool.path(), target).await?,
            UploadPlan::Multipart { part_size, parts } => {
                debug!(target = %target, bytes, parts, "Using multipart upload");
                self.put_multipart(bucket, key, spool.path(), bytes, part_size, target)
                    .await?
            }
        }

        Ok(bytes)
    }
}
