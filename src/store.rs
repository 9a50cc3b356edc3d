use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::{BehaviorVersion, Region, SharedCredentialsProvider};
use aws_sdk_s3::primitives::ByteStream;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::StorageConfig;
use crate::error::SyncError;

/// Characters that `encodeURIComponent` leaves unescaped, so persisted URLs
/// stay byte-identical to ones produced by earlier runs of the tool.
const URL_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, URL_COMPONENT).to_string()
}

/// The public address of an uploaded object: `{endpoint}/{bucket}/{encoded object name}`.
pub fn public_url(config: &StorageConfig, object_name: &str) -> String {
    format!(
        "{}/{}/{}",
        config.endpoint(),
        config.bucket,
        encode_component(object_name)
    )
}

/// The single operation the reconciler needs from the storage service.
///
/// Kept behind a trait so tests can observe and fail uploads without a live
/// bucket. No list, head or delete operations are used.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(
        &self,
        object_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), SyncError>;
}

/// An [`ObjectStore`] backed by an S3-compatible service such as MinIO.
///
/// The client is configured explicitly from [`StorageConfig`] rather than the
/// ambient AWS environment: path-style addressing for bucket-in-path
/// endpoints, and SDK retries disabled since the reconciler owns its own
/// bounded retry loop.
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Store {
    pub fn new(config: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "ImageSyncProvider",
        );

        // MinIO ignores the region but the signer requires one.
        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(SharedCredentialsProvider::new(credentials))
            .endpoint_url(config.endpoint())
            .force_path_style(true)
            .retry_config(RetryConfig::disabled())
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_object(
        &self,
        object_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), SyncError> {
        let length = bytes.len() as i64;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(object_name)
            .body(ByteStream::from(bytes))
            .content_length(length)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| SyncError::StorageError {
                message: format!("S3 upload failed: {}", e),
            })?;
        Ok(())
    }
}
