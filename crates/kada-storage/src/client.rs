//! S3 client implementation.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use aws_types::SdkConfig;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Lifetime of signed read URLs handed to the transcoder (the SigV4 maximum).
pub const DEFAULT_SIGNED_URL_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 7);

/// Object storage operations needed by the pipeline.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Time-limited GET URL for `bucket/key`.
    async fn presign_get(&self, bucket: &str, key: &str, expires_in: Duration) -> StorageResult<String>;

    /// Upload a local file to `bucket/key`.
    async fn upload_file(&self, path: &Path, bucket: &str, key: &str) -> StorageResult<()>;
}

/// Configuration overrides for the S3 client.
#[derive(Debug, Clone, Default)]
pub struct S3Config {
    /// Custom endpoint (S3-compatible stores, local stacks)
    pub endpoint_url: Option<String>,
    /// Use path-style addressing
    pub force_path_style: bool,
}

impl S3Config {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            endpoint_url: std::env::var("S3_ENDPOINT_URL").ok().filter(|s| !s.is_empty()),
            force_path_style: std::env::var("S3_FORCE_PATH_STYLE")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

/// S3 storage client.
#[derive(Clone)]
pub struct S3Client {
    client: Client,
}

impl S3Client {
    /// Create a client from shared AWS configuration.
    pub fn new(sdk_config: &SdkConfig, config: &S3Config) -> Self {
        let mut builder = aws_sdk_s3::config::Builder::from(sdk_config);

        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }
        if config.force_path_style {
            builder = builder.force_path_style(true);
        }

        Self {
            client: Client::from_conf(builder.build()),
        }
    }

    /// Wrap an already configured SDK client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn presign_get(&self, bucket: &str, key: &str, expires_in: Duration) -> StorageResult<String> {
        let presign_config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::presign_failed(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presign_config)
            .await
            .map_err(|e| StorageError::presign_failed(e.to_string()))?;

        debug!("Presigned s3://{}/{} for {:?}", bucket, key, expires_in);
        Ok(presigned.uri().to_string())
    }

    async fn upload_file(&self, path: &Path, bucket: &str, key: &str) -> StorageResult<()> {
        debug!("Uploading {} to s3://{}/{}", path.display(), bucket, key);

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .content_type(content_type_for(key))
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        info!("Uploaded {} to s3://{}/{}", path.display(), bucket, key);
        Ok(())
    }
}

/// Content type of an artifact, derived from its key.
pub fn content_type_for(key: &str) -> &'static str {
    let ext = key.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("mp4") => "video/mp4",
        Some("gif") => "image/gif",
        Some("mp3") => "audio/mpeg",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("v/00:00:00-00:00:05-sliced-output.mp4"), "video/mp4");
        assert_eq!(content_type_for("v/clip.GIF"), "image/gif");
        assert_eq!(content_type_for("v/clip"), "application/octet-stream");
    }

    #[test]
    fn test_default_ttl_is_seven_days() {
        assert_eq!(DEFAULT_SIGNED_URL_TTL.as_secs(), 604_800);
    }
}
