//! S3-compatible object storage (AWS S3, MinIO, R2, ...).

use super::{ObjectStore, StorageError};
use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::Path;
use tracing::{debug, info, instrument};
use url::Url;

/// Region used when none is configured. MinIO ignores it but signing needs one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Content type of uploaded bundles.
const BUNDLE_CONTENT_TYPE: &str = "application/octet-stream";

/// Connection settings for an S3-compatible endpoint.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Endpoint as `host[:port]`, or a full URL.
    pub endpoint: String,
    /// Access key id.
    pub access_key: String,
    /// Secret access key.
    pub secret_key: String,
    /// Bucket bundles are written to.
    pub bucket: String,
    /// Signing region.
    pub region: String,
    /// Whether to connect over TLS when `endpoint` carries no scheme.
    pub secure: bool,
}

impl StorageConfig {
    /// Resolves the endpoint URL, adding a scheme from the TLS toggle when missing.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidEndpoint`] if the result is not a valid URL.
    pub fn endpoint_url(&self) -> Result<Url, StorageError> {
        let raw = if self.endpoint.contains("://") {
            self.endpoint.clone()
        } else {
            let scheme = if self.secure { "https" } else { "http" };
            format!("{scheme}://{}", self.endpoint)
        };

        Url::parse(&raw).map_err(|source| StorageError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            source,
        })
    }
}

/// Bundle storage in an S3 bucket.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Wraps an already-configured client.
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    /// Builds a client with static credentials and path-style addressing.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidEndpoint`] if the endpoint cannot be parsed.
    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        let endpoint = config.endpoint_url()?;
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "bundle-archiver",
        );

        let s3_config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(endpoint.as_str().trim_end_matches('/'))
            .force_path_style(true)
            .build();

        info!(
            endpoint = %endpoint,
            bucket = %config.bucket,
            region = %config.region,
            "Object storage client initialised"
        );
        Ok(Self::new(
            Client::from_conf(s3_config),
            config.bucket.clone(),
        ))
    }

    /// Returns the target bucket.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    #[instrument(skip(self, local_path), fields(bucket = %self.bucket))]
    async fn put(&self, key: &str, local_path: &Path) -> Result<(), StorageError> {
        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| StorageError::ReadFailed {
                path: local_path.display().to_string(),
                message: e.to_string(),
            })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(BUNDLE_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed {
                key: key.to_string(),
                message: aws_sdk_s3::error::DisplayErrorContext(&e).to_string(),
            })?;

        debug!(path = %local_path.display(), "Bundle uploaded");
        Ok(())
    }
}
