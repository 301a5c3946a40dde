//! S3-compatible artifact store backend.

use std::time::Duration;

use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;

use crate::{ArtifactStore, StorageError};

/// Connection settings for the S3-compatible backend, loaded from
/// environment variables.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Bucket name (`STORAGE_BUCKET`, default `teamink-artifacts`).
    pub bucket: String,
    /// Region (`STORAGE_REGION`, default `us-east-1`).
    pub region: String,
    /// Custom endpoint for S3-compatible services (`STORAGE_ENDPOINT`).
    pub endpoint: Option<String>,
    /// Static credentials (`STORAGE_ACCESS_KEY` / `STORAGE_SECRET_KEY`).
    /// When absent, the ambient AWS credential chain is used.
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    /// Base URL prepended to public object paths
    /// (`STORAGE_PUBLIC_BASE_URL`). When unset, public objects get
    /// presigned URLs like private ones.
    pub public_base_url: Option<String>,
    /// Presigned URL lifetime in seconds
    /// (`STORAGE_PRESIGN_EXPIRY_SECS`, default `900`).
    pub presign_expiry_secs: u64,
}

impl StorageConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        let presign_expiry_secs: u64 = std::env::var("STORAGE_PRESIGN_EXPIRY_SECS")
            .unwrap_or_else(|_| "900".into())
            .parse()
            .expect("STORAGE_PRESIGN_EXPIRY_SECS must be a valid u64");

        Self {
            bucket: std::env::var("STORAGE_BUCKET")
                .unwrap_or_else(|_| "teamink-artifacts".into()),
            region: std::env::var("STORAGE_REGION").unwrap_or_else(|_| "us-east-1".into()),
            endpoint: std::env::var("STORAGE_ENDPOINT").ok(),
            access_key: std::env::var("STORAGE_ACCESS_KEY").ok(),
            secret_key: std::env::var("STORAGE_SECRET_KEY").ok(),
            public_base_url: std::env::var("STORAGE_PUBLIC_BASE_URL").ok(),
            presign_expiry_secs,
        }
    }
}

/// Artifact store backed by an S3-compatible service.
pub struct S3ArtifactStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: Option<String>,
    presign_expiry: Duration,
}

impl S3ArtifactStore {
    /// Build a client from the given configuration.
    pub async fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let base = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&base);

        if let Some(endpoint) = &config.endpoint {
            // S3-compatible services generally require path-style keys.
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        if let (Some(access), Some(secret)) = (&config.access_key, &config.secret_key) {
            builder = builder.credentials_provider(Credentials::new(
                access.clone(),
                secret.clone(),
                None,
                None,
                "teamink-storage-config",
            ));
        }

        Ok(Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            public_base_url: config.public_base_url.clone(),
            presign_expiry: Duration::from_secs(config.presign_expiry_secs),
        })
    }

    async fn presigned_url(&self, path: &str) -> Result<String, StorageError> {
        let presigning = PresigningConfig::expires_in(self.presign_expiry)
            .map_err(|e| StorageError::Config(e.to_string()))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(request.uri().to_string())
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        is_public: bool,
    ) -> Result<String, StorageError> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .content_type(content_type)
            .body(ByteStream::from(bytes));

        if is_public {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }

        request
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(path.to_string())
    }

    async fn get_url(&self, path: &str, is_public: bool) -> Result<String, StorageError> {
        if is_public {
            if let Some(base) = &self.public_base_url {
                return Ok(format!("{}/{}", base.trim_end_matches('/'), path));
            }
        }
        self.presigned_url(path).await
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(())
    }
}
