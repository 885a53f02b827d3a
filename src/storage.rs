use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    presigning::PresigningConfig,
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use bytes::Bytes;
use tracing::debug;
use uuid::Uuid;

use crate::config::AppConfig;

/// MinIO ignores the region but the signer needs one.
const SIGNING_REGION: &str = "us-east-1";

/// Object storage for uploaded scans.
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    async fn presign_get(&self, key: &str, seconds: u64) -> anyhow::Result<String>;
}

/// Key of an uploaded scan: `xrays/<user>/<millis>_<file name>`.
pub fn scan_key(user_id: Uuid, millis: i128, file_name: &str) -> String {
    format!("xrays/{}/{}_{}", user_id, millis, sanitize_file_name(file_name))
}

fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// S3 / MinIO bucket, path-style addressing.
#[derive(Clone)]
pub struct Storage {
    client: Client,
    bucket: String,
}

impl Storage {
    pub async fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let credentials = Credentials::new(
            &cfg.minio_access_key,
            &cfg.minio_secret_key,
            None,
            None,
            "minio-static",
        );
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(SIGNING_REGION))
            .credentials_provider(credentials)
            .endpoint_url(&cfg.minio_endpoint)
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(&cfg.minio_endpoint)
            .force_path_style(true)
            .build();

        debug!(endpoint = %cfg.minio_endpoint, bucket = %cfg.minio_bucket, "object storage configured");
        Ok(Self {
            client: Client::from_conf(conf),
            bucket: cfg.minio_bucket.clone(),
        })
    }
}

#[async_trait]
impl StorageClient for Storage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .with_context(|| format!("upload scan {key}"))?;
        debug!(%key, size, "scan stored");
        Ok(())
    }

    async fn presign_get(&self, key: &str, seconds: u64) -> anyhow::Result<String> {
        let presigning = PresigningConfig::expires_in(Duration::from_secs(seconds))
            .context("presign expiry")?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .with_context(|| format!("presign scan {key}"))?;
        Ok(request.uri().to_string())
    }
}
