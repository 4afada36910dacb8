//! Object store publishing target.

use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use tracing::{debug, instrument};

/// Abstraction over the object store for testability.
///
/// Production code uses [`S3Store`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait ObjectStore: Send + Sync {
    /// Write `body` as a single object at `bucket`/`key`.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError>;
}

/// S3-backed object store.
pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(config))
    }
}

impl ObjectStore for S3Store {
    #[instrument(skip(self, body), fields(%bucket, %key, bytes = body.len()))]
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StoreError::Put {
                key: key.to_owned(),
                detail: DisplayErrorContext(&e).to_string(),
            })?;

        debug!(%content_type, "object uploaded");
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("S3 PutObject failed for {key}: {detail}")]
    Put { key: String, detail: String },
}
