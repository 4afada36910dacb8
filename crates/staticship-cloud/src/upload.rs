use reqwest::header::CONTENT_TYPE;

/// Abstraction over the archive PUT for testability.
///
/// Production code uses [`HttpUploader`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait ArchiveUploader: Send + Sync {
    /// PUT the archive bytes to a platform-issued upload URL.
    async fn put_archive(&self, url: &str, body: Vec<u8>) -> Result<(), UploadError>;
}

/// Uploads with a plain HTTP PUT.
#[derive(Debug, Clone, Default)]
pub struct HttpUploader {
    client: reqwest::Client,
}

impl HttpUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl ArchiveUploader for HttpUploader {
    async fn put_archive(&self, url: &str, body: Vec<u8>) -> Result<(), UploadError> {
        let bytes = body.len();
        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "application/zip")
            .body(body)
            .send()
            .await
            .map_err(|e| UploadError::Request { source: e })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("unknown").to_owned(),
            });
        }

        tracing::info!(bytes, status = status.as_u16(), "archive uploaded");
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("archive upload request failed")]
    Request { source: reqwest::Error },

    #[error("failed to upload zip file: {status_text}")]
    Status { status: u16, status_text: String },
}
