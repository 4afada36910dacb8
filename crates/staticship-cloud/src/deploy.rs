use std::path::{Path, PathBuf};

use crate::hosting::{AmplifyPlatform, HostingError, HostingPlatform};
use crate::upload::{ArchiveUploader, HttpUploader, UploadError};

/// Status reported when the platform returns no job summary.
const UNKNOWN_STATUS: &str = "unknown";

/// A started platform deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOutcome {
    pub job_id: String,
    pub status: String,
}

/// Create deployment → upload archive → start deployment.
pub struct ArchiveDeployer<P: HostingPlatform = AmplifyPlatform, U: ArchiveUploader = HttpUploader>
{
    platform: P,
    uploader: U,
}

impl<P: HostingPlatform, U: ArchiveUploader> ArchiveDeployer<P, U> {
    pub fn new(platform: P, uploader: U) -> Self {
        Self { platform, uploader }
    }

    pub async fn deploy(
        &self,
        app_id: &str,
        branch_name: &str,
        archive: &Path,
    ) -> Result<DeployOutcome, DeployError> {
        let created = self
            .platform
            .create_deployment(app_id, branch_name)
            .await
            .map_err(|e| DeployError::Platform { source: e })?;

        let (Some(job_id), Some(upload_url)) = (created.job_id, created.zip_upload_url) else {
            return Err(DeployError::MissingDeploymentJob);
        };
        tracing::info!(%job_id, "deployment job created");

        let body = tokio::fs::read(archive)
            .await
            .map_err(|e| DeployError::ReadArchive {
                path: archive.to_path_buf(),
                source: e,
            })?;

        self.uploader
            .put_archive(&upload_url, body)
            .await
            .map_err(|e| DeployError::Upload { source: e })?;

        let status = self
            .platform
            .start_deployment(app_id, branch_name, &job_id, &upload_url)
            .await
            .map_err(|e| DeployError::Platform { source: e })?
            .unwrap_or_else(|| UNKNOWN_STATUS.to_owned());

        Ok(DeployOutcome { job_id, status })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("failed to create deployment")]
    MissingDeploymentJob,

    #[error("hosting platform request failed")]
    Platform { source: HostingError },

    #[error("failed to read archive {path}")]
    ReadArchive {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("archive upload failed")]
    Upload { source: UploadError },
}
