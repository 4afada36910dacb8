use aws_sdk_amplify::Client;
use aws_sdk_amplify::error::DisplayErrorContext;
use aws_sdk_amplify::types::{JobStatus, JobSummary};
use tracing::instrument;

/// What the platform returned for a new manual deployment.
///
/// Both fields are checked by the caller before anything is uploaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatedDeployment {
    pub job_id: Option<String>,
    pub zip_upload_url: Option<String>,
}

/// Abstraction over the managed hosting platform for testability.
///
/// Production code uses [`AmplifyPlatform`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait HostingPlatform: Send + Sync {
    /// Request a deployment job and its one-time archive upload URL.
    async fn create_deployment(
        &self,
        app_id: &str,
        branch_name: &str,
    ) -> Result<CreatedDeployment, HostingError>;

    /// Start the deployment job; returns the reported job status, if any.
    async fn start_deployment(
        &self,
        app_id: &str,
        branch_name: &str,
        job_id: &str,
        source_url: &str,
    ) -> Result<Option<String>, HostingError>;
}

/// AWS Amplify Hosting.
pub struct AmplifyPlatform {
    client: Client,
}

impl AmplifyPlatform {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(config))
    }
}

impl HostingPlatform for AmplifyPlatform {
    #[instrument(skip(self))]
    async fn create_deployment(
        &self,
        app_id: &str,
        branch_name: &str,
    ) -> Result<CreatedDeployment, HostingError> {
        let output = self
            .client
            .create_deployment()
            .app_id(app_id)
            .branch_name(branch_name)
            .send()
            .await
            .map_err(|e| HostingError::CreateDeployment {
                detail: DisplayErrorContext(&e).to_string(),
            })?;

        // Required members are plain values in newer SDK releases
        let job_id: Option<&str> = Option::from(output.job_id());
        let zip_upload_url: Option<&str> = Option::from(output.zip_upload_url());

        Ok(CreatedDeployment {
            job_id: non_empty(job_id),
            zip_upload_url: non_empty(zip_upload_url),
        })
    }

    #[instrument(skip(self, source_url))]
    async fn start_deployment(
        &self,
        app_id: &str,
        branch_name: &str,
        job_id: &str,
        source_url: &str,
    ) -> Result<Option<String>, HostingError> {
        let output = self
            .client
            .start_deployment()
            .app_id(app_id)
            .branch_name(branch_name)
            .job_id(job_id)
            .source_url(source_url)
            .send()
            .await
            .map_err(|e| HostingError::StartDeployment {
                job_id: job_id.to_owned(),
                detail: DisplayErrorContext(&e).to_string(),
            })?;

        let summary: Option<&JobSummary> = Option::from(output.job_summary());
        let status = summary.and_then(|s| {
            let status: Option<&JobStatus> = Option::from(s.status());
            status.map(|st| st.as_str().to_owned())
        });

        tracing::info!(status = ?status, "deployment started");
        Ok(status)
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_owned)
}

#[derive(Debug, thiserror::Error)]
pub enum HostingError {
    #[error("create deployment request failed: {detail}")]
    CreateDeployment { detail: String },

    #[error("start deployment request failed for job {job_id}: {detail}")]
    StartDeployment { job_id: String, detail: String },
}
