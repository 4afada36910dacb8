use anyhow::Context;
use serde::Serialize;
use serde_json::{Value, json};
use staticship_build::{CommandRunner, FetchBuild, RealRunner, create_archive};
use staticship_cloud::{
    AmplifyPlatform, ArchiveDeployer, ArchiveUploader, DeployOutcome, HostingPlatform,
    HttpUploader,
};
use staticship_core::{BuildSettings, DeployJobConfig, EnvSource, env_keys};

/// Proxy-style response: the job status as a JSON string body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployResponse {
    pub status_code: u16,
    pub body: String,
}

impl DeployResponse {
    pub fn success(status: &str) -> Self {
        Self {
            status_code: 200,
            body: json!({ "status": status }).to_string(),
        }
    }

    pub fn failure() -> Self {
        Self {
            status_code: 500,
            body: json!({ "status": "failure" }).to_string(),
        }
    }
}

/// Resolve the deploy configuration for one invocation, taking the branch
/// from the event when it carries one.
pub fn deploy_job_config(
    env: &impl EnvSource,
    event: &Value,
) -> staticship_core::Result<DeployJobConfig> {
    let event_branch = event
        .get(env_keys::AMPLIFY_BRANCH_NAME)
        .and_then(Value::as_str);
    DeployJobConfig::from_source(env, event_branch)
}

/// Fetch & build, zip the export, and hand it to the hosting platform.
pub struct DeployFunction<
    R: CommandRunner = RealRunner,
    P: HostingPlatform = AmplifyPlatform,
    U: ArchiveUploader = HttpUploader,
> {
    pipeline: FetchBuild<R>,
    deployer: ArchiveDeployer<P, U>,
}

impl DeployFunction {
    /// Production wiring: local processes, Amplify, and plain HTTP upload.
    pub async fn from_aws(settings: BuildSettings) -> Self {
        let config = staticship_cloud::load_aws_config().await;
        Self::new(
            FetchBuild::new(settings),
            ArchiveDeployer::new(AmplifyPlatform::from_config(&config), HttpUploader::new()),
        )
    }
}

impl<R: CommandRunner, P: HostingPlatform, U: ArchiveUploader> DeployFunction<R, P, U> {
    pub fn new(pipeline: FetchBuild<R>, deployer: ArchiveDeployer<P, U>) -> Self {
        Self { pipeline, deployer }
    }

    /// Handle one invocation. Every failure is logged and collapsed into
    /// the generic 500 response.
    pub async fn handle(&self, env: &impl EnvSource, event: &Value) -> DeployResponse {
        match self.run(env, event).await {
            Ok(outcome) => {
                tracing::info!(
                    job_id = %outcome.job_id,
                    status = %outcome.status,
                    "deployment started"
                );
                DeployResponse::success(&outcome.status)
            }
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "archive deploy failed");
                DeployResponse::failure()
            }
        }
    }

    async fn run(&self, env: &impl EnvSource, event: &Value) -> anyhow::Result<DeployOutcome> {
        let config = deploy_job_config(env, event)?;

        let settings = self.pipeline.settings();
        let job = super::build_job(settings, &config.repo_name, &config.api_url);
        let build = self.pipeline.run(&job).await?;

        let source = build.output_dir;
        let dest = job.archive_path(settings);
        let archive = tokio::task::spawn_blocking(move || create_archive(&source, &dest))
            .await
            .context("archive task did not complete")??;

        let outcome = self
            .deployer
            .deploy(&config.app_id, &config.branch_name, &archive.path)
            .await?;
        Ok(outcome)
    }
}
