use serde::Serialize;
use serde_json::{Value, json};
use staticship_build::{CommandRunner, FetchBuild, RealRunner};
use staticship_cloud::{
    CallbackSender, CustomResourceEvent, CustomResourceResponse, DirectorySynchronizer,
    HttpCallback, ObjectStore, S3Store, SyncReport,
};
use staticship_core::{BuildSettings, EnvSource, ScratchRoot, SyncJobConfig};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub status_code: u16,
    pub message: String,
}

impl SyncResponse {
    pub fn success() -> Self {
        Self {
            status_code: 200,
            message: "Success".to_owned(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status_code: 500,
            message: message.into(),
        }
    }
}

/// Fetch & build, then copy the export file by file into a bucket.
pub struct SyncFunction<
    R: CommandRunner = RealRunner,
    S: ObjectStore = S3Store,
    C: CallbackSender = HttpCallback,
> {
    pipeline: FetchBuild<R>,
    synchronizer: DirectorySynchronizer<S>,
    callback: C,
}

impl SyncFunction {
    /// Production wiring: local processes, S3, and HTTP callback delivery.
    pub async fn from_aws(settings: BuildSettings) -> Self {
        let config = staticship_cloud::load_aws_config().await;
        let scratch = ScratchRoot::new(settings.scratch_root.clone());
        Self::new(
            FetchBuild::new(settings),
            DirectorySynchronizer::new(S3Store::from_config(&config), scratch),
            HttpCallback::new(),
        )
    }
}

impl<R: CommandRunner, S: ObjectStore, C: CallbackSender> SyncFunction<R, S, C> {
    pub fn new(
        pipeline: FetchBuild<R>,
        synchronizer: DirectorySynchronizer<S>,
        callback: C,
    ) -> Self {
        Self {
            pipeline,
            synchronizer,
            callback,
        }
    }

    /// Handle one invocation.
    ///
    /// When the event carries a `ResponseURL` the outcome is also PUT there;
    /// a failed delivery is logged and does not change the response.
    pub async fn handle(&self, env: &impl EnvSource, event: &Value) -> SyncResponse {
        let trigger = CustomResourceEvent::from_payload(event);

        let (response, callback) = match self.run(env).await {
            Ok(report) => {
                if !report.all_uploaded() {
                    let failed: Vec<&str> = report.failed().map(|f| f.file.as_str()).collect();
                    tracing::warn!(?failed, "some files were not uploaded");
                }
                let data = json!({
                    "Uploaded": report.uploaded_count(),
                    "Failed": report.results.len() - report.uploaded_count(),
                });
                (
                    SyncResponse::success(),
                    CustomResourceResponse::success(&trigger, data),
                )
            }
            Err(e) => {
                let message = format!("{e:#}");
                tracing::error!(error = %message, "directory sync failed");
                (
                    SyncResponse::failure(message.clone()),
                    CustomResourceResponse::failure(&trigger, message),
                )
            }
        };

        if let Some(url) = trigger.response_url.as_deref() {
            if let Err(e) = self.callback.send(url, &callback).await {
                tracing::error!(error = %e, "callback delivery failed");
            }
        }

        response
    }

    async fn run(&self, env: &impl EnvSource) -> anyhow::Result<SyncReport> {
        let config = SyncJobConfig::from_source(env)?;

        let job = super::build_job(self.pipeline.settings(), &config.repo_name, &config.api_url);
        let build = self.pipeline.run(&job).await?;

        let report = self
            .synchronizer
            .sync(
                &build.output_dir,
                &config.bucket_name,
                config.key_prefix.as_deref(),
            )
            .await?;
        Ok(report)
    }
}
