pub mod callback;
pub mod deploy;
pub mod hosting;
pub mod store;
pub mod sync;
pub mod upload;

pub use callback::{
    CallbackError, CallbackSender, CallbackStatus, CustomResourceEvent, CustomResourceResponse,
    HttpCallback,
};
pub use deploy::{ArchiveDeployer, DeployError, DeployOutcome};
pub use hosting::{AmplifyPlatform, CreatedDeployment, HostingError, HostingPlatform};
pub use store::{ObjectStore, S3Store, StoreError};
pub use sync::{
    DirectorySynchronizer, FileOutcome, SyncError, SyncReport, UploadStatus, UploadUnit,
    object_key, plan_uploads,
};
pub use upload::{ArchiveUploader, HttpUploader, UploadError};

/// Load the shared AWS configuration from the standard credential chain.
pub async fn load_aws_config() -> aws_config::SdkConfig {
    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    tracing::debug!(region = ?config.region(), "AWS config loaded");
    config
}
