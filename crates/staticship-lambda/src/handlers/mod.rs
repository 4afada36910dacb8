mod archive_deploy;
mod directory_sync;

pub use archive_deploy::{DeployFunction, DeployResponse, deploy_job_config};
pub use directory_sync::{SyncFunction, SyncResponse};

use staticship_core::{BuildJob, BuildSettings, ScratchRoot};

/// Build Job rooted at the configured scratch space.
fn build_job(settings: &BuildSettings, repo_name: &str, api_url: &str) -> BuildJob {
    BuildJob::new(
        repo_name,
        api_url,
        ScratchRoot::new(settings.scratch_root.clone()),
    )
}
