use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use serde_json::Value;
use staticship_cloud::CustomResourceEvent;
use staticship_core::{BuildSettings, ProcessEnv, SyncJobConfig};
use staticship_lambda::handlers::{
    DeployFunction, DeployResponse, SyncFunction, SyncResponse, deploy_job_config,
};

/// Directory under the system temp dir used when no scratch root is configured.
const LOCAL_SCRATCH_DIR: &str = "staticship";

/// Run the archive deploy handler locally.
pub async fn archive_deploy(
    event: Option<PathBuf>,
    scratch_root: Option<PathBuf>,
    config: &Path,
) -> anyhow::Result<()> {
    let event = read_event(event.as_deref())?;

    if let Err(e) = deploy_job_config(&ProcessEnv, &event) {
        tracing::error!(error = %e, "archive deploy failed");
        print_response(&DeployResponse::failure())?;
        anyhow::bail!("archive deploy failed: {e}");
    }

    let settings = load_settings(config, scratch_root)?;
    let function = DeployFunction::from_aws(settings).await;
    let response = function.handle(&ProcessEnv, &event).await;

    print_response(&response)?;
    if response.status_code != 200 {
        anyhow::bail!("archive deploy failed: {}", response.body);
    }
    Ok(())
}

/// Run the directory sync handler locally.
pub async fn directory_sync(
    event: Option<PathBuf>,
    scratch_root: Option<PathBuf>,
    config: &Path,
) -> anyhow::Result<()> {
    let event = read_event(event.as_deref())?;

    // Events with a response endpoint go through the handler so the
    // failure is reported there too.
    let answers_trigger = CustomResourceEvent::from_payload(&event)
        .response_url
        .is_some();
    if !answers_trigger {
        if let Err(e) = SyncJobConfig::from_source(&ProcessEnv) {
            tracing::error!(error = %e, "directory sync failed");
            print_response(&SyncResponse::failure(e.to_string()))?;
            anyhow::bail!("directory sync failed: {e}");
        }
    }

    let settings = load_settings(config, scratch_root)?;
    let function = SyncFunction::from_aws(settings).await;
    let response = function.handle(&ProcessEnv, &event).await;

    print_response(&response)?;
    if response.status_code != 200 {
        anyhow::bail!("directory sync failed: {}", response.message);
    }
    Ok(())
}

fn read_event(path: Option<&Path>) -> anyhow::Result<Value> {
    let Some(path) = path else {
        return Ok(Value::Object(Default::default()));
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read event file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("event file {} is not valid JSON", path.display()))
}

/// Settings file values, with the scratch root taken from `--scratch-root`,
/// then the settings file, then a private directory under the system temp
/// dir. The Lambda default (`/tmp`) is never used locally.
fn load_settings(config: &Path, scratch_root: Option<PathBuf>) -> anyhow::Result<BuildSettings> {
    let mut settings = BuildSettings::load(config)?;
    if let Some(root) = scratch_root {
        settings.scratch_root = root;
    } else if settings.scratch_root == BuildSettings::default().scratch_root {
        settings.scratch_root = std::env::temp_dir().join(LOCAL_SCRATCH_DIR);
    }

    ensure_disposable(&settings.scratch_root)?;
    tracing::debug!(scratch_root = %settings.scratch_root.display(), "build settings loaded");
    Ok(settings)
}

/// Refuse scratch roots whose purge would delete unrelated files: the
/// filesystem root, the home or system temp directory, or the working
/// directory and its ancestors.
fn ensure_disposable(root: &Path) -> anyhow::Result<()> {
    let refuse = |why: &str| {
        anyhow::anyhow!(
            "refusing to use {} as scratch root ({why}); its contents are deleted before every build",
            root.display()
        )
    };

    if root.components().any(|c| c == Component::ParentDir) {
        return Err(refuse("contains `..`"));
    }

    let root = absolute(root)?;
    if root.parent().is_none() {
        return Err(refuse("filesystem root"));
    }
    if absolute(&std::env::current_dir()?)?.starts_with(&root) {
        return Err(refuse("contains the working directory"));
    }
    if root == absolute(&std::env::temp_dir())? {
        return Err(refuse("system temp directory"));
    }
    if let Some(home) = std::env::var_os("HOME") {
        if root == absolute(Path::new(&home))? {
            return Err(refuse("home directory"));
        }
    }
    Ok(())
}

/// Canonical form for existing paths, lexical absolute form otherwise.
fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    let resolved = if path.exists() {
        path.canonicalize()
    } else {
        std::path::absolute(path)
    };
    resolved.with_context(|| format!("failed to resolve {}", path.display()))
}

fn print_response(response: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(())
}
