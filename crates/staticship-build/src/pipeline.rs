use std::fmt;
use std::path::{Path, PathBuf};

use staticship_core::{BuildJob, BuildSettings};

use crate::runner::{CommandError, CommandOutput, CommandRunner, CommandSpec, RealRunner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    Clean,
    Clone,
    Install,
    Build,
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Clean => "clean",
            Self::Clone => "clone",
            Self::Install => "install",
            Self::Build => "build",
        };
        f.write_str(name)
    }
}

/// Outcome of one completed step, with its captured diagnostic output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: BuildStep,
    pub output: CommandOutput,
}

/// A fully materialized static export.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub output_dir: PathBuf,
    pub steps: Vec<StepReport>,
}

/// Clean → clone → install → build, parameterized over the runner for
/// testability.
pub struct FetchBuild<R: CommandRunner = RealRunner> {
    runner: R,
    settings: BuildSettings,
}

impl FetchBuild<RealRunner> {
    pub fn new(settings: BuildSettings) -> Self {
        Self {
            runner: RealRunner,
            settings,
        }
    }
}

impl<R: CommandRunner> FetchBuild<R> {
    pub fn with_runner(runner: R, settings: BuildSettings) -> Self {
        Self { runner, settings }
    }

    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    /// Run every step in order, stopping at the first failure.
    pub async fn run(&self, job: &BuildJob) -> Result<BuildOutput, BuildError> {
        let steps = vec![
            self.clean(job).await?,
            self.clone_repo(job).await?,
            self.install(job).await?,
            self.build(job).await?,
        ];

        let output_dir = job.output_dir(&self.settings);
        if !output_dir.is_dir() {
            return Err(BuildError::MissingOutput(output_dir));
        }

        tracing::info!(output_dir = %output_dir.display(), "static export ready");
        Ok(BuildOutput { output_dir, steps })
    }

    // ── Steps ──

    async fn clean(&self, job: &BuildJob) -> Result<StepReport, BuildError> {
        let root = job.scratch.path();
        let removed = purge_dir(root).await?;

        tracing::info!(scratch = %root.display(), removed, "scratch space purged");
        Ok(StepReport {
            step: BuildStep::Clean,
            output: CommandOutput {
                stdout: format!("removed {removed} entries from {}", root.display()),
                stderr: String::new(),
            },
        })
    }

    async fn clone_repo(&self, job: &BuildJob) -> Result<StepReport, BuildError> {
        let spec = CommandSpec::new("git", job.scratch.path()).args([
            "clone".to_owned(),
            job.clone_url(&self.settings),
            job.repo_name.clone(),
        ]);
        self.exec(BuildStep::Clone, &spec).await
    }

    async fn install(&self, job: &BuildJob) -> Result<StepReport, BuildError> {
        let spec = self.package_manager(job, &self.settings.install_args);
        self.exec(BuildStep::Install, &spec).await
    }

    async fn build(&self, job: &BuildJob) -> Result<StepReport, BuildError> {
        let spec = self
            .package_manager(job, &self.settings.build_args)
            .env(&self.settings.api_url_var, &job.api_url);
        self.exec(BuildStep::Build, &spec).await
    }

    // ── Helpers ──

    fn package_manager(&self, job: &BuildJob, args: &[String]) -> CommandSpec {
        let cache_dir = job.cache_dir(&self.settings);
        CommandSpec::new(&self.settings.package_manager, job.repo_dir())
            .args(args.iter().cloned())
            .env(&self.settings.cache_var, cache_dir.to_string_lossy())
    }

    async fn exec(&self, step: BuildStep, spec: &CommandSpec) -> Result<StepReport, BuildError> {
        tracing::info!(%step, command = %spec.display(), "running step");

        let output = self
            .runner
            .run(spec)
            .await
            .map_err(|e| BuildError::Step { step, source: e })?;

        tracing::debug!(%step, stdout = %output.stdout, stderr = %output.stderr, "step finished");
        Ok(StepReport { step, output })
    }
}

/// Remove every entry under `root`, creating `root` if absent.
async fn purge_dir(root: &Path) -> Result<usize, BuildError> {
    let clean_err = |e| BuildError::Clean {
        path: root.to_path_buf(),
        source: e,
    };

    tokio::fs::create_dir_all(root).await.map_err(clean_err)?;

    let mut entries = tokio::fs::read_dir(root).await.map_err(clean_err)?;
    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await.map_err(clean_err)? {
        let path = entry.path();
        let file_type = entry.file_type().await.map_err(clean_err)?;
        let result = if file_type.is_dir() {
            tokio::fs::remove_dir_all(&path).await
        } else {
            tokio::fs::remove_file(&path).await
        };
        result.map_err(|e| BuildError::Clean { path, source: e })?;
        removed += 1;
    }

    Ok(removed)
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("failed to clean scratch space at {path}")]
    Clean {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{step} step failed")]
    Step {
        step: BuildStep,
        source: CommandError,
    },

    #[error("build finished but produced no output at {0}")]
    MissingOutput(PathBuf),
}
