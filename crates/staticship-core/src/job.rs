use std::path::{Component, Path, PathBuf};

use crate::config::BuildSettings;

/// Scratch directory every invocation works inside.
///
/// Injected rather than hard-coded so tests can point it at a temporary
/// directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchRoot(PathBuf);

impl ScratchRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.0.join(path)
    }

    /// Normalize `path` so it lies beneath the scratch root.
    ///
    /// Relative paths are joined onto the root and absolute paths elsewhere
    /// are re-rooted beneath it. `..` components are resolved lexically and
    /// never climb above the root, so the result always starts with it.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        let skip = if path.starts_with(&self.0) {
            self.0.components().count()
        } else {
            0
        };

        let mut within = PathBuf::new();
        for component in path.components().skip(skip) {
            match component {
                Component::Normal(part) => within.push(part),
                Component::ParentDir => {
                    within.pop();
                }
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            }
        }

        if within.as_os_str().is_empty() {
            self.0.clone()
        } else {
            self.0.join(within)
        }
    }
}

/// Ephemeral descriptor for one fetch & build run.
#[derive(Debug, Clone)]
pub struct BuildJob {
    pub repo_name: String,
    pub api_url: String,
    pub scratch: ScratchRoot,
}

impl BuildJob {
    pub fn new(repo_name: impl Into<String>, api_url: impl Into<String>, scratch: ScratchRoot) -> Self {
        Self {
            repo_name: repo_name.into(),
            api_url: api_url.into(),
            scratch,
        }
    }

    /// `<git_base_url>/<repo_name>.git`
    pub fn clone_url(&self, settings: &BuildSettings) -> String {
        format!(
            "{base}/{repo}.git",
            base = settings.git_base_url.trim_end_matches('/'),
            repo = self.repo_name,
        )
    }

    pub fn repo_dir(&self) -> PathBuf {
        self.scratch.join(&self.repo_name)
    }

    pub fn output_dir(&self, settings: &BuildSettings) -> PathBuf {
        self.repo_dir().join(&settings.output_dir)
    }

    pub fn cache_dir(&self, settings: &BuildSettings) -> PathBuf {
        self.scratch.join(&settings.cache_dir)
    }

    pub fn archive_path(&self, settings: &BuildSettings) -> PathBuf {
        self.scratch.join(&settings.archive_name)
    }
}
