use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable names read by the entry points.
pub mod env_keys {
    pub const REPO_NAME: &str = "REPO_NAME";
    pub const API_URL: &str = "NEXT_PUBLIC_API_URL";
    pub const BUCKET_NAME: &str = "BUCKET_NAME";
    pub const KEY_PREFIX: &str = "KEY_PREFIX";
    pub const AMPLIFY_APP_ID: &str = "AMPLIFY_APP_ID";
    pub const AMPLIFY_BRANCH_NAME: &str = "AMPLIFY_BRANCH_NAME";
}

/// Source of configuration values.
///
/// Production code reads the process environment through [`ProcessEnv`];
/// tests pass a `HashMap` so nothing touches process-global state.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        // arch-lint: allow(no-silent-result-drop) reason="an unset or non-UTF-8 variable is reported as a missing config value by the caller"
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Configuration for the directory sync entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncJobConfig {
    pub bucket_name: String,
    pub repo_name: String,
    pub api_url: String,
    /// Object key prefix; keys are bare relative paths when `None`.
    pub key_prefix: Option<String>,
}

impl SyncJobConfig {
    /// Resolve from the environment. Fails on the first missing value.
    pub fn from_source(env: &impl EnvSource) -> crate::Result<Self> {
        let config = Self {
            bucket_name: required(env, env_keys::BUCKET_NAME)?,
            repo_name: required(env, env_keys::REPO_NAME)?,
            api_url: required(env, env_keys::API_URL)?,
            key_prefix: optional(env, env_keys::KEY_PREFIX),
        };

        tracing::debug!(
            bucket = %config.bucket_name,
            repo = %config.repo_name,
            prefix = ?config.key_prefix,
            "sync job config resolved"
        );
        Ok(config)
    }
}

/// Configuration for the archive deploy entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployJobConfig {
    pub repo_name: String,
    pub api_url: String,
    pub app_id: String,
    pub branch_name: String,
    pub branch_source: BranchSource,
}

/// Where [`DeployJobConfig::branch_name`] was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchSource {
    Event,
    Environment,
}

impl DeployJobConfig {
    /// Resolve from the environment.
    ///
    /// `event_branch` is the `AMPLIFY_BRANCH_NAME` field carried on the
    /// invocation event; it wins over the environment variable when it is
    /// non-blank.
    pub fn from_source(env: &impl EnvSource, event_branch: Option<&str>) -> crate::Result<Self> {
        let repo_name = required(env, env_keys::REPO_NAME)?;
        let api_url = required(env, env_keys::API_URL)?;
        let app_id = required(env, env_keys::AMPLIFY_APP_ID)?;

        let (branch_name, branch_source) =
            match event_branch.map(str::trim).filter(|b| !b.is_empty()) {
                Some(branch) => (branch.to_owned(), BranchSource::Event),
                None => (
                    required(env, env_keys::AMPLIFY_BRANCH_NAME)?,
                    BranchSource::Environment,
                ),
            };

        tracing::debug!(
            repo = %repo_name,
            app_id = %app_id,
            branch = %branch_name,
            source = ?branch_source,
            "deploy job config resolved"
        );

        Ok(Self {
            repo_name,
            api_url,
            app_id,
            branch_name,
            branch_source,
        })
    }
}

fn required(env: &impl EnvSource, key: &'static str) -> crate::Result<String> {
    optional(env, key).ok_or(crate::Error::MissingEnvVar(key))
}

fn optional(env: &impl EnvSource, key: &str) -> Option<String> {
    env.var(key)
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// staticship.toml build settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSettings {
    /// Base URL repositories are cloned from (`<base>/<repo>.git`)
    #[serde(default = "default_git_base_url")]
    pub git_base_url: String,
    /// Package manager executable
    #[serde(default = "default_package_manager")]
    pub package_manager: String,
    /// Arguments for the dependency install step
    #[serde(default = "default_install_args")]
    pub install_args: Vec<String>,
    /// Arguments for the build step
    #[serde(default = "default_build_args")]
    pub build_args: Vec<String>,
    /// Static export directory, relative to the cloned repository
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Build-time variable that receives the API URL
    #[serde(default = "default_api_url_var")]
    pub api_url_var: String,
    /// Variable pointing the package manager at its cache directory
    #[serde(default = "default_cache_var")]
    pub cache_var: String,
    /// Cache directory, relative to the scratch root
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
    /// Archive file name, relative to the scratch root
    #[serde(default = "default_archive_name")]
    pub archive_name: String,
    /// Scratch directory purged at the start of every invocation
    #[serde(default = "default_scratch_root")]
    pub scratch_root: PathBuf,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            git_base_url: default_git_base_url(),
            package_manager: default_package_manager(),
            install_args: default_install_args(),
            build_args: default_build_args(),
            output_dir: default_output_dir(),
            api_url_var: default_api_url_var(),
            cache_var: default_cache_var(),
            cache_dir: default_cache_dir(),
            archive_name: default_archive_name(),
            scratch_root: default_scratch_root(),
        }
    }
}

impl BuildSettings {
    /// Load from the TOML file at `path`, or return defaults if not found.
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content =
                std::fs::read_to_string(path).map_err(|e| crate::Error::ConfigLoad {
                    path: path.to_path_buf(),
                    source: e,
                })?;
            toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: path.to_path_buf(),
                source: e,
            })
        } else {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            Ok(Self::default())
        }
    }
}

fn default_git_base_url() -> String {
    "https://github.com/nulib".to_owned()
}

fn default_package_manager() -> String {
    "npm".to_owned()
}

fn default_install_args() -> Vec<String> {
    vec!["install".to_owned()]
}

fn default_build_args() -> Vec<String> {
    vec!["run".to_owned(), "build".to_owned()]
}

fn default_output_dir() -> String {
    "out".to_owned()
}

fn default_api_url_var() -> String {
    env_keys::API_URL.to_owned()
}

fn default_cache_var() -> String {
    "NPM_CONFIG_CACHE".to_owned()
}

fn default_cache_dir() -> String {
    ".npm".to_owned()
}

fn default_archive_name() -> String {
    "deployment.zip".to_owned()
}

fn default_scratch_root() -> PathBuf {
    PathBuf::from("/tmp")
}
