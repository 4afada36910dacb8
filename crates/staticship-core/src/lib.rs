//! Core types and configuration for staticship.
//!
//! This crate defines the environment-driven job configuration
//! ([`SyncJobConfig`], [`DeployJobConfig`]), the optional `staticship.toml`
//! build settings ([`BuildSettings`]), Build Job path conventions
//! ([`BuildJob`], [`ScratchRoot`]), and the extension → content type table.

pub mod config;
pub mod content_type;
pub mod error;
pub mod job;

pub use config::{
    BranchSource, BuildSettings, DeployJobConfig, EnvSource, ProcessEnv, SyncJobConfig, env_keys,
};
pub use content_type::{DEFAULT_CONTENT_TYPE, content_type_for};
pub use error::{Error, Result};
pub use job::{BuildJob, ScratchRoot};
