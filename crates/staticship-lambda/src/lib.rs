//! Entry points for the two publishing functions.
//!
//! - [`handlers::DeployFunction`] builds, zips, and deploys through Amplify Hosting
//! - [`handlers::SyncFunction`] builds and copies the export into an S3 bucket
//!
//! Both are invoked by `lambda_runtime` in the `archive-deploy` and
//! `directory-sync` binaries, and locally by the `staticship` CLI.

pub mod handlers;
pub mod telemetry;
