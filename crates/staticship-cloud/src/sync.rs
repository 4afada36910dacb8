//! Directory → object store synchronization.
//!
//! Every regular file under the source root becomes one object whose key is
//! its relative path (optionally prefixed) and whose content type is inferred
//! from its extension. All uploads run concurrently and each reports its own
//! outcome; only a failure to enumerate the directory fails the whole call.

use std::path::{Path, PathBuf};

use futures::future::join_all;
use serde::Serialize;
use staticship_build::artifact::{ArtifactError, ArtifactFile, list_files};
use staticship_core::{ScratchRoot, content_type_for};

use crate::store::{ObjectStore, S3Store};

/// One file paired with its destination key and content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadUnit {
    /// Path relative to the source root.
    pub file: String,
    #[serde(skip)]
    pub path: PathBuf,
    pub key: String,
    pub content_type: &'static str,
}

impl UploadUnit {
    fn from_artifact(entry: ArtifactFile, prefix: Option<&str>) -> Self {
        let file = entry.relative_key();
        Self {
            key: object_key(prefix, &file),
            content_type: content_type_for(&entry.relative),
            path: entry.path,
            file,
        }
    }
}

/// `<prefix>/<relative>` when a prefix is given, else the relative path.
pub fn object_key(prefix: Option<&str>, relative: &str) -> String {
    match prefix.filter(|p| !p.is_empty()) {
        Some(prefix) => format!("{prefix}/{relative}"),
        None => relative.to_owned(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadStatus {
    Uploaded,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub file: String,
    pub key: String,
    pub content_type: &'static str,
    #[serde(flatten)]
    pub status: UploadStatus,
}

impl FileOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self.status, UploadStatus::Uploaded)
    }
}

/// Aggregate result of one sync.
///
/// `success` reports that enumeration completed and every upload was
/// attempted. It does not mean every upload succeeded; check
/// [`SyncReport::all_uploaded`] or the per-file results for that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub success: bool,
    pub message: String,
    pub results: Vec<FileOutcome>,
}

impl SyncReport {
    pub fn uploaded_count(&self) -> usize {
        self.results.iter().filter(|r| r.succeeded()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileOutcome> {
        self.results.iter().filter(|r| !r.succeeded())
    }

    pub fn all_uploaded(&self) -> bool {
        self.results.iter().all(FileOutcome::succeeded)
    }
}

/// Publishes a local directory into an object store bucket,
/// parameterized over the store for testability.
pub struct DirectorySynchronizer<S: ObjectStore = S3Store> {
    store: S,
    scratch: ScratchRoot,
}

impl<S: ObjectStore> DirectorySynchronizer<S> {
    pub fn new(store: S, scratch: ScratchRoot) -> Self {
        Self { store, scratch }
    }

    /// Enumerate `source` and derive the upload units without uploading.
    ///
    /// `source` is normalized beneath the scratch root first.
    pub async fn plan(
        &self,
        source: &Path,
        prefix: Option<&str>,
    ) -> Result<Vec<UploadUnit>, SyncError> {
        plan_uploads(self.scratch.resolve(source), prefix).await
    }

    /// Upload every file under `source` into `bucket`.
    pub async fn sync(
        &self,
        source: &Path,
        bucket: &str,
        prefix: Option<&str>,
    ) -> Result<SyncReport, SyncError> {
        let units = self.plan(source, prefix).await?;
        tracing::info!(
            source = %source.display(),
            %bucket,
            files = units.len(),
            "syncing directory"
        );

        let results = join_all(units.into_iter().map(|unit| self.upload(bucket, unit))).await;

        let report = SyncReport {
            success: true,
            message: "Directory upload completed".to_owned(),
            results,
        };
        tracing::info!(
            uploaded = report.uploaded_count(),
            failed = report.results.len() - report.uploaded_count(),
            "directory sync finished"
        );
        Ok(report)
    }

    async fn upload(&self, bucket: &str, unit: UploadUnit) -> FileOutcome {
        let status = match self.put(bucket, &unit).await {
            Ok(()) => {
                tracing::debug!(file = %unit.file, key = %unit.key, "uploaded");
                UploadStatus::Uploaded
            }
            Err(error) => {
                tracing::error!(file = %unit.file, %error, "upload failed");
                UploadStatus::Failed { error }
            }
        };

        FileOutcome {
            file: unit.file,
            key: unit.key,
            content_type: unit.content_type,
            status,
        }
    }

    async fn put(&self, bucket: &str, unit: &UploadUnit) -> Result<(), String> {
        let body = tokio::fs::read(&unit.path)
            .await
            .map_err(|e| format!("failed to read {}: {e}", unit.path.display()))?;

        self.store
            .put_object(bucket, &unit.key, body, unit.content_type)
            .await
            .map_err(|e| e.to_string())
    }
}

/// Enumerate `root` and derive one upload unit per regular file.
pub async fn plan_uploads(
    root: PathBuf,
    prefix: Option<&str>,
) -> Result<Vec<UploadUnit>, SyncError> {
    let listing_root = root.clone();
    let files = tokio::task::spawn_blocking(move || list_files(&listing_root))
        .await
        .map_err(|e| SyncError::ListingTask { source: e })?
        .map_err(|e| SyncError::Listing { path: root, source: e })?;

    Ok(files
        .into_iter()
        .map(|entry| UploadUnit::from_artifact(entry, prefix))
        .collect())
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("failed to upload directory {path}")]
    Listing {
        path: PathBuf,
        source: ArtifactError,
    },

    #[error("directory listing task did not complete")]
    ListingTask { source: tokio::task::JoinError },
}
