use std::path::{Path, PathBuf};

/// A regular file inside a build artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFile {
    /// Path relative to the artifact root, as enumerated.
    pub relative: PathBuf,
    /// Absolute path on local disk.
    pub path: PathBuf,
}

impl ArtifactFile {
    /// Relative path as enumerated, separators untouched.
    pub fn relative_key(&self) -> String {
        self.relative.to_string_lossy().into_owned()
    }
}

/// Recursively list every regular file beneath `root`, sorted by relative path.
///
/// Only real directories are descended into. Whether an entry counts as a
/// file is decided by its metadata, which follows symlinks; directories are
/// skipped and never produce entries of their own.
pub fn list_files(root: &Path) -> Result<Vec<ArtifactFile>, ArtifactError> {
    let metadata = std::fs::metadata(root).map_err(|e| ArtifactError::Root {
        path: root.to_path_buf(),
        source: e,
    })?;
    if !metadata.is_dir() {
        return Err(ArtifactError::NotADirectory(root.to_path_buf()));
    }

    let mut files = Vec::new();
    walk(root, Path::new(""), &mut files)?;
    files.sort_by(|a, b| a.relative.cmp(&b.relative));

    tracing::debug!(root = %root.display(), count = files.len(), "artifact enumerated");
    Ok(files)
}

fn walk(dir: &Path, relative: &Path, files: &mut Vec<ArtifactFile>) -> Result<(), ArtifactError> {
    let read_err = |e| ArtifactError::ReadDir {
        path: dir.to_path_buf(),
        source: e,
    };

    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let path = entry.path();
        let rel = relative.join(entry.file_name());

        if entry.file_type().map_err(read_err)?.is_dir() {
            walk(&path, &rel, files)?;
            continue;
        }

        let metadata = std::fs::metadata(&path).map_err(|e| ArtifactError::Metadata {
            path: path.clone(),
            source: e,
        })?;
        if metadata.is_file() {
            files.push(ArtifactFile {
                relative: rel,
                path,
            });
        }
    }

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read artifact root {path}")]
    Root {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("artifact root {0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("failed to list directory {path}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read metadata for {path}")]
    Metadata {
        path: PathBuf,
        source: std::io::Error,
    },
}
