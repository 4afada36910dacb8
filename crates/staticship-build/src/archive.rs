use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::artifact::{ArtifactError, list_files};

/// A finished archive on local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    pub files: usize,
    pub bytes: u64,
}

/// Zip every file under `source_dir` into `dest`.
///
/// Entry names are paths relative to `source_dir` with `/` separators.
/// An existing archive at `dest` is replaced.
pub fn create_archive(source_dir: &Path, dest: &Path) -> Result<ArchiveSummary, ArchiveError> {
    let files = list_files(source_dir)?;

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ArchiveError::Create {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    // File::create truncates any previous archive
    let file = File::create(dest).map_err(|e| ArchiveError::Create {
        path: dest.to_path_buf(),
        source: e,
    })?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for entry in &files {
        let name = entry_name(&entry.relative);
        writer
            .start_file(name.as_str(), options)
            .map_err(|e| ArchiveError::Zip {
                entry: name.clone(),
                source: e,
            })?;

        let mut input = File::open(&entry.path).map_err(|e| ArchiveError::ReadFile {
            path: entry.path.clone(),
            source: e,
        })?;
        std::io::copy(&mut input, &mut writer).map_err(|e| ArchiveError::ReadFile {
            path: entry.path.clone(),
            source: e,
        })?;
    }

    let mut inner = writer.finish().map_err(|e| ArchiveError::Zip {
        entry: "<central directory>".to_owned(),
        source: e,
    })?;
    inner.flush().map_err(|e| ArchiveError::Create {
        path: dest.to_path_buf(),
        source: e,
    })?;

    let bytes = std::fs::metadata(dest)
        .map_err(|e| ArchiveError::Create {
            path: dest.to_path_buf(),
            source: e,
        })?
        .len();

    tracing::info!(
        archive = %dest.display(),
        files = files.len(),
        bytes,
        "archive created"
    );

    Ok(ArchiveSummary {
        path: dest.to_path_buf(),
        files: files.len(),
        bytes,
    })
}

fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("failed to enumerate build output")]
    Artifact(#[from] ArtifactError),

    #[error("failed to create archive at {path}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read {path} into archive")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write archive entry {entry}")]
    Zip {
        entry: String,
        source: zip::result::ZipError,
    },
}
