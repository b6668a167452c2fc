//! Filesystem adapter for the shared file.
//!
//! [`FsSharedFile`] implements [`SharedFile`] with `tokio::fs`.  Writes use a
//! plain truncate-and-write rather than an atomic rename: renaming onto a
//! FAT-formatted stick is not atomic either, and readers already tolerate a
//! torn read through the codec's length checks.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::application::ports::SharedFile;

pub mod mock;

/// The shared file on a real filesystem.
#[derive(Debug, Clone)]
pub struct FsSharedFile {
    path: PathBuf,
}

impl FsSharedFile {
    /// Creates an adapter for the file at `path`.  The file need not exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SharedFile for FsSharedFile {
    fn path(&self) -> &Path {
        &self.path
    }

    async fn exists(&self) -> io::Result<bool> {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn read(&self) -> io::Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn write(&self, bytes: &[u8]) -> io::Result<()> {
        tokio::fs::write(&self.path, bytes).await
    }
}

/// Startup check of the configured shared directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharedDirStatus {
    /// The directory exists and can be listed.
    Ready,
    /// Nothing is mounted there yet; the presence poller will wait for it.
    Missing,
}

/// Errors that make the configured directory unusable.
#[derive(Debug, Error)]
pub enum SharedDirError {
    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("cannot read directory {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Checks that `dir` is either a readable directory or does not exist yet.
///
/// # Errors
///
/// Returns [`SharedDirError`] if the path exists but is not a directory, or
/// cannot be accessed.
pub fn probe_shared_dir(dir: &Path) -> Result<SharedDirStatus, SharedDirError> {
    let unreadable = |source| SharedDirError::Unreadable {
        path: dir.to_path_buf(),
        source,
    };
    match std::fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => {
            std::fs::read_dir(dir).map_err(unreadable)?;
            Ok(SharedDirStatus::Ready)
        }
        Ok(_) => Err(SharedDirError::NotADirectory(dir.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(SharedDirStatus::Missing),
        Err(e) => Err(unreadable(e)),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
