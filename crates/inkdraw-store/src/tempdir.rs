//! Scratch-file allocation for the host's file-based transfer mechanism.

use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use uuid::Uuid;

/// A per-process scratch directory.
///
/// Attachment payloads are written here before being handed to the host by
/// path. The directory and everything in it is removed when the value is
/// dropped; removal is best-effort since the process may be torn down by
/// the host at any time.
pub struct TemporaryDirectory {
    path: PathBuf,
    file_counter: AtomicU64,
}

impl TemporaryDirectory {
    /// Create a fresh scratch directory under the OS temp dir.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub async fn create() -> std::io::Result<Self> {
        let path = std::env::temp_dir().join(format!("inkdraw-{}", Uuid::new_v4().simple()));
        tokio::fs::create_dir_all(&path).await?;
        Ok(Self {
            path,
            file_counter: AtomicU64::new(0),
        })
    }

    /// Path of the scratch directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reserve a new file path. `file_extension`, if given, should include
    /// the leading dot.
    #[must_use]
    pub fn next_file_path(&self, file_extension: &str) -> PathBuf {
        let id = self.file_counter.fetch_add(1, Ordering::Relaxed);
        self.path.join(format!("tmp{id}{file_extension}"))
    }

    /// Write `data` to a fresh scratch file and return its path.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub async fn new_file(&self, data: &str, file_extension: &str) -> std::io::Result<PathBuf> {
        let path = self.next_file_path(file_extension);
        tokio::fs::write(&path, data).await?;
        Ok(path)
    }
}

impl Drop for TemporaryDirectory {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            tracing::debug!("failed to remove scratch directory: {e}");
        }
    }
}
