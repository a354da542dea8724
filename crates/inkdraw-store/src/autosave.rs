//! Single-slot, file-backed backup of the most recent in-progress drawing.

use std::path::{Path, PathBuf};

const AUTOSAVE_DIR: &str = "autosaves";
const AUTOSAVE_FILE: &str = "autosave.svg";

/// Durable backup slot, independent of any session or resource.
///
/// There is exactly one slot: every write overwrites the previous backup in
/// place. The slot is only cleared by an explicit `clear` call, never as a
/// side effect of reading it.
pub struct AutosaveStore {
    dir: PathBuf,
}

impl AutosaveStore {
    /// Create a store rooted at the plugin-private data directory.
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            dir: data_dir.join(AUTOSAVE_DIR),
        }
    }

    /// Create a store under the current user's data directory.
    #[must_use]
    pub fn in_user_data_dir(app_name: &str) -> Self {
        let base = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
        Self::new(&base.join(app_name))
    }

    fn slot_path(&self) -> PathBuf {
        self.dir.join(AUTOSAVE_FILE)
    }

    /// Overwrite the slot with `data`.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or the write
    /// fails.
    pub async fn write(&self, data: &str) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.slot_path(), data).await
    }

    /// Whether a backup currently exists.
    pub async fn has(&self) -> bool {
        tokio::fs::try_exists(self.slot_path()).await.unwrap_or(false)
    }

    /// Read the current backup, `None` when the slot is empty.
    ///
    /// # Errors
    /// Returns an error if an existing slot cannot be read.
    pub async fn read(&self) -> std::io::Result<Option<String>> {
        if !self.has().await {
            return Ok(None);
        }
        tokio::fs::read_to_string(self.slot_path()).await.map(Some)
    }

    /// Remove the backup slot.
    ///
    /// # Errors
    /// Returns an error if the slot exists but cannot be removed.
    pub async fn clear(&self) -> std::io::Result<()> {
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_store() -> (AutosaveStore, PathBuf) {
        let root = std::env::temp_dir().join(format!("inkdraw-test-{}", Uuid::new_v4().simple()));
        (AutosaveStore::new(&root), root)
    }

    #[tokio::test]
    async fn empty_slot_reads_none() {
        let (store, root) = scratch_store();
        assert!(!store.has().await);
        assert_eq!(store.read().await.unwrap(), None);
        let _ = tokio::fs::remove_dir_all(root).await;
    }

    #[tokio::test]
    async fn repeated_writes_leave_one_record() {
        let (store, root) = scratch_store();

        for payload in ["A", "B", "C"] {
            store.write(payload).await.unwrap();
        }

        assert_eq!(store.read().await.unwrap(), Some("C".to_string()));

        // Reading must not clear the slot.
        assert_eq!(store.read().await.unwrap(), Some("C".to_string()));

        let _ = tokio::fs::remove_dir_all(root).await;
    }

    #[tokio::test]
    async fn clear_is_explicit_and_idempotent() {
        let (store, root) = scratch_store();
        store.write("<svg/>").await.unwrap();

        store.clear().await.unwrap();
        assert_eq!(store.read().await.unwrap(), None);

        // Clearing an already-empty slot is fine.
        store.clear().await.unwrap();

        let _ = tokio::fs::remove_dir_all(root).await;
    }
}
