//! In-memory attachment store.

use std::{collections::HashMap, path::Path, sync::RwLock};

use async_trait::async_trait;
use inkdraw_core::{AttachmentMeta, AttachmentStore, StoreError};
use uuid::Uuid;

struct StoredAttachment {
    meta: AttachmentMeta,
    data: Vec<u8>,
}

/// In-memory attachment store.
///
/// Useful for tests and the demo host. Data is lost on restart.
pub struct MemoryAttachmentStore {
    attachments: RwLock<HashMap<String, StoredAttachment>>,
}

impl MemoryAttachmentStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            attachments: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored attachments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attachments.read().map(|a| a.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Seed an attachment with a fixed id, for tests.
    pub fn insert_raw(&self, meta: AttachmentMeta, data: Vec<u8>) {
        if let Ok(mut attachments) = self.attachments.write() {
            attachments.insert(meta.id.clone(), StoredAttachment { meta, data });
        }
    }
}

impl Default for MemoryAttachmentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AttachmentStore for MemoryAttachmentStore {
    async fn get(&self, id: &str) -> Result<Option<AttachmentMeta>, StoreError> {
        Ok(self
            .attachments
            .read()
            .map_err(|e| StoreError::Host(e.to_string()))?
            .get(id)
            .map(|stored| stored.meta.clone()))
    }

    async fn get_file(&self, id: &str) -> Result<Vec<u8>, StoreError> {
        self.attachments
            .read()
            .map_err(|e| StoreError::Host(e.to_string()))?
            .get(id)
            .map(|stored| stored.data.clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn post(&self, meta: AttachmentMeta, file: &Path) -> Result<AttachmentMeta, StoreError> {
        let data = tokio::fs::read(file).await?;
        let meta = AttachmentMeta {
            id: Uuid::new_v4().simple().to_string(),
            ..meta
        };

        self.attachments
            .write()
            .map_err(|e| StoreError::Host(e.to_string()))?
            .insert(meta.id.clone(), StoredAttachment {
                meta: meta.clone(),
                data,
            });

        Ok(meta)
    }

    async fn put(&self, id: &str, meta: AttachmentMeta, file: &Path) -> Result<(), StoreError> {
        let data = tokio::fs::read(file).await?;
        let mut attachments = self
            .attachments
            .write()
            .map_err(|e| StoreError::Host(e.to_string()))?;

        let stored = attachments
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        // Identity is immutable; only payload and mutable metadata change.
        stored.meta = AttachmentMeta {
            id: stored.meta.id.clone(),
            created_time: stored.meta.created_time,
            ..meta
        };
        stored.data = data;

        Ok(())
    }
}
