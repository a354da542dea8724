//! The host's attachment storage, modeled as an external collaborator.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Metadata for one stored attachment.
///
/// Timestamps are epoch milliseconds, matching the host's own records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentMeta {
    /// Opaque, host-assigned identifier. Immutable once created.
    pub id: String,
    /// Mime type of the attachment payload.
    pub mime: String,
    /// Human-readable title.
    pub title: String,
    /// File extension without the leading dot, if known.
    pub file_extension: Option<String>,
    /// Creation timestamp.
    pub created_time: Option<i64>,
    /// Last-update timestamp.
    pub updated_time: Option<i64>,
}

/// Attachment storage error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no attachment matches {0:?}")]
    NotFound(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("host storage error: {0}")]
    Host(String),
}

/// Trait for the host's attachment CRUD operations.
///
/// Payloads travel as file paths because the host's transfer mechanism is
/// file-based; callers stage data through a temporary directory.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Fetch metadata for an attachment, `None` when the id is unknown.
    async fn get(&self, id: &str) -> Result<Option<AttachmentMeta>, StoreError>;

    /// Fetch the attachment payload.
    async fn get_file(&self, id: &str) -> Result<Vec<u8>, StoreError>;

    /// Create a new attachment from a staged file. The host assigns the id.
    async fn post(&self, meta: AttachmentMeta, file: &Path) -> Result<AttachmentMeta, StoreError>;

    /// Replace the payload and metadata of an existing attachment.
    async fn put(&self, id: &str, meta: AttachmentMeta, file: &Path) -> Result<(), StoreError>;
}
