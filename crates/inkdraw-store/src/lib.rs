//! Resource persistence for drawing sessions.
//!
//! Provides:
//! - `ResourceStore` / `Resource` - Adapter over the host's attachment CRUD
//! - `AutosaveStore` - Single-slot, file-backed crash backup
//! - `TemporaryDirectory` - Scratch files for the host's file-based transfer
//! - `MemoryAttachmentStore` - In-memory attachment store for tests and demos

pub mod autosave;
pub mod memory;
pub mod resource;
pub mod tempdir;
pub mod title;

pub use autosave::AutosaveStore;
pub use memory::MemoryAttachmentStore;
pub use resource::{Resource, ResourceStore, SVG_MIME, parse_resource_ref};
pub use tempdir::TemporaryDirectory;
