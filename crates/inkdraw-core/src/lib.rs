//! Core abstractions for embedded drawing-editor sessions.
//!
//! This crate provides the fundamental building blocks:
//! - `EditorConfig` / `Settings` - Per-session configuration snapshots
//! - `AttachmentMeta` and the `AttachmentStore` trait - The host's
//!   attachment storage, modeled as an external collaborator

pub mod attachment;
pub mod config;

pub use attachment::{AttachmentMeta, AttachmentStore, StoreError};
pub use config::{EditorConfig, KeybindingMap, Settings, StyleMode, ToolbarType};
