//! Abstract contract every hosting surface implements.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use inkdraw_channel::{
    ChannelError, DialogButton, DialogResult, MessageHandler, SaveMethod, WebViewMessage,
};
use thiserror::Error;

/// Hosting-surface error.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),
    #[error("host view error: {0}")]
    Host(String),
}

/// One concrete hosting surface for the editor (embedded panel or detached
/// window). A view may be reused across sequential sessions but never holds
/// two sessions concurrently; the session manager's pool enforces that.
#[async_trait]
pub trait DrawingView: Send + Sync {
    /// Ask the surface to load a script or stylesheet, by plugin-root path.
    async fn add_script(&self, path: &str) -> Result<(), ViewError>;

    /// Replace the dialog button row shown by the host chrome.
    async fn set_dialog_buttons(&self, buttons: &[DialogButton]) -> Result<(), ViewError>;

    /// Fire-and-forget message to the embedded editor.
    fn post_message(&self, message: WebViewMessage);

    /// Register the handler receiving every editor message.
    fn on_message(&self, handler: MessageHandler);

    /// Present the surface; suspends until the terminal button click.
    async fn show_dialog(&self) -> Result<DialogResult, ViewError>;

    /// Whether a dialog is currently presented on this surface.
    fn is_open(&self) -> bool;

    /// Allow or forbid the surface from filling the host window. Not used
    /// by all implementations.
    async fn set_can_fullscreen(&self, _enabled: bool) -> Result<(), ViewError> {
        Ok(())
    }
}

/// Modal alert surface supplied by the host application.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn alert(&self, message: &str);
}

/// Capability invoked with exported SVG text when the user saves.
pub type SaveCallback =
    Arc<dyn Fn(String) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Build a `SaveCallback` from an async closure.
pub fn save_callback<F, Fut>(f: F) -> SaveCallback
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |data| Box::pin(f(data)))
}

/// Capability pair bound to a session at start.
///
/// `overwrite` is always present. `save_as_new` is absent in overwrite-only
/// entry points (for example the in-note edit button), where creating a copy
/// is not a legal action.
#[derive(Clone)]
pub struct SaveCallbacks {
    pub overwrite: SaveCallback,
    pub save_as_new: Option<SaveCallback>,
}

/// Options for one editing session.
#[derive(Clone)]
pub struct InsertDrawingOptions {
    /// SVG text to load into the editor, `None` for a blank drawing.
    pub initial_data: Option<String>,
    pub save_callbacks: SaveCallbacks,
    /// Pre-seeded save method; skips the save-choice prompt when set.
    pub initial_save_method: Option<SaveMethod>,
}
