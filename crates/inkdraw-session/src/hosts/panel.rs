//! Editor hosted in an embedded dialog panel.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use inkdraw_channel::{
    DialogButton, DialogResult, LocalChannel, MessageChannel, MessageHandler, WebViewMessage,
};

use crate::view::{DrawingView, ViewError};

/// Chrome stylesheets toggling the panel between filling the host window
/// and a regular dialog frame.
const FULLSCREEN_STYLE: &str = "dialog/chrome/fullscreen.css";
const WINDOWED_STYLE: &str = "dialog/chrome/windowed.css";

/// Host-application dialog the panel renders into.
#[async_trait]
pub trait PanelBackend: Send + Sync {
    /// Replace the native dialog button row.
    async fn set_buttons(&self, buttons: &[DialogButton]) -> Result<(), ViewError>;

    /// Load a script or stylesheet into the panel's webview.
    async fn add_script(&self, path: &str) -> Result<(), ViewError>;

    /// Load a chrome stylesheet controlling the panel frame itself.
    async fn load_chrome_style(&self, path: &str) -> Result<(), ViewError>;

    /// Present the dialog; resolves with the terminal button click.
    async fn open(&self) -> Result<DialogResult, ViewError>;
}

/// `DrawingView` hosted in the application's embedded dialog.
///
/// The panel fills the host window whenever no dialog buttons are visible,
/// so the native button row never floats over a fullscreen canvas. The
/// toggle is suppressed entirely when the fills-window setting is off.
pub struct PanelHost {
    backend: Arc<dyn PanelBackend>,
    channel: LocalChannel,
    can_fullscreen: AtomicBool,
    fullscreen: AtomicBool,
    open: AtomicBool,
}

impl PanelHost {
    /// Build a panel over `backend`. The returned `LocalChannel` is the
    /// editor-side endpoint the backend wires into its webview glue.
    #[must_use]
    pub fn new(backend: Arc<dyn PanelBackend>) -> (Self, LocalChannel) {
        let (host, editor) = LocalChannel::pair();
        let panel = Self {
            backend,
            channel: host,
            can_fullscreen: AtomicBool::new(true),
            fullscreen: AtomicBool::new(false),
            open: AtomicBool::new(false),
        };
        (panel, editor)
    }

    async fn set_fullscreen(&self, on: bool) -> Result<(), ViewError> {
        let on = on && self.can_fullscreen.load(Ordering::Relaxed);
        if self.fullscreen.swap(on, Ordering::Relaxed) == on {
            return Ok(());
        }
        let style = if on { FULLSCREEN_STYLE } else { WINDOWED_STYLE };
        self.backend.load_chrome_style(style).await
    }
}

#[async_trait]
impl DrawingView for PanelHost {
    async fn add_script(&self, path: &str) -> Result<(), ViewError> {
        self.backend.add_script(path).await
    }

    async fn set_dialog_buttons(&self, buttons: &[DialogButton]) -> Result<(), ViewError> {
        // Buttons and fullscreen are mutually exclusive; whichever chrome
        // state matches the new row is applied first so the row never
        // renders over a fullscreen canvas.
        self.set_fullscreen(buttons.is_empty()).await?;
        self.backend.set_buttons(buttons).await
    }

    fn post_message(&self, message: WebViewMessage) {
        self.channel.notify(message);
    }

    fn on_message(&self, handler: MessageHandler) {
        self.channel.set_handler(handler);
    }

    async fn show_dialog(&self) -> Result<DialogResult, ViewError> {
        self.open.store(true, Ordering::Relaxed);
        let result = self.backend.open().await;
        self.open.store(false, Ordering::Relaxed);
        result
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Relaxed)
    }

    async fn set_can_fullscreen(&self, enabled: bool) -> Result<(), ViewError> {
        self.can_fullscreen.store(enabled, Ordering::Relaxed);
        if !enabled {
            self.set_fullscreen(false).await?;
        }
        Ok(())
    }
}
