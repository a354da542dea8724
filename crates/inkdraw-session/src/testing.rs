//! Test doubles shared across this crate's test modules.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use inkdraw_channel::{
    DialogButton, DialogResult, LocalChannel, MessageChannel, MessageHandler, WebViewMessage,
};
use inkdraw_store::AutosaveStore;

use crate::view::{AlertSink, DrawingView, ViewError};

/// In-process `DrawingView` backed by a `LocalChannel` pair.
///
/// The host side is driven by the code under test; `editor_endpoint` hands
/// tests the other end so they can play the embedded editor.
pub(crate) struct TestView {
    host: LocalChannel,
    editor: Arc<LocalChannel>,
    scripts: Mutex<Vec<String>>,
    buttons: Mutex<Vec<Vec<DialogButton>>>,
    dialog_tx: tokio::sync::mpsc::UnboundedSender<DialogResult>,
    dialog_rx: tokio::sync::Mutex<tokio::sync::mpsc::UnboundedReceiver<DialogResult>>,
    open: std::sync::atomic::AtomicBool,
}

impl TestView {
    pub(crate) fn new() -> Self {
        let (host, editor) = LocalChannel::pair();
        let (dialog_tx, dialog_rx) = tokio::sync::mpsc::unbounded_channel();
        Self {
            host,
            editor: Arc::new(editor),
            scripts: Mutex::new(Vec::new()),
            buttons: Mutex::new(Vec::new()),
            dialog_tx,
            dialog_rx: tokio::sync::Mutex::new(dialog_rx),
            open: std::sync::atomic::AtomicBool::new(false),
        }
    }

    /// The endpoint a test uses to play the embedded editor.
    pub(crate) fn editor_endpoint(&self) -> Arc<LocalChannel> {
        Arc::clone(&self.editor)
    }

    /// Simulate the user clicking a terminal dialog button.
    pub(crate) fn resolve_dialog(&self, result: DialogResult) {
        let _ = self.dialog_tx.send(result);
    }

    pub(crate) fn last_buttons(&self) -> Option<Vec<DialogButton>> {
        self.buttons.lock().unwrap().last().cloned()
    }

    pub(crate) fn scripts(&self) -> Vec<String> {
        self.scripts.lock().unwrap().clone()
    }
}

#[async_trait]
impl DrawingView for TestView {
    async fn add_script(&self, path: &str) -> Result<(), ViewError> {
        self.scripts.lock().unwrap().push(path.to_string());
        Ok(())
    }

    async fn set_dialog_buttons(&self, buttons: &[DialogButton]) -> Result<(), ViewError> {
        self.buttons.lock().unwrap().push(buttons.to_vec());
        Ok(())
    }

    fn post_message(&self, message: WebViewMessage) {
        self.host.notify(message);
    }

    fn on_message(&self, handler: MessageHandler) {
        self.host.set_handler(handler);
    }

    async fn show_dialog(&self) -> Result<DialogResult, ViewError> {
        use std::sync::atomic::Ordering;
        self.open.store(true, Ordering::Relaxed);
        let result = self
            .dialog_rx
            .lock()
            .await
            .recv()
            .await
            .ok_or_else(|| ViewError::Host("test dialog torn down".to_string()));
        self.open.store(false, Ordering::Relaxed);
        result
    }

    fn is_open(&self) -> bool {
        self.open.load(std::sync::atomic::Ordering::Relaxed)
    }
}

/// Alert sink that records every message.
#[derive(Default)]
pub(crate) struct RecordingAlerts {
    messages: Mutex<Vec<String>>,
}

impl RecordingAlerts {
    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlertSink for RecordingAlerts {
    async fn alert(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// Autosave store rooted in a fresh scratch directory.
pub(crate) fn scratch_autosave() -> (AutosaveStore, PathBuf) {
    let root = std::env::temp_dir().join(format!("inkdraw-test-{}", uuid::Uuid::new_v4().simple()));
    (AutosaveStore::new(&root), root)
}
