//! Editor hosted in a detached window.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use inkdraw_channel::{
    DialogButton, DialogResult, MessageChannel, MessageHandler, WebViewMessage, WireChannel,
    WireEnvelope, WireEvent,
};
use tokio::sync::mpsc;

use crate::view::{DrawingView, ViewError};

/// Frame transport to an opened window, plus the origin its frames carry.
pub struct WindowConnection {
    pub origin: String,
    pub outgoing: mpsc::UnboundedSender<WireEnvelope>,
    pub incoming: mpsc::UnboundedReceiver<WireEnvelope>,
}

/// Host-application capability to open the detached editor window.
#[async_trait]
pub trait WindowBackend: Send + Sync {
    /// Open the window and return its frame transport.
    async fn open(&self) -> Result<WindowConnection, ViewError>;
}

#[derive(Default)]
struct Inner {
    scripts: Vec<String>,
    buttons: Vec<DialogButton>,
    handler: Option<MessageHandler>,
    active: Option<Arc<WireChannel>>,
}

/// `DrawingView` hosted in a detached window.
///
/// The window does not exist until `show_dialog` opens it, so scripts,
/// buttons and the message handler applied before then are queued and
/// flushed once the wire channel is up.
pub struct WindowHost {
    backend: Arc<dyn WindowBackend>,
    inner: Mutex<Inner>,
}

impl WindowHost {
    #[must_use]
    pub fn new(backend: Arc<dyn WindowBackend>) -> Self {
        Self {
            backend,
            inner: Mutex::new(Inner::default()),
        }
    }

    fn locked(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Lock poisoning would mean a panic while queueing chrome state;
        // the queued state is still usable.
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl DrawingView for WindowHost {
    async fn add_script(&self, path: &str) -> Result<(), ViewError> {
        let channel = {
            let mut inner = self.locked();
            inner.scripts.push(path.to_string());
            inner.active.clone()
        };
        if let Some(channel) = channel {
            channel.add_script(path)?;
        }
        Ok(())
    }

    async fn set_dialog_buttons(&self, buttons: &[DialogButton]) -> Result<(), ViewError> {
        let channel = {
            let mut inner = self.locked();
            inner.buttons = buttons.to_vec();
            inner.active.clone()
        };
        if let Some(channel) = channel {
            channel.set_buttons(buttons)?;
        }
        Ok(())
    }

    fn post_message(&self, message: WebViewMessage) {
        let channel = self.locked().active.clone();
        match channel {
            Some(channel) => channel.notify(message),
            None => tracing::debug!(?message, "window not open, message dropped"),
        }
    }

    fn on_message(&self, handler: MessageHandler) {
        let channel = {
            let mut inner = self.locked();
            inner.handler = Some(Arc::clone(&handler));
            inner.active.clone()
        };
        if let Some(channel) = channel {
            channel.set_handler(handler);
        }
    }

    async fn show_dialog(&self) -> Result<DialogResult, ViewError> {
        let connection = self.backend.open().await?;
        let (channel, mut events) =
            WireChannel::spawn(connection.outgoing, connection.incoming, connection.origin);
        let channel = Arc::new(channel);

        // Flush everything queued before the window existed.
        let (scripts, buttons, handler) = {
            let mut inner = self.locked();
            inner.active = Some(Arc::clone(&channel));
            (
                inner.scripts.clone(),
                inner.buttons.clone(),
                inner.handler.clone(),
            )
        };
        if let Some(handler) = handler {
            channel.set_handler(handler);
        }
        for script in &scripts {
            channel.add_script(script)?;
        }
        channel.set_buttons(&buttons)?;

        let result = loop {
            match events.recv().await {
                Some(WireEvent::DialogResult(result)) => break result,
                Some(event) => {
                    tracing::debug!(?event, "window-bound chrome frame received by host");
                }
                // The window was closed without clicking anything, which is
                // a cancel.
                None => {
                    break DialogResult {
                        button: inkdraw_channel::ButtonId::Cancel,
                    };
                }
            }
        };

        let mut inner = self.locked();
        inner.active = None;
        inner.scripts.clear();
        Ok(result)
    }

    fn is_open(&self) -> bool {
        self.locked().active.is_some()
    }
}
