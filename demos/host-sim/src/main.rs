//! End-to-end drawing-session simulation against in-memory hosts.
//!
//! Run with: cargo run -p host-sim
//!
//! A scripted editor plays the embedded webview: it boots, autosaves three
//! revisions, saves the drawing as a new resource, overwrites it, then
//! closes. Afterwards the crash backup is restored as a second resource.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use inkdraw_channel::{
    ButtonId, DialogButton, DialogResult, LocalChannel, MessageChannel, WebViewMessage,
};
use inkdraw_core::AttachmentStore;
use inkdraw_session::{
    AlertSink, DrawingView, HostKind, NoteEditor, PanelBackend, PanelHost, SessionManager,
    ViewError, ViewFactory, strings,
};
use inkdraw_store::{AutosaveStore, MemoryAttachmentStore, ResourceStore, TemporaryDirectory};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// The scripted editor's handle on one opened panel.
struct PanelHandles {
    editor: LocalChannel,
    dialog: mpsc::UnboundedSender<DialogResult>,
}

/// Panel chrome that logs instead of rendering.
struct SimPanelBackend {
    dialog_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<DialogResult>>,
}

#[async_trait]
impl PanelBackend for SimPanelBackend {
    async fn set_buttons(&self, buttons: &[DialogButton]) -> Result<(), ViewError> {
        tracing::info!(?buttons, "dialog buttons updated");
        Ok(())
    }

    async fn add_script(&self, path: &str) -> Result<(), ViewError> {
        tracing::debug!(path, "script loaded");
        Ok(())
    }

    async fn load_chrome_style(&self, path: &str) -> Result<(), ViewError> {
        tracing::info!(path, "chrome style swapped");
        Ok(())
    }

    async fn open(&self) -> Result<DialogResult, ViewError> {
        tracing::info!("dialog opened");
        let result = self
            .dialog_rx
            .lock()
            .await
            .recv()
            .await
            .unwrap_or(DialogResult {
                button: ButtonId::Cancel,
            });
        tracing::info!(button = ?result.button, "dialog closed");
        Ok(result)
    }
}

/// Note body the drawing links are inserted into.
#[derive(Default)]
struct DemoNote {
    body: Mutex<String>,
}

#[async_trait]
impl NoteEditor for DemoNote {
    async fn selected_text(&self) -> anyhow::Result<Option<String>> {
        Ok(None)
    }

    async fn insert_text(&self, text: &str) -> anyhow::Result<()> {
        let mut body = self.body.lock().unwrap();
        body.push_str(text);
        body.push('\n');
        tracing::info!(%text, "markup inserted into note");
        Ok(())
    }
}

struct LoggingAlerts;

#[async_trait]
impl AlertSink for LoggingAlerts {
    async fn alert(&self, message: &str) {
        tracing::warn!(%message, "user alert");
    }
}

/// Drive one full editing session from the editor's side of the channel.
async fn scripted_editor(handles: Arc<Mutex<Vec<PanelHandles>>>) {
    let PanelHandles { editor, dialog } = loop {
        if let Some(handles) = handles.lock().unwrap().pop() {
            break handles;
        }
        tokio::task::yield_now().await;
    };

    let initial = editor
        .request(WebViewMessage::GetInitialData)
        .await
        .unwrap();
    tracing::info!(?initial, "editor booted");

    for revision in ["<svg>1</svg>", "<svg>12</svg>", "<svg>123</svg>"] {
        editor
            .request(WebViewMessage::AutosaveSvg {
                data: revision.to_string(),
            })
            .await
            .unwrap();
    }

    // The insert flow pre-seeds save-as-new, so this creates the resource.
    editor
        .request(WebViewMessage::SaveSvg {
            data: "<svg>123</svg>".to_string(),
        })
        .await
        .unwrap();

    // Keep drawing, save again: this time the created resource is
    // overwritten in place.
    editor
        .request(WebViewMessage::SaveSvg {
            data: "<svg>1234</svg>".to_string(),
        })
        .await
        .unwrap();

    editor
        .request(WebViewMessage::ShowCloseButton { is_saved: true })
        .await
        .unwrap();
    dialog
        .send(DialogResult {
            button: ButtonId::Ok,
        })
        .unwrap();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let host_store = Arc::new(MemoryAttachmentStore::new());
    let tempdir = Arc::new(TemporaryDirectory::create().await?);
    let resources = Arc::new(ResourceStore::new(
        Arc::clone(&host_store) as Arc<dyn AttachmentStore>,
        tempdir,
    ));
    let autosave = Arc::new(AutosaveStore::new(
        &std::env::temp_dir().join("inkdraw-host-sim"),
    ));
    let note = Arc::new(DemoNote::default());

    let handles: Arc<Mutex<Vec<PanelHandles>>> = Arc::default();
    let factory_handles = Arc::clone(&handles);
    let factory: ViewFactory = Arc::new(move || {
        let (dialog_tx, dialog_rx) = mpsc::unbounded_channel();
        let backend = Arc::new(SimPanelBackend {
            dialog_rx: tokio::sync::Mutex::new(dialog_rx),
        });
        let (panel, editor) = PanelHost::new(backend as Arc<dyn PanelBackend>);
        factory_handles.lock().unwrap().push(PanelHandles {
            editor,
            dialog: dialog_tx,
        });
        Arc::new(panel) as Arc<dyn DrawingView>
    });

    let mut manager = SessionManager::new(
        resources,
        Arc::clone(&autosave),
        Arc::clone(&note) as Arc<dyn NoteEditor>,
        Arc::new(LoggingAlerts) as Arc<dyn AlertSink>,
        strings::default_locale(),
    );
    manager.register_host(HostKind::EmbeddedPanel, factory);

    tokio::spawn(scripted_editor(Arc::clone(&handles)));

    match manager.edit_or_insert_drawing(HostKind::EmbeddedPanel).await? {
        Some(resource) => {
            tracing::info!(id = %resource.id, title = %resource.title, "session saved a drawing");
        }
        None => tracing::info!("session closed without saving"),
    }

    // The crash backup survives the session; bring it back as a second
    // resource, then clear the slot.
    if let Some(restored) = manager.restore_autosave().await? {
        tracing::info!(id = %restored.id, "autosave restored into the note");
    }
    manager.delete_autosave().await?;

    tracing::info!(
        attachments = host_store.len(),
        note = %note.body.lock().unwrap(),
        "final state"
    );
    Ok(())
}
