//! The editor-session state machine.
//!
//! One `EditorSession` drives one editing transaction: it answers the
//! embedded editor's messages, resolves the save method, persists autosave
//! backups, and turns the terminal button click into a "did save" verdict.

use std::sync::Arc;

use inkdraw_channel::{
    ButtonId, DialogButton, MessageHandler, SaveMethod, WebViewMessage, WebViewResponse,
};
use inkdraw_core::EditorConfig;
use inkdraw_store::AutosaveStore;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::strings::Localization;
use crate::view::{AlertSink, DrawingView, InsertDrawingOptions, SaveCallbacks, ViewError};

/// Fixed client-side bundle injected into every hosting surface.
pub const WEBVIEW_SCRIPT: &str = "dialog/webview/webview.js";
pub const WEBVIEW_STYLE: &str = "dialog/webview/webview.css";

/// Session error.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("view error: {0}")]
    View(#[from] ViewError),
}

/// Mutable protocol state shared between the message handler and the
/// dialog-result resolution.
struct SessionState {
    /// `None` until the user chooses or the session is opened with only
    /// one legal option.
    save_method: Option<SaveMethod>,
    /// Staged payload awaiting a save-method decision.
    pending_save: Option<String>,
    /// Whether any save callback has succeeded this session.
    did_save: bool,
}

/// Everything the message handler needs, clonable into the `'static`
/// handler closure.
struct SessionCtx {
    state: Arc<Mutex<SessionState>>,
    view: Arc<dyn DrawingView>,
    callbacks: SaveCallbacks,
    autosave: Arc<AutosaveStore>,
    alerts: Arc<dyn AlertSink>,
    config: EditorConfig,
    strings: &'static Localization,
    initial_data: Option<String>,
}

impl SessionCtx {
    async fn set_buttons(&self, buttons: &[DialogButton]) {
        if let Err(e) = self.view.set_dialog_buttons(buttons).await {
            tracing::error!("failed to update dialog buttons: {e}");
        }
    }

    /// Invoke the bound save callback for `method`.
    ///
    /// On success the editor is notified and a first `SaveAsNew` flips the
    /// session's method to `Overwrite`, so later saves mutate the resource
    /// just created instead of creating another copy. On failure the user
    /// sees an alert and the session state does not advance.
    async fn perform_save(&self, method: SaveMethod, data: String) -> bool {
        let callback = match (method, &self.callbacks.save_as_new) {
            (SaveMethod::SaveAsNew, Some(save_as_new)) => Arc::clone(save_as_new),
            _ => Arc::clone(&self.callbacks.overwrite),
        };

        match callback(data).await {
            Ok(()) => {
                let mut state = self.state.lock().await;
                state.did_save = true;
                if method == SaveMethod::SaveAsNew {
                    state.save_method = Some(SaveMethod::Overwrite);
                }
                drop(state);
                self.view.post_message(WebViewMessage::SaveCompleted);
                true
            }
            Err(e) => {
                tracing::error!("save callback failed: {e:#}");
                self.alerts.alert(&self.strings.not_saved(&e.to_string())).await;
                false
            }
        }
    }

    async fn handle(&self, message: WebViewMessage) -> WebViewResponse {
        match message {
            WebViewMessage::GetInitialData => {
                // The editor has loaded; the emergency exit button can go.
                self.set_buttons(&[]).await;
                WebViewResponse::InitialData {
                    initial_data: self.initial_data.clone(),
                    autosave_interval_ms: u64::try_from(
                        self.config.autosave_interval.as_millis(),
                    )
                    .unwrap_or(u64::MAX),
                    toolbar_type: self.config.toolbar_type,
                    style_mode: self.config.style_mode,
                    keyboard_shortcuts: self.config.keybindings.clone(),
                }
            }
            WebViewMessage::SaveSvg { data } => {
                let method = {
                    let mut state = self.state.lock().await;
                    match state.save_method {
                        None => {
                            state.pending_save = Some(data.clone());
                            None
                        }
                        Some(method) => {
                            state.pending_save = None;
                            Some(method)
                        }
                    }
                };

                match method {
                    None => {
                        self.set_buttons(&[DialogButton::titled(
                            ButtonId::Ok,
                            self.strings.save_and_close,
                        )])
                        .await;
                        WebViewResponse::Save {
                            waiting_for_save_type: true,
                        }
                    }
                    Some(method) => {
                        self.perform_save(method, data).await;
                        WebViewResponse::Save {
                            waiting_for_save_type: false,
                        }
                    }
                }
            }
            WebViewMessage::SetSaveMethod { method } => {
                if self.callbacks.save_as_new.is_none() {
                    // Overwrite-only sessions never honor a method change,
                    // even from a buggy or hostile editor.
                    tracing::warn!(?method, "ignoring save-method change in overwrite-only session");
                    return WebViewResponse::Ack;
                }

                let deferred = {
                    let mut state = self.state.lock().await;
                    state.save_method = Some(method);
                    state.pending_save.take()
                };
                if let Some(data) = deferred {
                    self.perform_save(method, data).await;
                }
                WebViewResponse::Ack
            }
            WebViewMessage::AutosaveSvg { data } => {
                if let Err(e) = self.autosave.clear().await {
                    tracing::warn!("failed to clear autosave slot: {e}");
                }
                if let Err(e) = self.autosave.write(&data).await {
                    tracing::warn!("autosave write failed: {e}");
                }
                WebViewResponse::Ack
            }
            WebViewMessage::ShowCloseButton { is_saved } => {
                let button = if is_saved {
                    DialogButton::titled(ButtonId::Ok, self.strings.close)
                } else {
                    DialogButton::titled(ButtonId::Cancel, self.strings.discard_changes)
                };
                self.set_buttons(&[button]).await;
                WebViewResponse::Ack
            }
            WebViewMessage::HideButtons => {
                self.set_buttons(&[]).await;
                self.state.lock().await.pending_save = None;
                WebViewResponse::Ack
            }
            WebViewMessage::SaveCompleted | WebViewMessage::ResumeEditing => {
                tracing::debug!(?message, "editor-bound message received by host, ignoring");
                WebViewResponse::Ack
            }
        }
    }
}

/// One interactive editing transaction.
pub struct EditorSession {
    view: Arc<dyn DrawingView>,
    config: EditorConfig,
    autosave: Arc<AutosaveStore>,
    alerts: Arc<dyn AlertSink>,
    strings: &'static Localization,
}

impl EditorSession {
    #[must_use]
    pub fn new(
        view: Arc<dyn DrawingView>,
        config: EditorConfig,
        autosave: Arc<AutosaveStore>,
        alerts: Arc<dyn AlertSink>,
        strings: &'static Localization,
    ) -> Self {
        Self {
            view,
            config,
            autosave,
            alerts,
            strings,
        }
    }

    /// Reset the surface prior to use. Safe to call multiple times.
    async fn initialize_dialog(&self) -> Result<(), SessionError> {
        // Sometimes the surface fails to load; a bare cancel button lets
        // the user dismiss it and try again.
        self.view
            .set_dialog_buttons(&[DialogButton::new(ButtonId::Cancel)])
            .await?;
        self.view.add_script(WEBVIEW_SCRIPT).await?;
        self.view.add_script(WEBVIEW_STYLE).await?;
        Ok(())
    }

    /// Present the editor and run the session protocol to completion.
    ///
    /// Returns `true` if the drawing was saved at least once. A cancel
    /// after an earlier successful save still reports `true`.
    ///
    /// # Errors
    /// Returns an error only when the hosting surface itself fails; save
    /// failures are alerted to the user and leave the session retryable.
    pub async fn prompt_for_drawing(
        &self,
        options: InsertDrawingOptions,
    ) -> Result<bool, SessionError> {
        self.initialize_dialog().await?;

        // Without a save-as-new capability there is only one legal method,
        // so the choice prompt is skipped entirely.
        let initial_method = if options.save_callbacks.save_as_new.is_none() {
            Some(SaveMethod::Overwrite)
        } else {
            options.initial_save_method
        };

        let ctx = Arc::new(SessionCtx {
            state: Arc::new(Mutex::new(SessionState {
                save_method: initial_method,
                pending_save: None,
                did_save: false,
            })),
            view: Arc::clone(&self.view),
            callbacks: options.save_callbacks,
            autosave: Arc::clone(&self.autosave),
            alerts: Arc::clone(&self.alerts),
            config: self.config.clone(),
            strings: self.strings,
            initial_data: options.initial_data,
        });

        let handler_ctx = Arc::clone(&ctx);
        let handler: MessageHandler = Arc::new(move |message| {
            let ctx = Arc::clone(&handler_ctx);
            Box::pin(async move { ctx.handle(message).await })
        });
        self.view.on_message(handler);

        let result = self.view.show_dialog().await?;

        let (pending, method, did_save) = {
            let mut state = ctx.state.lock().await;
            (
                state.pending_save.take(),
                state.save_method,
                state.did_save,
            )
        };

        if result.button == ButtonId::Ok {
            if let Some(data) = pending {
                // The user clicked "save and close" without ever picking a
                // method; save-as-new is the documented default.
                let method = method.unwrap_or(SaveMethod::SaveAsNew);
                ctx.perform_save(method, data).await;
                return Ok(true);
            }
        }

        Ok(did_save)
    }
}
