//! Wire vocabulary between the host controller and the embedded editor.

use inkdraw_core::{KeybindingMap, StyleMode, ToolbarType};
use serde::{Deserialize, Serialize};

/// How a save resolves: create a new resource or mutate the existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SaveMethod {
    SaveAsNew,
    Overwrite,
}

/// Identifier of a terminal dialog button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ButtonId {
    Ok,
    Cancel,
}

/// One button in the host chrome's dialog button row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogButton {
    pub id: ButtonId,
    /// Label override; the host supplies a default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl DialogButton {
    #[must_use]
    pub fn new(id: ButtonId) -> Self {
        Self { id, title: None }
    }

    #[must_use]
    pub fn titled(id: ButtonId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: Some(title.into()),
        }
    }
}

/// Terminal result of a dialog: which button the user clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogResult {
    pub button: ButtonId,
}

/// Messages crossing the host/editor boundary.
///
/// This is a closed union: every request tag that expects data has exactly
/// one response tag, and fire-and-forget tags are answered with `Ack`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WebViewMessage {
    /// Editor asks for its initial payload and configuration on load.
    GetInitialData,
    /// Editor requests a save of the exported drawing.
    #[serde(rename = "saveSVG", rename_all = "camelCase")]
    SaveSvg { data: String },
    /// User picked a save method on the in-editor save screen.
    #[serde(rename_all = "camelCase")]
    SetSaveMethod { method: SaveMethod },
    /// Periodic crash backup of the in-progress drawing.
    #[serde(rename = "autosaveSVG", rename_all = "camelCase")]
    AutosaveSvg { data: String },
    /// Editor is showing its close screen and needs a matching button.
    #[serde(rename_all = "camelCase")]
    ShowCloseButton { is_saved: bool },
    /// Editor left a sub-screen; no dialog buttons should be visible.
    HideButtons,
    /// Host confirms a save callback finished successfully.
    SaveCompleted,
    /// Host asks the editor to leave its current sub-screen.
    ResumeEditing,
}

/// Responses paired to `WebViewMessage` requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WebViewResponse {
    /// Response to `GetInitialData`.
    #[serde(rename_all = "camelCase")]
    InitialData {
        #[serde(skip_serializing_if = "Option::is_none")]
        initial_data: Option<String>,
        #[serde(rename = "autosaveIntervalMS")]
        autosave_interval_ms: u64,
        toolbar_type: ToolbarType,
        style_mode: StyleMode,
        keyboard_shortcuts: KeybindingMap,
    },
    /// Response to `SaveSvg`.
    #[serde(rename_all = "camelCase")]
    Save { waiting_for_save_type: bool },
    /// Trivial acknowledgement for fire-and-forget messages.
    Ack,
}
