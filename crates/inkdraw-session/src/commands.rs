//! Palette commands the host application registers.

use crate::manager::{HostKind, SessionManager};

/// The user-facing commands, with names stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    InsertDrawing,
    InsertDrawingNewWindow,
    RestoreAutosave,
    DeleteAutosave,
}

impl Command {
    pub const ALL: [Self; 4] = [
        Self::InsertDrawing,
        Self::InsertDrawingNewWindow,
        Self::RestoreAutosave,
        Self::DeleteAutosave,
    ];

    /// Stable identifier the host registers the command under.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::InsertDrawing => "inkdraw.insertDrawing",
            Self::InsertDrawingNewWindow => "inkdraw.insertDrawingNewWindow",
            Self::RestoreAutosave => "inkdraw.restoreAutosave",
            Self::DeleteAutosave => "inkdraw.deleteAutosave",
        }
    }

    /// Palette label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::InsertDrawing => "Insert drawing",
            Self::InsertDrawingNewWindow => "Insert drawing (new window)",
            Self::RestoreAutosave => "Restore autosaved drawing",
            Self::DeleteAutosave => "Delete autosaved drawing",
        }
    }
}

/// Run a palette command to completion.
///
/// Failures are alerted to the user and logged, never returned; a command
/// invocation must not take the host process down.
pub async fn dispatch(command: Command, manager: &SessionManager) {
    let result = match command {
        Command::InsertDrawing => manager
            .edit_or_insert_drawing(HostKind::EmbeddedPanel)
            .await
            .map(drop),
        Command::InsertDrawingNewWindow => manager
            .edit_or_insert_drawing(HostKind::DetachedWindow)
            .await
            .map(drop),
        Command::RestoreAutosave => manager.restore_autosave().await.map(drop),
        Command::DeleteAutosave => manager.delete_autosave().await,
    };

    if let Err(error) = result {
        manager.alert_error(&error).await;
    }
}
