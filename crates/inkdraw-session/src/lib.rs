//! Drawing-session orchestration.
//!
//! Provides:
//! - `EditorSession` - The session state machine driving one editing
//!   transaction across the message channel
//! - `DrawingView` and the concrete panel/window hosts
//! - `SessionManager` - Pooling, entry points and user commands

pub mod commands;
pub mod hosts;
pub mod manager;
pub mod session;
pub mod strings;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use commands::Command;
pub use hosts::{PanelBackend, PanelHost, WindowBackend, WindowConnection, WindowHost};
pub use manager::{
    EditDrawingOptions, HostKind, ManagerError, NoteEditor, SessionManager, ViewFactory,
};
pub use session::{EditorSession, SessionError};
pub use strings::Localization;
pub use view::{
    AlertSink, DrawingView, InsertDrawingOptions, SaveCallback, SaveCallbacks, ViewError,
    save_callback,
};
