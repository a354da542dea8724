//! Concrete hosting surfaces: the embedded panel and the detached window.

pub mod panel;
pub mod window;

pub use panel::{PanelBackend, PanelHost};
pub use window::{WindowBackend, WindowConnection, WindowHost};
