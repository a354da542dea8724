//! Message channels between the host controller and the embedded editor.
//!
//! Provides:
//! - The closed message vocabulary (`WebViewMessage` / `WebViewResponse`)
//! - `LocalChannel` - In-process endpoint pair for embedded panels
//! - `WireChannel` - JSON frames with correlation ids for detached windows

pub mod channel;
pub mod protocol;
pub mod wire;

pub use channel::{ChannelError, LocalChannel, MessageChannel, MessageHandler};
pub use protocol::{
    ButtonId, DialogButton, DialogResult, SaveMethod, WebViewMessage, WebViewResponse,
};
pub use wire::{WireChannel, WireEnvelope, WireEvent, WireFrame};
