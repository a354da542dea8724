//! Editor configuration and host-settings decoding.

use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Toolbar layout shown inside the editor surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolbarType {
    /// Toolbar along the top edge.
    #[default]
    Default,
    /// Vertical sidebar toolbar.
    Sidebar,
    /// Compact dropdown toolbar.
    Dropdown,
}

impl ToolbarType {
    /// Decode the integer stored by the host settings store.
    #[must_use]
    pub fn from_setting(value: i64) -> Self {
        match value {
            1 => Self::Sidebar,
            2 => Self::Dropdown,
            _ => Self::Default,
        }
    }
}

/// Editor color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleMode {
    /// Follow the host application's theme.
    #[default]
    MatchHost,
    /// Always light.
    Light,
    /// Always dark.
    Dark,
}

impl StyleMode {
    /// Decode the string stored by the host settings store.
    #[must_use]
    pub fn from_setting(value: &str) -> Self {
        match value {
            "light" => Self::Light,
            "dark" => Self::Dark,
            _ => Self::MatchHost,
        }
    }
}

/// Keyboard shortcut overrides, action id to key list.
pub type KeybindingMap = BTreeMap<String, Vec<String>>;

/// Default autosave cadence when the setting is missing or invalid.
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(2 * 60);

/// Immutable configuration snapshot applied when a session starts.
///
/// Changing settings while a session is open takes effect on the next
/// session, never the current one.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Cadence of background autosave backups.
    pub autosave_interval: Duration,
    /// Toolbar layout.
    pub toolbar_type: ToolbarType,
    /// Color scheme.
    pub style_mode: StyleMode,
    /// Keyboard shortcut overrides.
    pub keybindings: KeybindingMap,
    /// Whether the hosting surface may expand to fill the window.
    pub can_fullscreen: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_interval: DEFAULT_AUTOSAVE_INTERVAL,
            toolbar_type: ToolbarType::default(),
            style_mode: StyleMode::default(),
            keybindings: KeybindingMap::new(),
            can_fullscreen: true,
        }
    }
}

/// Fixed setting names, as stored in the host's settings store.
pub mod keys {
    pub const TOOLBAR_TYPE: &str = "toolbar-type";
    pub const STYLE_MODE: &str = "style-mode";
    pub const DISABLE_FULLSCREEN: &str = "disable-editor-fills-window";
    pub const AUTOSAVE_INTERVAL_MINUTES: &str = "autosave-interval-minutes";
    pub const KEYBOARD_SHORTCUTS: &str = "keyboard-shortcuts";
}

/// Decoded image of the host's settings store.
///
/// Decoding is lenient: unknown or malformed values fall back to the
/// documented defaults rather than failing, since a settings-change
/// notification must never abort session creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub toolbar_type: ToolbarType,
    pub style_mode: StyleMode,
    pub disable_fullscreen: bool,
    pub autosave_interval_minutes: u32,
    pub keybindings: KeybindingMap,
}

impl Settings {
    /// Decode settings from the raw key/value map the host hands back.
    #[must_use]
    pub fn from_values(values: &BTreeMap<String, Value>) -> Self {
        let toolbar_type = values
            .get(keys::TOOLBAR_TYPE)
            .and_then(Value::as_i64)
            .map_or_else(ToolbarType::default, ToolbarType::from_setting);

        let style_mode = values
            .get(keys::STYLE_MODE)
            .and_then(Value::as_str)
            .map_or_else(StyleMode::default, StyleMode::from_setting);

        let disable_fullscreen = values
            .get(keys::DISABLE_FULLSCREEN)
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let autosave_interval_minutes = values
            .get(keys::AUTOSAVE_INTERVAL_MINUTES)
            .and_then(Value::as_i64)
            .filter(|minutes| *minutes > 0)
            .and_then(|minutes| u32::try_from(minutes).ok())
            .unwrap_or(2);

        let keybindings = values
            .get(keys::KEYBOARD_SHORTCUTS)
            .and_then(|v| serde_json::from_value::<KeybindingMap>(v.clone()).ok())
            .unwrap_or_default();

        Self {
            toolbar_type,
            style_mode,
            disable_fullscreen,
            autosave_interval_minutes,
            keybindings,
        }
    }

    /// Produce the immutable snapshot a new session captures.
    #[must_use]
    pub fn editor_config(&self) -> EditorConfig {
        EditorConfig {
            autosave_interval: Duration::from_secs(u64::from(self.autosave_interval_minutes) * 60),
            toolbar_type: self.toolbar_type,
            style_mode: self.style_mode,
            keybindings: self.keybindings.clone(),
            can_fullscreen: !self.disable_fullscreen,
        }
    }
}
