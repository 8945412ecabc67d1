use crate::config::{default_playback_hotkey, default_record_hotkey};

use auto_macro_core::{HotkeyAction, HotkeyBindings, KeySymbol};
use serde::{Deserialize, Serialize};

/// Global hotkeys of the macro recorder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotkeyConfig {
    /// Starts and stops recording.
    #[serde(default = "default_record_hotkey")]
    pub record: String,
    /// Starts and stops playback.
    #[serde(default = "default_playback_hotkey")]
    pub playback: String,
    /// Stops whatever is running.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel: Option<String>,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            record: default_record_hotkey(),
            playback: default_playback_hotkey(),
            cancel: None,
        }
    }
}

impl HotkeyConfig {
    /// Binding table for the macro hotkey controller.
    pub fn bindings(&self) -> HotkeyBindings {
        let bindings = HotkeyBindings::new()
            .with(KeySymbol::parse(&self.record), HotkeyAction::ToggleRecord)
            .with(KeySymbol::parse(&self.playback), HotkeyAction::TogglePlayback);

        match &self.cancel {
            Some(cancel) => bindings.with(KeySymbol::parse(cancel), HotkeyAction::Cancel),
            None => bindings,
        }
    }

    /// Every configured key name, labelled for diagnostics.
    pub(crate) fn named_keys(&self) -> Vec<(&'static str, &str)> {
        let mut keys = vec![
            ("hotkeys.record", self.record.as_str()),
            ("hotkeys.playback", self.playback.as_str()),
        ];
        if let Some(cancel) = &self.cancel {
            keys.push(("hotkeys.cancel", cancel.as_str()));
        }
        keys
    }
}
