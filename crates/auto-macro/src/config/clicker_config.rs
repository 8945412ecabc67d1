use crate::config::{default_click_interval_ms, default_clicker_hotkey};

use std::time::Duration;

use auto_macro_core::{ClickKind, ClickerSettings, MouseButton};
use serde::{Deserialize, Serialize};

fn default_button() -> MouseButton {
    MouseButton::Left
}

/// Auto clicker section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickerConfig {
    /// Milliseconds between clicks.
    #[serde(default = "default_click_interval_ms")]
    pub interval_ms: u64,
    /// Random ± offset in milliseconds, unset for a fixed rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jitter_ms: Option<u64>,
    /// `left`, `right` or `middle`.
    #[serde(default = "default_button")]
    pub button: MouseButton,
    /// `single` or `double`.
    #[serde(default)]
    pub click: ClickKind,
    /// Number of clicks; 0 clicks until toggled off.
    #[serde(default)]
    pub repeat: u32,
    /// Fixed `[x, y]` to click at instead of the current cursor position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[i32; 2]>,
    /// Toggles the clicker.
    #[serde(default = "default_clicker_hotkey")]
    pub hotkey: String,
}

impl Default for ClickerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_click_interval_ms(),
            jitter_ms: None,
            button: default_button(),
            click: ClickKind::default(),
            repeat: 0,
            position: None,
            hotkey: default_clicker_hotkey(),
        }
    }
}

impl ClickerConfig {
    /// Settings handed to the clicker.
    pub fn settings(&self) -> ClickerSettings {
        ClickerSettings {
            interval: Duration::from_millis(self.interval_ms),
            jitter: self.jitter_ms.map(Duration::from_millis),
            button: self.button,
            click: self.click,
            repeat: self.repeat,
            position: self.position.map(|[x, y]| (x, y)),
        }
    }
}
