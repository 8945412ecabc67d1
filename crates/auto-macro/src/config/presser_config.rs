use crate::config::{default_press_interval_ms, default_presser_hotkey, default_presser_key};

use std::time::Duration;

use auto_macro_core::{KeySymbol, PressMode, PresserSettings};
use serde::{Deserialize, Serialize};

/// Key presser section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresserConfig {
    /// Key to press, by name or as a single character.
    #[serde(default = "default_presser_key")]
    pub key: String,
    /// `continuous` or `hold`.
    #[serde(default)]
    pub mode: PressMode,
    /// Milliseconds between taps in continuous mode.
    #[serde(default = "default_press_interval_ms")]
    pub interval_ms: u64,
    /// Toggles the presser.
    #[serde(default = "default_presser_hotkey")]
    pub hotkey: String,
}

impl Default for PresserConfig {
    fn default() -> Self {
        Self {
            key: default_presser_key(),
            mode: PressMode::default(),
            interval_ms: default_press_interval_ms(),
            hotkey: default_presser_hotkey(),
        }
    }
}

impl PresserConfig {
    /// Settings handed to the presser.
    pub fn settings(&self) -> PresserSettings {
        PresserSettings {
            key: KeySymbol::parse(&self.key),
            mode: self.mode,
            interval: Duration::from_millis(self.interval_ms),
        }
    }
}
