use crate::config::{default_repeat, default_speed};

use serde::{Deserialize, Serialize};

/// Playback settings used by the playback hotkey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Speed multiplier; 2.0 replays twice as fast.
    #[serde(default = "default_speed")]
    pub speed: f64,
    /// Number of passes; 0 repeats until cancelled.
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            repeat: default_repeat(),
        }
    }
}
