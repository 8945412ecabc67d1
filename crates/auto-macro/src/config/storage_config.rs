use crate::config::{default_macro_path, default_true};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where the recorded macro lives and when it is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Macro file path.
    #[serde(default = "default_macro_path")]
    pub macro_path: PathBuf,
    /// Save the log whenever a recording stops.
    #[serde(default = "default_true")]
    pub autosave: bool,
    /// Load the macro file at startup.
    #[serde(default = "default_true")]
    pub load_on_start: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            macro_path: default_macro_path(),
            autosave: true,
            load_on_start: true,
        }
    }
}
