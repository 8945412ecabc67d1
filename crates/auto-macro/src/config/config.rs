//! Configuration management for auto-macro.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, validation, and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{
        ClickerConfig, HotkeyConfig, PlaybackConfig, PresserConfig, StorageConfig, project_dirs,
    },
};

use std::{
    collections::HashMap,
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
    time::Duration,
};

use auto_macro_core::{KeySymbol, PeriodicConfig, PressMode, validate_speed};
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Macro recorder hotkeys.
    #[serde(default)]
    pub hotkeys: HotkeyConfig,
    /// Playback speed and repeat count.
    #[serde(default)]
    pub playback: PlaybackConfig,
    /// Macro file location and autosave behavior.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Auto clicker settings.
    #[serde(default)]
    pub clicker: ClickerConfig,
    /// Key presser settings.
    #[serde(default)]
    pub presser: PresserConfig,
}

impl Config {
    /// Load configuration from the platform config directory, creating a
    /// default file if none exists.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `path`, writing defaults there if missing.
    #[track_caller]
    #[instrument]
    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            info!(config_path = ?path, "No config found, creating default");
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?path, "Configuration loaded");

        Ok(config)
    }

    /// Check speeds and intervals, and report hotkey names that did not parse
    /// to a known key.
    ///
    /// Unknown key names are accepted as raw keys; only a warning is logged.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn validate(&self) -> AppResult<()> {
        validate_speed(self.playback.speed)?;

        PeriodicConfig::new(Duration::from_millis(self.clicker.interval_ms)).validate()?;
        if self.presser.mode == PressMode::Continuous {
            PeriodicConfig::new(Duration::from_millis(self.presser.interval_ms)).validate()?;
        }

        let mut seen: HashMap<KeySymbol, &str> = HashMap::new();
        for (field, name) in self.named_keys() {
            let key = KeySymbol::parse(name);
            if key.is_raw() {
                warn!(field, key = name, "Unknown key name, using it verbatim");
            }
            if let Some(other) = seen.insert(key, field) {
                warn!(field, other, key = name, "Two settings share the same key");
            }
        }

        debug!("Configuration valid");
        Ok(())
    }

    /// Hotkeys of the clicker and presser. The manager keeps these out of
    /// recordings alongside its own bindings.
    pub fn tool_hotkeys(&self) -> Vec<KeySymbol> {
        vec![
            KeySymbol::parse(&self.clicker.hotkey),
            KeySymbol::parse(&self.presser.hotkey),
        ]
    }

    fn named_keys(&self) -> Vec<(&'static str, &str)> {
        let mut keys = self.hotkeys.named_keys();
        keys.push(("clicker.hotkey", self.clicker.hotkey.as_str()));
        keys.push(("presser.hotkey", self.presser.hotkey.as_str()));
        keys
    }

    /// Save configuration to `path` using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let temp_path = path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?path, "Configuration saved (atomic write)");

        Ok(())
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = project_dirs().ok_or_else(|| AppError::ConfigError {
            reason: "Failed to get config directory".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join("config.toml"))
    }
}
