mod clicker_config;
#[allow(clippy::module_inception)]
mod config;
mod hotkey_config;
mod playback_config;
mod presser_config;
mod storage_config;

pub(crate) use {
    clicker_config::ClickerConfig, config::Config, hotkey_config::HotkeyConfig,
    playback_config::PlaybackConfig, presser_config::PresserConfig,
    storage_config::StorageConfig,
};

use std::path::PathBuf;

use directories::ProjectDirs;

pub(crate) const APP_QUALIFIER: &str = "com";
pub(crate) const APP_ORGANIZATION: &str = "auto-macro";
pub(crate) const APP_NAME: &str = "Auto-Macro";

pub(crate) const DEFAULT_RECORD_HOTKEY: &str = "F9";
pub(crate) const DEFAULT_PLAYBACK_HOTKEY: &str = "F10";
pub(crate) const DEFAULT_CLICKER_HOTKEY: &str = "F6";
pub(crate) const DEFAULT_PRESSER_HOTKEY: &str = "F8";
pub(crate) const DEFAULT_PRESSER_KEY: &str = "f";

pub(crate) const DEFAULT_REPEAT: u32 = 1;
pub(crate) const DEFAULT_CLICK_INTERVAL_MS: u64 = 100;
pub(crate) const DEFAULT_PRESS_INTERVAL_MS: u64 = 50;

const MACRO_DIR: &str = "macros";
const MACRO_FILE: &str = "last_macro.json";

pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
}

pub(crate) fn default_record_hotkey() -> String {
    DEFAULT_RECORD_HOTKEY.to_string()
}

pub(crate) fn default_playback_hotkey() -> String {
    DEFAULT_PLAYBACK_HOTKEY.to_string()
}

pub(crate) fn default_clicker_hotkey() -> String {
    DEFAULT_CLICKER_HOTKEY.to_string()
}

pub(crate) fn default_presser_hotkey() -> String {
    DEFAULT_PRESSER_HOTKEY.to_string()
}

pub(crate) fn default_presser_key() -> String {
    DEFAULT_PRESSER_KEY.to_string()
}

pub(crate) fn default_speed() -> f64 {
    auto_macro_core::DEFAULT_SPEED
}

pub(crate) fn default_repeat() -> u32 {
    DEFAULT_REPEAT
}

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_click_interval_ms() -> u64 {
    DEFAULT_CLICK_INTERVAL_MS
}

pub(crate) fn default_press_interval_ms() -> u64 {
    DEFAULT_PRESS_INTERVAL_MS
}

/// `<data dir>/macros/last_macro.json`, or a relative path when the platform
/// has no home directory.
pub(crate) fn default_macro_path() -> PathBuf {
    match project_dirs() {
        Some(dirs) => dirs.data_dir().join(MACRO_DIR).join(MACRO_FILE),
        None => PathBuf::from(MACRO_DIR).join(MACRO_FILE),
    }
}
