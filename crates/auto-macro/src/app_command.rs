use crate::HotkeyScope;

use auto_macro_core::HotkeyAction;

/// Commands sent from the hotkey handlers and the signal task to the
/// application loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Start recording, or stop and keep the recorded log.
    ToggleRecording,
    /// Start replaying the current log, or stop the running playback.
    TogglePlayback,
    /// Stop every running session and tool.
    CancelAll,
    /// Start or stop the auto clicker.
    ToggleClicker,
    /// Start or stop the key presser.
    TogglePresser,
    /// Request application shutdown.
    Shutdown,
}

impl AppCommand {
    /// Command for a hotkey matched in `scope`, if that scope handles it.
    pub fn from_hotkey(scope: HotkeyScope, action: HotkeyAction) -> Option<Self> {
        match (scope, action) {
            (HotkeyScope::Macro, HotkeyAction::ToggleRecord) => Some(AppCommand::ToggleRecording),
            (HotkeyScope::Macro, HotkeyAction::TogglePlayback) => Some(AppCommand::TogglePlayback),
            (_, HotkeyAction::Cancel) => Some(AppCommand::CancelAll),
            (HotkeyScope::Clicker, HotkeyAction::Toggle) => Some(AppCommand::ToggleClicker),
            (HotkeyScope::Presser, HotkeyAction::Toggle) => Some(AppCommand::TogglePresser),
            _ => None,
        }
    }
}
