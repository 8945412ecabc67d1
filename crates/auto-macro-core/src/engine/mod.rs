mod cancel;
mod capture;
mod held_input_guard;
mod hotkey;
mod manager;
pub(crate) mod mode;
mod periodic;
mod playback;

pub(crate) use hotkey::spawn_key_watch;

pub use {
    cancel::CancelToken,
    capture::{CaptureEngine, CaptureHandle, CaptureOptions},
    held_input_guard::HeldInputGuard,
    hotkey::{
        BindingTable, HotkeyAction, HotkeyBinding, HotkeyBindings, HotkeyController, HotkeyTarget,
    },
    manager::{MacroManager, MacroStatus, ToggleOutcome},
    mode::{Mode, ModeCell},
    periodic::{
        MIN_DELAY, PeriodicAction, PeriodicConfig, PeriodicHandle, PeriodicOutcome,
        PeriodicReport, cps_from_interval, format_interval, interval_from_cps,
        interval_from_parts,
    },
    playback::{
        DEFAULT_SPEED, PlaybackEngine, PlaybackHandle, PlaybackOptions, PlaybackOutcome,
        PlaybackReport, validate_speed,
    },
};

#[cfg(test)]
pub(crate) use capture::{CaptureSession, CaptureStep};
