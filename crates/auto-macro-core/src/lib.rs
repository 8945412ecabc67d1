//! Auto-macro Core Library
//!
//! Records global mouse/keyboard activity into a time-stamped action log and
//! replays it with adjustable speed and repeat count. Recording, playback
//! and hotkey toggling run on their own threads and share one atomically
//! updated mode, so at most one session is ever active.
//!
//! The operating system hooks stay outside this crate: callers provide an
//! [`InputSource`] for global events and a [`SinkFactory`] for synthesis.
//!
//! # Example
//!
//! ```no_run
//! use auto_macro_core::{
//!     BindingTable, CoreResult, HotkeyAction, HotkeyBindings, InputHub, MacroManager, SinkFactory,
//! };
//!
//! use std::{sync::Arc, thread::sleep, time::Duration};
//!
//! fn run(sinks: SinkFactory) -> CoreResult<()> {
//!     let hub = InputHub::new();
//!     let bindings = HotkeyBindings::new()
//!         .with("F9", HotkeyAction::ToggleRecord)
//!         .with("F10", HotkeyAction::TogglePlayback);
//!     let manager = MacroManager::new(Arc::new(hub), sinks, BindingTable::new(bindings));
//!
//!     manager.start_recording()?;
//!     sleep(Duration::from_secs(3));
//!     manager.stop_recording()?;
//!
//!     manager.set_playback(2.0, 1)?;
//!     manager.start_playback()?;
//!     Ok(())
//! }
//! ```

mod action;
mod engine;
mod error;
mod input;
pub mod storage;
mod tools;

pub use {
    action::{ActionLog, ActionRecord, KeySymbol, LogSlot, MouseButton, NamedKey, RawKey},
    engine::{
        BindingTable, CancelToken, CaptureEngine, CaptureHandle, CaptureOptions, DEFAULT_SPEED,
        HeldInputGuard, HotkeyAction, HotkeyBinding, HotkeyBindings, HotkeyController,
        HotkeyTarget, MIN_DELAY, MacroManager, MacroStatus, Mode, ModeCell, PeriodicAction,
        PeriodicConfig, PeriodicHandle, PeriodicOutcome, PeriodicReport, PlaybackEngine,
        PlaybackHandle, PlaybackOptions, PlaybackOutcome, PlaybackReport, ToggleOutcome,
        cps_from_interval, format_interval, interval_from_cps, interval_from_parts,
        validate_speed,
    },
    error::{MacroError, Result as CoreResult},
    input::{InputEvent, InputEventKind, InputHub, InputSink, InputSource, SinkFactory, Subscription},
    tools::{
        AutoClicker, ClickKind, ClickerSettings, ClickerStatus, DEFAULT_SEQUENCE_INTERVAL,
        KeyPresser, PressMode, PresserSettings, PresserStatus,
    },
};
