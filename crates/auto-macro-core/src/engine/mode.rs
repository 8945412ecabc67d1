use crate::{CoreResult, MacroError};

use std::{
    fmt,
    panic::Location,
    sync::{
        Arc,
        atomic::{AtomicU8, Ordering},
    },
};

use error_location::ErrorLocation;
use serde::Serialize;
use tracing::{debug, warn};

/// Process-wide engine state. Recording and Playing never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Nothing running.
    Idle,
    /// Capture engine owns the log.
    Recording,
    /// Playback engine is walking the log.
    Playing,
}

impl Mode {
    fn as_u8(self) -> u8 {
        match self {
            Mode::Idle => 0,
            Mode::Recording => 1,
            Mode::Playing => 2,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Mode::Recording,
            2 => Mode::Playing,
            _ => Mode::Idle,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Idle => "idle",
            Mode::Recording => "recording",
            Mode::Playing => "playing",
        })
    }
}

/// Atomically updated [`Mode`].
///
/// Every transition is a compare-and-swap, so two threads racing to start
/// a session cannot both observe `Idle` and both win.
#[derive(Debug)]
pub struct ModeCell {
    raw: AtomicU8,
}

impl ModeCell {
    /// Cell starting at `Idle`.
    pub fn new() -> Self {
        Self {
            raw: AtomicU8::new(Mode::Idle.as_u8()),
        }
    }

    /// Current mode.
    pub fn get(&self) -> Mode {
        Mode::from_u8(self.raw.load(Ordering::Acquire))
    }

    /// Move from `Idle` to `to`, or fail with `AlreadyActive`.
    #[track_caller]
    pub fn begin(&self, to: Mode) -> CoreResult<()> {
        match self.raw.compare_exchange(
            Mode::Idle.as_u8(),
            to.as_u8(),
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                debug!(mode = ?to, "Mode transition from Idle");
                Ok(())
            }
            Err(actual) => Err(MacroError::AlreadyActive {
                active: Mode::from_u8(actual).to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    /// Return from `from` to `Idle`. Returns `false` when the cell was not in
    /// `from` (already finished, or owned by another session kind).
    pub fn finish(&self, from: Mode) -> bool {
        let done = self
            .raw
            .compare_exchange(
                from.as_u8(),
                Mode::Idle.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if done {
            debug!(mode = ?from, "Mode transition to Idle");
        }
        done
    }
}

impl Default for ModeCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the shared mode to `Idle` when dropped.
///
/// Session workers hold one for their whole lifetime so the mode cannot stay
/// stuck in Recording/Playing, even if the worker panics.
pub(crate) struct ModeGuard {
    cell: Arc<ModeCell>,
    held: Mode,
}

impl ModeGuard {
    pub(crate) fn new(cell: Arc<ModeCell>, held: Mode) -> Self {
        Self { cell, held }
    }
}

impl Drop for ModeGuard {
    fn drop(&mut self) {
        if !self.cell.finish(self.held) {
            warn!(held = ?self.held, current = ?self.cell.get(), "Mode changed while session held it");
        }
    }
}
