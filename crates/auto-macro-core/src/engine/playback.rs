//! Playback engine: replays an [`ActionLog`] with its original timing.
//!
//! For each pass the gap between consecutive records is divided by the
//! speed multiplier and accumulated from the pass start, so scheduling
//! overhead does not drift later records. Negative gaps (hand-edited logs)
//! count as zero wait. Every wait is interruptible, and cancellation is
//! checked again immediately before each record is synthesized.

use crate::{
    ActionLog, CancelToken, CoreResult, HeldInputGuard, InputSource, KeySymbol, MacroError, Mode,
    SinkFactory,
    engine::{ModeCell, mode::ModeGuard, spawn_key_watch},
};

use std::{
    panic::Location,
    sync::Arc,
    thread::JoinHandle,
    time::{Duration, Instant},
};

use error_location::ErrorLocation;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Default speed multiplier (original timing).
pub const DEFAULT_SPEED: f64 = 1.0;

/// Reject speeds that are not finite and strictly positive.
#[track_caller]
pub fn validate_speed(speed: f64) -> CoreResult<()> {
    if speed.is_finite() && speed > 0.0 {
        Ok(())
    } else {
        Err(MacroError::InvalidSpeed {
            speed,
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

/// Per-session playback settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackOptions {
    /// Speed multiplier; 2.0 plays twice as fast.
    pub speed: f64,
    /// Number of passes; 0 repeats until cancelled.
    pub repeat: u32,
    /// Key that cancels this session when pressed.
    pub cancel_hotkey: Option<KeySymbol>,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            repeat: 1,
            cancel_hotkey: None,
        }
    }
}

/// How a playback session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackOutcome {
    /// Every requested pass ran to the end.
    Completed,
    /// Stopped by hotkey or explicit stop.
    Cancelled,
    /// The synthesis backend could not be created.
    Failed,
}

/// Summary returned when a session ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackReport {
    /// Session correlation id.
    pub session_id: Uuid,
    /// How the session ended.
    pub outcome: PlaybackOutcome,
    /// Passes that reached the last record.
    pub passes_completed: u64,
    /// Records synthesized successfully.
    pub events_synthesized: u64,
    /// Records whose synthesis failed and were skipped.
    pub events_failed: u64,
    /// Keys/buttons force-released at the end of the session.
    pub inputs_released: usize,
}

/// Replays action logs through a synthesis backend.
pub struct PlaybackEngine {
    mode: Arc<ModeCell>,
    source: Arc<dyn InputSource>,
    sinks: SinkFactory,
}

impl PlaybackEngine {
    /// Engine sharing `mode` with the capture engine. `source` is only used
    /// for the optional cancel hotkey.
    pub fn new(mode: Arc<ModeCell>, source: Arc<dyn InputSource>, sinks: SinkFactory) -> Self {
        Self {
            mode,
            source,
            sinks,
        }
    }

    /// Start replaying `log`.
    ///
    /// # Errors
    ///
    /// `InvalidSpeed` for a non-positive speed, `EmptyLog` for a log without
    /// records, `AlreadyActive` while another session runs and
    /// `ListenerUnavailable` if the cancel hotkey cannot be watched. No
    /// thread is started and the mode is unchanged on error.
    #[track_caller]
    #[instrument(skip(self, log), fields(records = log.len()))]
    pub fn play(&self, log: Arc<ActionLog>, options: PlaybackOptions) -> CoreResult<PlaybackHandle> {
        validate_speed(options.speed)?;

        if log.is_empty() {
            return Err(MacroError::EmptyLog {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.mode.begin(Mode::Playing)?;
        let guard = ModeGuard::new(Arc::clone(&self.mode), Mode::Playing);

        let session_id = Uuid::new_v4();
        let cancel = CancelToken::new();

        let watcher = match &options.cancel_hotkey {
            Some(key) => {
                let subscription = self.source.subscribe("playback-hotkey")?;
                Some(spawn_key_watch(
                    subscription,
                    key.clone(),
                    cancel.clone(),
                    "playback-hotkey",
                )?)
            }
            None => None,
        };

        let run = PlaybackRun {
            session_id,
            log,
            speed: options.speed,
            repeat: options.repeat,
            sinks: Arc::clone(&self.sinks),
            cancel: cancel.clone(),
            watcher,
        };

        let worker = match std::thread::Builder::new()
            .name("macro-playback".to_string())
            .spawn(move || run.execute(guard))
        {
            Ok(worker) => worker,
            Err(e) => {
                // Stops the watcher thread if one was started.
                cancel.cancel();
                return Err(e.into());
            }
        };

        info!(
            session_id = %session_id,
            speed = options.speed,
            repeat = options.repeat,
            "Playback started"
        );

        Ok(PlaybackHandle {
            session_id,
            cancel,
            worker: Some(worker),
            report: None,
        })
    }
}

struct PlaybackRun {
    session_id: Uuid,
    log: Arc<ActionLog>,
    speed: f64,
    repeat: u32,
    sinks: SinkFactory,
    cancel: CancelToken,
    watcher: Option<JoinHandle<()>>,
}

impl PlaybackRun {
    fn execute(mut self, _mode: ModeGuard) -> PlaybackReport {
        let mut report = PlaybackReport {
            session_id: self.session_id,
            outcome: PlaybackOutcome::Completed,
            passes_completed: 0,
            events_synthesized: 0,
            events_failed: 0,
            inputs_released: 0,
        };

        match (self.sinks)() {
            Ok(sink) => {
                let mut held = HeldInputGuard::new(sink);
                report.outcome = self.replay(&mut held, &mut report);
                report.inputs_released = held.release_all();
            }
            Err(e) => {
                error!(session_id = %self.session_id, error = ?e, "Failed to create input sink");
                report.outcome = PlaybackOutcome::Failed;
            }
        }

        // Stop the hotkey watcher before reporting, so no listener outlives
        // the Playing mode.
        self.cancel.cancel();
        if let Some(watcher) = self.watcher.take() {
            if watcher.join().is_err() {
                warn!(session_id = %self.session_id, "Playback hotkey watcher panicked");
            }
        }

        info!(
            session_id = %self.session_id,
            outcome = ?report.outcome,
            passes = report.passes_completed,
            synthesized = report.events_synthesized,
            failed = report.events_failed,
            released = report.inputs_released,
            "Playback finished"
        );

        report
    }

    fn replay(&self, held: &mut HeldInputGuard, report: &mut PlaybackReport) -> PlaybackOutcome {
        loop {
            if self.repeat != 0 && report.passes_completed >= u64::from(self.repeat) {
                return PlaybackOutcome::Completed;
            }
            if self.cancel.is_cancelled() {
                return PlaybackOutcome::Cancelled;
            }

            let pass_start = Instant::now();
            let mut offset = Duration::ZERO;
            let mut last_t = 0.0;

            for (index, record) in self.log.records().iter().enumerate() {
                let gap = (record.t() - last_t) / self.speed;
                if gap > 0.0 {
                    offset = offset.saturating_add(
                        Duration::try_from_secs_f64(gap).unwrap_or(Duration::MAX),
                    );
                }

                let cancelled = match pass_start.checked_add(offset) {
                    Some(deadline) => self.cancel.sleep_until(deadline),
                    None => {
                        self.cancel.wait();
                        true
                    }
                };
                if cancelled {
                    debug!(session_id = %self.session_id, index, "Playback cancelled before record");
                    return PlaybackOutcome::Cancelled;
                }

                match held.dispatch(record) {
                    Ok(()) => report.events_synthesized += 1,
                    Err(e) => {
                        warn!(
                            session_id = %self.session_id,
                            index,
                            kind = record.kind(),
                            error = ?e,
                            "Failed to synthesize record, skipping"
                        );
                        report.events_failed += 1;
                    }
                }

                last_t = record.t();
            }

            report.passes_completed += 1;
            debug!(session_id = %self.session_id, pass = report.passes_completed, "Playback pass complete");
        }
    }
}

/// Control handle for a running playback session.
pub struct PlaybackHandle {
    session_id: Uuid,
    cancel: CancelToken,
    worker: Option<JoinHandle<PlaybackReport>>,
    report: Option<PlaybackReport>,
}

impl PlaybackHandle {
    /// Correlation id of this session.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Whether the worker has exited.
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Cancel playback and wait for the worker to release held inputs,
    /// stop its hotkey listener and return the mode to `Idle`. Idempotent.
    #[track_caller]
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub fn stop(&mut self) -> CoreResult<PlaybackReport> {
        self.cancel.cancel();
        self.wait()
    }

    /// Wait for playback to end on its own.
    #[track_caller]
    pub fn wait(&mut self) -> CoreResult<PlaybackReport> {
        if let Some(report) = &self.report {
            return Ok(report.clone());
        }

        let Some(worker) = self.worker.take() else {
            return Err(MacroError::WorkerPanicked {
                worker: "macro-playback".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let report = worker.join().map_err(|_| MacroError::WorkerPanicked {
            worker: "macro-playback".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        self.report = Some(report.clone());
        Ok(report)
    }
}

// The worker owns the mode guard, so an abandoned session must still end.
impl Drop for PlaybackHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
