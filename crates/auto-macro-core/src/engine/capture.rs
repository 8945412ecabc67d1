//! Capture engine: turns the global input stream into an [`ActionLog`].
//!
//! Mouse and keyboard events share one subscription channel, and a single
//! worker thread is the only writer of the session's log, so records land
//! in exactly the order the source delivered them.

use crate::{
    ActionLog, ActionRecord, CoreResult, InputEvent, InputEventKind, InputSource, KeySymbol,
    LogSlot, MacroError, Mode, Subscription,
    engine::{CancelToken, ModeCell, mode::ModeGuard},
};

use std::{panic::Location, sync::Arc, thread::JoinHandle, time::Instant};

use crossbeam_channel::select;
use error_location::ErrorLocation;
use tracing::{debug, info, instrument, trace, warn};
use uuid::Uuid;

/// Per-session capture settings.
#[derive(Debug, Clone, Default)]
pub struct CaptureOptions {
    /// Pressing this key ends the session; neither its press nor its release
    /// is recorded.
    pub stop_hotkey: Option<KeySymbol>,
    /// Keys left out of the log entirely (toggle hotkeys owned by other
    /// listeners), so replaying the log never re-triggers them.
    pub ignored_keys: Vec<KeySymbol>,
}

impl CaptureOptions {
    /// Options with only a stop hotkey.
    pub fn with_stop_hotkey(key: impl Into<KeySymbol>) -> Self {
        Self {
            stop_hotkey: Some(key.into()),
            ignored_keys: Vec::new(),
        }
    }
}

/// What the session did with one incoming event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CaptureStep {
    Appended,
    Skipped,
    Stop,
}

/// Recording state for one session, independent of threads and channels.
pub(crate) struct CaptureSession {
    started: Instant,
    last_t: f64,
    options: CaptureOptions,
    log: ActionLog,
}

impl CaptureSession {
    pub(crate) fn new(options: CaptureOptions, started: Instant) -> Self {
        Self {
            started,
            last_t: 0.0,
            options,
            log: ActionLog::new(),
        }
    }

    fn is_stop_key(&self, key: &KeySymbol) -> bool {
        self.options
            .stop_hotkey
            .as_ref()
            .is_some_and(|stop| stop.eq_ignore_case(key))
    }

    fn is_ignored(&self, key: &KeySymbol) -> bool {
        self.options
            .ignored_keys
            .iter()
            .any(|ignored| ignored.eq_ignore_case(key))
    }

    pub(crate) fn accept(&mut self, event: InputEvent) -> CaptureStep {
        match &event.kind {
            InputEventKind::KeyPress(key) if self.is_stop_key(key) => return CaptureStep::Stop,
            InputEventKind::KeyPress(key) | InputEventKind::KeyRelease(key)
                if self.is_stop_key(key) || self.is_ignored(key) =>
            {
                trace!(key = %key, "Skipping reserved key");
                return CaptureStep::Skipped;
            }
            _ => {}
        }

        // Sources with several producer threads can hand over events whose
        // arrival stamps are slightly out of order; clamp so the log stays
        // non-decreasing in append order.
        let t = event
            .at
            .saturating_duration_since(self.started)
            .as_secs_f64()
            .max(self.last_t);
        self.last_t = t;

        let record = match event.kind {
            InputEventKind::MouseMove { x, y } => ActionRecord::MouseMove { t, x, y },
            InputEventKind::MouseButton {
                x,
                y,
                button,
                pressed,
            } => ActionRecord::MouseClick {
                t,
                x,
                y,
                button,
                pressed,
            },
            InputEventKind::MouseScroll { x, y, dx, dy } => {
                ActionRecord::MouseScroll { t, x, y, dx, dy }
            }
            InputEventKind::KeyPress(key) => ActionRecord::KeyPress { t, key },
            InputEventKind::KeyRelease(key) => ActionRecord::KeyRelease { t, key },
        };

        self.log.push(record);
        CaptureStep::Appended
    }

    pub(crate) fn into_log(self) -> ActionLog {
        self.log
    }
}

#[derive(Debug, Clone, Copy)]
enum StopReason {
    Hotkey,
    Requested,
    SourceClosed,
}

/// Records global input into a fresh [`ActionLog`] per session.
pub struct CaptureEngine {
    mode: Arc<ModeCell>,
    source: Arc<dyn InputSource>,
    slot: LogSlot,
}

impl CaptureEngine {
    /// Engine sharing `mode` with the other engines and publishing finished
    /// logs into `slot`.
    pub fn new(mode: Arc<ModeCell>, source: Arc<dyn InputSource>, slot: LogSlot) -> Self {
        Self { mode, source, slot }
    }

    /// Begin a recording session.
    ///
    /// # Errors
    ///
    /// `AlreadyActive` when another session runs, `ListenerUnavailable` when
    /// the input subscription cannot be acquired. No thread is started on
    /// error and the mode is left unchanged.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start(&self, options: CaptureOptions) -> CoreResult<CaptureHandle> {
        self.mode.begin(Mode::Recording)?;
        let guard = ModeGuard::new(Arc::clone(&self.mode), Mode::Recording);

        // Dropping the guard on any early return puts the mode back to Idle.
        let subscription = self.source.subscribe("capture")?;

        let session_id = Uuid::new_v4();
        let cancel = CancelToken::new();
        let session = CaptureSession::new(options, Instant::now());
        let slot = self.slot.clone();
        let worker_cancel = cancel.clone();

        let worker = std::thread::Builder::new()
            .name("macro-capture".to_string())
            .spawn(move || {
                run_capture(session_id, session, subscription, worker_cancel, slot, guard)
            })?;

        info!(session_id = %session_id, "Recording started");

        Ok(CaptureHandle {
            session_id,
            cancel,
            worker: Some(worker),
            finished: None,
        })
    }
}

fn run_capture(
    session_id: Uuid,
    mut session: CaptureSession,
    mut subscription: Subscription,
    cancel: CancelToken,
    slot: LogSlot,
    _mode: ModeGuard,
) -> Arc<ActionLog> {
    let reason = loop {
        select! {
            recv(subscription.events()) -> msg => match msg {
                Ok(event) => {
                    if session.accept(event) == CaptureStep::Stop {
                        break StopReason::Hotkey;
                    }
                }
                Err(_) => break StopReason::SourceClosed,
            },
            recv(cancel.signal()) -> _ => break StopReason::Requested,
        }
    };

    subscription.unsubscribe();

    // Events delivered before the unsubscribe still belong to the session.
    if let StopReason::Requested = reason {
        for event in subscription.events().try_iter() {
            if session.accept(event) == CaptureStep::Stop {
                break;
            }
        }
    }

    if let StopReason::SourceClosed = reason {
        warn!(session_id = %session_id, "Input source closed during recording");
    }

    let log = Arc::new(session.into_log());
    slot.replace(Arc::clone(&log));

    info!(
        session_id = %session_id,
        records = log.len(),
        duration_secs = log.duration_secs(),
        reason = ?reason,
        "Recording stopped"
    );

    log
}

/// Control handle for a running capture session.
pub struct CaptureHandle {
    session_id: Uuid,
    cancel: CancelToken,
    worker: Option<JoinHandle<Arc<ActionLog>>>,
    finished: Option<Arc<ActionLog>>,
}

impl CaptureHandle {
    /// Correlation id of this session.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Whether the worker has exited (stop hotkey, `stop`, or source loss).
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stop recording and return the session's log.
    ///
    /// Unsubscribes from the input source and returns the mode to `Idle`
    /// before returning. Idempotent: later calls return the same log.
    #[track_caller]
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub fn stop(&mut self) -> CoreResult<Arc<ActionLog>> {
        self.cancel.cancel();
        self.wait()
    }

    /// Wait for the session to end on its own (stop hotkey) and return the
    /// log.
    #[track_caller]
    pub fn wait(&mut self) -> CoreResult<Arc<ActionLog>> {
        if let Some(log) = &self.finished {
            return Ok(Arc::clone(log));
        }

        let Some(worker) = self.worker.take() else {
            return Err(MacroError::WorkerPanicked {
                worker: "macro-capture".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let log = worker.join().map_err(|_| MacroError::WorkerPanicked {
            worker: "macro-capture".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        debug!(session_id = %self.session_id, "Capture worker joined");
        self.finished = Some(Arc::clone(&log));
        Ok(log)
    }
}

// The worker owns the mode guard, so an abandoned session must still end.
impl Drop for CaptureHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
