//! Macro manager: one owner for the shared mode, the current log and the
//! two session handles.
//!
//! Hotkey toggles, explicit commands and persistence all go through here, so
//! callers never juggle engine handles themselves.

use crate::{
    ActionLog, BindingTable, CaptureEngine, CaptureHandle, CaptureOptions, CoreResult,
    HotkeyAction, HotkeyBindings, HotkeyTarget, InputSource, KeySymbol, LogSlot, Mode,
    PlaybackEngine, PlaybackHandle, PlaybackOptions, PlaybackReport, SinkFactory,
    engine::{ModeCell, validate_speed},
    storage,
};

use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Result of a toggle command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    /// A new session started.
    Started,
    /// The running session was stopped.
    Stopped,
}

/// Point-in-time view of the manager.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacroStatus {
    /// Current engine mode.
    pub mode: Mode,
    /// Records in the current log.
    pub records: usize,
    /// Length of the current log in seconds.
    pub duration_secs: f64,
    /// Playback speed used by toggles.
    pub speed: f64,
    /// Playback repeat count used by toggles.
    pub repeat: u32,
    /// Active recording session.
    pub recording_session: Option<Uuid>,
    /// Active playback session.
    pub playback_session: Option<Uuid>,
    /// Report of the most recent finished playback.
    pub last_playback: Option<PlaybackReport>,
}

/// Facade over the capture and playback engines.
pub struct MacroManager {
    mode: Arc<ModeCell>,
    slot: LogSlot,
    capture: CaptureEngine,
    playback: PlaybackEngine,
    bindings: BindingTable,
    playback_options: Mutex<PlaybackOptions>,
    extra_reserved: Mutex<Vec<KeySymbol>>,
    recording: Mutex<Option<CaptureHandle>>,
    playing: Mutex<Option<PlaybackHandle>>,
    last_playback: Mutex<Option<PlaybackReport>>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|e| {
        error!("{} lock poisoned, recovering: {}", what, e);
        e.into_inner()
    })
}

impl MacroManager {
    /// Manager with an empty log, default playback options and the given
    /// hotkey table.
    pub fn new(source: Arc<dyn InputSource>, sinks: SinkFactory, bindings: BindingTable) -> Self {
        let mode = Arc::new(ModeCell::new());
        let slot = LogSlot::new();
        Self {
            capture: CaptureEngine::new(Arc::clone(&mode), Arc::clone(&source), slot.clone()),
            playback: PlaybackEngine::new(Arc::clone(&mode), source, sinks),
            mode,
            slot,
            bindings,
            playback_options: Mutex::new(PlaybackOptions::default()),
            extra_reserved: Mutex::new(Vec::new()),
            recording: Mutex::new(None),
            playing: Mutex::new(None),
            last_playback: Mutex::new(None),
        }
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.mode.get()
    }

    /// Set the speed and repeat count used by later playback sessions.
    ///
    /// # Errors
    ///
    /// `InvalidSpeed` for a non-positive speed; the previous settings stay.
    #[track_caller]
    pub fn set_playback(&self, speed: f64, repeat: u32) -> CoreResult<()> {
        validate_speed(speed)?;
        let mut options = lock(&self.playback_options, "Playback options");
        options.speed = speed;
        options.repeat = repeat;
        debug!(speed, repeat, "Playback settings updated");
        Ok(())
    }

    /// Keys owned by other listeners (tool hotkeys) that must never be
    /// recorded. Hotkeys in the binding table are always excluded.
    pub fn reserve_keys(&self, keys: impl IntoIterator<Item = KeySymbol>) {
        lock(&self.extra_reserved, "Reserved keys").extend(keys);
    }

    /// Every key currently excluded from recordings.
    pub fn reserved_keys(&self) -> Vec<KeySymbol> {
        let mut keys = self.bindings.snapshot().keys();
        keys.extend(lock(&self.extra_reserved, "Reserved keys").iter().cloned());
        keys
    }

    /// Start recording into a fresh log.
    ///
    /// # Errors
    ///
    /// `AlreadyActive` while recording or playing, `ListenerUnavailable`
    /// when the input source cannot be subscribed.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start_recording(&self) -> CoreResult<Uuid> {
        let mut recording = lock(&self.recording, "Recording handle");
        self.start_recording_locked(&mut recording)
    }

    #[track_caller]
    fn start_recording_locked(&self, slot: &mut Option<CaptureHandle>) -> CoreResult<Uuid> {
        let options = CaptureOptions {
            stop_hotkey: None,
            ignored_keys: self.reserved_keys(),
        };
        // Fails with AlreadyActive unless any previous session has already
        // released the mode, so the handle replaced below is done.
        let handle = self.capture.start(options)?;
        let session_id = handle.session_id();
        if let Some(previous) = slot.replace(handle) {
            self.reap_recording(previous);
        }
        Ok(session_id)
    }

    /// Stop recording. Returns the recorded log, or `None` when nothing was
    /// recording.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn stop_recording(&self) -> CoreResult<Option<Arc<ActionLog>>> {
        let mut recording = lock(&self.recording, "Recording handle");
        Self::stop_recording_locked(&mut recording)
    }

    #[track_caller]
    fn stop_recording_locked(slot: &mut Option<CaptureHandle>) -> CoreResult<Option<Arc<ActionLog>>> {
        match slot.take() {
            Some(mut handle) => handle.stop().map(Some),
            None => Ok(None),
        }
    }

    /// Idle -> Recording, Recording -> Idle.
    ///
    /// # Errors
    ///
    /// `AlreadyActive` while playing.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn toggle_recording(&self) -> CoreResult<ToggleOutcome> {
        let mut recording = lock(&self.recording, "Recording handle");
        let active = recording.as_ref().is_some_and(|h| !h.is_finished());
        if active {
            Self::stop_recording_locked(&mut recording)?;
            Ok(ToggleOutcome::Stopped)
        } else {
            self.start_recording_locked(&mut recording)?;
            Ok(ToggleOutcome::Started)
        }
    }

    /// Replay the current log with the configured speed and repeat count.
    ///
    /// # Errors
    ///
    /// `EmptyLog` when nothing has been recorded or loaded, `AlreadyActive`
    /// while recording or playing.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start_playback(&self) -> CoreResult<Uuid> {
        let options = lock(&self.playback_options, "Playback options").clone();
        self.start_playback_with(options)
    }

    /// Replay the current log with explicit options.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start_playback_with(&self, options: PlaybackOptions) -> CoreResult<Uuid> {
        let mut playing = lock(&self.playing, "Playback handle");
        self.start_playback_locked(&mut playing, options)
    }

    #[track_caller]
    fn start_playback_locked(
        &self,
        slot: &mut Option<PlaybackHandle>,
        options: PlaybackOptions,
    ) -> CoreResult<Uuid> {
        let handle = self.playback.play(self.slot.get(), options)?;
        let session_id = handle.session_id();
        if let Some(previous) = slot.replace(handle) {
            self.reap_playback(previous);
        }
        Ok(session_id)
    }

    /// Stop playback, releasing anything it held down. Returns `None` when
    /// nothing was playing.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn stop_playback(&self) -> CoreResult<Option<PlaybackReport>> {
        let mut playing = lock(&self.playing, "Playback handle");
        self.stop_playback_locked(&mut playing)
    }

    #[track_caller]
    fn stop_playback_locked(
        &self,
        slot: &mut Option<PlaybackHandle>,
    ) -> CoreResult<Option<PlaybackReport>> {
        let Some(mut handle) = slot.take() else {
            return Ok(None);
        };
        let report = handle.stop()?;
        *lock(&self.last_playback, "Last playback") = Some(report.clone());
        Ok(Some(report))
    }

    /// Idle -> Playing, Playing -> Idle.
    ///
    /// # Errors
    ///
    /// `EmptyLog` or `AlreadyActive` when starting.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn toggle_playback(&self) -> CoreResult<ToggleOutcome> {
        let mut playing = lock(&self.playing, "Playback handle");
        let active = playing.as_ref().is_some_and(|h| !h.is_finished());
        if active {
            self.stop_playback_locked(&mut playing)?;
            Ok(ToggleOutcome::Stopped)
        } else {
            let options = lock(&self.playback_options, "Playback options").clone();
            self.start_playback_locked(&mut playing, options)?;
            Ok(ToggleOutcome::Started)
        }
    }

    /// Stop whatever session is running. Returns the mode that was active.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn cancel(&self) -> CoreResult<Mode> {
        let was = self.mode.get();
        self.stop_playback()?;
        self.stop_recording()?;
        info!(was = ?was, "Cancelled active session");
        Ok(was)
    }

    /// Current log snapshot.
    pub fn current_log(&self) -> Arc<ActionLog> {
        self.slot.get()
    }

    /// Replace the current log. A running playback keeps its own snapshot.
    pub fn replace_log(&self, log: ActionLog) {
        info!(records = log.len(), "Action log replaced");
        self.slot.replace(Arc::new(log));
    }

    /// Save the current log to `path`.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, path: &Path) -> CoreResult<()> {
        storage::save(&self.slot.get(), path)
    }

    /// Load a log from `path` and make it current.
    ///
    /// # Errors
    ///
    /// `Io` or `MalformedLog`; the previous log stays current on error.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn load_from(&self, path: &Path) -> CoreResult<usize> {
        let log = storage::load(path)?;
        let records = log.len();
        self.replace_log(log);
        Ok(records)
    }

    /// Rebind a toggle action to another key.
    pub fn set_hotkey(&self, action: HotkeyAction, key: impl Into<KeySymbol>) {
        self.bindings.rebind(action, key);
    }

    /// Current hotkey bindings.
    pub fn bindings(&self) -> Arc<HotkeyBindings> {
        self.bindings.snapshot()
    }

    /// Shared binding table, for a [`crate::HotkeyController`].
    pub fn binding_table(&self) -> BindingTable {
        self.bindings.clone()
    }

    /// Snapshot of mode, log and session state.
    pub fn status(&self) -> MacroStatus {
        let log = self.slot.get();
        let options = lock(&self.playback_options, "Playback options").clone();
        let recording_session = lock(&self.recording, "Recording handle")
            .as_ref()
            .filter(|h| !h.is_finished())
            .map(CaptureHandle::session_id);
        let playback_session = {
            let mut playing = lock(&self.playing, "Playback handle");
            // A session that ended on its own still owes its report.
            if let Some(finished) = playing.take_if(|h| h.is_finished()) {
                self.reap_playback(finished);
            }
            playing.as_ref().map(PlaybackHandle::session_id)
        };

        MacroStatus {
            mode: self.mode.get(),
            records: log.len(),
            duration_secs: log.duration_secs(),
            speed: options.speed,
            repeat: options.repeat,
            recording_session,
            playback_session,
            last_playback: lock(&self.last_playback, "Last playback").clone(),
        }
    }

    fn reap_recording(&self, mut previous: CaptureHandle) {
        if let Err(e) = previous.wait() {
            warn!(error = ?e, "Previous recording ended abnormally");
        }
    }

    fn reap_playback(&self, mut previous: PlaybackHandle) {
        match previous.wait() {
            Ok(report) => *lock(&self.last_playback, "Last playback") = Some(report),
            Err(e) => warn!(error = ?e, "Previous playback ended abnormally"),
        }
    }
}

impl HotkeyTarget for MacroManager {
    fn on_hotkey(&self, action: HotkeyAction) {
        let result = match action {
            HotkeyAction::ToggleRecord => self
                .toggle_recording()
                .map(|outcome| debug!(outcome = ?outcome, "Recording toggled")),
            HotkeyAction::TogglePlayback => self
                .toggle_playback()
                .map(|outcome| debug!(outcome = ?outcome, "Playback toggled")),
            HotkeyAction::Cancel => self.cancel().map(|_| ()),
            HotkeyAction::Toggle => {
                debug!("Tool toggle ignored by macro manager");
                Ok(())
            }
        };
        if let Err(e) = result {
            warn!(action = ?action, error = %e, "Hotkey action rejected");
        }
    }
}
