use crate::{
    CancelToken, CoreResult, HeldInputGuard, HotkeyAction, HotkeyTarget, KeySymbol,
    PeriodicAction, PeriodicConfig, PeriodicHandle, PeriodicReport, SinkFactory,
    engine::ToggleOutcome, tools::ToolRunner,
};

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

/// How long a key stays down per press in continuous mode.
const TAP_HOLD: Duration = Duration::from_millis(1);

/// Usual pause between keys for [`KeyPresser::send_sequence`] and
/// [`KeyPresser::type_text`].
pub const DEFAULT_SEQUENCE_INTERVAL: Duration = Duration::from_millis(50);

/// Continuous tapping or a single long hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressMode {
    /// Press and release the key every interval.
    #[default]
    Continuous,
    /// Press once and keep the key down until stopped.
    Hold,
}

/// Key presser configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresserSettings {
    /// Key to press.
    pub key: KeySymbol,
    /// Tap repeatedly or hold.
    pub mode: PressMode,
    /// Delay between taps in continuous mode.
    pub interval: Duration,
}

impl Default for PresserSettings {
    fn default() -> Self {
        Self {
            key: KeySymbol::Char('f'),
            mode: PressMode::Continuous,
            interval: Duration::from_millis(50),
        }
    }
}

impl PresserSettings {
    // Hold mode runs a single iteration that blocks until cancelled.
    fn periodic(&self) -> PeriodicConfig {
        PeriodicConfig::new(self.interval)
    }
}

/// Point-in-time view of the presser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresserStatus {
    /// Whether the press loop is running.
    pub running: bool,
    /// Active settings.
    pub settings: PresserSettings,
    /// Report of the last finished loop.
    pub last_run: Option<PeriodicReport>,
}

/// Taps or holds one key until stopped.
pub struct KeyPresser {
    sinks: SinkFactory,
    settings: Mutex<PresserSettings>,
    runner: ToolRunner,
}

impl KeyPresser {
    /// Idle presser.
    pub fn new(sinks: SinkFactory, settings: PresserSettings) -> Self {
        Self {
            sinks,
            settings: Mutex::new(settings),
            runner: ToolRunner::new("key presser"),
        }
    }

    /// Current settings.
    pub fn settings(&self) -> PresserSettings {
        self.settings
            .lock()
            .unwrap_or_else(|e| {
                error!("Presser settings lock poisoned, recovering: {}", e);
                e.into_inner()
            })
            .clone()
    }

    /// Replace the settings used by the next start.
    ///
    /// # Errors
    ///
    /// `InvalidInterval` for a zero interval.
    #[track_caller]
    pub fn set_settings(&self, settings: PresserSettings) -> CoreResult<()> {
        settings.periodic().validate()?;
        if settings.key.is_raw() {
            warn!(key = %settings.key, "Presser key is not a known key, sending it as text");
        }
        *self.settings.lock().unwrap_or_else(|e| {
            error!("Presser settings lock poisoned, recovering: {}", e);
            e.into_inner()
        }) = settings;
        Ok(())
    }

    /// Start pressing.
    ///
    /// # Errors
    ///
    /// `AlreadyActive` while running, `InvalidInterval` for a zero interval.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start(&self) -> CoreResult<()> {
        let settings = self.settings();
        self.runner.start(|| self.spawn(settings))
    }

    /// Stop pressing; a held key is released before this returns.
    #[instrument(skip(self))]
    pub fn stop(&self) -> CoreResult<Option<PeriodicReport>> {
        self.runner.stop()
    }

    /// Start when idle, stop when running.
    #[track_caller]
    pub fn toggle(&self) -> CoreResult<ToggleOutcome> {
        let settings = self.settings();
        self.runner.toggle(|| self.spawn(settings))
    }

    /// Whether the press loop is running.
    pub fn is_running(&self) -> bool {
        self.runner.is_running()
    }

    /// Running flag, settings and last report.
    pub fn status(&self) -> PresserStatus {
        PresserStatus {
            running: self.runner.is_running(),
            settings: self.settings(),
            last_run: self.runner.last_report(),
        }
    }

    /// Press `key` once, keeping it down for `hold`, on the calling thread.
    #[instrument(skip(self))]
    pub fn press_once(&self, key: &KeySymbol, hold: Duration) -> CoreResult<()> {
        let mut held = HeldInputGuard::new((self.sinks)()?);
        held.key(key, true)?;
        std::thread::sleep(hold);
        held.key(key, false)
    }

    /// Tap each key in order, pausing `interval` between keys.
    #[instrument(skip(self, keys), fields(count = keys.len()))]
    pub fn send_sequence(&self, keys: &[KeySymbol], interval: Duration) -> CoreResult<()> {
        let mut held = HeldInputGuard::new((self.sinks)()?);
        for (n, key) in keys.iter().enumerate() {
            held.key(key, true)?;
            std::thread::sleep(TAP_HOLD);
            held.key(key, false)?;
            if n + 1 < keys.len() {
                std::thread::sleep(interval);
            }
        }
        Ok(())
    }

    /// Type `text` one character at a time, `interval` apart.
    pub fn type_text(&self, text: &str, interval: Duration) -> CoreResult<()> {
        let keys: Vec<KeySymbol> = text.chars().map(KeySymbol::Char).collect();
        self.send_sequence(&keys, interval)
    }

    #[track_caller]
    fn spawn(&self, settings: PresserSettings) -> CoreResult<PeriodicHandle> {
        let sinks = Arc::clone(&self.sinks);
        let config = settings.periodic();
        debug!(?settings, "Spawning press loop");

        PeriodicAction::spawn("key-presser", config, move || {
            let mut held = HeldInputGuard::new(sinks()?);
            let key = settings.key;
            let mode = settings.mode;
            Ok(move |_iteration: u64, cancel: &CancelToken| -> CoreResult<()> {
                held.key(&key, true)?;
                match mode {
                    PressMode::Continuous => std::thread::sleep(TAP_HOLD),
                    PressMode::Hold => {
                        info!(key = %key, "Holding key until stopped");
                        cancel.wait();
                    }
                }
                held.key(&key, false)
            })
        })
    }
}

impl HotkeyTarget for KeyPresser {
    fn on_hotkey(&self, action: HotkeyAction) {
        let result = match action {
            HotkeyAction::Toggle => self.toggle().map(|_| ()),
            HotkeyAction::Cancel => self.stop().map(|_| ()),
            _ => Ok(()),
        };
        if let Err(e) = result {
            warn!(action = ?action, error = %e, "Key presser hotkey rejected");
        }
    }
}
