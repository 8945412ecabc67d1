use crate::{
    CancelToken, CoreResult, HeldInputGuard, HotkeyAction, HotkeyTarget, MouseButton,
    PeriodicAction, PeriodicConfig, PeriodicHandle, PeriodicReport, SinkFactory,
    engine::ToggleOutcome, tools::ToolRunner,
};

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, warn};

/// Gap between the two clicks of a double click, and between the
/// individual clicks of [`AutoClicker::click_at`].
const MULTI_CLICK_GAP: Duration = Duration::from_millis(50);

/// Settle time after moving the cursor before clicking.
const MOVE_SETTLE: Duration = Duration::from_millis(10);

/// Single or double click per iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickKind {
    /// One press/release pair.
    #[default]
    Single,
    /// Two press/release pairs.
    Double,
}

/// Auto clicker configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClickerSettings {
    /// Delay between clicks.
    pub interval: Duration,
    /// Random ± offset applied to every delay.
    pub jitter: Option<Duration>,
    /// Button to click.
    pub button: MouseButton,
    /// Single or double click.
    pub click: ClickKind,
    /// Number of clicks; 0 clicks until stopped.
    pub repeat: u32,
    /// Fixed position the cursor is moved to before each click.
    pub position: Option<(i32, i32)>,
}

impl Default for ClickerSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            jitter: None,
            button: MouseButton::Left,
            click: ClickKind::Single,
            repeat: 0,
            position: None,
        }
    }
}

impl ClickerSettings {
    fn periodic(&self) -> PeriodicConfig {
        PeriodicConfig {
            interval: self.interval,
            jitter: self.jitter,
            repeat: self.repeat,
        }
    }
}

/// Point-in-time view of the clicker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClickerStatus {
    /// Whether the click loop is running.
    pub running: bool,
    /// Active settings.
    pub settings: ClickerSettings,
    /// Report of the last finished loop.
    pub last_run: Option<PeriodicReport>,
}

/// Clicks a mouse button at a fixed interval until stopped.
pub struct AutoClicker {
    sinks: SinkFactory,
    settings: Mutex<ClickerSettings>,
    runner: ToolRunner,
}

impl AutoClicker {
    /// Idle clicker.
    pub fn new(sinks: SinkFactory, settings: ClickerSettings) -> Self {
        Self {
            sinks,
            settings: Mutex::new(settings),
            runner: ToolRunner::new("auto clicker"),
        }
    }

    /// Current settings.
    pub fn settings(&self) -> ClickerSettings {
        self.settings
            .lock()
            .unwrap_or_else(|e| {
                error!("Clicker settings lock poisoned, recovering: {}", e);
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
    pub fn set_settings(&self, settings: ClickerSettings) -> CoreResult<()> {
        settings.periodic().validate()?;
        *self.settings.lock().unwrap_or_else(|e| {
            error!("Clicker settings lock poisoned, recovering: {}", e);
            e.into_inner()
        }) = settings;
        Ok(())
    }

    /// Start clicking.
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

    /// Stop clicking. Returns the finished loop's report, if one was running.
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

    /// Whether the click loop is running.
    pub fn is_running(&self) -> bool {
        self.runner.is_running()
    }

    /// Running flag, settings and last report.
    pub fn status(&self) -> ClickerStatus {
        ClickerStatus {
            running: self.runner.is_running(),
            settings: self.settings(),
            last_run: self.runner.last_report(),
        }
    }

    /// Move to `(x, y)` and click `count` times on the calling thread.
    #[instrument(skip(self))]
    pub fn click_at(
        &self,
        x: i32,
        y: i32,
        button: MouseButton,
        click: ClickKind,
        count: u32,
    ) -> CoreResult<()> {
        let mut held = HeldInputGuard::new((self.sinks)()?);
        held.sink_mut().move_to(x, y)?;
        std::thread::sleep(MOVE_SETTLE);

        for n in 0..count {
            click_once(&mut held, button, click, None)?;
            if count > 1 && n + 1 < count {
                std::thread::sleep(MULTI_CLICK_GAP);
            }
        }
        Ok(())
    }

    #[track_caller]
    fn spawn(&self, settings: ClickerSettings) -> CoreResult<PeriodicHandle> {
        let sinks = Arc::clone(&self.sinks);
        let config = settings.periodic();
        debug!(?settings, "Spawning click loop");

        PeriodicAction::spawn("auto-clicker", config, move || {
            let mut held = HeldInputGuard::new(sinks()?);
            Ok(move |_iteration: u64, cancel: &CancelToken| -> CoreResult<()> {
                if let Some((x, y)) = settings.position {
                    held.sink_mut().move_to(x, y)?;
                }
                click_once(&mut held, settings.button, settings.click, Some(cancel))
            })
        })
    }
}

fn click_once(
    held: &mut HeldInputGuard,
    button: MouseButton,
    click: ClickKind,
    cancel: Option<&CancelToken>,
) -> CoreResult<()> {
    held.button(button, true)?;
    held.button(button, false)?;

    if click == ClickKind::Double {
        let interrupted = match cancel {
            Some(cancel) => cancel.sleep(MULTI_CLICK_GAP / 2),
            None => {
                std::thread::sleep(MULTI_CLICK_GAP / 2);
                false
            }
        };
        if !interrupted {
            held.button(button, true)?;
            held.button(button, false)?;
        }
    }
    Ok(())
}

impl HotkeyTarget for AutoClicker {
    fn on_hotkey(&self, action: HotkeyAction) {
        let result = match action {
            HotkeyAction::Toggle => self.toggle().map(|_| ()),
            HotkeyAction::Cancel => self.stop().map(|_| ()),
            _ => Ok(()),
        };
        if let Err(e) = result {
            warn!(action = ?action, error = %e, "Auto clicker hotkey rejected");
        }
    }
}
