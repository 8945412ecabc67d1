//! Single-action tools built on [`crate::PeriodicAction`].

mod auto_clicker;
mod key_presser;

pub use {
    auto_clicker::{AutoClicker, ClickKind, ClickerSettings, ClickerStatus},
    key_presser::{
        DEFAULT_SEQUENCE_INTERVAL, KeyPresser, PressMode, PresserSettings, PresserStatus,
    },
};

use crate::{CoreResult, MacroError, PeriodicHandle, PeriodicReport, engine::ToggleOutcome};

use std::{
    panic::Location,
    sync::{Mutex, MutexGuard},
};

use error_location::ErrorLocation;
use tracing::{error, info};

/// Start/stop bookkeeping shared by the tools: at most one loop at a time.
pub(crate) struct ToolRunner {
    name: &'static str,
    running: Mutex<Option<PeriodicHandle>>,
    last_report: Mutex<Option<PeriodicReport>>,
}

impl ToolRunner {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            running: Mutex::new(None),
            last_report: Mutex::new(None),
        }
    }

    fn lock_running(&self) -> MutexGuard<'_, Option<PeriodicHandle>> {
        self.running.lock().unwrap_or_else(|e| {
            error!(tool = self.name, "Tool handle lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }

    fn record(&self, report: PeriodicReport) {
        let mut last = self.last_report.lock().unwrap_or_else(|e| {
            error!(tool = self.name, "Tool report lock poisoned, recovering: {}", e);
            e.into_inner()
        });
        *last = Some(report);
    }

    #[track_caller]
    fn start_locked<F>(&self, slot: &mut Option<PeriodicHandle>, spawn: F) -> CoreResult<()>
    where
        F: FnOnce() -> CoreResult<PeriodicHandle>,
    {
        if let Some(mut previous) = slot.take() {
            if !previous.is_finished() {
                *slot = Some(previous);
                return Err(MacroError::AlreadyActive {
                    active: self.name.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            if let Ok(report) = previous.wait() {
                self.record(report);
            }
        }

        *slot = Some(spawn()?);
        info!(tool = self.name, "Tool started");
        Ok(())
    }

    fn stop_locked(&self, slot: &mut Option<PeriodicHandle>) -> CoreResult<Option<PeriodicReport>> {
        let Some(mut handle) = slot.take() else {
            return Ok(None);
        };
        let report = handle.stop()?;
        self.record(report.clone());
        info!(tool = self.name, iterations = report.iterations, "Tool stopped");
        Ok(Some(report))
    }

    /// Start unless a loop is already running.
    #[track_caller]
    pub(crate) fn start<F>(&self, spawn: F) -> CoreResult<()>
    where
        F: FnOnce() -> CoreResult<PeriodicHandle>,
    {
        let mut running = self.lock_running();
        self.start_locked(&mut running, spawn)
    }

    /// Stop the running loop, if any.
    pub(crate) fn stop(&self) -> CoreResult<Option<PeriodicReport>> {
        let mut running = self.lock_running();
        self.stop_locked(&mut running)
    }

    /// Stop when running, otherwise start.
    #[track_caller]
    pub(crate) fn toggle<F>(&self, spawn: F) -> CoreResult<ToggleOutcome>
    where
        F: FnOnce() -> CoreResult<PeriodicHandle>,
    {
        let mut running = self.lock_running();
        if running.as_ref().is_some_and(|h| !h.is_finished()) {
            self.stop_locked(&mut running)?;
            Ok(ToggleOutcome::Stopped)
        } else {
            self.start_locked(&mut running, spawn)?;
            Ok(ToggleOutcome::Started)
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.lock_running()
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    pub(crate) fn last_report(&self) -> Option<PeriodicReport> {
        self.last_report
            .lock()
            .unwrap_or_else(|e| {
                error!(tool = self.name, "Tool report lock poisoned, recovering: {}", e);
                e.into_inner()
            })
            .clone()
    }
}
