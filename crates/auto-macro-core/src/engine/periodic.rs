//! Cancellable interval loop shared by the auto clicker and key presser.

use crate::{CancelToken, CoreResult, MacroError};

use std::{
    panic::Location,
    thread::JoinHandle,
    time::Duration,
};

use error_location::ErrorLocation;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, error, info, instrument};

/// Shortest delay ever waited between two iterations.
pub const MIN_DELAY: Duration = Duration::from_millis(1);

/// Timing of a periodic loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicConfig {
    /// Base delay between iterations.
    pub interval: Duration,
    /// Maximum random offset added to or subtracted from `interval`.
    pub jitter: Option<Duration>,
    /// Number of iterations; 0 runs until cancelled.
    pub repeat: u32,
}

impl PeriodicConfig {
    /// Unbounded loop with a fixed interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            jitter: None,
            repeat: 0,
        }
    }

    /// Same config with a random ± offset.
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = Some(jitter);
        self
    }

    /// Same config bounded to `repeat` iterations.
    pub fn with_repeat(mut self, repeat: u32) -> Self {
        self.repeat = repeat;
        self
    }

    /// Reject a zero interval.
    #[track_caller]
    pub fn validate(&self) -> CoreResult<()> {
        if self.interval.is_zero() {
            return Err(MacroError::InvalidInterval {
                reason: "interval must be greater than zero".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(())
    }

    /// Delay before the next iteration: `interval ± jitter`, never below
    /// [`MIN_DELAY`].
    pub fn next_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let base = self.interval.as_secs_f64();
        let offset = match self.jitter {
            Some(jitter) if !jitter.is_zero() => {
                let bound = jitter.as_secs_f64();
                rng.gen_range(-bound..=bound)
            }
            _ => 0.0,
        };

        Duration::try_from_secs_f64(base + offset)
            .unwrap_or(Duration::ZERO)
            .max(MIN_DELAY)
    }
}

/// Interval from a clicks-per-second rate, at least [`MIN_DELAY`].
#[track_caller]
pub fn interval_from_cps(cps: f64) -> CoreResult<Duration> {
    if !(cps.is_finite() && cps > 0.0) {
        return Err(MacroError::InvalidInterval {
            reason: format!("rate must be positive, got {} per second", cps),
            location: ErrorLocation::from(Location::caller()),
        });
    }
    Ok(Duration::try_from_secs_f64(1.0 / cps)
        .unwrap_or(MIN_DELAY)
        .max(MIN_DELAY))
}

/// Rate per second for an interval.
pub fn cps_from_interval(interval: Duration) -> f64 {
    let secs = interval.max(MIN_DELAY).as_secs_f64();
    1.0 / secs
}

/// Interval from clock parts, at least [`MIN_DELAY`].
pub fn interval_from_parts(hours: u64, minutes: u64, seconds: u64, millis: u64) -> Duration {
    let total_ms = hours
        .saturating_mul(3_600_000)
        .saturating_add(minutes.saturating_mul(60_000))
        .saturating_add(seconds.saturating_mul(1_000))
        .saturating_add(millis);
    Duration::from_millis(total_ms).max(MIN_DELAY)
}

/// Human-readable interval, e.g. `250ms`, `1.5s`, `2m 5s`.
pub fn format_interval(interval: Duration) -> String {
    let ms = interval.as_millis();
    if ms < 1_000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        let secs = interval.as_secs_f64();
        if ms % 1_000 == 0 {
            format!("{}s", ms / 1_000)
        } else {
            format!("{:.1}s", secs)
        }
    } else {
        let total_secs = interval.as_secs();
        let (minutes, seconds) = (total_secs / 60, total_secs % 60);
        if seconds == 0 {
            format!("{}m", minutes)
        } else {
            format!("{}m {}s", minutes, seconds)
        }
    }
}

/// How a periodic loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodicOutcome {
    /// The repeat bound was reached.
    Completed,
    /// Stopped by its handle or a hotkey toggle.
    Cancelled,
    /// The action (or its setup) returned an error.
    Failed,
}

/// Summary of a finished loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodicReport {
    /// How the loop ended.
    pub outcome: PeriodicOutcome,
    /// Number of successful action invocations.
    pub iterations: u64,
}

/// Runs an action on a worker thread at a fixed (optionally jittered)
/// interval until the repeat bound is reached or it is cancelled.
pub struct PeriodicAction;

impl PeriodicAction {
    /// Validate `config` and start the loop on a thread named `name`.
    ///
    /// `setup` runs on the worker thread and builds the action, so the
    /// action may own values that are not `Send` (such as an input sink).
    /// The action receives the zero-based iteration index and the loop's
    /// cancel token, which it may block on (hold-style actions).
    ///
    /// Cancellation is checked before every iteration and again right
    /// after each wait.
    ///
    /// # Errors
    ///
    /// `InvalidInterval` for a zero interval; no thread is started.
    #[track_caller]
    #[instrument(skip(setup), fields(interval = ?config.interval, repeat = config.repeat))]
    pub fn spawn<S, A>(name: &str, config: PeriodicConfig, setup: S) -> CoreResult<PeriodicHandle>
    where
        S: FnOnce() -> CoreResult<A> + Send + 'static,
        A: FnMut(u64, &CancelToken) -> CoreResult<()>,
    {
        config.validate()?;

        let cancel = CancelToken::new();
        let worker_cancel = cancel.clone();
        let thread_name = name.to_string();

        let worker = std::thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                let report = match setup() {
                    Ok(action) => run_loop(config, action, &worker_cancel),
                    Err(e) => {
                        error!(worker = %thread_name, error = ?e, "Periodic action setup failed");
                        PeriodicReport {
                            outcome: PeriodicOutcome::Failed,
                            iterations: 0,
                        }
                    }
                };
                info!(
                    worker = %thread_name,
                    outcome = ?report.outcome,
                    iterations = report.iterations,
                    "Periodic action finished"
                );
                report
            })?;

        Ok(PeriodicHandle {
            name: name.to_string(),
            cancel,
            worker: Some(worker),
            report: None,
        })
    }
}

fn run_loop<A>(config: PeriodicConfig, mut action: A, cancel: &CancelToken) -> PeriodicReport
where
    A: FnMut(u64, &CancelToken) -> CoreResult<()>,
{
    let mut rng = rand::thread_rng();
    let mut iterations = 0u64;
    let limit = u64::from(config.repeat);

    let outcome = loop {
        if limit != 0 && iterations >= limit {
            break PeriodicOutcome::Completed;
        }
        if cancel.is_cancelled() {
            break PeriodicOutcome::Cancelled;
        }

        if let Err(e) = action(iterations, cancel) {
            error!(iteration = iterations, error = ?e, "Periodic action failed");
            break PeriodicOutcome::Failed;
        }
        iterations += 1;

        if limit != 0 && iterations >= limit {
            break PeriodicOutcome::Completed;
        }

        let delay = config.next_delay(&mut rng);
        if cancel.sleep(delay) {
            break PeriodicOutcome::Cancelled;
        }
    };

    debug!(iterations, outcome = ?outcome, "Periodic loop exited");
    PeriodicReport {
        outcome,
        iterations,
    }
}

/// Control handle for a running [`PeriodicAction`].
pub struct PeriodicHandle {
    name: String,
    cancel: CancelToken,
    worker: Option<JoinHandle<PeriodicReport>>,
    report: Option<PeriodicReport>,
}

impl PeriodicHandle {
    /// Whether the loop has exited.
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Cancel the loop and wait for it to exit. Idempotent.
    #[track_caller]
    pub fn stop(&mut self) -> CoreResult<PeriodicReport> {
        self.cancel.cancel();
        self.wait()
    }

    /// Wait for the loop to exit on its own.
    #[track_caller]
    pub fn wait(&mut self) -> CoreResult<PeriodicReport> {
        if let Some(report) = &self.report {
            return Ok(report.clone());
        }

        let Some(worker) = self.worker.take() else {
            return Err(MacroError::WorkerPanicked {
                worker: self.name.clone(),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let report = worker.join().map_err(|_| MacroError::WorkerPanicked {
            worker: self.name.clone(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        self.report = Some(report.clone());
        Ok(report)
    }
}

impl Drop for PeriodicHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
