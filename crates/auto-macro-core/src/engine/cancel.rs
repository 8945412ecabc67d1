use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, bounded};
use tracing::error;

/// Cooperative cancellation signal that wakes sleepers immediately.
///
/// Cancelling drops the only sender of an internal channel; every clone's
/// receiver then reports disconnection at once, which interrupts a
/// `recv_timeout` wait or a `select!` arm without polling.
#[derive(Debug, Clone)]
pub struct CancelToken {
    trigger: Arc<Mutex<Option<Sender<()>>>>,
    signal: Receiver<()>,
}

impl CancelToken {
    /// Token in the not-cancelled state.
    pub fn new() -> Self {
        let (tx, rx) = bounded(0);
        Self {
            trigger: Arc::new(Mutex::new(Some(tx))),
            signal: rx,
        }
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        let mut trigger = self.trigger.lock().unwrap_or_else(|e| {
            error!("Cancel token lock poisoned, recovering: {}", e);
            e.into_inner()
        });
        trigger.take();
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.signal.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Sleep for `duration` unless cancelled first.
    ///
    /// Returns `true` if the sleep was cut short by cancellation.
    pub fn sleep(&self, duration: Duration) -> bool {
        match self.signal.recv_timeout(duration) {
            Err(RecvTimeoutError::Timeout) => false,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
        }
    }

    /// Sleep until `deadline` unless cancelled first.
    ///
    /// Returns `true` if cancelled. A deadline in the past only checks the
    /// flag.
    pub fn sleep_until(&self, deadline: Instant) -> bool {
        let now = Instant::now();
        if deadline <= now {
            return self.is_cancelled();
        }
        self.sleep(deadline - now)
    }

    /// Block until cancelled.
    pub fn wait(&self) {
        let _ = self.signal.recv();
    }

    /// Receiver that disconnects on cancellation, for use in `select!`.
    pub fn signal(&self) -> &Receiver<()> {
        &self.signal
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
