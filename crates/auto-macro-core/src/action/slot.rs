use crate::ActionLog;

use std::sync::{Arc, RwLock};

use tracing::error;

/// Shared holder for the current action log.
///
/// Logs are immutable once published; replacing the log swaps the whole
/// `Arc`, so a playback session that already holds the previous log keeps
/// reading it undisturbed.
#[derive(Debug, Clone, Default)]
pub struct LogSlot {
    current: Arc<RwLock<Arc<ActionLog>>>,
}

impl LogSlot {
    /// Slot holding an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current log.
    pub fn get(&self) -> Arc<ActionLog> {
        let guard = self.current.read().unwrap_or_else(|e| {
            error!("Log slot lock poisoned, recovering: {}", e);
            e.into_inner()
        });
        Arc::clone(&guard)
    }

    /// Replace the current log wholesale.
    pub fn replace(&self, log: Arc<ActionLog>) {
        let mut guard = self.current.write().unwrap_or_else(|e| {
            error!("Log slot lock poisoned, recovering: {}", e);
            e.into_inner()
        });
        *guard = log;
    }
}
