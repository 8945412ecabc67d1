//! Bridge from hotkey controller threads to the async command loop.
//!
//! Each [`auto_macro_core::HotkeyController`] runs on its own OS thread and
//! calls its target synchronously. The handler turns the matched action into
//! an [`AppCommand`] and hands it to the application over a bounded channel.

use crate::{AppCommand, AppError, AppResult};

use std::panic::Location;

use auto_macro_core::{HotkeyAction, HotkeyTarget};
use error_location::ErrorLocation;
use tokio::sync::mpsc;
use tracing::{debug, error, instrument};

/// Which feature a hotkey controller serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyScope {
    /// Record/playback/cancel keys of the macro manager.
    Macro,
    /// Auto clicker toggle key.
    Clicker,
    /// Key presser toggle key.
    Presser,
}

/// [`HotkeyTarget`] forwarding matched hotkeys as [`AppCommand`]s.
pub struct HotkeyHandler {
    scope: HotkeyScope,
    command_tx: mpsc::Sender<AppCommand>,
}

impl HotkeyHandler {
    /// Handler for one controller.
    pub fn new(scope: HotkeyScope, command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self { scope, command_tx }
    }

    /// Send the command for `action`. Returns the command sent, `None` when
    /// this scope ignores the action.
    ///
    /// Blocks while the channel is full; must not be called from inside the
    /// async runtime.
    #[track_caller]
    #[instrument(skip(self), fields(scope = ?self.scope))]
    pub fn dispatch(&self, action: HotkeyAction) -> AppResult<Option<AppCommand>> {
        let Some(command) = AppCommand::from_hotkey(self.scope, action) else {
            debug!("Hotkey ignored in this scope");
            return Ok(None);
        };

        self.command_tx
            .blocking_send(command)
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send {:?}: {}", command, e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        debug!(command = ?command, "Hotkey forwarded");
        Ok(Some(command))
    }
}

impl HotkeyTarget for HotkeyHandler {
    fn on_hotkey(&self, action: HotkeyAction) {
        if let Err(e) = self.dispatch(action) {
            error!(error = ?e, "Failed to forward hotkey");
        }
    }
}
