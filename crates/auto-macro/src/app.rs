use crate::{AppCommand, AppError, AppResult, config::StorageConfig};

use std::{panic::Location, sync::Arc};

use auto_macro_core::{
    AutoClicker, CoreResult, KeyPresser, MacroError, MacroManager, Mode, ToggleOutcome,
};
use error_location::ErrorLocation;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

/// Main application state.
///
/// Runs on the async runtime. Engine calls can block (stopping a session
/// joins its worker thread), so every one of them goes through
/// `spawn_blocking`.
pub struct App {
    pub(crate) manager: Arc<MacroManager>,
    pub(crate) clicker: Arc<AutoClicker>,
    pub(crate) presser: Arc<KeyPresser>,
    pub(crate) storage: StorageConfig,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
}

impl App {
    /// Run the main application event loop until `Shutdown` arrives or every
    /// sender is gone.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Auto-Macro starting");

        if self.storage.load_on_start {
            self.load_macro().await;
        }

        loop {
            match self.command_rx.recv().await {
                Some(AppCommand::Shutdown) => {
                    info!("Shutdown requested");
                    break;
                }
                Some(command) => {
                    if let Err(e) = self.handle(command).await {
                        error!(command = ?command, error = ?e, "Command failed");
                    }
                }
                None => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        self.shutdown().await?;
        info!("Auto-Macro shut down successfully");

        Ok(())
    }

    #[instrument(skip(self))]
    async fn handle(&self, command: AppCommand) -> AppResult<()> {
        match command {
            AppCommand::ToggleRecording => {
                let manager = Arc::clone(&self.manager);
                let outcome = run_blocking(move || manager.toggle_recording()).await?;
                info!(outcome = ?outcome, "Recording toggled");
                if outcome == ToggleOutcome::Stopped {
                    self.autosave().await?;
                }
            }
            AppCommand::TogglePlayback => {
                let manager = Arc::clone(&self.manager);
                let outcome = run_blocking(move || manager.toggle_playback()).await?;
                info!(outcome = ?outcome, "Playback toggled");
            }
            AppCommand::CancelAll => {
                let was = self.stop_everything().await?;
                if was == Mode::Recording {
                    self.autosave().await?;
                }
            }
            AppCommand::ToggleClicker => {
                let clicker = Arc::clone(&self.clicker);
                let outcome = run_blocking(move || clicker.toggle()).await?;
                info!(outcome = ?outcome, "Auto clicker toggled");
            }
            AppCommand::TogglePresser => {
                let presser = Arc::clone(&self.presser);
                let outcome = run_blocking(move || presser.toggle()).await?;
                info!(outcome = ?outcome, "Key presser toggled");
            }
            AppCommand::Shutdown => {}
        }

        debug!(status = ?self.manager.status(), "Macro status");
        Ok(())
    }

    /// Stop the macro session and both tools. Returns the macro mode that
    /// was active.
    async fn stop_everything(&self) -> AppResult<Mode> {
        let manager = Arc::clone(&self.manager);
        let clicker = Arc::clone(&self.clicker);
        let presser = Arc::clone(&self.presser);

        run_blocking(move || {
            let was = manager.cancel()?;
            clicker.stop()?;
            presser.stop()?;
            Ok(was)
        })
        .await
    }

    /// Save the current log when autosave is on. Empty logs never overwrite
    /// the file.
    #[instrument(skip(self))]
    async fn autosave(&self) -> AppResult<()> {
        if !self.storage.autosave {
            return Ok(());
        }

        let records = self.manager.current_log().len();
        if records == 0 {
            info!("Recording is empty, keeping the saved macro");
            return Ok(());
        }

        let manager = Arc::clone(&self.manager);
        let path = self.storage.macro_path.clone();
        run_blocking(move || manager.save_to(&path)).await?;

        info!(path = ?self.storage.macro_path, records, "Macro saved");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn load_macro(&self) {
        let path = self.storage.macro_path.clone();
        if !path.exists() {
            debug!(path = ?path, "No saved macro to load");
            return;
        }

        let manager = Arc::clone(&self.manager);
        match run_blocking(move || manager.load_from(&path)).await {
            Ok(records) => info!(path = ?self.storage.macro_path, records, "Macro loaded"),
            Err(e) => warn!(error = ?e, "Failed to load saved macro"),
        }
    }

    async fn shutdown(&self) -> AppResult<()> {
        let was = self.stop_everything().await?;
        if was == Mode::Recording {
            self.autosave().await?;
        }
        Ok(())
    }
}

/// Run a blocking engine call off the async runtime.
#[track_caller]
fn run_blocking<T, F>(f: F) -> impl Future<Output = AppResult<T>>
where
    F: FnOnce() -> CoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let caller = Location::caller();
    async move {
        match tokio::task::spawn_blocking(f).await {
            Ok(result) => result.map_err(AppError::from),
            Err(e) => Err(AppError::Core {
                source: MacroError::WorkerPanicked {
                    worker: format!("command task ({})", e),
                    location: ErrorLocation::from(caller),
                },
                location: ErrorLocation::from(caller),
            }),
        }
    }
}
