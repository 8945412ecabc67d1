//! Auto-Macro: global mouse/keyboard macro recorder with hotkey control,
//! plus an auto clicker and a key presser.

mod app;
mod app_command;
mod config;
mod enigo_sink;
mod error;
mod hotkey_handler;
mod keymap;
mod rdev_source;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    error::{AppError, Result as AppResult},
    hotkey_handler::{HotkeyHandler, HotkeyScope},
    rdev_source::RdevInputSource,
};

use crate::config::Config;

use std::sync::Arc;

use auto_macro_core::{
    AutoClicker, BindingTable, HotkeyAction, HotkeyBindings, HotkeyController, KeyPresser,
    KeySymbol, MacroManager,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "auto_macro=debug,auto_macro_core=debug";

/// Application entry point.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    if let Err(e) = run() {
        error!(error = ?e, "Auto-Macro failed");
        std::process::exit(1);
    }
}

fn run() -> AppResult<()> {
    let config = Config::load()?;
    config.validate()?;

    let source = Arc::new(RdevInputSource::start()?);
    let sinks = enigo_sink::sink_factory();

    let manager = Arc::new(MacroManager::new(
        source.clone(),
        Arc::clone(&sinks),
        BindingTable::new(config.hotkeys.bindings()),
    ));
    manager.set_playback(config.playback.speed, config.playback.repeat)?;
    manager.reserve_keys(config.tool_hotkeys());

    let clicker = Arc::new(AutoClicker::new(Arc::clone(&sinks), config.clicker.settings()));
    let presser = Arc::new(KeyPresser::new(sinks, config.presser.settings()));

    let (command_tx, command_rx) = mpsc::channel(32);

    // One controller per scope, each with its own subscription to the shared
    // listener.
    let mut controllers = vec![
        HotkeyController::spawn(
            source.as_ref(),
            manager.binding_table(),
            Arc::new(HotkeyHandler::new(HotkeyScope::Macro, command_tx.clone())),
        )?,
        HotkeyController::spawn(
            source.as_ref(),
            toggle_binding(&config.clicker.hotkey),
            Arc::new(HotkeyHandler::new(HotkeyScope::Clicker, command_tx.clone())),
        )?,
        HotkeyController::spawn(
            source.as_ref(),
            toggle_binding(&config.presser.hotkey),
            Arc::new(HotkeyHandler::new(HotkeyScope::Presser, command_tx.clone())),
        )?,
    ];

    info!(
        record = %config.hotkeys.record,
        playback = %config.hotkeys.playback,
        clicker = %config.clicker.hotkey,
        presser = %config.presser.hotkey,
        "Hotkeys active, press Ctrl+C to quit"
    );

    let app = App {
        manager,
        clicker,
        presser,
        storage: config.storage.clone(),
        command_rx,
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(async move {
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl+C received");
                    if command_tx.send(AppCommand::Shutdown).await.is_err() {
                        debug!("App loop already stopped");
                    }
                }
                Err(e) => error!(error = ?e, "Failed to listen for Ctrl+C"),
            }
        });

        app.run().await
    });

    for controller in &mut controllers {
        controller.stop();
    }

    // The rdev listener thread cannot be stopped; it ends with the process.
    result
}

fn toggle_binding(key: &str) -> BindingTable {
    BindingTable::new(HotkeyBindings::new().with(KeySymbol::parse(key), HotkeyAction::Toggle))
}
