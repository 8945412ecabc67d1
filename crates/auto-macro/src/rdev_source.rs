//! Global input listener backed by `rdev`.
//!
//! `rdev::listen` installs a process-wide hook and blocks its thread forever,
//! so exactly one listener thread is started and every consumer (capture,
//! playback cancel key, hotkey controllers) attaches to the [`InputHub`] it
//! feeds.

use crate::{AppResult, keymap};

use std::{
    panic::Location,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    time::Duration,
};

use auto_macro_core::{
    CoreResult, InputEvent, InputEventKind, InputHub, InputSource, MacroError, Subscription,
};
use error_location::ErrorLocation;
use rdev::EventType;
use tracing::{debug, error, info, instrument, trace};

/// How long `start` waits for the hook to fail before assuming it is running.
/// `rdev::listen` only returns on failure.
const STARTUP_GRACE: Duration = Duration::from_millis(250);

/// Turns raw hook events into engine events.
///
/// The hook reports a position only for moves, so clicks and scrolls carry
/// the last position seen.
#[derive(Debug, Default)]
pub(crate) struct EventTranslator {
    last_position: (i32, i32),
}

impl EventTranslator {
    pub(crate) fn translate(&mut self, event: &EventType) -> Option<InputEventKind> {
        let (last_x, last_y) = self.last_position;
        let kind = match *event {
            EventType::MouseMove { x, y } => {
                let position = (x.round() as i32, y.round() as i32);
                self.last_position = position;
                InputEventKind::MouseMove {
                    x: position.0,
                    y: position.1,
                }
            }
            EventType::ButtonPress(button) => InputEventKind::MouseButton {
                x: last_x,
                y: last_y,
                button: keymap::mouse_button(button)?,
                pressed: true,
            },
            EventType::ButtonRelease(button) => InputEventKind::MouseButton {
                x: last_x,
                y: last_y,
                button: keymap::mouse_button(button)?,
                pressed: false,
            },
            EventType::Wheel { delta_x, delta_y } => InputEventKind::MouseScroll {
                x: last_x,
                y: last_y,
                dx: saturate(delta_x),
                dy: saturate(delta_y),
            },
            EventType::KeyPress(key) => InputEventKind::KeyPress(keymap::key_symbol(key)),
            EventType::KeyRelease(key) => InputEventKind::KeyRelease(keymap::key_symbol(key)),
        };
        Some(kind)
    }
}

fn saturate(delta: i64) -> i32 {
    delta.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[derive(Default)]
struct ListenerState {
    alive: AtomicBool,
    failure: Mutex<Option<String>>,
}

impl ListenerState {
    fn fail(&self, reason: String) {
        self.alive.store(false, Ordering::SeqCst);
        let mut failure = self.failure.lock().unwrap_or_else(|e| {
            error!("Listener state lock poisoned, recovering: {}", e);
            e.into_inner()
        });
        *failure = Some(reason);
    }

    fn failure(&self) -> String {
        self.failure
            .lock()
            .unwrap_or_else(|e| {
                error!("Listener state lock poisoned, recovering: {}", e);
                e.into_inner()
            })
            .clone()
            .unwrap_or_else(|| "input listener stopped".to_string())
    }
}

/// [`InputSource`] fed by a single `rdev` hook thread.
pub struct RdevInputSource {
    hub: Arc<InputHub>,
    state: Arc<ListenerState>,
}

impl RdevInputSource {
    /// Install the global hook on a dedicated thread.
    ///
    /// # Errors
    ///
    /// `ListenerUnavailable` when the hook cannot be installed, typically
    /// because the OS denies input monitoring to this process.
    #[track_caller]
    #[instrument]
    pub fn start() -> AppResult<Self> {
        let hub = Arc::new(InputHub::new());
        let state = Arc::new(ListenerState::default());
        state.alive.store(true, Ordering::SeqCst);

        let (failed_tx, failed_rx) = mpsc::channel::<String>();
        let thread_hub = Arc::clone(&hub);
        let thread_state = Arc::clone(&state);

        std::thread::Builder::new()
            .name("rdev-listener".to_string())
            .spawn(move || {
                let callback_hub = Arc::clone(&thread_hub);
                let mut translator = EventTranslator::default();
                let result = rdev::listen(move |event| {
                    if let Some(kind) = translator.translate(&event.event_type) {
                        trace!(?kind, "Input event");
                        callback_hub.publish(InputEvent::now(kind));
                    }
                });

                let reason = match result {
                    Ok(()) => "input listener returned".to_string(),
                    Err(e) => format!("{:?}", e),
                };
                error!(reason = %reason, "Input listener stopped");
                thread_state.fail(reason.clone());
                thread_hub.close();
                // Nobody listens once startup has passed.
                let _ = failed_tx.send(reason);
            })?;

        match failed_rx.recv_timeout(STARTUP_GRACE) {
            Ok(reason) => Err(MacroError::ListenerUnavailable {
                reason,
                location: ErrorLocation::from(Location::caller()),
            }
            .into()),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                info!("Global input listener running");
                Ok(Self { hub, state })
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(MacroError::ListenerUnavailable {
                reason: state.failure(),
                location: ErrorLocation::from(Location::caller()),
            }
            .into()),
        }
    }
}

impl InputSource for RdevInputSource {
    #[track_caller]
    fn subscribe(&self, name: &'static str) -> CoreResult<Subscription> {
        if !self.state.alive.load(Ordering::SeqCst) {
            return Err(MacroError::ListenerUnavailable {
                reason: self.state.failure(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        debug!(subscriber = name, "Attaching to input listener");
        Ok(self.hub.attach(name))
    }
}
