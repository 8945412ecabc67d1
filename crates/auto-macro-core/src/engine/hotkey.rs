//! Hotkey toggle controller.
//!
//! A long-lived listener maps configured keys to mode-flip actions. The
//! binding table is immutable and shared behind an `Arc`; rebinding swaps
//! in a new table under a write lock while the single dispatch thread reads
//! the table once per key event, so every event is matched against exactly
//! one table: never none, never two.

use crate::{CancelToken, CoreResult, InputSource, KeySymbol, Subscription};

use std::{
    sync::{Arc, RwLock},
    thread::JoinHandle,
};

use crossbeam_channel::select;
use serde::Serialize;
use tracing::{debug, error, info, instrument, trace, warn};

/// What a hotkey does when pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HotkeyAction {
    /// Idle -> Recording, Recording -> Idle.
    ToggleRecord,
    /// Idle -> Playing, Playing -> Idle.
    TogglePlayback,
    /// Stop whatever is running.
    Cancel,
    /// Start/stop a single-action tool (auto clicker, key presser).
    Toggle,
}

/// One key mapped to one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeyBinding {
    /// Bound key, matched case-insensitively.
    pub key: KeySymbol,
    /// Action fired on press.
    pub action: HotkeyAction,
}

impl HotkeyBinding {
    /// Bind `key` to `action`.
    pub fn new(key: impl Into<KeySymbol>, action: HotkeyAction) -> Self {
        Self {
            key: key.into(),
            action,
        }
    }
}

/// Immutable set of bindings, at most one key per action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HotkeyBindings {
    bindings: Vec<HotkeyBinding>,
}

impl HotkeyBindings {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with `key` bound to `action`, replacing any earlier key for
    /// that action.
    pub fn with(mut self, key: impl Into<KeySymbol>, action: HotkeyAction) -> Self {
        self.bindings.retain(|b| b.action != action);
        self.bindings.push(HotkeyBinding::new(key, action));
        self
    }

    /// Table without any binding for `action`.
    pub fn without(mut self, action: HotkeyAction) -> Self {
        self.bindings.retain(|b| b.action != action);
        self
    }

    /// Action bound to a pressed key, if any.
    pub fn action_for(&self, pressed: &KeySymbol) -> Option<HotkeyAction> {
        self.bindings
            .iter()
            .find(|b| b.key.eq_ignore_case(pressed))
            .map(|b| b.action)
    }

    /// Key bound to `action`, if any.
    pub fn key_for(&self, action: HotkeyAction) -> Option<&KeySymbol> {
        self.bindings
            .iter()
            .find(|b| b.action == action)
            .map(|b| &b.key)
    }

    /// Every bound key.
    pub fn keys(&self) -> Vec<KeySymbol> {
        self.bindings.iter().map(|b| b.key.clone()).collect()
    }

    /// Bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &HotkeyBinding> {
        self.bindings.iter()
    }
}

/// Shared, atomically replaceable handle to a [`HotkeyBindings`] table.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    current: Arc<RwLock<Arc<HotkeyBindings>>>,
}

impl BindingTable {
    /// Handle starting with `bindings`.
    pub fn new(bindings: HotkeyBindings) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(bindings))),
        }
    }

    /// Current table.
    pub fn snapshot(&self) -> Arc<HotkeyBindings> {
        let guard = self.current.read().unwrap_or_else(|e| {
            error!("Binding table lock poisoned, recovering: {}", e);
            e.into_inner()
        });
        Arc::clone(&guard)
    }

    /// Swap in a whole new table.
    pub fn replace(&self, bindings: HotkeyBindings) {
        let mut guard = self.current.write().unwrap_or_else(|e| {
            error!("Binding table lock poisoned, recovering: {}", e);
            e.into_inner()
        });
        *guard = Arc::new(bindings);
    }

    /// Rebind one action to a new key.
    pub fn rebind(&self, action: HotkeyAction, key: impl Into<KeySymbol>) {
        let key = key.into();
        let mut guard = self.current.write().unwrap_or_else(|e| {
            error!("Binding table lock poisoned, recovering: {}", e);
            e.into_inner()
        });
        let next = guard.as_ref().clone().with(key.clone(), action);
        *guard = Arc::new(next);
        info!(action = ?action, key = %key, "Hotkey rebound");
    }

    /// Remove the binding for one action.
    pub fn unbind(&self, action: HotkeyAction) {
        let mut guard = self.current.write().unwrap_or_else(|e| {
            error!("Binding table lock poisoned, recovering: {}", e);
            e.into_inner()
        });
        let next = guard.as_ref().clone().without(action);
        *guard = Arc::new(next);
    }
}

/// Receiver of matched hotkey actions.
///
/// Called on the controller's listener thread, one action at a time in
/// key-press order.
pub trait HotkeyTarget: Send + Sync {
    /// Handle one matched hotkey press.
    fn on_hotkey(&self, action: HotkeyAction);
}

/// Long-lived listener dispatching bound key presses to a [`HotkeyTarget`].
pub struct HotkeyController {
    table: BindingTable,
    shutdown: CancelToken,
    worker: Option<JoinHandle<()>>,
}

impl HotkeyController {
    /// Subscribe to `source` and start dispatching.
    ///
    /// # Errors
    ///
    /// `ListenerUnavailable` if the subscription cannot be acquired.
    #[track_caller]
    #[instrument(skip_all)]
    pub fn spawn(
        source: &dyn InputSource,
        table: BindingTable,
        target: Arc<dyn HotkeyTarget>,
    ) -> CoreResult<Self> {
        let subscription = source.subscribe("hotkey-controller")?;
        let shutdown = CancelToken::new();

        let worker_table = table.clone();
        let worker_shutdown = shutdown.clone();
        let worker = std::thread::Builder::new()
            .name("hotkey-controller".to_string())
            .spawn(move || run_controller(subscription, worker_table, target, worker_shutdown))?;

        let bound: Vec<String> = table
            .snapshot()
            .iter()
            .map(|b| format!("{}={:?}", b.key, b.action))
            .collect();
        info!(bindings = ?bound, "Hotkey controller listening");

        Ok(Self {
            table,
            shutdown,
            worker: Some(worker),
        })
    }

    /// Rebind `action` to `key`. Takes effect from the next key event.
    pub fn set_hotkey(&self, action: HotkeyAction, key: impl Into<KeySymbol>) {
        self.table.rebind(action, key);
    }

    /// Current bindings.
    pub fn bindings(&self) -> Arc<HotkeyBindings> {
        self.table.snapshot()
    }

    /// Shared table handle.
    pub fn table(&self) -> &BindingTable {
        &self.table
    }

    /// Stop listening and unsubscribe. Idempotent.
    pub fn stop(&mut self) {
        self.shutdown.cancel();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Hotkey controller thread panicked");
            } else {
                debug!("Hotkey controller stopped");
            }
        }
    }
}

impl Drop for HotkeyController {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_controller(
    subscription: Subscription,
    table: BindingTable,
    target: Arc<dyn HotkeyTarget>,
    shutdown: CancelToken,
) {
    loop {
        select! {
            recv(subscription.events()) -> msg => match msg {
                Ok(event) => {
                    let Some(key) = event.pressed_key() else {
                        continue;
                    };
                    match table.snapshot().action_for(key) {
                        Some(action) => {
                            debug!(key = %key, action = ?action, "Hotkey pressed");
                            target.on_hotkey(action);
                        }
                        None => trace!(key = %key, "Unbound key ignored"),
                    }
                }
                Err(_) => {
                    warn!("Input source closed, hotkey controller exiting");
                    break;
                }
            },
            recv(shutdown.signal()) -> _ => break,
        }
    }
}

/// Watch for a single key and cancel `cancel` when it is pressed.
///
/// The thread exits (and unsubscribes) on the first match, when `cancel`
/// fires for any other reason, or when the source closes.
pub(crate) fn spawn_key_watch(
    subscription: Subscription,
    key: KeySymbol,
    cancel: CancelToken,
    thread_name: &str,
) -> CoreResult<JoinHandle<()>> {
    let handle = std::thread::Builder::new()
        .name(thread_name.to_string())
        .spawn(move || {
            loop {
                select! {
                    recv(subscription.events()) -> msg => match msg {
                        Ok(event) => {
                            if event.pressed_key().is_some_and(|k| k.eq_ignore_case(&key)) {
                                info!(key = %key, "Stop hotkey pressed");
                                cancel.cancel();
                                break;
                            }
                        }
                        Err(_) => break,
                    },
                    recv(cancel.signal()) -> _ => break,
                }
            }
            drop(subscription);
        })?;
    Ok(handle)
}
