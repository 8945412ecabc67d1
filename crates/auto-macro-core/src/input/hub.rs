use crate::{CoreResult, InputEvent, InputSource};

use std::sync::{
    Arc, Mutex, Weak,
    atomic::{AtomicU64, Ordering},
};

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::{debug, error, trace};

struct Subscriber {
    id: u64,
    name: &'static str,
    tx: Sender<InputEvent>,
}

#[derive(Default)]
struct HubInner {
    next_id: AtomicU64,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl HubInner {
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Subscriber>> {
        self.subscribers.lock().unwrap_or_else(|e| {
            error!("Subscriber list lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }

    fn remove(&self, id: u64) {
        let mut subscribers = self.lock();
        if let Some(pos) = subscribers.iter().position(|s| s.id == id) {
            let removed = subscribers.remove(pos);
            debug!(subscriber = removed.name, id, "Input subscriber removed");
        }
    }
}

/// Fan-out point between one physical event stream and any number of
/// listeners.
///
/// Each subscriber gets its own unbounded channel, so bursts are queued
/// rather than dropped, and every subscriber sees events in publish order.
#[derive(Clone, Default)]
pub struct InputHub {
    inner: Arc<HubInner>,
}

impl InputHub {
    /// Hub with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new listener.
    pub fn attach(&self, name: &'static str) -> Subscription {
        let (tx, rx) = unbounded();
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);

        self.inner.lock().push(Subscriber { id, name, tx });
        debug!(subscriber = name, id, "Input subscriber added");

        Subscription {
            id,
            name,
            hub: Arc::downgrade(&self.inner),
            events: rx,
            attached: true,
        }
    }

    /// Deliver an event to every current subscriber.
    pub fn publish(&self, event: InputEvent) {
        let mut subscribers = self.inner.lock();
        subscribers.retain(|s| {
            let delivered = s.tx.send(event.clone()).is_ok();
            if !delivered {
                trace!(subscriber = s.name, "Dropping subscriber with closed receiver");
            }
            delivered
        });
    }

    /// Disconnect every subscriber, e.g. when the underlying source died.
    ///
    /// Receivers drain whatever was already queued and then report
    /// disconnection.
    pub fn close(&self) {
        let mut subscribers = self.inner.lock();
        debug!(count = subscribers.len(), "Closing all input subscribers");
        subscribers.clear();
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().len()
    }
}

impl InputSource for InputHub {
    fn subscribe(&self, name: &'static str) -> CoreResult<Subscription> {
        Ok(self.attach(name))
    }
}

/// A live registration with an [`InputHub`].
///
/// Dropping the subscription unregisters it.
pub struct Subscription {
    id: u64,
    name: &'static str,
    hub: Weak<HubInner>,
    events: Receiver<InputEvent>,
    attached: bool,
}

impl Subscription {
    /// Channel delivering events in arrival order.
    pub fn events(&self) -> &Receiver<InputEvent> {
        &self.events
    }

    /// Listener name used in logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Stop receiving new events. Events already queued stay readable.
    /// Calling this more than once is a no-op.
    pub fn unsubscribe(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;
        if let Some(hub) = self.hub.upgrade() {
            hub.remove(self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
