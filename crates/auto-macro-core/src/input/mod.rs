//! Boundary to the operating system's input devices.
//!
//! The engine consumes two capabilities it does not implement itself: a
//! global event subscription ([`InputSource`]) and event synthesis
//! ([`InputSink`]). Platform backends live in the application crate; tests
//! drive the engine through an [`InputHub`] and an in-memory sink.

mod hub;

pub use hub::{InputHub, Subscription};

use crate::{CoreResult, KeySymbol, MouseButton};

use std::{sync::Arc, time::Instant};

/// What happened on an input device.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEventKind {
    /// Cursor moved to an absolute position.
    MouseMove {
        /// Horizontal position in pixels.
        x: i32,
        /// Vertical position in pixels.
        y: i32,
    },
    /// Mouse button pressed or released at a position.
    MouseButton {
        /// Horizontal position in pixels.
        x: i32,
        /// Vertical position in pixels.
        y: i32,
        /// Button that changed state.
        button: MouseButton,
        /// `true` for press.
        pressed: bool,
    },
    /// Wheel scrolled at a position.
    MouseScroll {
        /// Horizontal position in pixels.
        x: i32,
        /// Vertical position in pixels.
        y: i32,
        /// Horizontal delta.
        dx: i32,
        /// Vertical delta (positive scrolls up).
        dy: i32,
    },
    /// Key went down.
    KeyPress(KeySymbol),
    /// Key went up.
    KeyRelease(KeySymbol),
}

/// An input event stamped with its arrival time.
#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    /// Monotonic arrival time.
    pub at: Instant,
    /// Event payload.
    pub kind: InputEventKind,
}

impl InputEvent {
    /// Event arriving now.
    pub fn now(kind: InputEventKind) -> Self {
        Self {
            at: Instant::now(),
            kind,
        }
    }

    /// Pressed key, if this is a key-down event.
    pub fn pressed_key(&self) -> Option<&KeySymbol> {
        match &self.kind {
            InputEventKind::KeyPress(key) => Some(key),
            _ => None,
        }
    }
}

/// Global mouse/keyboard event subscription.
pub trait InputSource: Send + Sync {
    /// Start receiving events. Fails with `ListenerUnavailable` when the
    /// platform hook cannot be installed.
    fn subscribe(&self, name: &'static str) -> CoreResult<Subscription>;
}

/// Input event synthesis.
///
/// Implementations are created on the thread that uses them (platform
/// handles are often not `Send`), see [`SinkFactory`].
pub trait InputSink {
    /// Move the cursor to an absolute position.
    fn move_to(&mut self, x: i32, y: i32) -> CoreResult<()>;

    /// Press or release a mouse button at the current position.
    fn button(&mut self, button: MouseButton, pressed: bool) -> CoreResult<()>;

    /// Scroll by a delta (positive `dy` scrolls up).
    fn scroll(&mut self, dx: i32, dy: i32) -> CoreResult<()>;

    /// Press or release a key.
    fn key(&mut self, key: &KeySymbol, pressed: bool) -> CoreResult<()>;
}

/// Builds a sink on the worker thread that will drive it.
pub type SinkFactory = Arc<dyn Fn() -> CoreResult<Box<dyn InputSink>> + Send + Sync>;
