use crate::{ActionRecord, CoreResult, InputSink, KeySymbol, MouseButton};

use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
enum HeldInput {
    Button(MouseButton),
    Key(KeySymbol),
}

/// RAII owner of an [`InputSink`] that remembers which keys and buttons it
/// pressed and releases any still down when dropped.
///
/// Prevents stuck modifiers or a held mouse button when a session is
/// cancelled between a press record and its release record. Releases are
/// best-effort and happen in reverse press order.
pub struct HeldInputGuard {
    sink: Box<dyn InputSink>,
    held: Vec<HeldInput>,
}

impl HeldInputGuard {
    /// Wrap a sink with nothing held yet.
    pub fn new(sink: Box<dyn InputSink>) -> Self {
        Self {
            sink,
            held: Vec::new(),
        }
    }

    /// Synthesize one recorded action.
    pub fn dispatch(&mut self, record: &ActionRecord) -> CoreResult<()> {
        match record {
            ActionRecord::MouseMove { x, y, .. } => self.sink.move_to(*x, *y),
            ActionRecord::MouseClick {
                button, pressed, ..
            } => self.button(*button, *pressed),
            ActionRecord::MouseScroll { dx, dy, .. } => self.sink.scroll(*dx, *dy),
            ActionRecord::KeyPress { key, .. } => self.key(key, true),
            ActionRecord::KeyRelease { key, .. } => self.key(key, false),
        }
    }

    /// Press or release a mouse button, tracking it while held.
    pub fn button(&mut self, button: MouseButton, pressed: bool) -> CoreResult<()> {
        self.sink.button(button, pressed)?;
        self.track(HeldInput::Button(button), pressed);
        Ok(())
    }

    /// Press or release a key, tracking it while held.
    pub fn key(&mut self, key: &KeySymbol, pressed: bool) -> CoreResult<()> {
        self.sink.key(key, pressed)?;
        self.track(HeldInput::Key(key.clone()), pressed);
        Ok(())
    }

    /// Access the underlying sink for untracked operations.
    pub fn sink_mut(&mut self) -> &mut dyn InputSink {
        self.sink.as_mut()
    }

    /// Number of keys and buttons currently held down.
    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    /// Release everything still held. Returns how many releases were sent.
    pub fn release_all(&mut self) -> usize {
        let mut released = 0;
        while let Some(input) = self.held.pop() {
            let result = match &input {
                HeldInput::Button(button) => self.sink.button(*button, false),
                HeldInput::Key(key) => self.sink.key(key, false),
            };
            match result {
                Ok(()) => {
                    debug!(input = ?input, "Released held input");
                    released += 1;
                }
                Err(e) => warn!(input = ?input, error = ?e, "Failed to release held input"),
            }
        }
        released
    }

    fn track(&mut self, input: HeldInput, pressed: bool) {
        if pressed {
            // Key auto-repeat delivers several presses for one physical hold.
            if !self.held.contains(&input) {
                self.held.push(input);
            }
        } else {
            self.held.retain(|held| *held != input);
        }
    }
}

impl Drop for HeldInputGuard {
    fn drop(&mut self) {
        self.release_all();
    }
}
