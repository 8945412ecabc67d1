//! Input synthesis backed by `enigo`.

use crate::keymap::UNMAPPED_PREFIX;

use std::{panic::Location, sync::Arc};

use auto_macro_core::{
    CoreResult, InputSink, KeySymbol, MacroError, MouseButton, NamedKey, SinkFactory,
};
use enigo::{Axis, Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};
use error_location::ErrorLocation;
use tracing::{debug, instrument};

/// [`InputSink`] driving the real mouse and keyboard.
pub struct EnigoSink {
    enigo: Enigo,
}

impl EnigoSink {
    /// Connect to the platform's input synthesis API.
    ///
    /// # Errors
    ///
    /// `SynthesisFailed` when no connection can be made (no display, missing
    /// accessibility permission).
    #[track_caller]
    #[instrument]
    pub fn new() -> CoreResult<Self> {
        let enigo = Enigo::new(&Settings::default()).map_err(|e| MacroError::SynthesisFailed {
            reason: format!("Failed to create Enigo: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;
        debug!("Input synthesis connected");
        Ok(Self { enigo })
    }
}

/// Factory building one [`EnigoSink`] per worker thread.
pub fn sink_factory() -> SinkFactory {
    Arc::new(|| Ok(Box::new(EnigoSink::new()?) as Box<dyn InputSink>))
}

#[track_caller]
fn synthesis_failed(what: &str, e: enigo::InputError) -> MacroError {
    MacroError::SynthesisFailed {
        reason: format!("{}: {}", what, e),
        location: ErrorLocation::from(Location::caller()),
    }
}

fn direction(pressed: bool) -> Direction {
    if pressed {
        Direction::Press
    } else {
        Direction::Release
    }
}

fn enigo_button(button: MouseButton) -> Button {
    match button {
        MouseButton::Left => Button::Left,
        MouseButton::Right => Button::Right,
        MouseButton::Middle => Button::Middle,
    }
}

/// Key `enigo` presses for a named key.
///
/// Sided modifiers replay through the generic modifier keys. Keys that `enigo`
/// only offers on some platforms are unsupported everywhere so a saved macro
/// replays the same on every machine.
pub(crate) fn enigo_named_key(key: NamedKey) -> Option<Key> {
    let mapped = match key {
        NamedKey::F1 => Key::F1,
        NamedKey::F2 => Key::F2,
        NamedKey::F3 => Key::F3,
        NamedKey::F4 => Key::F4,
        NamedKey::F5 => Key::F5,
        NamedKey::F6 => Key::F6,
        NamedKey::F7 => Key::F7,
        NamedKey::F8 => Key::F8,
        NamedKey::F9 => Key::F9,
        NamedKey::F10 => Key::F10,
        NamedKey::F11 => Key::F11,
        NamedKey::F12 => Key::F12,
        NamedKey::ShiftLeft | NamedKey::ShiftRight => Key::Shift,
        NamedKey::ControlLeft | NamedKey::ControlRight => Key::Control,
        NamedKey::MetaLeft | NamedKey::MetaRight => Key::Meta,
        NamedKey::Alt => Key::Alt,
        NamedKey::Up => Key::UpArrow,
        NamedKey::Down => Key::DownArrow,
        NamedKey::Left => Key::LeftArrow,
        NamedKey::Right => Key::RightArrow,
        NamedKey::Home => Key::Home,
        NamedKey::End => Key::End,
        NamedKey::PageUp => Key::PageUp,
        NamedKey::PageDown => Key::PageDown,
        NamedKey::Delete => Key::Delete,
        NamedKey::Backspace => Key::Backspace,
        NamedKey::Tab => Key::Tab,
        NamedKey::Return => Key::Return,
        NamedKey::Space => Key::Space,
        NamedKey::Escape => Key::Escape,
        NamedKey::CapsLock => Key::CapsLock,
        NamedKey::AltGr
        | NamedKey::Insert
        | NamedKey::NumLock
        | NamedKey::ScrollLock
        | NamedKey::Pause
        | NamedKey::PrintScreen => return None,
    };
    Some(mapped)
}

impl InputSink for EnigoSink {
    fn move_to(&mut self, x: i32, y: i32) -> CoreResult<()> {
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(|e| synthesis_failed("move mouse", e))
    }

    fn button(&mut self, button: MouseButton, pressed: bool) -> CoreResult<()> {
        self.enigo
            .button(enigo_button(button), direction(pressed))
            .map_err(|e| synthesis_failed("mouse button", e))
    }

    // enigo scrolls down for positive lengths; recorded deltas are positive up.
    fn scroll(&mut self, dx: i32, dy: i32) -> CoreResult<()> {
        if dy != 0 {
            self.enigo
                .scroll(-dy, Axis::Vertical)
                .map_err(|e| synthesis_failed("vertical scroll", e))?;
        }
        if dx != 0 {
            self.enigo
                .scroll(dx, Axis::Horizontal)
                .map_err(|e| synthesis_failed("horizontal scroll", e))?;
        }
        Ok(())
    }

    #[track_caller]
    fn key(&mut self, key: &KeySymbol, pressed: bool) -> CoreResult<()> {
        let mapped = match key {
            KeySymbol::Char(c) => Key::Unicode(*c),
            KeySymbol::Named(named) => {
                enigo_named_key(*named).ok_or_else(|| MacroError::UnrecognizedKey {
                    key: key.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                })?
            }
            KeySymbol::Raw(text) if text.starts_with(UNMAPPED_PREFIX) => {
                return Err(MacroError::UnrecognizedKey {
                    key: text.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            // Other unknown keys are typed as their text on press.
            KeySymbol::Raw(text) => {
                if pressed {
                    self.enigo
                        .text(text.as_str())
                        .map_err(|e| synthesis_failed("type text", e))?;
                }
                return Ok(());
            }
        };
        self.enigo
            .key(mapped, direction(pressed))
            .map_err(|e| synthesis_failed("key", e))
    }
}
