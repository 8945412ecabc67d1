//! Translation of `rdev` key codes into [`KeySymbol`]s.
//!
//! Printable keys map to their unshifted US-layout character so that press
//! and release events of the same physical key always produce the same
//! symbol. Keys with no counterpart are kept as raw text under
//! [`UNMAPPED_PREFIX`].

use auto_macro_core::{KeySymbol, MouseButton, NamedKey};
use rdev::{Button, Key};

/// Prefix of raw symbols for hook key codes with no known meaning. Such keys
/// are recorded so the log stays complete but are never synthesized.
pub(crate) const UNMAPPED_PREFIX: &str = "rdev:";

/// Symbol recorded for a physical key.
pub(crate) fn key_symbol(key: Key) -> KeySymbol {
    if let Some(named) = named_key(key) {
        return KeySymbol::Named(named);
    }
    match printable(key) {
        Some(c) => KeySymbol::Char(c),
        None => KeySymbol::parse(&format!("{}{:?}", UNMAPPED_PREFIX, key)),
    }
}

/// Mouse button, if the engine records it.
pub(crate) fn mouse_button(button: Button) -> Option<MouseButton> {
    match button {
        Button::Left => Some(MouseButton::Left),
        Button::Right => Some(MouseButton::Right),
        Button::Middle => Some(MouseButton::Middle),
        Button::Unknown(_) => None,
    }
}

fn named_key(key: Key) -> Option<NamedKey> {
    let named = match key {
        Key::F1 => NamedKey::F1,
        Key::F2 => NamedKey::F2,
        Key::F3 => NamedKey::F3,
        Key::F4 => NamedKey::F4,
        Key::F5 => NamedKey::F5,
        Key::F6 => NamedKey::F6,
        Key::F7 => NamedKey::F7,
        Key::F8 => NamedKey::F8,
        Key::F9 => NamedKey::F9,
        Key::F10 => NamedKey::F10,
        Key::F11 => NamedKey::F11,
        Key::F12 => NamedKey::F12,
        Key::ShiftLeft => NamedKey::ShiftLeft,
        Key::ShiftRight => NamedKey::ShiftRight,
        Key::ControlLeft => NamedKey::ControlLeft,
        Key::ControlRight => NamedKey::ControlRight,
        Key::MetaLeft => NamedKey::MetaLeft,
        Key::MetaRight => NamedKey::MetaRight,
        Key::Alt => NamedKey::Alt,
        Key::AltGr => NamedKey::AltGr,
        Key::UpArrow => NamedKey::Up,
        Key::DownArrow => NamedKey::Down,
        Key::LeftArrow => NamedKey::Left,
        Key::RightArrow => NamedKey::Right,
        Key::Home => NamedKey::Home,
        Key::End => NamedKey::End,
        Key::PageUp => NamedKey::PageUp,
        Key::PageDown => NamedKey::PageDown,
        Key::Insert => NamedKey::Insert,
        Key::Delete | Key::KpDelete => NamedKey::Delete,
        Key::Backspace => NamedKey::Backspace,
        Key::Tab => NamedKey::Tab,
        Key::Return | Key::KpReturn => NamedKey::Return,
        Key::Space => NamedKey::Space,
        Key::Escape => NamedKey::Escape,
        Key::CapsLock => NamedKey::CapsLock,
        Key::NumLock => NamedKey::NumLock,
        Key::ScrollLock => NamedKey::ScrollLock,
        Key::Pause => NamedKey::Pause,
        Key::PrintScreen => NamedKey::PrintScreen,
        _ => return None,
    };
    Some(named)
}

fn printable(key: Key) -> Option<char> {
    let c = match key {
        Key::KeyA => 'a',
        Key::KeyB => 'b',
        Key::KeyC => 'c',
        Key::KeyD => 'd',
        Key::KeyE => 'e',
        Key::KeyF => 'f',
        Key::KeyG => 'g',
        Key::KeyH => 'h',
        Key::KeyI => 'i',
        Key::KeyJ => 'j',
        Key::KeyK => 'k',
        Key::KeyL => 'l',
        Key::KeyM => 'm',
        Key::KeyN => 'n',
        Key::KeyO => 'o',
        Key::KeyP => 'p',
        Key::KeyQ => 'q',
        Key::KeyR => 'r',
        Key::KeyS => 's',
        Key::KeyT => 't',
        Key::KeyU => 'u',
        Key::KeyV => 'v',
        Key::KeyW => 'w',
        Key::KeyX => 'x',
        Key::KeyY => 'y',
        Key::KeyZ => 'z',
        Key::Num0 | Key::Kp0 => '0',
        Key::Num1 | Key::Kp1 => '1',
        Key::Num2 | Key::Kp2 => '2',
        Key::Num3 | Key::Kp3 => '3',
        Key::Num4 | Key::Kp4 => '4',
        Key::Num5 | Key::Kp5 => '5',
        Key::Num6 | Key::Kp6 => '6',
        Key::Num7 | Key::Kp7 => '7',
        Key::Num8 | Key::Kp8 => '8',
        Key::Num9 | Key::Kp9 => '9',
        Key::Comma => ',',
        Key::Dot => '.',
        Key::SemiColon => ';',
        Key::Quote => '\'',
        Key::BackQuote => '`',
        Key::Slash | Key::KpDivide => '/',
        Key::BackSlash | Key::IntlBackslash => '\\',
        Key::LeftBracket => '[',
        Key::RightBracket => ']',
        Key::Minus | Key::KpMinus => '-',
        Key::Equal => '=',
        Key::KpPlus => '+',
        Key::KpMultiply => '*',
        _ => return None,
    };
    Some(c)
}
