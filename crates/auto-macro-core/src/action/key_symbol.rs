use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix written by older saved macros in front of named keys (`Key.f9`).
const LEGACY_NAMED_PREFIX: &str = "Key.";

/// Non-printable keys the engine knows by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum NamedKey {
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    MetaLeft,
    MetaRight,
    Alt,
    AltGr,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    Backspace,
    Tab,
    Return,
    Space,
    Escape,
    CapsLock,
    NumLock,
    ScrollLock,
    Pause,
    PrintScreen,
}

impl NamedKey {
    /// Every named key, in declaration order.
    pub const ALL: [NamedKey; 40] = [
        NamedKey::F1,
        NamedKey::F2,
        NamedKey::F3,
        NamedKey::F4,
        NamedKey::F5,
        NamedKey::F6,
        NamedKey::F7,
        NamedKey::F8,
        NamedKey::F9,
        NamedKey::F10,
        NamedKey::F11,
        NamedKey::F12,
        NamedKey::ShiftLeft,
        NamedKey::ShiftRight,
        NamedKey::ControlLeft,
        NamedKey::ControlRight,
        NamedKey::MetaLeft,
        NamedKey::MetaRight,
        NamedKey::Alt,
        NamedKey::AltGr,
        NamedKey::Up,
        NamedKey::Down,
        NamedKey::Left,
        NamedKey::Right,
        NamedKey::Home,
        NamedKey::End,
        NamedKey::PageUp,
        NamedKey::PageDown,
        NamedKey::Insert,
        NamedKey::Delete,
        NamedKey::Backspace,
        NamedKey::Tab,
        NamedKey::Return,
        NamedKey::Space,
        NamedKey::Escape,
        NamedKey::CapsLock,
        NamedKey::NumLock,
        NamedKey::ScrollLock,
        NamedKey::Pause,
        NamedKey::PrintScreen,
    ];

    /// Canonical lower-case name, as written to saved macros.
    pub fn name(self) -> &'static str {
        match self {
            NamedKey::F1 => "f1",
            NamedKey::F2 => "f2",
            NamedKey::F3 => "f3",
            NamedKey::F4 => "f4",
            NamedKey::F5 => "f5",
            NamedKey::F6 => "f6",
            NamedKey::F7 => "f7",
            NamedKey::F8 => "f8",
            NamedKey::F9 => "f9",
            NamedKey::F10 => "f10",
            NamedKey::F11 => "f11",
            NamedKey::F12 => "f12",
            NamedKey::ShiftLeft => "shift",
            NamedKey::ShiftRight => "shift_r",
            NamedKey::ControlLeft => "ctrl",
            NamedKey::ControlRight => "ctrl_r",
            NamedKey::MetaLeft => "cmd",
            NamedKey::MetaRight => "cmd_r",
            NamedKey::Alt => "alt",
            NamedKey::AltGr => "alt_gr",
            NamedKey::Up => "up",
            NamedKey::Down => "down",
            NamedKey::Left => "left",
            NamedKey::Right => "right",
            NamedKey::Home => "home",
            NamedKey::End => "end",
            NamedKey::PageUp => "page_up",
            NamedKey::PageDown => "page_down",
            NamedKey::Insert => "insert",
            NamedKey::Delete => "delete",
            NamedKey::Backspace => "backspace",
            NamedKey::Tab => "tab",
            NamedKey::Return => "enter",
            NamedKey::Space => "space",
            NamedKey::Escape => "esc",
            NamedKey::CapsLock => "caps_lock",
            NamedKey::NumLock => "num_lock",
            NamedKey::ScrollLock => "scroll_lock",
            NamedKey::Pause => "pause",
            NamedKey::PrintScreen => "print_screen",
        }
    }

    /// Look a key up by name, ignoring ASCII case. Accepts the canonical
    /// name and the common aliases (`escape`, `control`, `return`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        if let Some(found) = Self::ALL.iter().find(|k| k.name() == lower) {
            return Some(*found);
        }

        let key = match lower.as_str() {
            "shift_l" | "lshift" => NamedKey::ShiftLeft,
            "rshift" => NamedKey::ShiftRight,
            "ctrl_l" | "control" | "control_l" | "lctrl" => NamedKey::ControlLeft,
            "control_r" | "rctrl" => NamedKey::ControlRight,
            "cmd_l" | "meta" | "meta_l" | "super" | "win" | "command" => NamedKey::MetaLeft,
            "meta_r" => NamedKey::MetaRight,
            "alt_l" | "option" => NamedKey::Alt,
            "alt_r" | "altgr" => NamedKey::AltGr,
            "arrow_up" | "up_arrow" => NamedKey::Up,
            "arrow_down" | "down_arrow" => NamedKey::Down,
            "arrow_left" | "left_arrow" => NamedKey::Left,
            "arrow_right" | "right_arrow" => NamedKey::Right,
            "pageup" | "pgup" => NamedKey::PageUp,
            "pagedown" | "pgdn" => NamedKey::PageDown,
            "ins" => NamedKey::Insert,
            "del" => NamedKey::Delete,
            "return" => NamedKey::Return,
            "escape" => NamedKey::Escape,
            "capslock" => NamedKey::CapsLock,
            "numlock" => NamedKey::NumLock,
            "scrolllock" => NamedKey::ScrollLock,
            "printscreen" | "print" | "prtsc" => NamedKey::PrintScreen,
            _ => return None,
        };
        Some(key)
    }
}

/// Key text that matched neither a named key nor a single character.
///
/// Only [`KeySymbol::parse`] builds one, so a raw key's text never parses
/// back into a different symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawKey(String);

impl RawKey {
    /// The key text as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for RawKey {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

/// A key as recorded, bound or synthesized.
///
/// Parsing never fails: text that is neither a known name nor a single
/// character is kept verbatim in [`KeySymbol::Raw`] so unusual keys survive
/// capture, persistence and replay.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum KeySymbol {
    /// A printable character.
    Char(char),
    /// A symbolic key from the fixed set.
    Named(NamedKey),
    /// Unrecognized key text, carried through untouched.
    Raw(RawKey),
}

impl KeySymbol {
    /// Parse a key name or literal character.
    pub fn parse(text: &str) -> Self {
        let stripped = text.strip_prefix(LEGACY_NAMED_PREFIX).unwrap_or(text);

        if let Some(named) = NamedKey::from_name(stripped) {
            return KeySymbol::Named(named);
        }

        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => KeySymbol::Char(c),
            _ => KeySymbol::Raw(RawKey(text.to_string())),
        }
    }

    /// Case-insensitive comparison used for hotkey matching.
    pub fn eq_ignore_case(&self, other: &KeySymbol) -> bool {
        match (self, other) {
            (KeySymbol::Named(a), KeySymbol::Named(b)) => a == b,
            (KeySymbol::Char(a), KeySymbol::Char(b)) => {
                a == b || a.to_lowercase().eq(b.to_lowercase())
            }
            (KeySymbol::Raw(a), KeySymbol::Raw(b)) => a.eq_ignore_ascii_case(b.as_str()),
            _ => false,
        }
    }

    /// Whether this symbol was produced by the raw fallback.
    pub fn is_raw(&self) -> bool {
        matches!(self, KeySymbol::Raw(_))
    }
}

impl fmt::Display for KeySymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySymbol::Char(c) => write!(f, "{}", c),
            KeySymbol::Named(named) => f.write_str(named.name()),
            KeySymbol::Raw(text) => f.write_str(text.as_str()),
        }
    }
}

impl From<NamedKey> for KeySymbol {
    fn from(named: NamedKey) -> Self {
        KeySymbol::Named(named)
    }
}

impl From<char> for KeySymbol {
    fn from(c: char) -> Self {
        KeySymbol::Char(c)
    }
}

impl From<String> for KeySymbol {
    fn from(text: String) -> Self {
        KeySymbol::parse(&text)
    }
}

impl From<&str> for KeySymbol {
    fn from(text: &str) -> Self {
        KeySymbol::parse(text)
    }
}

impl From<KeySymbol> for String {
    fn from(key: KeySymbol) -> Self {
        key.to_string()
    }
}
