use crate::KeySymbol;

use serde::{Deserialize, Serialize};

/// Mouse buttons the engine records and replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    /// Primary button.
    #[serde(alias = "Button.left", alias = "Left")]
    Left,
    /// Secondary button.
    #[serde(alias = "Button.right", alias = "Right")]
    Right,
    /// Wheel button.
    #[serde(alias = "Button.middle", alias = "Middle")]
    Middle,
}

/// One time-stamped input action.
///
/// `t` is seconds since the recording session started. It is serialized as
/// `timestamp` next to a `type` discriminator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionRecord {
    /// Absolute cursor position.
    MouseMove {
        /// Seconds since session start.
        #[serde(rename = "timestamp")]
        t: f64,
        /// Horizontal position in pixels.
        x: i32,
        /// Vertical position in pixels.
        y: i32,
    },
    /// Button transition at a position.
    MouseClick {
        /// Seconds since session start.
        #[serde(rename = "timestamp")]
        t: f64,
        /// Horizontal position in pixels.
        x: i32,
        /// Vertical position in pixels.
        y: i32,
        /// Button that changed state.
        button: MouseButton,
        /// `true` for press, `false` for release.
        pressed: bool,
    },
    /// Scroll delta at a position.
    MouseScroll {
        /// Seconds since session start.
        #[serde(rename = "timestamp")]
        t: f64,
        /// Horizontal position in pixels.
        x: i32,
        /// Vertical position in pixels.
        y: i32,
        /// Horizontal scroll amount.
        dx: i32,
        /// Vertical scroll amount (positive scrolls up).
        dy: i32,
    },
    /// Key down.
    KeyPress {
        /// Seconds since session start.
        #[serde(rename = "timestamp")]
        t: f64,
        /// Key that went down.
        key: KeySymbol,
    },
    /// Key up.
    KeyRelease {
        /// Seconds since session start.
        #[serde(rename = "timestamp")]
        t: f64,
        /// Key that went up.
        key: KeySymbol,
    },
}

impl ActionRecord {
    /// Seconds since session start.
    pub fn t(&self) -> f64 {
        match self {
            ActionRecord::MouseMove { t, .. }
            | ActionRecord::MouseClick { t, .. }
            | ActionRecord::MouseScroll { t, .. }
            | ActionRecord::KeyPress { t, .. }
            | ActionRecord::KeyRelease { t, .. } => *t,
        }
    }

    /// Discriminator used in the persisted format.
    pub fn kind(&self) -> &'static str {
        match self {
            ActionRecord::MouseMove { .. } => "mouse_move",
            ActionRecord::MouseClick { .. } => "mouse_click",
            ActionRecord::MouseScroll { .. } => "mouse_scroll",
            ActionRecord::KeyPress { .. } => "key_press",
            ActionRecord::KeyRelease { .. } => "key_release",
        }
    }
}
