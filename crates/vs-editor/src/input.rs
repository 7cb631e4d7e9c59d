//! Input abstraction layer.
//!
//! Normalizes DOM (or native) pointer and wheel events into an
//! `InputEvent` consumed by the point editor. Coordinates are in the
//! editor surface's pixel space.

use serde::{Deserialize, Serialize};

/// Which pointer button went down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Auxiliary,
    Secondary,
    Other(i16),
}

impl PointerButton {
    /// Map a DOM `MouseEvent.button` value.
    pub fn from_dom(button: i16) -> Self {
        match button {
            0 => Self::Primary,
            1 => Self::Auxiliary,
            2 => Self::Secondary,
            n => Self::Other(n),
        }
    }
}

/// A normalized input event from any pointing device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed.
    PointerDown { x: f64, y: f64, button: PointerButton },

    /// Pointer moved, pressed or not.
    PointerMove { x: f64, y: f64 },

    /// Pointer released (or left the surface).
    PointerUp { x: f64, y: f64 },

    /// Wheel step at the cursor. Negative `delta_y` scrolls up.
    Wheel { x: f64, y: f64, delta_y: f64 },
}

impl InputEvent {
    /// Create a PointerDown from a DOM button code.
    pub fn from_pointer_down(x: f64, y: f64, button: i16) -> Self {
        Self::PointerDown {
            x,
            y,
            button: PointerButton::from_dom(button),
        }
    }

    pub fn from_pointer_move(x: f64, y: f64) -> Self {
        Self::PointerMove { x, y }
    }

    pub fn from_pointer_up(x: f64, y: f64) -> Self {
        Self::PointerUp { x, y }
    }

    pub fn from_wheel(x: f64, y: f64, delta_y: f64) -> Self {
        Self::Wheel { x, y, delta_y }
    }

    /// Pointer position carried by the event.
    pub fn position(&self) -> (f64, f64) {
        match *self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y }
            | Self::PointerUp { x, y }
            | Self::Wheel { x, y, .. } => (x, y),
        }
    }
}
