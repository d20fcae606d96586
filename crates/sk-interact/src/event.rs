//! Input events consumed by the interactor chain
//!
//! An event carries a `handled` flag: the first interactor that acts on it
//! consumes it and later links in the chain see it as spent. The flag only
//! ever goes from unhandled to handled.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Pointer buttons the engine distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Modifier keys held during an event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        control: false,
        alt: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        control: false,
        alt: false,
    };
}

/// Keys with editing semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Escape,
    Enter,
    Delete,
}

/// What happened
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventKind {
    ButtonPress { button: PointerButton, clicks: u8 },
    ButtonRelease { button: PointerButton },
    Motion,
    Wheel { delta: f64 },
    KeyPress { key: Key },
}

/// One pointer or keyboard event in screen coordinates
#[derive(Debug, Clone)]
pub struct InputEvent {
    pub kind: EventKind,
    /// Cursor position in pixels, y-down
    pub pos: DVec2,
    pub modifiers: Modifiers,
    handled: bool,
}

impl InputEvent {
    pub fn new(kind: EventKind, pos: DVec2) -> Self {
        Self {
            kind,
            pos,
            modifiers: Modifiers::NONE,
            handled: false,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn button_press(pos: DVec2, button: PointerButton) -> Self {
        Self::new(EventKind::ButtonPress { button, clicks: 1 }, pos)
    }

    pub fn double_click(pos: DVec2, button: PointerButton) -> Self {
        Self::new(EventKind::ButtonPress { button, clicks: 2 }, pos)
    }

    pub fn button_release(pos: DVec2, button: PointerButton) -> Self {
        Self::new(EventKind::ButtonRelease { button }, pos)
    }

    pub fn motion(pos: DVec2) -> Self {
        Self::new(EventKind::Motion, pos)
    }

    pub fn wheel(pos: DVec2, delta: f64) -> Self {
        Self::new(EventKind::Wheel { delta }, pos)
    }

    pub fn key_press(pos: DVec2, key: Key) -> Self {
        Self::new(EventKind::KeyPress { key }, pos)
    }

    pub fn is_handled(&self) -> bool {
        self.handled
    }

    /// Mark the event as consumed; later interactors in the chain skip it
    pub fn consume(&mut self) {
        self.handled = true;
    }
}
