//! Key and pointer vocabulary shared by the editor and the presentation.
//!
//! Hosts translate their native events into [`KeyPress`] and pointer calls;
//! this module maps key presses onto the editor and presentation commands.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;

/// Maximum pointer travel between the two clicks of a double-click.
const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const ALT: Modifiers = Modifiers {
        alt: true,
        ..Modifiers::NONE
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Keys the editor and presentation react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Escape,
    Enter,
    Space,
    Backspace,
    Delete,
    Tab,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    /// A printable character, lowercased.
    Character(char),
}

impl Key {
    /// Parse a DOM-style key name (`"Escape"`, `"ArrowLeft"`, `" "`, `"h"`...).
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name {
            "Escape" | "Esc" => Key::Escape,
            "Enter" | "Return" => Key::Enter,
            " " | "Space" | "Spacebar" => Key::Space,
            "Backspace" => Key::Backspace,
            "Delete" | "Del" => Key::Delete,
            "Tab" => Key::Tab,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowRight" | "Right" => Key::ArrowRight,
            "ArrowUp" | "Up" => Key::ArrowUp,
            "ArrowDown" | "Down" => Key::ArrowDown,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Character(c.to_ascii_lowercase()),
                    _ => return None,
                }
            }
        };
        Some(key)
    }

    /// The digit value for `1`-`9`.
    pub fn digit(&self) -> Option<usize> {
        match self {
            Key::Character(c @ '1'..='9') => c.to_digit(10).map(|d| d as usize),
            _ => None,
        }
    }
}

/// A key press with the modifiers held at the time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Parse a DOM-style key name without modifiers.
    pub fn named(name: &str) -> Option<Self> {
        Key::from_name(name).map(Self::new)
    }

    fn command_char(&self) -> Option<char> {
        match self.key {
            Key::Character(c) if self.modifiers.command() && !self.modifiers.shift => Some(c),
            _ => None,
        }
    }
}

/// Where keyboard focus currently is.
///
/// Destructive shortcuts are suppressed while a text field has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InputFocus {
    #[default]
    Canvas,
    TextInput,
}

/// Editor keyboard commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditorCommand {
    DeleteSelection,
    Copy,
    Paste,
    Undo,
    Duplicate,
    Deselect,
}

impl EditorCommand {
    pub fn from_key(press: &KeyPress) -> Option<Self> {
        match press.key {
            Key::Delete => return Some(EditorCommand::DeleteSelection),
            Key::Escape => return Some(EditorCommand::Deselect),
            _ => {}
        }
        match press.command_char()? {
            'c' => Some(EditorCommand::Copy),
            'v' => Some(EditorCommand::Paste),
            'z' => Some(EditorCommand::Undo),
            'd' => Some(EditorCommand::Duplicate),
            _ => None,
        }
    }

    /// Whether the command must be ignored while a text field has focus.
    pub fn blocked_by_text_focus(&self) -> bool {
        matches!(self, EditorCommand::DeleteSelection)
    }
}

/// Presentation keyboard commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentationCommand {
    Close,
    Back,
    /// Advance when exactly one next slide exists.
    Next,
    /// Pick the n-th next slide (1-based).
    Choose(usize),
    ToggleNavigation,
}

impl PresentationCommand {
    pub fn from_key(press: &KeyPress) -> Option<Self> {
        if press.modifiers.command() || press.modifiers.alt {
            return None;
        }
        match press.key {
            Key::Escape => Some(PresentationCommand::Close),
            Key::ArrowLeft | Key::Backspace => Some(PresentationCommand::Back),
            Key::ArrowRight | Key::Space | Key::Enter => Some(PresentationCommand::Next),
            Key::Character('h') => Some(PresentationCommand::ToggleNavigation),
            key => key.digit().map(PresentationCommand::Choose),
        }
    }
}

/// Pointer buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Detects double-clicks from a stream of clicks.
#[derive(Debug, Clone)]
pub struct ClickTracker {
    window: Duration,
    last: Option<(Instant, Point)>,
}

impl ClickTracker {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Register a click. Returns `true` when it completes a double-click.
    pub fn register(&mut self, position: Point, now: Instant) -> bool {
        if let Some((time, last_position)) = self.last {
            let quick = now.saturating_duration_since(time) <= self.window;
            let close = position.distance(last_position) <= DOUBLE_CLICK_DISTANCE;
            if quick && close {
                // A third click starts a new sequence.
                self.last = None;
                return true;
            }
        }
        self.last = Some((now, position));
        false
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
