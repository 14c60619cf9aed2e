//! Keyboard input as seen by the grid
//!
//! Mirrors the fields of a DOM `KeyboardEvent` the state machine needs, so
//! it can be built from a browser event or by hand in tests.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Logical key, parsed from `KeyboardEvent.key`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Tab,
    Enter,
    Escape,
    F2,
    Delete,
    Backspace,
    /// IME is processing the keystroke (`"Process"`, keyCode 229)
    Process,
    Char(char),
    Other(String),
}

impl Key {
    pub fn parse(key: &str) -> Self {
        match key {
            "ArrowUp" | "Up" => Key::ArrowUp,
            "ArrowDown" | "Down" => Key::ArrowDown,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowRight" | "Right" => Key::ArrowRight,
            "Tab" => Key::Tab,
            "Enter" => Key::Enter,
            "Escape" | "Esc" => Key::Escape,
            "F2" => Key::F2,
            "Delete" | "Del" => Key::Delete,
            "Backspace" => Key::Backspace,
            "Process" => Key::Process,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => Key::Other(other.to_string()),
                }
            }
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        match self {
            Key::ArrowUp => Some(Direction::Up),
            Key::ArrowDown => Some(Direction::Down),
            Key::ArrowLeft => Some(Direction::Left),
            Key::ArrowRight => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Movement direction; numeric on the wire (0=up, 1=down, 2=left, 3=right)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Direction {
    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            0 => Some(Direction::Up),
            1 => Some(Direction::Down),
            2 => Some(Direction::Left),
            3 => Some(Direction::Right),
            _ => None,
        }
    }
}

/// A keydown event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInput {
    pub key: String,
    #[serde(default)]
    pub shift_key: bool,
    #[serde(default)]
    pub ctrl_key: bool,
    #[serde(default)]
    pub alt_key: bool,
    #[serde(default)]
    pub meta_key: bool,
    #[serde(default)]
    pub is_composing: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            shift_key: false,
            ctrl_key: false,
            alt_key: false,
            meta_key: false,
            is_composing: false,
        }
    }

    pub fn shift(mut self) -> Self {
        self.shift_key = true;
        self
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl_key = true;
        self
    }

    pub fn composing(mut self) -> Self {
        self.is_composing = true;
        self
    }

    pub fn parsed(&self) -> Key {
        Key::parse(&self.key)
    }

    /// Ctrl, Alt or Meta held (Shift alone still types characters)
    pub fn has_command_modifier(&self) -> bool {
        self.ctrl_key || self.alt_key || self.meta_key
    }

    /// The typed character, if this is a plain printable keystroke
    pub fn printable(&self) -> Option<char> {
        if self.has_command_modifier() {
            return None;
        }
        match self.parsed() {
            Key::Char(c) if !c.is_control() => Some(c),
            _ => None,
        }
    }

    /// Keystroke that opens an IME composition
    pub fn starts_composition(&self) -> bool {
        self.is_composing || self.parsed() == Key::Process
    }
}

impl From<&web_sys::KeyboardEvent> for KeyInput {
    fn from(event: &web_sys::KeyboardEvent) -> Self {
        Self {
            key: event.key(),
            shift_key: event.shift_key(),
            ctrl_key: event.ctrl_key(),
            alt_key: event.alt_key(),
            meta_key: event.meta_key(),
            is_composing: event.is_composing(),
        }
    }
}
