// Vikey Input Layer - Keystrokes
// Raw events as delivered by the system hook, and the sentinel on our own

use std::time::Instant;

use crate::modifier::Modifiers;
use crate::Key;

/// Marker written to the user-data field of every event we synthesize.
/// Events carrying it are our own output and are never processed.
pub const SENTINEL: i64 = 0x564B_4559;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    KeyDown,
    KeyUp,
    /// A modifier key went down or up
    FlagsChanged,
    /// A mouse button was pressed; the caret may have moved
    MouseDown,
}

/// One event from the hook.
///
/// `character` is what the active keyboard layout produces for the key,
/// if anything.
#[derive(Debug, Clone)]
pub struct Keystroke {
    pub key: Key,
    pub character: Option<char>,
    pub modifiers: Modifiers,
    pub kind: EventKind,
    pub repeat: bool,
    pub user_data: i64,
    pub timestamp: Instant,
}

impl Keystroke {
    pub fn new(kind: EventKind, key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            character: None,
            modifiers,
            kind,
            repeat: false,
            user_data: 0,
            timestamp: Instant::now(),
        }
    }

    /// Key-down with the QWERTY character for `key`
    pub fn key_down(key: Key, modifiers: Modifiers) -> Self {
        let mut keystroke = Self::new(EventKind::KeyDown, key, modifiers);
        keystroke.character = qwerty_char(key, modifiers);
        keystroke
    }

    pub fn key_up(key: Key, modifiers: Modifiers) -> Self {
        Self::new(EventKind::KeyUp, key, modifiers)
    }

    pub fn flags_changed(key: Key, modifiers: Modifiers) -> Self {
        Self::new(EventKind::FlagsChanged, key, modifiers)
    }

    pub fn mouse_down() -> Self {
        Self::new(EventKind::MouseDown, Key(u16::MAX), Modifiers::empty())
    }

    pub fn with_character(mut self, character: Option<char>) -> Self {
        self.character = character;
        self
    }

    pub fn with_repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn with_user_data(mut self, user_data: i64) -> Self {
        self.user_data = user_data;
        self
    }

    /// True for events we posted ourselves
    pub fn is_synthetic(&self) -> bool {
        self.user_data == SENTINEL
    }

    pub fn is_uppercase(&self) -> bool {
        self.modifiers.is_uppercase() || self.character.is_some_and(char::is_uppercase)
    }
}

/// Character for `key` on a QWERTY layout, honouring Shift and Caps Lock
pub fn qwerty_char(key: Key, modifiers: Modifiers) -> Option<char> {
    use crate::modifier::Modifier;

    let shifted = modifiers.contains(Modifier::Shift);
    let c = key.to_char(shifted)?;
    if modifiers.contains(Modifier::CapsLock) && c.is_ascii_alphabetic() {
        if shifted {
            return Some(c.to_ascii_lowercase());
        }
        return Some(c.to_ascii_uppercase());
    }
    Some(c)
}
