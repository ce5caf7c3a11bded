// Vikey Hotkey Type
// A chord (modifiers + key) or a modifier-only binding

use std::fmt;
use std::str::FromStr;

use crate::config::{parse_combo_string, ComboParseError};
use crate::modifier::Modifiers;
use crate::Key;

/// A hotkey binding.
///
/// With a key it is a discrete chord matched on key-down. Without one it
/// is a modifier-only binding (for example `Ctrl-Shift`) that fires when
/// the modifiers are released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hotkey {
    modifiers: Modifiers,
    key: Option<Key>,
}

impl Hotkey {
    pub fn chord(modifiers: Modifiers, key: Key) -> Self {
        Self {
            modifiers,
            key: Some(key),
        }
    }

    pub fn modifier_only(modifiers: Modifiers) -> Self {
        Self {
            modifiers,
            key: None,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn key(&self) -> Option<Key> {
        self.key
    }

    pub fn is_modifier_only(&self) -> bool {
        self.key.is_none()
    }

    /// Exact match against a key-down. Latched Caps Lock and the hardware
    /// Fn flag are ignored.
    pub fn matches_chord(&self, key: Key, held: Modifiers) -> bool {
        self.key == Some(key) && held.chord_part() == self.modifiers.chord_part()
    }
}

impl FromStr for Hotkey {
    type Err = ComboParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = parse_combo_string(s)?;
        Ok(Self {
            modifiers: parsed.modifiers,
            key: parsed.key,
        })
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.key {
            Some(key) if self.modifiers.is_empty() => write!(f, "{}", key),
            Some(key) => write!(f, "{}-{}", self.modifiers, key),
            None => write!(f, "{}", self.modifiers),
        }
    }
}
