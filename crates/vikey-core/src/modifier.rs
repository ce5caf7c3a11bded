// Vikey Modifier System
// Modifier keys (Shift, Control, Option, Command) and the flag set carried by events

use std::fmt;

use crate::Key;

/// A single keyboard modifier.
///
/// Left and right variants are folded together: Quartz reports device
/// independent flags and hotkeys never distinguish the sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Shift,
    Control,
    Option,
    Command,
    CapsLock,
    Function,
}

impl Modifier {
    pub const ALL: [Modifier; 6] = [
        Modifier::Control,
        Modifier::Option,
        Modifier::Shift,
        Modifier::Command,
        Modifier::CapsLock,
        Modifier::Function,
    ];

    fn bit(self) -> u8 {
        match self {
            Modifier::Shift => 1 << 0,
            Modifier::Control => 1 << 1,
            Modifier::Option => 1 << 2,
            Modifier::Command => 1 << 3,
            Modifier::CapsLock => 1 << 4,
            Modifier::Function => 1 << 5,
        }
    }

    /// Get the first alias (string representation)
    pub fn primary_alias(self) -> &'static str {
        match self {
            Modifier::Shift => "Shift",
            Modifier::Control => "Ctrl",
            Modifier::Option => "Alt",
            Modifier::Command => "Cmd",
            Modifier::CapsLock => "CapsLock",
            Modifier::Function => "Fn",
        }
    }

    /// Get modifier by alias (case-insensitive)
    pub fn from_alias(alias: &str) -> Option<Modifier> {
        match alias.to_ascii_lowercase().as_str() {
            "shift" => Some(Modifier::Shift),
            "ctrl" | "control" => Some(Modifier::Control),
            "alt" | "opt" | "option" => Some(Modifier::Option),
            "cmd" | "command" | "meta" | "super" | "win" => Some(Modifier::Command),
            "capslock" | "caps" => Some(Modifier::CapsLock),
            "fn" | "function" | "globe" => Some(Modifier::Function),
            _ => None,
        }
    }

    /// Get modifier by physical key code
    pub fn from_key(key: Key) -> Option<Modifier> {
        match key {
            Key::SHIFT | Key::RIGHT_SHIFT => Some(Modifier::Shift),
            Key::CONTROL | Key::RIGHT_CONTROL => Some(Modifier::Control),
            Key::OPTION | Key::RIGHT_OPTION => Some(Modifier::Option),
            Key::COMMAND | Key::RIGHT_COMMAND => Some(Modifier::Command),
            Key::CAPS_LOCK => Some(Modifier::CapsLock),
            Key::FUNCTION => Some(Modifier::Function),
            _ => None,
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.primary_alias())
    }
}

/// Set of modifiers held during an event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const fn empty() -> Self {
        Modifiers(0)
    }

    pub fn with(mut self, modifier: Modifier) -> Self {
        self.insert(modifier);
        self
    }

    pub fn insert(&mut self, modifier: Modifier) {
        self.0 |= modifier.bit();
    }

    pub fn remove(&mut self, modifier: Modifier) {
        self.0 &= !modifier.bit();
    }

    pub fn contains(self, modifier: Modifier) -> bool {
        self.0 & modifier.bit() != 0
    }

    /// Modifiers that participate in chords. Caps Lock is a latched state
    /// and Fn is set by the hardware on arrow and function keys, so both
    /// are left out.
    pub fn chord_part(self) -> Modifiers {
        let mut m = self;
        m.remove(Modifier::CapsLock);
        m.remove(Modifier::Function);
        m
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// True if every modifier in `other` is also held here
    pub fn is_superset_of(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when these modifiers turn a keystroke into a shortcut rather
    /// than text: any of Command, Control or Option, or two or more chord
    /// modifiers together. Shift on its own only changes case.
    pub fn is_combo(self) -> bool {
        let chord = self.chord_part();
        chord.contains(Modifier::Command)
            || chord.contains(Modifier::Control)
            || chord.contains(Modifier::Option)
            || chord.len() >= 2
    }

    /// Whether typed letters come out upper-case
    pub fn is_uppercase(self) -> bool {
        self.contains(Modifier::Shift) ^ self.contains(Modifier::CapsLock)
    }

    pub fn iter(self) -> impl Iterator<Item = Modifier> {
        Modifier::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

impl FromIterator<Modifier> for Modifiers {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        iter.into_iter().fold(Modifiers::empty(), Modifiers::with)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self.iter().map(Modifier::primary_alias).collect();
        write!(f, "{}", parts.join("-"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_from_alias() {
        assert_eq!(Modifier::from_alias("Ctrl"), Some(Modifier::Control));
        assert_eq!(Modifier::from_alias("option"), Some(Modifier::Option));
        assert_eq!(Modifier::from_alias("CMD"), Some(Modifier::Command));
        assert_eq!(Modifier::from_alias("Hyper"), None);
    }

    #[test]
    fn test_modifier_from_key() {
        assert_eq!(Modifier::from_key(Key::RIGHT_SHIFT), Some(Modifier::Shift));
        assert_eq!(Modifier::from_key(Key::COMMAND), Some(Modifier::Command));
        assert_eq!(Modifier::from_key(Key::A), None);
    }

    #[test]
    fn test_shift_alone_is_not_combo() {
        let shift = Modifiers::empty().with(Modifier::Shift);
        assert!(!shift.is_combo());
        assert!(!Modifiers::empty().is_combo());
    }

    #[test]
    fn test_command_control_option_are_combos() {
        assert!(Modifiers::empty().with(Modifier::Command).is_combo());
        assert!(Modifiers::empty().with(Modifier::Control).is_combo());
        assert!(Modifiers::empty().with(Modifier::Option).is_combo());
    }

    #[test]
    fn test_fn_and_caps_do_not_count() {
        let arrows = Modifiers::empty()
            .with(Modifier::Function)
            .with(Modifier::Shift);
        assert!(!arrows.is_combo());
        let caps = Modifiers::empty()
            .with(Modifier::CapsLock)
            .with(Modifier::Shift);
        assert!(!caps.is_combo());
    }

    #[test]
    fn test_uppercase_from_shift_xor_caps() {
        let shift = Modifiers::empty().with(Modifier::Shift);
        let caps = Modifiers::empty().with(Modifier::CapsLock);
        assert!(shift.is_uppercase());
        assert!(caps.is_uppercase());
        assert!(!shift.with(Modifier::CapsLock).is_uppercase());
    }

    #[test]
    fn test_display_order() {
        let m: Modifiers = [Modifier::Shift, Modifier::Control].into_iter().collect();
        assert_eq!(m.to_string(), "Ctrl-Shift");
    }
}
