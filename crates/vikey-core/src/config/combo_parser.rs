// Vikey Config - Hotkey String Parser
// Parses hotkey strings like "Cmd-Shift-Z" or "Ctrl-Shift" into structured components

use crate::modifier::{Modifier, Modifiers};
use crate::Key;

/// Result of parsing a hotkey string
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCombo {
    /// The modifiers parsed from the string
    pub modifiers: Modifiers,
    /// The key, or `None` for a modifier-only binding
    pub key: Option<Key>,
}

/// Errors that can occur during combo parsing
#[derive(Debug, Clone, PartialEq)]
pub enum ComboParseError {
    /// Empty input string
    EmptyInput,
    /// Key name not recognized
    UnknownKey(String),
    /// Modifier alias not recognized
    UnknownModifier(String),
    /// Input ends with hyphen (e.g., "Ctrl-")
    TrailingHyphen,
    /// A bare key with no modifier would swallow normal typing
    MissingModifier,
}

impl std::fmt::Display for ComboParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComboParseError::EmptyInput => write!(f, "combo string cannot be empty"),
            ComboParseError::UnknownKey(name) => write!(f, "unknown key name: '{}'", name),
            ComboParseError::UnknownModifier(name) => write!(f, "unknown modifier: '{}'", name),
            ComboParseError::TrailingHyphen => write!(f, "combo string cannot end with hyphen"),
            ComboParseError::MissingModifier => {
                write!(f, "hotkey needs at least one modifier")
            }
        }
    }
}

impl std::error::Error for ComboParseError {}

/// Parse a hotkey string into modifiers and an optional key.
///
/// Every component except the last must be a modifier alias. The last is
/// a modifier too for modifier-only bindings, otherwise it names the key.
///
/// # Examples
/// ```
/// use vikey_core::config::parse_combo_string;
/// use vikey_core::Key;
/// let parsed = parse_combo_string("Cmd-Z").unwrap();
/// assert_eq!(parsed.modifiers.len(), 1);
/// assert_eq!(parsed.key, Some(Key::Z));
/// ```
pub fn parse_combo_string(exp: &str) -> Result<ParsedCombo, ComboParseError> {
    let trimmed = exp.trim();
    if trimmed.is_empty() {
        return Err(ComboParseError::EmptyInput);
    }

    if trimmed.ends_with('-') {
        return Err(ComboParseError::TrailingHyphen);
    }

    let parts: Vec<&str> = trimmed.split('-').map(str::trim).collect();
    let Some((last, leading)) = parts.split_last() else {
        return Err(ComboParseError::EmptyInput);
    };

    let mut modifiers = Modifiers::empty();
    for part in leading {
        let modifier = Modifier::from_alias(part)
            .ok_or_else(|| ComboParseError::UnknownModifier(part.to_string()))?;
        modifiers.insert(modifier);
    }

    let key = match Modifier::from_alias(last) {
        Some(modifier) => {
            modifiers.insert(modifier);
            None
        }
        None => Some(
            crate::key::key_from_name(last)
                .ok_or_else(|| ComboParseError::UnknownKey(last.to_string()))?,
        ),
    };

    if modifiers.chord_part().is_empty() {
        return Err(ComboParseError::MissingModifier);
    }

    Ok(ParsedCombo { modifiers, key })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chord() {
        let parsed = parse_combo_string("Cmd-Alt-Z").unwrap();
        assert_eq!(parsed.modifiers.len(), 2);
        assert!(parsed.modifiers.contains(Modifier::Command));
        assert!(parsed.modifiers.contains(Modifier::Option));
        assert_eq!(parsed.key, Some(Key::Z));
    }

    #[test]
    fn test_parse_modifier_only() {
        let parsed = parse_combo_string("Ctrl-Shift").unwrap();
        assert_eq!(parsed.key, None);
        assert!(parsed.modifiers.contains(Modifier::Control));
        assert!(parsed.modifiers.contains(Modifier::Shift));
    }

    #[test]
    fn test_parse_single_modifier_only() {
        let parsed = parse_combo_string("Option").unwrap();
        assert_eq!(parsed.key, None);
        assert_eq!(parsed.modifiers.len(), 1);
    }

    #[test]
    fn test_parse_duplicate_modifiers_collapse() {
        let parsed = parse_combo_string("Ctrl-ctrl-Space").unwrap();
        assert_eq!(parsed.modifiers.len(), 1);
        assert_eq!(parsed.key, Some(Key::SPACE));
    }

    #[test]
    fn test_parse_empty_string() {
        assert_eq!(parse_combo_string(""), Err(ComboParseError::EmptyInput));
        assert_eq!(parse_combo_string("   "), Err(ComboParseError::EmptyInput));
    }

    #[test]
    fn test_parse_trailing_hyphen() {
        assert_eq!(
            parse_combo_string("Ctrl-"),
            Err(ComboParseError::TrailingHyphen)
        );
    }

    #[test]
    fn test_parse_unknown_parts() {
        assert!(matches!(
            parse_combo_string("Ctrl-NotARealKey"),
            Err(ComboParseError::UnknownKey(_))
        ));
        assert!(matches!(
            parse_combo_string("Hyper-A"),
            Err(ComboParseError::UnknownModifier(_))
        ));
    }

    #[test]
    fn test_bare_key_rejected() {
        assert_eq!(
            parse_combo_string("Z"),
            Err(ComboParseError::MissingModifier)
        );
        assert_eq!(
            parse_combo_string("Fn-Z"),
            Err(ComboParseError::MissingModifier)
        );
    }
}
