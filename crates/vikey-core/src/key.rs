// Vikey Key Type
// macOS virtual key codes and the layout-independent QWERTY translation table

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// One row of the translation table: key code, name, unshifted and shifted
/// character on an ANSI QWERTY layout.
type KeyRow = (u16, &'static str, Option<char>, Option<char>);

// `Key`, its named constants and `KEY_TABLE`, from data/key_codes.txt
include!(concat!(env!("OUT_DIR"), "/key_codes.rs"));

impl Key {
    /// Get the raw numeric code value
    pub fn code(self) -> u16 {
        self.0
    }

    /// Get the name of this key
    pub fn name(self) -> &'static str {
        key_name(self.0)
    }

    /// Character this key produces on a QWERTY layout.
    ///
    /// `shifted` selects the Shift variant; Caps Lock is the caller's
    /// concern since it only affects letters.
    pub fn to_char(self, shifted: bool) -> Option<char> {
        row(self.0).and_then(|(_, _, plain, shift)| if shifted { *shift } else { *plain })
    }

    /// True for keys that move the caret without producing text
    pub fn is_navigation(self) -> bool {
        matches!(
            self,
            Key::LEFT | Key::RIGHT | Key::UP | Key::DOWN | Key::HOME | Key::END | Key::PAGE_UP
                | Key::PAGE_DOWN
        )
    }

    /// True for physical modifier keys (they arrive as flags-changed events)
    pub fn is_modifier(self) -> bool {
        (0x36..=0x3F).contains(&self.0)
    }
}

impl From<u16> for Key {
    fn from(code: u16) -> Self {
        Key(code)
    }
}

impl From<Key> for u16 {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        key_from_name(s).ok_or_else(|| format!("Unknown key: {}", s))
    }
}

fn row(code: u16) -> Option<&'static KeyRow> {
    static BY_CODE: OnceLock<Vec<Option<usize>>> = OnceLock::new();
    let index = BY_CODE.get_or_init(|| {
        let mut index = vec![None; 0x80];
        for (i, (code, ..)) in KEY_TABLE.iter().enumerate() {
            index[*code as usize] = Some(i);
        }
        index
    });
    index
        .get(code as usize)
        .copied()
        .flatten()
        .map(|i| &KEY_TABLE[i])
}

/// Display name for a key code
pub fn key_name(code: u16) -> &'static str {
    row(code).map(|(_, name, ..)| *name).unwrap_or("UNKNOWN")
}

/// Look up a key by name (case-insensitive).
///
/// Accepts the table names plus a few aliases commonly used in hotkey
/// strings (`ENTER`, `BACKSPACE`, `ESC`, `CMD`, `ALT`).
pub fn key_from_name(name: &str) -> Option<Key> {
    let name_upper = name.to_uppercase();
    let canonical = match name_upper.as_str() {
        "ENTER" => "RETURN",
        "BACKSPACE" => "DELETE",
        "DEL" => "FORWARD_DELETE",
        "ESC" => "ESCAPE",
        "CMD" => "COMMAND",
        "ALT" | "OPT" => "OPTION",
        "CTRL" => "CONTROL",
        "FN" => "FUNCTION",
        "PGUP" => "PAGE_UP",
        "PGDN" => "PAGE_DOWN",
        other => other,
    };
    KEY_TABLE
        .iter()
        .find(|(_, n, ..)| *n == canonical)
        .map(|(code, ..)| Key::from(*code))
}

/// Reverse lookup: the key (and whether Shift is needed) that types `c`
/// on a QWERTY layout. Keypad duplicates are never returned.
pub fn key_for_char(c: char) -> Option<(Key, bool)> {
    KEY_TABLE
        .iter()
        .filter(|(_, name, ..)| !name.starts_with("KEYPAD"))
        .find_map(|(code, _, plain, shifted)| {
            if *plain == Some(c) {
                Some((Key(*code), false))
            } else if *shifted == Some(c) {
                Some((Key(*code), true))
            } else {
                None
            }
        })
}
