// Vikey Transform - Syllable Buffer
// Letters of the word being typed, with the keystrokes that produced them

use smallvec::SmallVec;

use super::vowel::{compose, is_vowel, Shape, Tone};

/// Words longer than this stop being transformed
pub const MAX_LETTERS: usize = 32;

/// What a keystroke did to the letter it is recorded on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    /// Typed the letter itself
    Base,
    /// Set or cleared the tone of the word
    Tone,
    /// Added or removed a shape
    Shape,
}

/// One letter on screen.
///
/// `keys` holds the raw keystrokes attributed to this letter. A trigger
/// key is recorded on whichever letter was last when it was typed, which
/// need not be the letter it modified; joining every letter's keys gives
/// back what the user physically typed.
#[derive(Debug, Clone, PartialEq)]
pub struct Letter {
    pub base: char,
    pub upper: bool,
    pub shape: Shape,
    pub tone: Tone,
    keys: SmallVec<[(char, KeyRole); 4]>,
}

impl Letter {
    /// Letter typed directly by `raw`
    pub fn typed(raw: char, upper: bool) -> Self {
        let mut keys = SmallVec::new();
        keys.push((raw, KeyRole::Base));
        Self {
            base: raw.to_lowercase().next().unwrap_or(raw),
            upper,
            shape: Shape::None,
            tone: Tone::Level,
            keys,
        }
    }

    /// Letter inserted with a shape already applied (`w` → ư, `[` → ơ)
    pub fn shaped(base: char, shape: Shape, raw: char, upper: bool) -> Self {
        let mut letter = Self::typed(raw, upper);
        letter.base = base;
        letter.shape = shape;
        letter
    }

    pub fn is_vowel(&self) -> bool {
        is_vowel(self.base)
    }

    pub fn is_alphabetic(&self) -> bool {
        self.base.is_ascii_lowercase()
    }

    pub fn is_marked(&self) -> bool {
        self.shape != Shape::None || self.tone.is_marked()
    }

    /// Lower-case letter with its shape but without the tone
    pub fn shaped_char(&self) -> char {
        compose(self.base, self.shape, Tone::Level).unwrap_or(self.base)
    }

    /// The letter as precomposed Unicode, in its case
    pub fn render(&self) -> char {
        let lower = compose(self.base, self.shape, self.tone).unwrap_or(self.base);
        if self.upper {
            lower.to_uppercase().next().unwrap_or(lower)
        } else {
            lower
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &(char, KeyRole)> {
        self.keys.iter()
    }

    pub fn record_key(&mut self, raw: char, role: KeyRole) {
        self.keys.push((raw, role));
    }

    /// Remove and return the trigger keys, keeping the base key
    pub(crate) fn take_trigger_keys(&mut self) -> SmallVec<[(char, KeyRole); 4]> {
        if self.keys.len() <= 1 {
            return SmallVec::new();
        }
        self.keys.drain(1..).collect()
    }
}

/// The word currently being typed plus the bookkeeping around it
#[derive(Debug, Clone, Default)]
pub struct SyllableBuffer {
    pub(crate) letters: Vec<Letter>,
    /// Set once the word can no longer be Vietnamese (undone trigger,
    /// digits, overlong): further keys are appended untouched.
    pub(crate) literal_mode: bool,
    /// Set when the caret moved since the last reset; what is on screen
    /// around the caret is then unknown.
    pub(crate) cursor_moved: bool,
    /// Spaces typed after the previous word
    pub(crate) trailing_spaces: usize,
    /// The previous word, recalled when its trailing spaces are deleted
    pub(crate) previous: Option<PreviousWord>,
    /// Undo-typing already used for this word
    pub(crate) undo_used: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct PreviousWord {
    pub letters: Vec<Letter>,
    pub literal_mode: bool,
}

impl SyllableBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn letters(&self) -> &[Letter] {
        &self.letters
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_literal(&self) -> bool {
        self.literal_mode
    }

    pub fn cursor_moved(&self) -> bool {
        self.cursor_moved
    }

    pub fn trailing_spaces(&self) -> usize {
        self.trailing_spaces
    }

    /// The word as precomposed Unicode
    pub fn rendered(&self) -> String {
        self.letters.iter().map(Letter::render).collect()
    }

    /// The keystrokes that produced the word
    pub fn literal(&self) -> String {
        self.letters
            .iter()
            .flat_map(|l| l.keys().map(|(c, _)| *c))
            .collect()
    }

    pub fn has_marks(&self) -> bool {
        self.letters.iter().any(Letter::is_marked)
    }

    /// Clear the word only
    pub(crate) fn clear_word(&mut self) {
        self.letters.clear();
        self.literal_mode = false;
        self.undo_used = false;
    }

    /// Clear everything, including the previous-word memory
    pub(crate) fn clear(&mut self) {
        self.clear_word();
        self.cursor_moved = false;
        self.trailing_spaces = 0;
        self.previous = None;
    }
}

/// Rebuild letters from literal text, one unmarked letter per character
pub(crate) fn letters_from_literal(text: &str) -> Vec<Letter> {
    text.chars()
        .map(|c| Letter::typed(c, c.is_uppercase()))
        .collect()
}
