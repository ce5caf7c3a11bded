// Vikey Transliteration Engine
// Turns keystrokes into Vietnamese text, one backspace+retype edit at a time
//
// The engine keeps the word being typed as a list of letters with their
// shapes and tone. Every keystroke produces the new word; the edit sent
// to the focused app is the difference between what was on screen
// before and what should be there now:
// - backspace over the changed suffix
// - type the new suffix, encoded in the active code table
//
// Keys that only append their own character are passed through so the
// app sees the original event.

use std::sync::Arc;

use super::buffer::{letters_from_literal, KeyRole, Letter, PreviousWord, SyllableBuffer, MAX_LETTERS};
use super::code_table::encode;
use super::dictionary::SpellDictionary;
use super::macros::{MacroBuffer, MacroTable};
use super::spelling::{is_valid_prefix, is_valid_word, tone_position};
use super::vowel::{Shape, Tone};
use crate::settings::{EngineSettings, InputMethod};
use crate::Key;

/// Outcome of one keystroke
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineResult {
    /// Swallow the original event and apply the edit instead
    pub should_consume: bool,
    /// Code units to erase before the cursor, as the active code table
    /// put them on screen
    pub backspace_count: usize,
    /// Replacement text, already encoded in the active code table
    pub new_characters: String,
}

impl EngineResult {
    /// Let the original event through untouched
    pub fn pass() -> Self {
        Self::default()
    }

    pub fn replace(backspace_count: usize, new_characters: impl Into<String>) -> Self {
        Self {
            should_consume: true,
            backspace_count,
            new_characters: new_characters.into(),
        }
    }
}

/// What a trigger key asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Tone(Tone),
    /// Circumflex on the given vowel, or on any of a/e/o
    Circumflex(Option<char>),
    /// ươ, ơ, ư, and ă as well when `breve` is set (Telex `w`)
    Horn { breve: bool },
    Breve,
    Stroke,
    /// Append a new shaped letter (Telex `[` and `]`)
    Insert(char, Shape),
}

impl Trigger {
    fn role(self) -> KeyRole {
        match self {
            Trigger::Tone(_) => KeyRole::Tone,
            _ => KeyRole::Shape,
        }
    }
}

/// State kept between a trigger and the key right after it, so the same
/// trigger typed twice undoes the first one
#[derive(Debug, Clone)]
struct LastTrigger {
    key: char,
    before: Vec<Letter>,
}

const QUICK_TELEX: &[(char, char)] = &[
    ('c', 'h'),
    ('g', 'i'),
    ('k', 'h'),
    ('n', 'g'),
    ('p', 'h'),
    ('q', 'u'),
    ('t', 'h'),
];

pub struct TransliterationEngine {
    settings: EngineSettings,
    buffer: SyllableBuffer,
    last_trigger: Option<LastTrigger>,
    macros: MacroTable,
    macro_buffer: MacroBuffer,
    dictionary: Option<Arc<dyn SpellDictionary>>,
}

impl TransliterationEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            buffer: SyllableBuffer::new(),
            last_trigger: None,
            macros: MacroTable::new(),
            macro_buffer: MacroBuffer::default(),
            dictionary: None,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn buffer(&self) -> &SyllableBuffer {
        &self.buffer
    }

    pub fn macros(&self) -> &MacroTable {
        &self.macros
    }

    pub fn set_settings(&mut self, settings: EngineSettings) {
        self.settings = settings;
        self.reset();
    }

    /// Replace the macro table. The buffered word is dropped.
    pub fn set_macros(&mut self, macros: MacroTable) {
        self.macros = macros;
        self.reset();
    }

    pub fn set_dictionary(&mut self, dictionary: Option<Arc<dyn SpellDictionary>>) {
        self.dictionary = dictionary;
    }

    /// Forget everything about the text around the caret
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.last_trigger = None;
        self.macro_buffer.clear();
    }

    /// Reset after the caret moved by other means than typing. Restoring
    /// is disabled until the next word break.
    pub fn reset_with_cursor_moved(&mut self) {
        self.reset();
        self.buffer.cursor_moved = true;
    }

    /// Process a character-producing key.
    ///
    /// `ch` is the character the active layout resolved for the key;
    /// `is_uppercase` reflects Shift and Caps Lock.
    pub fn process_key(&mut self, ch: char, key: Key, is_uppercase: bool) -> EngineResult {
        log::trace!("process_key {:?} ({}) upper={}", ch, key, is_uppercase);

        if self.buffer.is_empty() {
            self.buffer.literal_mode = false;
        }
        self.buffer.trailing_spaces = 0;
        self.buffer.previous = None;
        self.macro_buffer.add_key(ch);

        let upper = is_uppercase || ch.is_uppercase();
        let before = self.rendered_chars();
        let last_trigger = self.last_trigger.take();

        if self.buffer.literal_mode || self.buffer.len() >= MAX_LETTERS {
            self.buffer.literal_mode = true;
            return self.append_literal(ch, upper, &before);
        }

        let c = ch.to_lowercase().next().unwrap_or(ch);
        if let Some(trigger) = self.trigger_for(c) {
            if let Some(last) = last_trigger.filter(|last| last.key == c) {
                return self.undo_trigger(last, ch, upper, &before);
            }
            if let Some(letters) = self.apply_trigger(trigger, ch, upper) {
                self.last_trigger = Some(LastTrigger {
                    key: c,
                    before: std::mem::replace(&mut self.buffer.letters, letters),
                });
                self.normalize_tone();
                self.check_instant_restore();
                return self.diff(&before, None);
            }
        }

        if !c.is_ascii_lowercase() {
            self.buffer.literal_mode = true;
            return self.append_literal(ch, upper, &before);
        }

        if self.settings.quick_telex && self.settings.input_method.is_telex() {
            if let Some(result) = self.quick_telex(c, ch, upper, &before) {
                return result;
            }
        }

        self.buffer.letters.push(Letter::typed(ch, upper));
        self.normalize_tone();
        self.check_instant_restore();
        self.diff(&before, Some(ch))
    }

    /// Process Backspace. The OS deletes one code unit when the result
    /// passes; for letters that occupy two the engine consumes the key and
    /// asks for both deletions itself.
    pub fn process_backspace(&mut self) -> EngineResult {
        self.last_trigger = None;

        let Some(mut popped) = self.buffer.letters.pop() else {
            if self.buffer.trailing_spaces > 0 {
                self.buffer.trailing_spaces -= 1;
                if self.buffer.trailing_spaces == 0 && !self.buffer.cursor_moved {
                    if let Some(previous) = self.buffer.previous.take() {
                        log::trace!("recalling previous word");
                        self.buffer.letters = previous.letters;
                        self.buffer.literal_mode = previous.literal_mode;
                    }
                }
            } else {
                self.buffer.previous = None;
            }
            self.macro_buffer.update_on_backspace(&self.buffer.literal());
            return EngineResult::pass();
        };

        // Trigger keys typed on the popped letter may have marked an
        // earlier one; they stay in the history while that mark is shown.
        let remaining_tone = self.buffer.letters.iter().any(|l| l.tone.is_marked());
        let kept: Vec<(char, KeyRole)> = popped
            .take_trigger_keys()
            .into_iter()
            .filter(|&(raw, role)| match role {
                KeyRole::Base => false,
                KeyRole::Tone => !popped.tone.is_marked() && remaining_tone,
                KeyRole::Shape => shape_survives(raw, &self.buffer.letters),
            })
            .collect();
        if let Some(last) = self.buffer.letters.last_mut() {
            for (raw, role) in kept {
                last.record_key(raw, role);
            }
        }
        if self.buffer.letters.is_empty() {
            self.buffer.literal_mode = false;
        }
        self.macro_buffer.update_on_backspace(&self.buffer.literal());

        let width = self.screen_width(&[popped.render()]);
        if width > 1 {
            return EngineResult::replace(width, String::new());
        }
        EngineResult::pass()
    }

    /// Whitespace and punctuation end a word unless the input method uses
    /// them as triggers (VNI digits, Telex brackets)
    pub fn is_word_break(&self, ch: char) -> bool {
        (ch.is_whitespace() || ch.is_ascii_punctuation()) && self.trigger_for(ch).is_none()
    }

    /// Whether `ch` ending a word needs the engine at all
    pub fn wants_word_break(&self, ch: char) -> bool {
        if !self.buffer.is_empty() {
            return true;
        }
        if self.settings.macros_enabled {
            if !self.macro_buffer.is_empty() {
                return true;
            }
            let mut candidate = self.macro_buffer.as_str().to_string();
            candidate.push(ch);
            if self.macros.could_extend(&candidate) {
                return true;
            }
        }
        self.buffer.trailing_spaces > 0 || self.buffer.previous.is_some()
    }

    /// Finish the current word on a space, Return or punctuation.
    ///
    /// Expands a macro or restores a misspelt word to its keystrokes when
    /// either applies; otherwise the character passes through.
    pub fn process_word_break(&mut self, ch: char) -> EngineResult {
        self.last_trigger = None;
        let word_len = self.buffer.len();
        let word_width = self.screen_width(&self.rendered_chars());
        let code_table = self.settings.code_table;

        if self.settings.macros_enabled && !ch.is_whitespace() {
            let mut candidate = self.macro_buffer.as_str().to_string();
            candidate.push(ch);
            if self.macros.could_extend(&candidate) {
                let before = self.rendered_chars();
                self.macro_buffer.add_key(ch);
                self.buffer.literal_mode = true;
                return self.append_literal(ch, false, &before);
            }
        }

        let mut result = EngineResult::pass();
        let mut saved = Some(PreviousWord {
            letters: self.buffer.letters.clone(),
            literal_mode: self.buffer.literal_mode,
        });

        let expansion = if self.settings.macros_enabled && !self.macro_buffer.is_empty() {
            self.macros
                .lookup(self.macro_buffer.as_str(), self.settings.macro_auto_caps)
        } else {
            None
        };

        if let Some(expansion) = expansion {
            log::debug!("macro {:?} expanded", self.macro_buffer.as_str());
            let mut text = expansion;
            text.push(ch);
            result = EngineResult::replace(word_width, encode(code_table, &text));
            saved = None;
        } else if self.should_restore() {
            let literal = self.buffer.literal();
            log::debug!("restoring {:?} to {:?}", self.buffer.rendered(), literal);
            let mut text = literal.clone();
            text.push(ch);
            result = EngineResult::replace(word_width, encode(code_table, &text));
            saved = Some(PreviousWord {
                letters: letters_from_literal(&literal),
                literal_mode: true,
            });
        }

        if ch == ' ' {
            if word_len > 0 {
                self.buffer.previous = saved;
                self.buffer.trailing_spaces = 1;
            } else {
                self.buffer.trailing_spaces += 1;
            }
        } else {
            self.buffer.previous = None;
            self.buffer.trailing_spaces = 0;
        }
        self.buffer.clear_word();
        self.buffer.cursor_moved = false;
        self.macro_buffer.clear();
        result
    }

    /// Replace the transformed word with the keys that produced it. Works
    /// once per word.
    pub fn undo_typing(&mut self) -> EngineResult {
        if self.buffer.is_empty() || self.buffer.undo_used {
            return EngineResult::pass();
        }
        let rendered = self.buffer.rendered();
        let literal = self.buffer.literal();
        if rendered == literal {
            return EngineResult::pass();
        }
        let backspace_count = self.screen_width(&self.rendered_chars());
        self.buffer.letters = letters_from_literal(&literal);
        self.buffer.literal_mode = true;
        self.buffer.undo_used = true;
        self.last_trigger = None;
        EngineResult::replace(backspace_count, encode(self.settings.code_table, &literal))
    }

    fn rendered_chars(&self) -> Vec<char> {
        self.buffer.letters.iter().map(Letter::render).collect()
    }

    /// Code units `chars` occupy once encoded
    fn screen_width(&self, chars: &[char]) -> usize {
        let code_table = self.settings.code_table;
        if !code_table.requires_double_backspace() {
            return chars.len();
        }
        let text: String = chars.iter().collect();
        encode(code_table, &text).chars().count()
    }

    fn append_literal(&mut self, ch: char, upper: bool, before: &[char]) -> EngineResult {
        self.buffer.letters.push(Letter::typed(ch, upper));
        self.diff(before, Some(ch))
    }

    /// Edit that turns `before` into the current letters. `typed` is the
    /// character of the key being processed; when the only change is
    /// that character appended, the key passes through.
    fn diff(&self, before: &[char], typed: Option<char>) -> EngineResult {
        let after = self.rendered_chars();
        let common = before
            .iter()
            .zip(after.iter())
            .take_while(|(a, b)| a == b)
            .count();
        if common == before.len() {
            if after.len() == before.len() {
                return EngineResult::pass();
            }
            if after.len() == before.len() + 1 && Some(after[common]) == typed {
                return EngineResult::pass();
            }
        }
        let replaced: String = after[common..].iter().collect();
        EngineResult::replace(
            self.screen_width(&before[common..]),
            encode(self.settings.code_table, &replaced),
        )
    }

    fn trigger_for(&self, c: char) -> Option<Trigger> {
        let method = self.settings.input_method;
        if method == InputMethod::Vni {
            return match c {
                '0' => Some(Trigger::Tone(Tone::Level)),
                '1' => Some(Trigger::Tone(Tone::Acute)),
                '2' => Some(Trigger::Tone(Tone::Grave)),
                '3' => Some(Trigger::Tone(Tone::Hook)),
                '4' => Some(Trigger::Tone(Tone::Tilde)),
                '5' => Some(Trigger::Tone(Tone::Dot)),
                '6' => Some(Trigger::Circumflex(None)),
                '7' => Some(Trigger::Horn { breve: false }),
                '8' => Some(Trigger::Breve),
                '9' => Some(Trigger::Stroke),
                _ => None,
            };
        }
        match c {
            's' => Some(Trigger::Tone(Tone::Acute)),
            'f' => Some(Trigger::Tone(Tone::Grave)),
            'r' => Some(Trigger::Tone(Tone::Hook)),
            'x' => Some(Trigger::Tone(Tone::Tilde)),
            'j' => Some(Trigger::Tone(Tone::Dot)),
            'z' => Some(Trigger::Tone(Tone::Level)),
            'a' | 'e' | 'o' => Some(Trigger::Circumflex(Some(c))),
            'w' => Some(Trigger::Horn { breve: true }),
            'd' => Some(Trigger::Stroke),
            '[' | '{' if method.bracket_shortcuts() => Some(Trigger::Insert('o', Shape::Horn)),
            ']' | '}' if method.bracket_shortcuts() => Some(Trigger::Insert('u', Shape::Horn)),
            _ => None,
        }
    }

    /// New letters for the first applicable reading of `trigger`, with
    /// the key recorded on them
    fn apply_trigger(&self, trigger: Trigger, ch: char, upper: bool) -> Option<Vec<Letter>> {
        let mut candidates = self.candidates(trigger, upper, ch);
        if candidates.is_empty()
            && trigger == (Trigger::Horn { breve: true })
            && self.settings.input_method.standalone_w()
        {
            let mut letters = self.buffer.letters.clone();
            letters.push(Letter::shaped('u', Shape::Horn, ch, upper));
            candidates.push(letters);
        }

        let free_mark = self.settings.free_mark;
        let mut chosen = candidates
            .into_iter()
            .find(|letters| free_mark || is_valid_prefix(letters))?;

        if !matches!(trigger, Trigger::Insert(..)) {
            let inserted = chosen.len() > self.buffer.len();
            if !inserted {
                if let Some(last) = chosen.last_mut() {
                    last.record_key(ch, trigger.role());
                }
            }
        }
        Some(chosen)
    }

    fn candidates(&self, trigger: Trigger, upper: bool, ch: char) -> Vec<Vec<Letter>> {
        let letters = &self.buffer.letters;
        let mut out = Vec::new();
        match trigger {
            Trigger::Tone(Tone::Level) => {
                if letters.iter().any(|l| l.tone.is_marked()) {
                    let mut cleared = letters.clone();
                    cleared.iter_mut().for_each(|l| l.tone = Tone::Level);
                    out.push(cleared);
                }
            }
            Trigger::Tone(tone) => {
                let Some(pos) = tone_position(letters, self.settings.modern_orthography) else {
                    return out;
                };
                let already = letters[pos].tone == tone
                    && letters
                        .iter()
                        .enumerate()
                        .all(|(i, l)| i == pos || !l.tone.is_marked());
                if !already {
                    let mut toned = letters.clone();
                    toned.iter_mut().for_each(|l| l.tone = Tone::Level);
                    toned[pos].tone = tone;
                    out.push(toned);
                }
            }
            Trigger::Circumflex(target) => {
                let is_target = |l: &Letter| match target {
                    Some(base) => l.base == base,
                    None => matches!(l.base, 'a' | 'e' | 'o'),
                };
                if let Some(i) = letters.iter().rposition(|l| l.is_vowel() && is_target(l)) {
                    if letters[i].shape != Shape::Circumflex {
                        let mut shaped = letters.clone();
                        shaped[i].shape = Shape::Circumflex;
                        out.push(shaped);
                    }
                }
            }
            Trigger::Horn { breve } => {
                if let Some(i) = letters
                    .windows(2)
                    .rposition(|w| w[0].base == 'u' && w[1].base == 'o')
                {
                    if letters[i].shape != Shape::Horn || letters[i + 1].shape != Shape::Horn {
                        let mut horned = letters.clone();
                        horned[i].shape = Shape::Horn;
                        horned[i + 1].shape = Shape::Horn;
                        out.push(horned);
                    }
                }
                for i in (0..letters.len()).rev() {
                    let shape = match letters[i].base {
                        'o' | 'u' => Shape::Horn,
                        'a' if breve => Shape::Breve,
                        _ => continue,
                    };
                    if letters[i].shape != shape {
                        let mut shaped = letters.clone();
                        shaped[i].shape = shape;
                        out.push(shaped);
                    }
                }
            }
            Trigger::Breve => {
                if let Some(i) = letters.iter().rposition(|l| l.base == 'a') {
                    if letters[i].shape != Shape::Breve {
                        let mut shaped = letters.clone();
                        shaped[i].shape = Shape::Breve;
                        out.push(shaped);
                    }
                }
            }
            Trigger::Stroke => {
                if letters.first().is_some_and(|l| l.base == 'd' && l.shape == Shape::None) {
                    let mut stroked = letters.clone();
                    stroked[0].shape = Shape::Stroke;
                    out.push(stroked);
                }
            }
            Trigger::Insert(base, shape) => {
                let mut inserted = letters.clone();
                inserted.push(Letter::shaped(base, shape, ch, upper));
                out.push(inserted);
            }
        }
        out
    }

    /// The same trigger typed twice: put back the letters from before the
    /// first one and append the key itself. The word is then left alone.
    fn undo_trigger(&mut self, last: LastTrigger, ch: char, upper: bool, before: &[char]) -> EngineResult {
        log::trace!("trigger {:?} undone", last.key);
        self.buffer.letters = last.before;
        self.buffer.letters.push(Letter::typed(ch, upper));
        self.buffer.literal_mode = true;
        self.diff(before, Some(ch))
    }

    fn quick_telex(&mut self, c: char, ch: char, upper: bool, before: &[char]) -> Option<EngineResult> {
        let (_, second) = QUICK_TELEX.iter().find(|(first, _)| *first == c)?;
        let [only] = self.buffer.letters.as_slice() else {
            return None;
        };
        if only.base != c || only.is_marked() {
            return None;
        }
        let second_upper = upper && only.upper;
        self.buffer
            .letters
            .push(Letter::shaped(*second, Shape::None, ch, second_upper));
        Some(self.diff(before, Some(ch)))
    }

    /// Keep the tone on the vowel the orthography wants it on
    fn normalize_tone(&mut self) {
        let letters = &mut self.buffer.letters;
        let Some(tone) = letters.iter().map(|l| l.tone).find(|t| t.is_marked()) else {
            return;
        };
        let Some(pos) = tone_position(letters, self.settings.modern_orthography) else {
            return;
        };
        letters.iter_mut().for_each(|l| l.tone = Tone::Level);
        letters[pos].tone = tone;
    }

    fn check_instant_restore(&mut self) {
        let s = &self.settings;
        if !(s.instant_restore && s.spell_check && s.restore_if_wrong_spelling) {
            return;
        }
        if self.buffer.cursor_moved || !self.buffer.has_marks() {
            return;
        }
        if is_valid_prefix(&self.buffer.letters) {
            return;
        }
        let literal = self.buffer.literal();
        log::debug!("instant restore to {:?}", literal);
        self.buffer.letters = letters_from_literal(&literal);
        self.buffer.literal_mode = true;
        self.last_trigger = None;
    }

    fn should_restore(&self) -> bool {
        let s = &self.settings;
        if !(s.spell_check && s.restore_if_wrong_spelling) {
            return false;
        }
        if self.buffer.cursor_moved || !self.buffer.has_marks() {
            return false;
        }
        if !is_valid_word(&self.buffer.letters) {
            return true;
        }
        match &self.dictionary {
            Some(dictionary) => !dictionary.is_valid_word(&self.buffer.rendered().to_lowercase()),
            None => false,
        }
    }
}

/// Whether a shape key still has a visible effect on `letters`
fn shape_survives(raw: char, letters: &[Letter]) -> bool {
    let key = raw.to_ascii_lowercase();
    letters.iter().any(|l| match key {
        'a' | 'e' | 'o' => l.base == key && l.shape == Shape::Circumflex,
        '6' => l.shape == Shape::Circumflex,
        'w' => matches!(l.shape, Shape::Horn | Shape::Breve),
        '7' => l.shape == Shape::Horn,
        '8' => l.shape == Shape::Breve,
        'd' | '9' => l.shape == Shape::Stroke,
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::CodeTable;
    use crate::transform::dictionary::WordList;

    /// Replays edits on a string standing in for the text field
    struct Screen {
        engine: TransliterationEngine,
        text: Vec<char>,
    }

    impl Screen {
        fn new(settings: EngineSettings) -> Self {
            Self {
                engine: TransliterationEngine::new(settings),
                text: Vec::new(),
            }
        }

        fn apply(&mut self, typed: Option<char>, result: EngineResult) {
            if result.should_consume {
                assert!(
                    result.backspace_count <= self.text.len(),
                    "erasing {} units from {:?}",
                    result.backspace_count,
                    self.text()
                );
                let kept = self.text.len() - result.backspace_count;
                self.text.truncate(kept);
                self.text.extend(result.new_characters.chars());
            } else if let Some(c) = typed {
                self.text.push(c);
            }
        }

        fn type_str(&mut self, keys: &str) -> &mut Self {
            for c in keys.chars() {
                let result = if self.engine.is_word_break(c) {
                    if self.engine.wants_word_break(c) {
                        self.engine.process_word_break(c)
                    } else {
                        EngineResult::pass()
                    }
                } else {
                    self.engine.process_key(c, Key::A, c.is_uppercase())
                };
                self.apply(Some(c), result);
            }
            self
        }

        fn backspace(&mut self) -> &mut Self {
            let result = self.engine.process_backspace();
            if result.should_consume {
                self.apply(None, result);
            } else {
                assert!(self.text.pop().is_some(), "backspace on an empty screen");
            }
            self
        }

        fn text(&self) -> String {
            self.text.iter().collect()
        }
    }

    fn telex() -> Screen {
        Screen::new(EngineSettings::default())
    }

    #[test]
    fn test_viet_golden() {
        let mut s = telex();
        s.type_str("vieetj");
        assert_eq!(s.text(), "việt");
        assert_eq!(s.engine.buffer().literal(), "vieetj");
    }

    #[test]
    fn test_circumflex_edit_shape() {
        let mut e = TransliterationEngine::new(EngineSettings::default());
        for c in "vie".chars() {
            assert!(!e.process_key(c, Key::A, false).should_consume);
        }
        let result = e.process_key('e', Key::A, false);
        assert_eq!(result, EngineResult::replace(1, "ê"));
    }

    #[test]
    fn test_plain_letter_passes_through() {
        let mut e = TransliterationEngine::new(EngineSettings::default());
        assert_eq!(e.process_key('b', Key::A, false), EngineResult::pass());
        assert_eq!(e.buffer().rendered(), "b");
    }

    #[test]
    fn test_double_tone_undoes() {
        let mut s = telex();
        s.type_str("as");
        assert_eq!(s.text(), "á");
        s.type_str("s");
        assert_eq!(s.text(), "as");
        // the word is left alone afterwards
        s.type_str("s");
        assert_eq!(s.text(), "ass");
    }

    #[test]
    fn test_double_shape_undoes() {
        let mut s = telex();
        s.type_str("aaa");
        assert_eq!(s.text(), "aa");
        let mut s = telex();
        s.type_str("ww");
        assert_eq!(s.text(), "w");
    }

    #[test]
    fn test_tone_moves_with_orthography() {
        let mut s = Screen::new(EngineSettings {
            modern_orthography: false,
            ..EngineSettings::default()
        });
        s.type_str("hoaf");
        assert_eq!(s.text(), "hòa");
        s.type_str("n");
        assert_eq!(s.text(), "hoàn");

        let mut s = telex();
        s.type_str("hoaf");
        assert_eq!(s.text(), "hoà");
    }

    #[test]
    fn test_w_variants() {
        assert_eq!(telex().type_str("nguowif").text(), "người");
        assert_eq!(telex().type_str("muaw").text(), "mưa");
        assert_eq!(telex().type_str("aw").text(), "ă");
        assert_eq!(telex().type_str("tw").text(), "tư");
        let mut s = Screen::new(EngineSettings::default().with_method(InputMethod::SimpleTelex2));
        s.type_str("tw");
        assert_eq!(s.text(), "tw");
    }

    #[test]
    fn test_brackets_only_in_full_telex() {
        assert_eq!(telex().type_str("t[").text(), "tơ");
        let mut s = Screen::new(EngineSettings::default().with_method(InputMethod::SimpleTelex1));
        s.type_str("t[");
        assert_eq!(s.text(), "t[");
    }

    #[test]
    fn test_stroke_and_clear_tone() {
        assert_eq!(telex().type_str("ddi").text(), "đi");
        assert_eq!(telex().type_str("dids").text(), "đí");
        assert_eq!(telex().type_str("asz").text(), "a");
    }

    #[test]
    fn test_vni() {
        let settings = EngineSettings::default().with_method(InputMethod::Vni);
        assert_eq!(Screen::new(settings).type_str("vie65t").text(), "việt");
        assert_eq!(Screen::new(settings).type_str("d9a").text(), "đa");
        assert_eq!(Screen::new(settings).type_str("nguo72i").text(), "người");
        assert_eq!(Screen::new(settings).type_str("2024").text(), "2024");
    }

    #[test]
    fn test_invalid_trigger_is_plain_letter() {
        let mut s = telex();
        s.type_str("str");
        assert_eq!(s.text(), "str");
        let mut s = telex();
        s.type_str("bs");
        assert_eq!(s.text(), "bs");
    }

    #[test]
    fn test_free_mark_applies_anywhere() {
        let mut s = Screen::new(EngineSettings {
            free_mark: true,
            ..EngineSettings::default()
        });
        s.type_str("eaa");
        assert_eq!(s.text(), "eâ");
        assert_eq!(telex().type_str("eaa").text(), "eaa");
        let mut strict = telex();
        strict.type_str("oaw");
        assert_eq!(strict.text(), "oă");
        let mut strict = telex();
        strict.type_str("eaw");
        assert_eq!(strict.text(), "eaw");
    }

    #[test]
    fn test_quick_telex() {
        let settings = EngineSettings {
            quick_telex: true,
            ..EngineSettings::default()
        };
        assert_eq!(Screen::new(settings).type_str("nn").text(), "ng");
        assert_eq!(Screen::new(settings).type_str("CC").text(), "CH");
        // only on a lone letter
        assert_eq!(Screen::new(settings).type_str("ann").text(), "ann");
        assert_eq!(telex().type_str("nn").text(), "nn");
    }

    #[test]
    fn test_restore_with_dictionary() {
        let mut s = telex();
        let empty: Arc<dyn SpellDictionary> = Arc::new(WordList::default());
        s.engine.set_dictionary(Some(empty));
        s.type_str("tieengs");
        assert_eq!(s.text(), "tiếng");
        s.type_str(" ");
        assert_eq!(s.text(), "tieengs ");

        let mut s = telex();
        let words: Arc<dyn SpellDictionary> = Arc::new(WordList::from_iter(["tiếng"]));
        s.engine.set_dictionary(Some(words));
        s.type_str("tieengs ");
        assert_eq!(s.text(), "tiếng ");
    }

    #[test]
    fn test_restore_invalid_english_word() {
        assert_eq!(telex().type_str("case ").text(), "case ");
        assert_eq!(telex().type_str("vieetj ").text(), "việt ");
    }

    #[test]
    fn test_no_restore_after_cursor_move() {
        let mut s = telex();
        s.engine.reset_with_cursor_moved();
        s.type_str("case ");
        assert_eq!(s.text(), "cáe ");
    }

    #[test]
    fn test_instant_restore() {
        let mut s = Screen::new(EngineSettings {
            instant_restore: true,
            ..EngineSettings::default()
        });
        s.type_str("cas");
        assert_eq!(s.text(), "cá");
        s.type_str("e");
        assert_eq!(s.text(), "case");
        assert!(s.engine.buffer().is_literal());
    }

    #[test]
    fn test_backspace_keeps_trigger_history() {
        let mut s = telex();
        s.type_str("vieetj");
        s.backspace();
        assert_eq!(s.text(), "việ");
        assert_eq!(s.engine.buffer().literal(), "vieej");
        s.backspace();
        assert_eq!(s.text(), "vi");
        assert_eq!(s.engine.buffer().literal(), "vi");
    }

    #[test]
    fn test_backspace_recalls_previous_word() {
        let mut s = telex();
        s.type_str("an ");
        assert!(s.engine.wants_word_break(' '));
        s.backspace();
        assert_eq!(s.engine.buffer().rendered(), "an");
        s.type_str("s");
        assert_eq!(s.text(), "án");
    }

    #[test]
    fn test_double_backspace_table_consumes_marked_letters() {
        let mut e = TransliterationEngine::new(
            EngineSettings::default().with_code_table(CodeTable::VniWindows),
        );
        for c in "as".chars() {
            e.process_key(c, Key::A, false);
        }
        assert_eq!(e.process_backspace(), EngineResult::replace(2, ""));
        e.process_key('b', Key::A, false);
        assert_eq!(e.process_backspace(), EngineResult::pass());
    }

    #[test]
    fn test_wide_tables_erase_encoded_units() {
        for table in [CodeTable::VniWindows, CodeTable::UnicodeCompound] {
            let mut s = Screen::new(EngineSettings::default().with_code_table(table));
            s.type_str("viee");
            assert_eq!(s.text(), encode(table, "viê"), "{}", table);

            let mut s = Screen::new(EngineSettings::default().with_code_table(table));
            s.type_str("tieengs");
            assert_eq!(s.text(), encode(table, "tiếng"), "{}", table);

            let mut s = Screen::new(EngineSettings::default().with_code_table(table));
            s.type_str("tieengs vieetj ");
            assert_eq!(s.text(), encode(table, "tiếng việt "), "{}", table);
        }
    }

    #[test]
    fn test_wide_tables_backspace_and_undo() {
        for table in [CodeTable::VniWindows, CodeTable::UnicodeCompound] {
            let mut s = Screen::new(EngineSettings::default().with_code_table(table));
            s.type_str("vieetj");
            s.backspace();
            assert_eq!(s.text(), encode(table, "việ"), "{}", table);
            s.backspace();
            assert_eq!(s.text(), encode(table, "vi"), "{}", table);

            let mut s = Screen::new(EngineSettings::default().with_code_table(table));
            s.type_str("tieengs");
            let result = s.engine.undo_typing();
            s.apply(None, result);
            assert_eq!(s.text(), "tieengs", "{}", table);
        }
    }

    #[test]
    fn test_code_table_encoding_in_edits() {
        let mut e = TransliterationEngine::new(
            EngineSettings::default().with_code_table(CodeTable::Tcvn3),
        );
        e.process_key('d', Key::A, false);
        assert_eq!(e.process_key('d', Key::A, false), EngineResult::replace(1, "\u{AE}"));
    }

    #[test]
    fn test_macro_expansion() {
        let mut s = Screen::new(EngineSettings {
            macros_enabled: true,
            ..EngineSettings::default()
        });
        s.engine
            .set_macros([("vn", "Việt Nam"), ("a.b", "alpha beta")].into_iter().collect());
        s.type_str("vn ");
        assert_eq!(s.text(), "Việt Nam ");
        s.type_str("a.b ");
        assert_eq!(s.text(), "Việt Nam alpha beta ");
    }

    #[test]
    fn test_undo_typing_once() {
        let mut s = telex();
        s.type_str("tieengs");
        let result = s.engine.undo_typing();
        s.apply(None, result);
        assert_eq!(s.text(), "tieengs");
        assert_eq!(s.engine.undo_typing(), EngineResult::pass());
    }

    #[test]
    fn test_reset_clears_buffer() {
        let mut a = telex();
        a.type_str("vieet");
        a.engine.reset();
        assert!(!a.engine.wants_word_break(' '));
        assert!(a.engine.buffer().is_empty());
        let mut b = telex();
        assert_eq!(
            a.engine.process_key('s', Key::A, false),
            b.engine.process_key('s', Key::A, false)
        );
    }

    #[test]
    fn test_word_break_characters() {
        let telex = TransliterationEngine::new(EngineSettings::default());
        assert!(telex.is_word_break(' '));
        assert!(telex.is_word_break(','));
        assert!(telex.is_word_break('\n'));
        assert!(!telex.is_word_break('['));
        assert!(!telex.is_word_break('a'));

        let vni = TransliterationEngine::new(EngineSettings::default().with_method(InputMethod::Vni));
        assert!(vni.is_word_break('['));
        assert!(!vni.is_word_break('6'));
    }

    #[test]
    fn test_overlong_word_is_literal() {
        let mut s = telex();
        let long = "b".repeat(MAX_LETTERS);
        s.type_str(&long);
        s.type_str("as");
        assert!(s.text().ends_with("as"));
    }
}
