// Vikey Transform Module
// Vietnamese transliteration: spelling rules, tone placement, code tables

pub mod buffer;
pub mod code_table;
pub mod dictionary;
pub mod engine;
pub mod macros;
pub mod spelling;
pub mod vowel;

pub use buffer::{KeyRole, Letter, SyllableBuffer, MAX_LETTERS};
pub use code_table::encode;
pub use dictionary::{DictionaryError, SpellDictionary, WordList};
pub use engine::{EngineResult, TransliterationEngine};
pub use macros::{MacroBuffer, MacroTable};
pub use spelling::{is_valid_prefix, is_valid_word, tone_position, Syllable};
pub use vowel::{Shape, Tone};
