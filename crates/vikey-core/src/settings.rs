// Vikey Settings Module
// Typing options consumed by the transliteration engine

use serde::Deserialize;
use strum_macros::{Display, EnumIter, EnumString};

/// Keystroke convention used to type diacritics
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum InputMethod {
    /// Letters as triggers: s f r x j tones, aa/ee/oo/aw/ow/uw/dd shapes,
    /// standalone `w` and the bracket keys as shortcuts for ư and ơ
    #[default]
    Telex,
    /// Digits as triggers: 1-5 tones, 0 clears, 6 circumflex, 7 horn,
    /// 8 breve, 9 stroke
    Vni,
    /// Telex without the bracket shortcuts
    #[serde(rename = "simple-telex-1")]
    #[strum(to_string = "simple-telex-1")]
    SimpleTelex1,
    /// Telex without the bracket shortcuts or standalone `w`
    #[serde(rename = "simple-telex-2")]
    #[strum(to_string = "simple-telex-2")]
    SimpleTelex2,
}

impl InputMethod {
    pub fn is_telex(self) -> bool {
        !matches!(self, InputMethod::Vni)
    }

    pub fn bracket_shortcuts(self) -> bool {
        matches!(self, InputMethod::Telex)
    }

    pub fn standalone_w(self) -> bool {
        matches!(self, InputMethod::Telex | InputMethod::SimpleTelex1)
    }
}

/// Character encoding the rendered text is emitted in
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum CodeTable {
    /// Precomposed Unicode
    #[default]
    Unicode,
    /// Base letter followed by a combining tone mark
    UnicodeCompound,
    /// TCVN3 (ABC), one byte per letter
    #[serde(rename = "tcvn3")]
    #[strum(to_string = "tcvn3")]
    Tcvn3,
    /// VNI-Windows, base letter followed by a mark byte
    VniWindows,
}

impl CodeTable {
    /// Tables where a marked letter can occupy two code units, so erasing
    /// it takes two deletions
    pub fn requires_double_backspace(self) -> bool {
        matches!(self, CodeTable::UnicodeCompound | CodeTable::VniWindows)
    }
}

/// Options for the transliteration engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub input_method: InputMethod,
    pub code_table: CodeTable,
    /// `oà`, `uý` (modern) instead of `òa`, `úy` (classic)
    pub modern_orthography: bool,
    /// Accept marks even where the word so far is not Vietnamese
    pub free_mark: bool,
    /// cc, gg, kk, nn, qq, pp, tt expand to ch, gi, kh, ng, qu, ph, th
    pub quick_telex: bool,
    pub spell_check: bool,
    pub restore_if_wrong_spelling: bool,
    /// Restore as soon as the word stops being Vietnamese instead of at
    /// the next word break
    pub instant_restore: bool,
    pub macros_enabled: bool,
    pub macro_auto_caps: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            input_method: InputMethod::Telex,
            code_table: CodeTable::Unicode,
            modern_orthography: true,
            free_mark: false,
            quick_telex: false,
            spell_check: true,
            restore_if_wrong_spelling: true,
            instant_restore: false,
            macros_enabled: false,
            macro_auto_caps: true,
        }
    }
}

impl EngineSettings {
    pub fn with_method(mut self, input_method: InputMethod) -> Self {
        self.input_method = input_method;
        self
    }

    pub fn with_code_table(mut self, code_table: CodeTable) -> Self {
        self.code_table = code_table;
        self
    }
}
