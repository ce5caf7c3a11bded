// Vikey Transform - Spelling Model
// Vietnamese syllable structure: initial consonant, vowel nucleus, final consonant

use std::ops::Range;

use super::buffer::Letter;
use super::vowel::{base_of, Shape, Tone};

const INITIALS: &[&str] = &[
    "b", "c", "ch", "d", "đ", "g", "gh", "gi", "h", "k", "kh", "l", "m", "n", "ng", "ngh", "nh",
    "p", "ph", "q", "qu", "r", "s", "t", "th", "tr", "v", "x",
];

const FINALS: &[&str] = &["c", "ch", "m", "n", "ng", "nh", "p", "t"];

/// Vowel nucleus, whether it may end a syllable, whether it may take a
/// final consonant
const NUCLEI: &[(&str, bool, bool)] = &[
    ("a", true, true),
    ("ă", false, true),
    ("â", false, true),
    ("e", true, true),
    ("ê", true, true),
    ("i", true, true),
    ("o", true, true),
    ("ô", true, true),
    ("ơ", true, true),
    ("u", true, true),
    ("ư", true, true),
    ("y", true, false),
    ("ai", true, false),
    ("ao", true, false),
    ("au", true, false),
    ("ay", true, false),
    ("âu", true, false),
    ("ây", true, false),
    ("eo", true, false),
    ("êu", true, false),
    ("ia", true, false),
    ("iê", false, true),
    ("iu", true, false),
    ("oa", true, true),
    ("oă", false, true),
    ("oe", true, true),
    ("oi", true, false),
    ("ôi", true, false),
    ("ơi", true, false),
    ("oo", false, true),
    ("ua", true, false),
    ("uâ", false, true),
    ("uê", true, true),
    ("ui", true, false),
    ("uô", false, true),
    ("uơ", true, false),
    ("uy", true, true),
    ("ưa", true, false),
    ("ưi", true, false),
    ("ươ", false, true),
    ("ưu", true, false),
    ("yê", false, true),
    ("iêu", true, false),
    ("oai", true, false),
    ("oay", true, false),
    ("oeo", true, false),
    ("uây", true, false),
    ("uôi", true, false),
    ("uya", true, false),
    ("uyê", false, true),
    ("uyu", true, false),
    ("ươi", true, false),
    ("ươu", true, false),
    ("yêu", true, false),
];

/// Positions of the three parts of a syllable within its letters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syllable {
    pub initial: Range<usize>,
    pub nucleus: Range<usize>,
    pub coda: Range<usize>,
}

impl Syllable {
    /// Split letters into initial, nucleus and coda. Returns `None` when
    /// the letters are not a single syllable shape (non-letters, or a vowel
    /// after the coda).
    pub fn parse(letters: &[Letter]) -> Option<Self> {
        if letters.iter().any(|l| !l.is_alphabetic()) {
            return None;
        }
        let n = letters.len();
        let mut i = 0;
        while i < n && !letters[i].is_vowel() {
            i += 1;
        }
        let mut j = i;
        while j < n && letters[j].is_vowel() {
            j += 1;
        }
        if letters[j..].iter().any(Letter::is_vowel) {
            return None;
        }

        // "gi" and "qu" take the first vowel into the initial when another
        // vowel follows: già, quý, giếng.
        if i == 1 && j - i >= 2 {
            let first = letters[0].base;
            let vowel = letters[1].base;
            if (first == 'g' && vowel == 'i') || (first == 'q' && vowel == 'u') {
                i += 1;
            }
        }

        Some(Self {
            initial: 0..i,
            nucleus: i..j,
            coda: j..n,
        })
    }

    pub fn has_coda(&self) -> bool {
        !self.coda.is_empty()
    }
}

fn shaped_string(letters: &[Letter]) -> String {
    letters.iter().map(Letter::shaped_char).collect()
}

fn word_tone(letters: &[Letter]) -> Tone {
    letters
        .iter()
        .map(|l| l.tone)
        .find(|t| t.is_marked())
        .unwrap_or(Tone::Level)
}

/// Whether the typed nucleus fits `candidate`. Unshaped letters are
/// wildcards for their shaped forms in prefix mode, since the shape key
/// may still come.
fn nucleus_fits(letters: &[Letter], candidate: &str, prefix_mode: bool) -> bool {
    let chars: Vec<char> = candidate.chars().collect();
    if letters.len() > chars.len() {
        return false;
    }
    letters.iter().zip(chars.iter()).all(|(letter, &c)| {
        if letter.shaped_char() == c {
            true
        } else {
            prefix_mode && letter.shape == Shape::None && base_of(c) == letter.base
        }
    })
}

fn check(letters: &[Letter], complete: bool) -> bool {
    let Some(syllable) = Syllable::parse(letters) else {
        return false;
    };
    let initial = shaped_string(&letters[syllable.initial.clone()]);
    let nucleus = &letters[syllable.nucleus.clone()];
    let coda = shaped_string(&letters[syllable.coda.clone()]);

    if nucleus.is_empty() {
        return !complete && INITIALS.iter().any(|i| i.starts_with(initial.as_str()));
    }
    if !initial.is_empty() && !INITIALS.contains(&initial.as_str()) {
        return false;
    }

    let prefix_mode = !complete;
    let nucleus_ok = NUCLEI.iter().any(|(candidate, open, closed)| {
        let len_ok = if coda.is_empty() && prefix_mode {
            nucleus.len() <= candidate.chars().count()
        } else {
            nucleus.len() == candidate.chars().count()
        };
        let coda_ok = if coda.is_empty() {
            prefix_mode || *open
        } else {
            *closed
        };
        len_ok && coda_ok && nucleus_fits(nucleus, candidate, prefix_mode)
    });
    if !nucleus_ok {
        return false;
    }

    if complete {
        if !coda.is_empty() && !FINALS.contains(&coda.as_str()) {
            return false;
        }
        return orthography_ok(&initial, nucleus, &coda, word_tone(letters));
    }
    coda.is_empty() || FINALS.iter().any(|f| f.starts_with(coda.as_str()))
}

/// Rules that only apply to a finished word
fn orthography_ok(initial: &str, nucleus: &[Letter], coda: &str, tone: Tone) -> bool {
    let first = nucleus[0].base;
    let front = matches!(first, 'e' | 'i' | 'y');
    let initial_ok = match initial {
        "k" | "gh" | "ngh" => front,
        "c" | "ng" => !front,
        "g" => first != 'e',
        "q" => false,
        _ => true,
    };
    if !initial_ok {
        return false;
    }
    if matches!(coda, "c" | "ch" | "p" | "t") && !matches!(tone, Tone::Acute | Tone::Dot) {
        return false;
    }
    if matches!(coda, "ch" | "nh") {
        let last = nucleus[nucleus.len() - 1].shaped_char();
        if !matches!(last, 'a' | 'ê' | 'i' | 'y') {
            return false;
        }
    }
    true
}

/// Whether the letters can still grow into a Vietnamese word
pub fn is_valid_prefix(letters: &[Letter]) -> bool {
    check(letters, false)
}

/// Whether the letters form a complete Vietnamese word
pub fn is_valid_word(letters: &[Letter]) -> bool {
    check(letters, true)
}

/// Index of the letter that carries the tone, if the word has a nucleus
pub fn tone_position(letters: &[Letter], modern: bool) -> Option<usize> {
    let syllable = Syllable::parse(letters)?;
    let nucleus = syllable.nucleus.clone();
    if nucleus.is_empty() {
        return None;
    }

    if let Some(i) = nucleus
        .clone()
        .rev()
        .find(|&i| matches!(letters[i].shape, Shape::Circumflex | Shape::Breve | Shape::Horn))
    {
        return Some(i);
    }

    let start = nucleus.start;
    match nucleus.len() {
        1 => Some(start),
        2 if syllable.has_coda() => Some(start + 1),
        2 => {
            let pair: String = letters[nucleus].iter().map(|l| l.base).collect();
            let second = modern && matches!(pair.as_str(), "oa" | "oe" | "uy");
            Some(if second { start + 1 } else { start })
        }
        _ => Some(start + 1),
    }
}
