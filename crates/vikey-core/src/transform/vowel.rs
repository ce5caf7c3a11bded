// Vikey Transform - Vowel Tables
// Shaped vowels and their six tones, and the composition between them

/// Diacritic that changes the letter itself (as opposed to the tone)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Shape {
    #[default]
    None,
    /// â ê ô
    Circumflex,
    /// ă
    Breve,
    /// ơ ư
    Horn,
    /// đ
    Stroke,
}

/// The six Vietnamese tones. `Level` (ngang) carries no mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tone {
    #[default]
    Level,
    /// sắc
    Acute,
    /// huyền
    Grave,
    /// hỏi
    Hook,
    /// ngã
    Tilde,
    /// nặng
    Dot,
}

impl Tone {
    pub const ALL: [Tone; 6] = [
        Tone::Level,
        Tone::Acute,
        Tone::Grave,
        Tone::Hook,
        Tone::Tilde,
        Tone::Dot,
    ];

    pub fn index(self) -> usize {
        match self {
            Tone::Level => 0,
            Tone::Acute => 1,
            Tone::Grave => 2,
            Tone::Hook => 3,
            Tone::Tilde => 4,
            Tone::Dot => 5,
        }
    }

    pub fn is_marked(self) -> bool {
        self != Tone::Level
    }

    /// Combining mark used by decomposed Unicode
    pub fn combining_mark(self) -> Option<char> {
        match self {
            Tone::Level => None,
            Tone::Acute => Some('\u{0301}'),
            Tone::Grave => Some('\u{0300}'),
            Tone::Hook => Some('\u{0309}'),
            Tone::Tilde => Some('\u{0303}'),
            Tone::Dot => Some('\u{0323}'),
        }
    }
}

/// Base letter, shape, and the six tone forms in `Tone::ALL` order
const VOWELS: [(char, Shape, [char; 6]); 12] = [
    ('a', Shape::None, ['a', 'á', 'à', 'ả', 'ã', 'ạ']),
    ('a', Shape::Breve, ['ă', 'ắ', 'ằ', 'ẳ', 'ẵ', 'ặ']),
    ('a', Shape::Circumflex, ['â', 'ấ', 'ầ', 'ẩ', 'ẫ', 'ậ']),
    ('e', Shape::None, ['e', 'é', 'è', 'ẻ', 'ẽ', 'ẹ']),
    ('e', Shape::Circumflex, ['ê', 'ế', 'ề', 'ể', 'ễ', 'ệ']),
    ('i', Shape::None, ['i', 'í', 'ì', 'ỉ', 'ĩ', 'ị']),
    ('o', Shape::None, ['o', 'ó', 'ò', 'ỏ', 'õ', 'ọ']),
    ('o', Shape::Circumflex, ['ô', 'ố', 'ồ', 'ổ', 'ỗ', 'ộ']),
    ('o', Shape::Horn, ['ơ', 'ớ', 'ờ', 'ở', 'ỡ', 'ợ']),
    ('u', Shape::None, ['u', 'ú', 'ù', 'ủ', 'ũ', 'ụ']),
    ('u', Shape::Horn, ['ư', 'ứ', 'ừ', 'ử', 'ữ', 'ự']),
    ('y', Shape::None, ['y', 'ý', 'ỳ', 'ỷ', 'ỹ', 'ỵ']),
];

pub fn is_vowel(base: char) -> bool {
    matches!(base, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

/// Whether `shape` exists for `base` (â ă ê ô ơ ư đ)
pub fn shape_allowed(base: char, shape: Shape) -> bool {
    match shape {
        Shape::None => true,
        Shape::Circumflex => matches!(base, 'a' | 'e' | 'o'),
        Shape::Breve => base == 'a',
        Shape::Horn => matches!(base, 'o' | 'u'),
        Shape::Stroke => base == 'd',
    }
}

/// Lower-case letter for a base, shape and tone.
///
/// Returns `None` for combinations that do not exist, such as a tone on
/// a consonant or a breve on `o`.
pub fn compose(base: char, shape: Shape, tone: Tone) -> Option<char> {
    if base == 'd' && shape == Shape::Stroke {
        return (tone == Tone::Level).then_some('đ');
    }
    if !is_vowel(base) {
        return (shape == Shape::None && tone == Tone::Level).then_some(base);
    }
    VOWELS
        .iter()
        .find(|(b, s, _)| *b == base && *s == shape)
        .map(|(_, _, forms)| forms[tone.index()])
}

/// Split a (possibly upper-case) Vietnamese letter into base, shape, tone
/// and case. Plain ASCII letters decompose to themselves.
pub fn decompose(c: char) -> Option<(char, Shape, Tone, bool)> {
    let upper = c.is_uppercase();
    let lower = if upper {
        c.to_lowercase().next().unwrap_or(c)
    } else {
        c
    };
    if lower == 'đ' {
        return Some(('d', Shape::Stroke, Tone::Level, upper));
    }
    for (base, shape, forms) in VOWELS.iter() {
        if let Some(i) = forms.iter().position(|f| *f == lower) {
            return Some((*base, *shape, Tone::ALL[i], upper));
        }
    }
    lower
        .is_ascii_lowercase()
        .then_some((lower, Shape::None, Tone::Level, upper))
}

/// Base letter of a shaped lower-case letter (`ư` → `u`)
pub fn base_of(c: char) -> char {
    decompose(c).map(|(base, ..)| base).unwrap_or(c)
}
