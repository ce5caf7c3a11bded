// Vikey Transform - Code Tables
// Encodes precomposed Vietnamese text into the legacy encodings some apps still expect

use super::vowel::{compose, decompose, Shape, Tone};
use crate::settings::CodeTable;

/// TCVN3 (ABC) single-byte codes for lower-case letters. TCVN3 has no
/// upper-case toned letters: upper-case fonts reuse the lower-case slots.
const TCVN3_LOWER: &[(char, u8)] = &[
    ('à', 0xB5), ('ả', 0xB6), ('ã', 0xB7), ('á', 0xB8), ('ạ', 0xB9),
    ('ă', 0xA8), ('ằ', 0xBB), ('ẳ', 0xBC), ('ẵ', 0xBD), ('ắ', 0xBE), ('ặ', 0xC6),
    ('â', 0xA9), ('ầ', 0xC7), ('ẩ', 0xC8), ('ẫ', 0xC9), ('ấ', 0xCA), ('ậ', 0xCB),
    ('đ', 0xAE),
    ('è', 0xCC), ('ẻ', 0xCE), ('ẽ', 0xCF), ('é', 0xD0), ('ẹ', 0xD1),
    ('ê', 0xAA), ('ề', 0xD2), ('ể', 0xD3), ('ễ', 0xD4), ('ế', 0xD5), ('ệ', 0xD6),
    ('ì', 0xD7), ('ỉ', 0xD8), ('ĩ', 0xDC), ('í', 0xDD), ('ị', 0xDE),
    ('ò', 0xDF), ('ỏ', 0xE1), ('õ', 0xE2), ('ó', 0xE3), ('ọ', 0xE4),
    ('ô', 0xAB), ('ồ', 0xE5), ('ổ', 0xE6), ('ỗ', 0xE7), ('ố', 0xE8), ('ộ', 0xE9),
    ('ơ', 0xAC), ('ờ', 0xEA), ('ở', 0xEB), ('ỡ', 0xEC), ('ớ', 0xED), ('ợ', 0xEE),
    ('ù', 0xEF), ('ủ', 0xF1), ('ũ', 0xF2), ('ú', 0xF3), ('ụ', 0xF4),
    ('ư', 0xAD), ('ừ', 0xF5), ('ử', 0xF6), ('ữ', 0xF7), ('ứ', 0xF8), ('ự', 0xF9),
    ('ỳ', 0xFA), ('ỷ', 0xFB), ('ỹ', 0xFC), ('ý', 0xFD), ('ỵ', 0xFE),
];

const TCVN3_UPPER: &[(char, u8)] = &[
    ('Ă', 0xA1), ('Â', 0xA2), ('Ê', 0xA3), ('Ô', 0xA4), ('Ơ', 0xA5), ('Ư', 0xA6), ('Đ', 0xA7),
];

/// VNI-Windows mark bytes: (lower, upper) for each tone, per shape family
const VNI_TONE: [(char, char); 6] = [
    ('\0', '\0'),
    ('\u{F9}', '\u{D9}'),
    ('\u{F8}', '\u{D8}'),
    ('\u{FB}', '\u{DB}'),
    ('\u{F5}', '\u{D5}'),
    ('\u{EF}', '\u{CF}'),
];
const VNI_CIRCUMFLEX: [(char, char); 6] = [
    ('\u{E2}', '\u{C2}'),
    ('\u{E1}', '\u{C1}'),
    ('\u{E0}', '\u{C0}'),
    ('\u{E5}', '\u{C5}'),
    ('\u{E3}', '\u{C3}'),
    ('\u{E4}', '\u{C4}'),
];
const VNI_BREVE: [(char, char); 6] = [
    ('\u{EA}', '\u{CA}'),
    ('\u{E9}', '\u{C9}'),
    ('\u{E8}', '\u{C8}'),
    ('\u{FA}', '\u{DA}'),
    ('\u{FC}', '\u{DC}'),
    ('\u{EB}', '\u{CB}'),
];
/// Toned `i` is a single byte in VNI-Windows
const VNI_I: [(char, char); 6] = [
    ('i', 'I'),
    ('\u{ED}', '\u{CD}'),
    ('\u{EC}', '\u{CC}'),
    ('\u{E6}', '\u{C6}'),
    ('\u{F3}', '\u{D3}'),
    ('\u{F2}', '\u{D2}'),
];

fn pick((lower, upper): (char, char), is_upper: bool) -> char {
    if is_upper {
        upper
    } else {
        lower
    }
}

fn encode_unicode_compound(base: char, shape: Shape, tone: Tone, upper: bool, out: &mut String) {
    let shaped = compose(base, shape, Tone::Level).unwrap_or(base);
    if upper {
        out.extend(shaped.to_uppercase());
    } else {
        out.push(shaped);
    }
    if let Some(mark) = tone.combining_mark() {
        out.push(mark);
    }
}

fn encode_tcvn3(c: char, out: &mut String) {
    let lower = c.to_lowercase().next().unwrap_or(c);
    let code = TCVN3_UPPER
        .iter()
        .find(|(u, _)| *u == c)
        .or_else(|| TCVN3_LOWER.iter().find(|(l, _)| *l == lower))
        .map(|(_, code)| *code);
    match code {
        Some(code) => out.push(char::from(code)),
        None => out.push(c),
    }
}

fn encode_vni(base: char, shape: Shape, tone: Tone, upper: bool, out: &mut String) {
    let t = tone.index();
    let letter = |c: char| if upper { c.to_ascii_uppercase() } else { c };
    match (base, shape) {
        ('d', Shape::Stroke) => out.push(pick(('\u{F1}', '\u{D1}'), upper)),
        ('i', _) => out.push(pick(VNI_I[t], upper)),
        ('y', _) if tone == Tone::Dot => out.push(pick(('\u{EE}', '\u{CE}'), upper)),
        ('o', Shape::Horn) | ('u', Shape::Horn) => {
            let horn = if base == 'o' {
                ('\u{F4}', '\u{D4}')
            } else {
                ('\u{F6}', '\u{D6}')
            };
            out.push(pick(horn, upper));
            if tone.is_marked() {
                out.push(pick(VNI_TONE[t], upper));
            }
        }
        (_, Shape::Circumflex) => {
            out.push(letter(base));
            out.push(pick(VNI_CIRCUMFLEX[t], upper));
        }
        (_, Shape::Breve) => {
            out.push(letter(base));
            out.push(pick(VNI_BREVE[t], upper));
        }
        _ => {
            out.push(letter(base));
            if tone.is_marked() {
                out.push(pick(VNI_TONE[t], upper));
            }
        }
    }
}

/// Encode precomposed Unicode text into `table`. Characters that are not
/// Vietnamese letters pass through unchanged.
pub fn encode(table: CodeTable, text: &str) -> String {
    if table == CodeTable::Unicode {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        let Some((base, shape, tone, upper)) = decompose(c) else {
            out.push(c);
            continue;
        };
        match table {
            CodeTable::Unicode => out.push(c),
            CodeTable::UnicodeCompound => encode_unicode_compound(base, shape, tone, upper, &mut out),
            CodeTable::Tcvn3 => encode_tcvn3(c, &mut out),
            CodeTable::VniWindows => encode_vni(base, shape, tone, upper, &mut out),
        }
    }
    out
}
