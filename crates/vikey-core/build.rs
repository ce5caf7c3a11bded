// Generates the key code table and the named `Key` constants from
// data/key_codes.txt

use std::env;
use std::error::Error;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const SOURCE: &str = "data/key_codes.txt";

struct Row {
    code: u16,
    name: String,
    plain: Option<char>,
    shifted: Option<char>,
}

fn parse_char(field: &str) -> Result<Option<char>, String> {
    let c = match field {
        "-" => return Ok(None),
        "\\s" => ' ',
        "\\t" => '\t',
        "\\n" => '\n',
        "\\\\" => '\\',
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => return Err(format!("expected one character, got {:?}", other)),
            }
        }
    };
    Ok(Some(c))
}

fn parse_rows(text: &str) -> Result<Vec<Row>, String> {
    let mut rows = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [code, name, plain, shifted] = fields[..] else {
            return Err(format!("{}:{}: expected 4 fields", SOURCE, number + 1));
        };
        let code = u16::from_str_radix(code.trim_start_matches("0x"), 16)
            .map_err(|e| format!("{}:{}: {}", SOURCE, number + 1, e))?;
        let char_err = |e: String| format!("{}:{}: {}", SOURCE, number + 1, e);
        rows.push(Row {
            code,
            name: name.to_string(),
            plain: parse_char(plain).map_err(char_err)?,
            shifted: parse_char(shifted).map_err(char_err)?,
        });
    }
    Ok(rows)
}

fn generate(rows: &[Row]) -> String {
    let mut out = String::new();
    out.push_str(
        r#"/// A physical key, identified by its macOS virtual key code.
///
/// The numeric values match the `kVK_*` constants from Carbon's
/// `HIToolbox/Events.h`. They name key positions, not characters:
/// `Key::A` is the key labelled A on an ANSI keyboard whatever layout
/// is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Key(pub u16);

"#,
    );

    out.push_str("impl Key {\n");
    for row in rows {
        // Digit keys have no identifier; look them up by name
        if row.name.starts_with(|c: char| c.is_ascii_digit()) {
            continue;
        }
        let _ = writeln!(out, "    pub const {}: Key = Key(0x{:02X});", row.name, row.code);
    }
    out.push_str("}\n\n");

    out.push_str("const KEY_TABLE: &[KeyRow] = &[\n");
    for row in rows {
        let _ = writeln!(
            out,
            "    (0x{:02X}, {:?}, {:?}, {:?}),",
            row.code, row.name, row.plain, row.shifted
        );
    }
    out.push_str("];\n");
    out
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed={}", SOURCE);

    let text = fs::read_to_string(SOURCE)?;
    let rows = parse_rows(&text)?;
    let out_dir = env::var("OUT_DIR")?;
    fs::write(Path::new(&out_dir).join("key_codes.rs"), generate(&rows))?;
    Ok(())
}
