// Vikey Config API
// Hotkey string parsing and the TOML configuration file

pub mod combo_parser;
pub mod parser;

pub use combo_parser::{parse_combo_string, ComboParseError, ParsedCombo};
pub use parser::{Config, ConfigError, ConfigToml};
