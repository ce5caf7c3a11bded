// Vikey Config Parser - TOML with Serde
// Parses configuration from TOML files

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::combo::Hotkey;
use crate::event::HotkeyBindings;
use crate::settings::{CodeTable, EngineSettings, InputMethod};
use crate::transform::MacroTable;
use crate::window::{
    InjectionDelays, InjectionMethod, InjectionStrategy, StrategyRule, TextSendingMethod,
};

/// Configuration parser errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid hotkey '{hotkey}': {reason}")]
    InvalidHotkey { hotkey: String, reason: String },

    #[error("Invalid app rule condition: {0}")]
    InvalidCondition(String),
}

/// Main configuration structure (root TOML table)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigToml {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub macros: MacrosConfig,

    #[serde(default)]
    pub hotkeys: HotkeysConfig,

    #[serde(default)]
    pub apps: AppsConfig,

    #[serde(default)]
    pub injection: InjectionConfig,
}

/// Typing settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    /// Start with Vietnamese typing on
    pub vietnamese: Option<bool>,
    pub method: Option<InputMethod>,
    pub code_table: Option<CodeTable>,
    pub modern_orthography: Option<bool>,
    pub free_mark: Option<bool>,
    pub quick_telex: Option<bool>,
    pub spell_check: Option<bool>,
    pub restore_if_wrong_spelling: Option<bool>,
    pub instant_restore: Option<bool>,
    /// Word list, one word per line
    pub dictionary: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MacrosConfig {
    pub enabled: Option<bool>,
    pub auto_caps: Option<bool>,
    /// Abbreviation to expansion, in file order
    #[serde(default)]
    pub table: IndexMap<String, String>,
}

/// Hotkey strings such as `"Ctrl-Shift"` or `"Cmd-Shift-Z"`. A missing
/// entry keeps the default binding; an empty string unbinds the action.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HotkeysConfig {
    pub toggle: Option<String>,
    pub undo_typing: Option<String>,
    pub toolbar: Option<String>,
    pub convert_tool: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppsConfig {
    /// Bundle identifiers whose keystrokes are never touched
    #[serde(default)]
    pub excluded: Vec<String>,

    #[serde(default)]
    pub rules: Vec<AppRuleToml>,
}

/// Injection strategy for focus targets matching every condition
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppRuleToml {
    /// Condition strings, e.g. `app =~ '^com\.jetbrains\.'`
    pub conditions: Vec<String>,
    pub method: InjectionMethod,
    pub delays: Option<InjectionDelays>,
    pub text_sending: Option<TextSendingMethod>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InjectionConfig {
    /// Pause after an injection before the next keystroke is processed
    pub settle_us: Option<u64>,
    /// Longest wait for a previous injection; unbounded when unset
    pub gate_timeout_ms: Option<u64>,
    /// Strategy when no rule matches
    pub method: Option<InjectionMethod>,
    pub delays: Option<InjectionDelays>,
    pub text_sending: Option<TextSendingMethod>,
}

/// Main configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    pub engine: EngineSettings,
    /// Vietnamese typing on at startup
    pub vietnamese: bool,
    pub dictionary: Option<PathBuf>,
    pub macros: MacroTable,
    pub hotkeys: HotkeyBindings,
    pub excluded_apps: Vec<String>,
    /// User strategy rules, ahead of the built-in ones
    pub rules: Vec<StrategyRule>,
    pub default_strategy: InjectionStrategy,
    pub settle: Duration,
    pub gate_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineSettings::default(),
            vietnamese: true,
            dictionary: None,
            macros: MacroTable::new(),
            hotkeys: HotkeyBindings::default(),
            excluded_apps: vec![],
            rules: vec![],
            default_strategy: InjectionStrategy::default(),
            settle: Duration::from_millis(2),
            gate_timeout: None,
        }
    }
}

impl Config {
    /// `~/Library/Application Support/vikey/config.toml` on macOS
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vikey").join("config.toml"))
    }

    /// Parse a TOML configuration file
    pub fn from_toml_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let toml_config: ConfigToml =
            toml::from_str(content).map_err(|e| ConfigError::TomlParse(e.to_string()))?;
        toml_config.to_config()
    }
}

impl ConfigToml {
    /// Convert parsed TOML to internal Config structure
    fn to_config(&self) -> Result<Config, ConfigError> {
        let mut config = Config::default();

        let input = &self.input;
        let engine = &mut config.engine;
        if let Some(method) = input.method {
            engine.input_method = method;
        }
        if let Some(code_table) = input.code_table {
            engine.code_table = code_table;
        }
        let flags = [
            (input.modern_orthography, &mut engine.modern_orthography),
            (input.free_mark, &mut engine.free_mark),
            (input.quick_telex, &mut engine.quick_telex),
            (input.spell_check, &mut engine.spell_check),
            (input.restore_if_wrong_spelling, &mut engine.restore_if_wrong_spelling),
            (input.instant_restore, &mut engine.instant_restore),
            (self.macros.enabled, &mut engine.macros_enabled),
            (self.macros.auto_caps, &mut engine.macro_auto_caps),
        ];
        for (value, field) in flags {
            if let Some(value) = value {
                *field = value;
            }
        }
        if let Some(vietnamese) = input.vietnamese {
            config.vietnamese = vietnamese;
        }
        config.dictionary = input.dictionary.clone();

        config.macros = self
            .macros
            .table
            .iter()
            .map(|(abbreviation, expansion)| (abbreviation.as_str(), expansion.as_str()))
            .collect();

        let hotkeys = &self.hotkeys;
        let defaults = HotkeyBindings::default();
        config.hotkeys = HotkeyBindings {
            toggle_vietnamese: parse_hotkey(hotkeys.toggle.as_deref(), defaults.toggle_vietnamese)?,
            undo_typing: parse_hotkey(hotkeys.undo_typing.as_deref(), defaults.undo_typing)?,
            toolbar: parse_hotkey(hotkeys.toolbar.as_deref(), defaults.toolbar)?,
            convert_tool: parse_hotkey(hotkeys.convert_tool.as_deref(), defaults.convert_tool)?,
        };

        config.excluded_apps = self.apps.excluded.clone();
        for rule in &self.apps.rules {
            let strategy = strategy_from(rule.method, rule.delays, rule.text_sending);
            let parsed = StrategyRule::parse(&rule.conditions, strategy)
                .map_err(|e| ConfigError::InvalidCondition(e.to_string()))?;
            config.rules.push(parsed);
        }

        let injection = &self.injection;
        config.default_strategy = strategy_from(
            injection.method.unwrap_or_default(),
            injection.delays,
            injection.text_sending,
        );
        if let Some(settle_us) = injection.settle_us {
            config.settle = Duration::from_micros(settle_us);
        }
        config.gate_timeout = injection.gate_timeout_ms.map(Duration::from_millis);

        log::debug!(
            "Config: {} macros, {} excluded apps, {} rules",
            config.macros.len(),
            config.excluded_apps.len(),
            config.rules.len()
        );
        Ok(config)
    }
}

fn strategy_from(
    method: InjectionMethod,
    delays: Option<InjectionDelays>,
    text_sending: Option<TextSendingMethod>,
) -> InjectionStrategy {
    let mut strategy = InjectionStrategy::new(method);
    if let Some(delays) = delays {
        strategy = strategy.with_delays(delays);
    }
    if let Some(text_sending) = text_sending {
        strategy = strategy.with_text_sending(text_sending);
    }
    strategy
}

fn parse_hotkey(
    value: Option<&str>,
    default: Option<Hotkey>,
) -> Result<Option<Hotkey>, ConfigError> {
    match value.map(str::trim) {
        None => Ok(default),
        Some("") => Ok(None),
        Some(s) => s
            .parse::<Hotkey>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidHotkey {
                hotkey: s.to_string(),
                reason: e.to_string(),
            }),
    }
}
