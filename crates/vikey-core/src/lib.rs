// Vikey Core Library
// Vietnamese input method: transliteration engine, injection and the keyboard hook

pub mod combo;
pub mod config;
pub mod event;
pub mod input;
pub mod key;
pub mod modifier;
pub mod output;
pub mod platform;
pub mod session;
pub mod settings;
pub mod trace;
pub mod transform;
pub mod window;

pub use combo::Hotkey;
pub use config::{parse_combo_string, ComboParseError, Config, ConfigError, ParsedCombo};
pub use event::{
    AppCommand, EventInterceptionPipeline, HotkeyAction, HotkeyBindings, PipelineControl, Verdict,
};
pub use input::{AppFilter, EventKind, Keystroke, SENTINEL};
pub use key::Key;
pub use modifier::{Modifier, Modifiers};
pub use output::{CharacterInjector, EventPoster, InjectionEdit, InjectionGate, SyntheticEvent};
pub use session::{ResetReason, SessionContext};
pub use settings::{CodeTable, EngineSettings, InputMethod};
pub use trace::{EventSink, LogSink, MemorySink, NullSink, PassReason, TraceEvent};
pub use transform::{EngineResult, SpellDictionary, TransliterationEngine, WordList};
pub use window::{
    FocusInfo, FocusProvider, InjectionMethod, InjectionStrategy, InjectionStrategySelector,
    RuleClassifier, StrategyDetector,
};
