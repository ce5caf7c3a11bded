// Injection Strategy Selection
//
// An injection strategy is the method plus timing profile used to write an
// edit into the focused control. Classification of the focused target is
// a pure function supplied by a `StrategyClassifier`; `StrategyDetector`
// caches its answer per focus context.

use std::str::FromStr;

use parking_lot::Mutex;
use serde::Deserialize;
use strum_macros::{Display, EnumString};

use super::provider::FocusInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum InjectionMethod {
    /// Backspaces and Unicode text posted to the tap proxy
    #[default]
    Fast,
    /// Same events, posted at session level with longer pauses
    Slow,
    /// Shift+Left selects the text to replace, then the text is typed over it
    Selection,
    /// Forward-Delete first clears an inline completion
    Autocomplete,
    /// Edit the focused element's value through accessibility
    AxDirect,
    /// Do not touch the target at all
    Passthrough,
}

/// Pauses in microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct InjectionDelays {
    /// After each delete pair
    pub backspace_us: u64,
    /// Once, between the last delete and the text
    pub post_backspace_us: u64,
    /// After each text chunk
    pub text_us: u64,
}

impl InjectionDelays {
    pub const fn new(backspace_us: u64, post_backspace_us: u64, text_us: u64) -> Self {
        Self {
            backspace_us,
            post_backspace_us,
            text_us,
        }
    }

    /// Default timing profile for `method`
    pub fn for_method(method: InjectionMethod) -> Self {
        match method {
            InjectionMethod::Fast | InjectionMethod::Autocomplete => Self::new(1_000, 0, 1_000),
            InjectionMethod::Slow => Self::new(8_000, 20_000, 8_000),
            InjectionMethod::Selection => Self::new(1_000, 3_000, 2_000),
            InjectionMethod::AxDirect => Self::new(0, 0, 2_000),
            InjectionMethod::Passthrough => Self::new(0, 0, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TextSendingMethod {
    /// One key event per character
    OneByOne,
    /// Up to 20 UTF-16 units per key event
    #[default]
    Chunked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectionStrategy {
    pub method: InjectionMethod,
    pub delays: InjectionDelays,
    pub text_sending: TextSendingMethod,
}

impl Default for InjectionStrategy {
    fn default() -> Self {
        Self::new(InjectionMethod::default())
    }
}

impl InjectionStrategy {
    pub fn new(method: InjectionMethod) -> Self {
        Self {
            method,
            delays: InjectionDelays::for_method(method),
            text_sending: TextSendingMethod::default(),
        }
    }

    pub fn with_delays(mut self, delays: InjectionDelays) -> Self {
        self.delays = delays;
        self
    }

    pub fn with_text_sending(mut self, text_sending: TextSendingMethod) -> Self {
        self.text_sending = text_sending;
        self
    }
}

impl FromStr for InjectionStrategy {
    type Err = strum::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InjectionMethod::from_str(s).map(Self::new)
    }
}

/// Pure classification of a focus target
pub trait StrategyClassifier: Send + Sync {
    fn classify(&self, focus: &FocusInfo) -> InjectionStrategy;
}

/// What the core asks before every injection
pub trait InjectionStrategySelector: Send + Sync {
    fn confirmed_method(&self, focus: &FocusInfo) -> InjectionStrategy;

    /// Forget cached answers; called on every engine reset
    fn clear_method_cache(&self);
}

/// Selector that asks a classifier once per focus context
pub struct StrategyDetector {
    classifier: Box<dyn StrategyClassifier>,
    cache: Mutex<Option<(FocusInfo, InjectionStrategy)>>,
}

impl StrategyDetector {
    pub fn new(classifier: Box<dyn StrategyClassifier>) -> Self {
        Self {
            classifier,
            cache: Mutex::new(None),
        }
    }
}

impl InjectionStrategySelector for StrategyDetector {
    fn confirmed_method(&self, focus: &FocusInfo) -> InjectionStrategy {
        let mut cache = self.cache.lock();
        if let Some((cached_focus, strategy)) = cache.as_ref() {
            if cached_focus == focus {
                return *strategy;
            }
        }
        let strategy = self.classifier.classify(focus);
        log::debug!(
            "Strategy for {}: {}",
            focus.target_app().unwrap_or("<unknown>"),
            strategy.method
        );
        *cache = Some((focus.clone(), strategy));
        strategy
    }

    fn clear_method_cache(&self) {
        *self.cache.lock() = None;
    }
}

/// Selector that always answers the same strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedStrategy(pub InjectionStrategy);

impl InjectionStrategySelector for FixedStrategy {
    fn confirmed_method(&self, _focus: &FocusInfo) -> InjectionStrategy {
        self.0
    }

    fn clear_method_cache(&self) {}
}
