//! Focus context module
//!
//! This module reports what holds keyboard focus and decides how text is
//! injected into it.

mod provider;
mod rules;
mod strategy;

pub use provider::{
    ConditionParseError, FocusCondition, FocusField, FocusInfo, FocusProvider, Matcher,
    WindowError,
};
pub use rules::{builtin_rules, RuleClassifier, StrategyRule};
pub use strategy::{
    FixedStrategy, InjectionDelays, InjectionMethod, InjectionStrategy,
    InjectionStrategySelector, StrategyClassifier, StrategyDetector, TextSendingMethod,
};
