// Rule-Based Strategy Classifier
//
// Ordered focus rules: user rules from the config file first, then the
// built-in defaults. The first rule whose conditions all match decides.

use regex::Regex;

use super::provider::{ConditionParseError, FocusCondition, FocusInfo};
use super::strategy::{InjectionMethod, InjectionStrategy, StrategyClassifier};
use crate::input::MIRRORING_APPS;

const TERMINALS: &str = r"^(com\.apple\.Terminal|com\.googlecode\.iterm2|io\.alacritty|net\.kovidgoyal\.kitty|com\.github\.wez\.wezterm|dev\.warp\.Warp-Stable)$";
const CHROMIUM_BROWSERS: &str = r"^(com\.google\.Chrome(\.canary)?|com\.brave\.Browser|com\.microsoft\.edgemac|com\.vivaldi\.Vivaldi|company\.thebrowser\.Browser)$";
const OTHER_BROWSERS: &str = r"^(com\.apple\.Safari|org\.mozilla\.firefox)$";
const LAUNCHERS: &str = r"^(com\.apple\.Spotlight|com\.raycast\.macos|com\.runningwithcrayons\.Alfred)$";

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyRule {
    pub conditions: Vec<FocusCondition>,
    pub strategy: InjectionStrategy,
}

impl StrategyRule {
    pub fn new(conditions: Vec<FocusCondition>, strategy: InjectionStrategy) -> Self {
        Self {
            conditions,
            strategy,
        }
    }

    /// Rule from condition strings such as `app =~ "^com\.apple\."`
    pub fn parse<S: AsRef<str>>(
        conditions: &[S],
        strategy: InjectionStrategy,
    ) -> Result<Self, ConditionParseError> {
        let conditions = conditions
            .iter()
            .map(|c| FocusCondition::parse(c.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(conditions, strategy))
    }

    pub fn matches(&self, focus: &FocusInfo) -> bool {
        self.conditions.iter().all(|c| focus.matches_condition(c))
    }
}

/// Built-in rules, lowest priority
pub fn builtin_rules() -> Vec<StrategyRule> {
    let mut rules: Vec<StrategyRule> = MIRRORING_APPS
        .iter()
        .map(|app| {
            StrategyRule::new(
                vec![FocusCondition::app_equals(app)],
                InjectionStrategy::new(InjectionMethod::Passthrough),
            )
        })
        .collect();

    let patterns = [
        (TERMINALS, None, InjectionMethod::Slow),
        (LAUNCHERS, None, InjectionMethod::Selection),
        (CHROMIUM_BROWSERS, Some("AXTextField"), InjectionMethod::Autocomplete),
        (OTHER_BROWSERS, Some("AXTextField"), InjectionMethod::Selection),
    ];
    for (pattern, role, method) in patterns {
        let app = match Regex::new(pattern) {
            Ok(re) => FocusCondition::app_matches(re),
            Err(e) => {
                log::error!("Built-in rule pattern rejected: {}", e);
                continue;
            }
        };
        let mut conditions = vec![app];
        conditions.extend(role.map(FocusCondition::role_equals));
        rules.push(StrategyRule::new(conditions, InjectionStrategy::new(method)));
    }
    rules
}

/// First-match classifier over an ordered rule list
#[derive(Debug, Clone)]
pub struct RuleClassifier {
    rules: Vec<StrategyRule>,
    default: InjectionStrategy,
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new(Vec::new(), InjectionStrategy::default())
    }
}

impl RuleClassifier {
    /// `user_rules` take priority over the built-in ones
    pub fn new(user_rules: Vec<StrategyRule>, default: InjectionStrategy) -> Self {
        let mut rules = user_rules;
        rules.extend(builtin_rules());
        Self { rules, default }
    }

    pub fn rules(&self) -> &[StrategyRule] {
        &self.rules
    }
}

impl StrategyClassifier for RuleClassifier {
    fn classify(&self, focus: &FocusInfo) -> InjectionStrategy {
        self.rules
            .iter()
            .find(|rule| rule.matches(focus))
            .map(|rule| rule.strategy)
            .unwrap_or(self.default)
    }
}
