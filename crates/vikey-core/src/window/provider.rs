// Focus Context Provider Trait
//
// This module defines the interface for focus providers, which report
// the app and text control that will receive typed text.

use std::fmt;

use regex::Regex;

/// Error type for focus queries
#[derive(Debug, Clone, PartialEq)]
pub enum WindowError {
    /// The process is not trusted for accessibility
    NotTrusted,

    /// No element has keyboard focus
    NoFocusedElement,

    /// Query failed
    QueryFailed(String),
}

impl fmt::Display for WindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowError::NotTrusted => write!(f, "Accessibility access not granted"),
            WindowError::NoFocusedElement => write!(f, "No focused element"),
            WindowError::QueryFailed(msg) => write!(f, "Query failed: {}", msg),
        }
    }
}

impl std::error::Error for WindowError {}

/// Identity of the focused text target
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FocusInfo {
    /// Bundle identifier (or executable path) of the frontmost app
    pub app_id: Option<String>,

    /// Process id of the frontmost app
    pub pid: Option<i32>,

    /// App owning the focused element, when it is not the frontmost app.
    /// Overlay launchers such as Spotlight take keyboard focus without
    /// becoming frontmost.
    pub element_app_id: Option<String>,

    /// Accessibility role of the focused element (`AXTextField`, ...)
    pub role: Option<String>,
}

impl FocusInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_app(app_id: &str) -> Self {
        Self {
            app_id: Some(app_id.to_string()),
            ..Self::default()
        }
    }

    pub fn with_role(mut self, role: &str) -> Self {
        self.role = Some(role.to_string());
        self
    }

    pub fn with_element_app(mut self, app_id: &str) -> Self {
        self.element_app_id = Some(app_id.to_string());
        self
    }

    /// The app that actually receives the text
    pub fn target_app(&self) -> Option<&str> {
        self.element_app_id.as_deref().or(self.app_id.as_deref())
    }

    pub fn matches_condition(&self, condition: &FocusCondition) -> bool {
        let value = match condition.field {
            FocusField::App => self.target_app(),
            FocusField::Role => self.role.as_deref(),
        };
        value.is_some_and(|v| condition.matcher.is_match(v))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusField {
    App,
    Role,
}

#[derive(Debug, Clone)]
pub enum Matcher {
    Equals(String),
    Regex(Regex),
}

impl Matcher {
    pub fn is_match(&self, value: &str) -> bool {
        match self {
            Matcher::Equals(s) => s == value,
            Matcher::Regex(re) => re.is_match(value),
        }
    }

    pub fn pattern(&self) -> &str {
        match self {
            Matcher::Equals(s) => s,
            Matcher::Regex(re) => re.as_str(),
        }
    }
}

impl PartialEq for Matcher {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Matcher::Equals(_), Matcher::Equals(_)) | (Matcher::Regex(_), Matcher::Regex(_))
        ) && self.pattern() == other.pattern()
    }
}

/// Condition on the focused target, used by strategy rules.
///
/// Supported formats:
/// - `app == "com.apple.Terminal"` - exact match
/// - `app =~ "^com\.google\.Chrome"` - regex match
/// - `role == "AXTextField"`
#[derive(Debug, Clone, PartialEq)]
pub struct FocusCondition {
    pub field: FocusField,
    pub matcher: Matcher,
}

/// Error parsing a focus condition string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionParseError {
    /// Empty condition string
    Empty,
    /// Missing operator (== or =~)
    MissingOperator,
    /// Invalid field name
    InvalidField(String),
    /// Unquoted value
    UnquotedValue(String),
    /// Regex did not compile
    InvalidRegex(String),
}

impl fmt::Display for ConditionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionParseError::Empty => write!(f, "Empty condition string"),
            ConditionParseError::MissingOperator => write!(f, "Missing operator (== or =~)"),
            ConditionParseError::InvalidField(field) => write!(f, "Invalid field: {}", field),
            ConditionParseError::UnquotedValue(val) => write!(f, "Value must be quoted: {}", val),
            ConditionParseError::InvalidRegex(msg) => write!(f, "Invalid regex: {}", msg),
        }
    }
}

impl std::error::Error for ConditionParseError {}

impl FocusCondition {
    pub fn app_equals(app_id: &str) -> Self {
        Self {
            field: FocusField::App,
            matcher: Matcher::Equals(app_id.to_string()),
        }
    }

    pub fn app_matches(pattern: Regex) -> Self {
        Self {
            field: FocusField::App,
            matcher: Matcher::Regex(pattern),
        }
    }

    pub fn role_equals(role: &str) -> Self {
        Self {
            field: FocusField::Role,
            matcher: Matcher::Equals(role.to_string()),
        }
    }

    /// Parse a condition string into a FocusCondition
    ///
    /// # Examples
    /// ```
    /// use vikey_core::window::{FocusCondition, FocusInfo};
    ///
    /// let condition = FocusCondition::parse("app =~ 'iterm2$'").unwrap();
    /// let focus = FocusInfo::for_app("com.googlecode.iterm2");
    /// assert!(focus.matches_condition(&condition));
    /// ```
    pub fn parse(condition: &str) -> Result<Self, ConditionParseError> {
        let trimmed = condition.trim();

        if trimmed.is_empty() {
            return Err(ConditionParseError::Empty);
        }

        let (field, is_regex, value) = if let Some(pos) = trimmed.find("==") {
            (trimmed[..pos].trim(), false, trimmed[pos + 2..].trim())
        } else if let Some(pos) = trimmed.find("=~") {
            (trimmed[..pos].trim(), true, trimmed[pos + 2..].trim())
        } else {
            return Err(ConditionParseError::MissingOperator);
        };

        let field = match field {
            "app" => FocusField::App,
            "role" => FocusField::Role,
            other => return Err(ConditionParseError::InvalidField(other.to_string())),
        };

        // Strip quotes from value (both single and double quotes)
        let value = if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            &value[1..value.len() - 1]
        } else {
            return Err(ConditionParseError::UnquotedValue(value.to_string()));
        };

        let matcher = if is_regex {
            Regex::new(value)
                .map(Matcher::Regex)
                .map_err(|e| ConditionParseError::InvalidRegex(e.to_string()))?
        } else {
            Matcher::Equals(value.to_string())
        };
        Ok(Self { field, matcher })
    }
}

/// Trait for focus providers
///
/// Implementations report what currently holds keyboard focus. The
/// pipeline queries it on every key-down to notice focus changes.
pub trait FocusProvider: Send + Sync {
    fn focused(&self) -> Result<FocusInfo, WindowError>;
}
