//! Linter configuration
//!
//! Configuration is JSON, one entry per rule:
//!
//! ```json
//! { "rules": { "hue-degree-notation": ["angle", { "severity": "warning" }] } }
//! ```
//!
//! A rule value is `null` (off), a primary option, or a `[primary, secondary]`
//! pair.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LintError, LintResult};

/// Default config file name looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = ".tinctrc.json";

/// Diagnostic severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// Options every rule accepts next to its primary option
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SecondaryOptions {
    #[serde(default)]
    pub severity: Severity,
    /// Replaces the rule's message; `%s` placeholders take the message arguments in order
    #[serde(default)]
    pub message: Option<String>,
    /// Report instead of fixing, even in fix mode
    #[serde(default)]
    pub disable_fix: bool,
}

/// The settings of one enabled rule
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSettings {
    pub primary: Value,
    pub secondary: SecondaryOptions,
}

impl RuleSettings {
    pub fn new(primary: impl Into<Value>) -> Self {
        Self {
            primary: primary.into(),
            secondary: SecondaryOptions::default(),
        }
    }

    /// Interpret a raw rule value; `None` means the rule is off
    pub fn from_value(rule: &'static str, value: &Value) -> LintResult<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::Array(items) => match items.as_slice() {
                [primary] => Ok(Some(Self::new(primary.clone()))),
                [primary, secondary] => {
                    let secondary = SecondaryOptions::deserialize(secondary).map_err(|e| {
                        LintError::InvalidSecondaryOptions {
                            rule,
                            reason: e.to_string(),
                        }
                    })?;
                    Ok(Some(Self {
                        primary: primary.clone(),
                        secondary,
                    }))
                }
                _ => Err(LintError::invalid_option(rule, value)),
            },
            primary => Ok(Some(Self::new(primary.clone()))),
        }
    }
}

/// Linter configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Raw rule values keyed by rule name
    #[serde(default)]
    pub rules: FxHashMap<String, Value>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON config file
    pub fn from_path(path: &Path) -> LintResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| LintError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = text.parse()?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Set or replace a rule's raw value
    pub fn set_rule(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.rules.insert(name.into(), value.into());
    }

    /// Rule names in a stable order
    pub fn rule_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl FromStr for Config {
    type Err = LintError;

    fn from_str(s: &str) -> LintResult<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const RULE: &str = "hue-degree-notation";

    #[test]
    fn test_parse_config() {
        let config: Config = r#"{ "rules": { "hue-degree-notation": "angle", "other": null } }"#
            .parse()
            .unwrap();
        assert_eq!(config.rules[RULE], json!("angle"));
        assert_eq!(config.rule_names(), vec!["hue-degree-notation", "other"]);
    }

    #[test]
    fn test_empty_config() {
        let config: Config = "{}".parse().unwrap();
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_malformed_config() {
        let err = "{ rules: }".parse::<Config>().unwrap_err();
        assert!(matches!(err, LintError::ConfigFormat(_)));
    }

    #[test]
    fn test_settings_from_primary() {
        let settings = RuleSettings::from_value(RULE, &json!("number")).unwrap().unwrap();
        assert_eq!(settings.primary, json!("number"));
        assert_eq!(settings.secondary, SecondaryOptions::default());
    }

    #[test]
    fn test_settings_null_disables() {
        assert_eq!(RuleSettings::from_value(RULE, &Value::Null).unwrap(), None);
    }

    #[test]
    fn test_settings_with_secondary() {
        let value = json!(["angle", { "severity": "warning", "disableFix": true, "message": "no: %s" }]);
        let settings = RuleSettings::from_value(RULE, &value).unwrap().unwrap();
        assert_eq!(settings.primary, json!("angle"));
        assert_eq!(settings.secondary.severity, Severity::Warning);
        assert!(settings.secondary.disable_fix);
        assert_eq!(settings.secondary.message.as_deref(), Some("no: %s"));
    }

    #[test]
    fn test_settings_unknown_secondary_option() {
        let value = json!(["angle", { "severty": "warning" }]);
        let err = RuleSettings::from_value(RULE, &value).unwrap_err();
        assert!(matches!(err, LintError::InvalidSecondaryOptions { rule: RULE, .. }));
    }

    #[test]
    fn test_settings_too_many_items() {
        let err = RuleSettings::from_value(RULE, &json!(["angle", {}, 3])).unwrap_err();
        assert!(matches!(err, LintError::InvalidOption { .. }));
    }

    #[test]
    fn test_set_rule() {
        let mut config = Config::new();
        config.set_rule(RULE, "angle");
        config.set_rule(RULE, "number");
        assert_eq!(config.rules[RULE], json!("number"));
    }
}
