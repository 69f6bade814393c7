//! Lint error types

use std::path::PathBuf;

use thiserror::Error;
use tinct_css::CssError;

/// Lint result type
pub type LintResult<T> = Result<T, LintError>;

/// Errors that stop a lint run. Rule violations are diagnostics, not errors.
#[derive(Debug, Error)]
pub enum LintError {
    #[error("Unknown rule \"{0}\"")]
    UnknownRule(String),

    #[error("Invalid option value {value} for rule \"{rule}\"")]
    InvalidOption { rule: &'static str, value: String },

    #[error("Invalid secondary options for rule \"{rule}\": {reason}")]
    InvalidSecondaryOptions { rule: &'static str, reason: String },

    #[error("The \"{0}\" value must have a unit")]
    MissingUnit(String),

    #[error("Failed to read config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    ConfigFormat(#[from] serde_json::Error),

    #[error(transparent)]
    Css(#[from] CssError),
}

impl LintError {
    pub fn invalid_option(rule: &'static str, value: &serde_json::Value) -> Self {
        Self::InvalidOption {
            rule,
            value: value.to_string(),
        }
    }
}
