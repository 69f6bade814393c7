//! Lint diagnostics

use std::fmt;

use serde::Serialize;
use tinct_css::SourceLocation;

use crate::config::Severity;

/// A rule violation found in a stylesheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Name of the rule that reported it
    pub rule: &'static str,
    pub severity: Severity,
    pub message: String,
    /// Property of the offending declaration
    pub property: String,
    /// Byte offset of the offending text
    pub start: usize,
    /// Byte offset just past the offending text
    pub end: usize,
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl Diagnostic {
    pub fn start_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column, self.start)
    }

    pub fn end_location(&self) -> SourceLocation {
        SourceLocation::new(self.end_line, self.end_column, self.end)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {}  {}  ({})",
            self.start_location(),
            self.severity,
            self.message,
            self.rule
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Diagnostic {
        Diagnostic {
            rule: "hue-degree-notation",
            severity: Severity::Error,
            message: "Expected \"200\" to be \"200deg\"".to_string(),
            property: "color".to_string(),
            start: 11,
            end: 14,
            line: 1,
            column: 12,
            end_line: 1,
            end_column: 15,
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(
            sample().to_string(),
            "1:12  error  Expected \"200\" to be \"200deg\"  (hue-degree-notation)"
        );
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["rule"], "hue-degree-notation");
        assert_eq!(json["severity"], "error");
        assert_eq!(json["end_column"], 15);
    }
}
