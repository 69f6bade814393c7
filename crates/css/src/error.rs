//! CSS parsing error types

use std::fmt;
use thiserror::Error;

/// CSS parsing result type
pub type CssResult<T> = Result<T, CssError>;

/// Source location in CSS
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number in characters (1-indexed)
    pub column: usize,
    /// Byte offset from start
    pub offset: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self { line, column, offset }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Stylesheet parsing errors. Each carries the location where the
/// offending construct starts.
#[derive(Debug, Error)]
pub enum CssError {
    #[error("Unexpected character '{character}' at {location}")]
    UnexpectedChar {
        character: char,
        location: SourceLocation,
    },

    #[error("Unclosed block at {location}")]
    UnclosedBlock { location: SourceLocation },

    #[error("Unclosed string at {location}")]
    UnclosedString { location: SourceLocation },

    #[error("Unclosed comment at {location}")]
    UnclosedComment { location: SourceLocation },

    /// A statement inside a block that is neither a declaration nor a rule
    #[error("Unknown word '{word}' at {location}")]
    UnknownWord {
        word: String,
        location: SourceLocation,
    },
}

impl CssError {
    pub fn location(&self) -> SourceLocation {
        match self {
            Self::UnexpectedChar { location, .. } | Self::UnknownWord { location, .. } => *location,
            Self::UnclosedBlock { location }
            | Self::UnclosedString { location }
            | Self::UnclosedComment { location } => *location,
        }
    }

    pub fn unknown_word(word: impl Into<String>, location: SourceLocation) -> Self {
        Self::UnknownWord {
            word: word.into(),
            location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_location_display() {
        let loc = SourceLocation::new(10, 5, 100);
        assert_eq!(format!("{}", loc), "10:5");
    }

    #[test]
    fn test_unexpected_char_display() {
        let loc = SourceLocation::new(1, 10, 9);
        let err = CssError::UnexpectedChar { character: '}', location: loc };
        assert_eq!(err.to_string(), "Unexpected character '}' at 1:10");
        assert_eq!(err.location(), loc);
    }

    #[test]
    fn test_unclosed_block_display() {
        let err = CssError::UnclosedBlock { location: SourceLocation::new(3, 1, 40) };
        assert_eq!(err.to_string(), "Unclosed block at 3:1");
    }

    #[test]
    fn test_unknown_word() {
        let err = CssError::unknown_word("color", SourceLocation::new(2, 3, 7));
        assert_eq!(err.to_string(), "Unknown word 'color' at 2:3");
        assert_eq!(err.location().offset, 7);
    }
}
