//! Standard CSS syntax detection
//!
//! Values written for preprocessors or template engines are not plain CSS
//! and should be left alone by anything that reasons about CSS values.

use std::sync::LazyLock;

use regex::Regex;

/// `namespace.$variable`
static SCSS_NAMESPACED_VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.+\.\$").expect("invalid namespaced variable pattern"));

/// `namespace.function(`
static SCSS_NAMESPACED_FUNCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.+\.[-\w]+\(").expect("invalid namespaced function pattern"));

/// `#{...}` `@{...}` `$(...)` `{...}` `<%...%>`
static INTERPOLATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)[#@]\{.+?\}|\$\(.+?\)|\{.+?\}|<%.*?%>").expect("invalid interpolation pattern")
});

/// Whether a value is plain CSS rather than preprocessor or template syntax
pub fn is_standard_syntax_value(value: &str) -> bool {
    // Ignore a single operator before a variable, e.g. -$var
    let normalized = match value.as_bytes().first() {
        Some(b'-' | b'+' | b'*' | b'/') => &value[1..],
        _ => value,
    };

    // SCSS $variable, Less @variable
    if normalized.starts_with('$') || normalized.starts_with('@') {
        return false;
    }

    if SCSS_NAMESPACED_VARIABLE.is_match(value) || SCSS_NAMESPACED_FUNCTION.is_match(value) {
        return false;
    }

    if INTERPOLATION.is_match(normalized) {
        return false;
    }

    // WebExtension message placeholder
    !normalized.contains("__MSG_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_values() {
        for value in ["200", "200deg", "-10", "+.5", "red", "var(--h)", "1.5turn", "50%"] {
            assert!(is_standard_syntax_value(value), "{} should be standard", value);
        }
    }

    #[test]
    fn test_variables() {
        for value in ["$hue", "-$hue", "@hue", "+@hue", "color.$hue", "math.div(1, 2)"] {
            assert!(!is_standard_syntax_value(value), "{} should not be standard", value);
        }
    }

    #[test]
    fn test_interpolation() {
        for value in ["#{$hue}", "#{$h}deg", "@{hue}", "$(hue)", "{{ hue }}", "<%= hue %>"] {
            assert!(!is_standard_syntax_value(value), "{} should not be standard", value);
        }
    }

    #[test]
    fn test_webextension_placeholder() {
        assert!(!is_standard_syntax_value("__MSG_hue__"));
    }
}
