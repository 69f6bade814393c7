//! Numeric prefix / unit suffix split for dimension-like words

/// A word split into its numeric part and whatever follows it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimension<'a> {
    /// Numeric prefix, sign and exponent included
    pub number: &'a str,
    /// Remainder after the number; empty for bare numbers
    pub unit: &'a str,
}

impl Dimension<'_> {
    pub fn is_unitless(&self) -> bool {
        self.unit.is_empty()
    }
}

/// Split `text` into number and unit, or `None` if it does not start like a number
pub fn unit(text: &str) -> Option<Dimension<'_>> {
    let bytes = text.as_bytes();
    if !starts_like_number(bytes) {
        return None;
    }

    let digits_from = |mut pos: usize| {
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        pos
    };
    let digit_at = |pos: usize| bytes.get(pos).map(u8::is_ascii_digit).unwrap_or(false);

    let mut pos = 0;
    if matches!(bytes[0], b'+' | b'-') {
        pos += 1;
    }
    pos = digits_from(pos);

    if bytes.get(pos) == Some(&b'.') && digit_at(pos + 1) {
        pos = digits_from(pos + 2);
    }

    if matches!(bytes.get(pos), Some(b'e') | Some(b'E')) {
        if digit_at(pos + 1) {
            pos = digits_from(pos + 2);
        } else if matches!(bytes.get(pos + 1), Some(b'+') | Some(b'-')) && digit_at(pos + 2) {
            pos = digits_from(pos + 3);
        }
    }

    Some(Dimension {
        number: &text[..pos],
        unit: &text[pos..],
    })
}

/// True when the unit is `deg`, in any case
pub fn is_degree(text: &str) -> bool {
    unit(text)
        .map(|d| d.unit.eq_ignore_ascii_case("deg"))
        .unwrap_or(false)
}

/// True when the text is a number with no unit at all
pub fn is_number(text: &str) -> bool {
    unit(text).map(|d| d.is_unitless()).unwrap_or(false)
}

fn starts_like_number(bytes: &[u8]) -> bool {
    let digit = |i: usize| bytes.get(i).map(u8::is_ascii_digit).unwrap_or(false);
    match bytes.first() {
        Some(b'+') | Some(b'-') => digit(1) || (bytes.get(1) == Some(&b'.') && digit(2)),
        Some(b'.') => digit(1),
        Some(b) => b.is_ascii_digit(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(text: &str) -> Option<(&str, &str)> {
        unit(text).map(|d| (d.number, d.unit))
    }

    #[test]
    fn test_bare_numbers() {
        assert_eq!(split("200"), Some(("200", "")));
        assert_eq!(split("-1.5"), Some(("-1.5", "")));
        assert_eq!(split(".5"), Some((".5", "")));
        assert_eq!(split("+.5"), Some(("+.5", "")));
        assert_eq!(split("1e3"), Some(("1e3", "")));
        assert_eq!(split("1E-3"), Some(("1E-3", "")));
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(split("200deg"), Some(("200", "deg")));
        assert_eq!(split("0.5turn"), Some(("0.5", "turn")));
        assert_eq!(split("50%"), Some(("50", "%")));
        assert_eq!(split("1em"), Some(("1", "em")));
        assert_eq!(split("1e"), Some(("1", "e")));
        assert_eq!(split("1.px"), Some(("1", ".px")));
    }

    #[test]
    fn test_not_numbers() {
        assert_eq!(split(""), None);
        assert_eq!(split("deg"), None);
        assert_eq!(split("$hue"), None);
        assert_eq!(split("-"), None);
        assert_eq!(split("-."), None);
        assert_eq!(split("var"), None);
    }

    #[test]
    fn test_is_degree() {
        assert!(is_degree("200deg"));
        assert!(is_degree("200DEG"));
        assert!(is_degree("-1.5Deg"));
        assert!(!is_degree("200"));
        assert!(!is_degree("200grad"));
        assert!(!is_degree("deg"));
    }

    #[test]
    fn test_is_number() {
        assert!(is_number("200"));
        assert!(is_number("0.25"));
        assert!(!is_number("200deg"));
        assert!(!is_number("50%"));
        assert!(!is_number("none"));
    }
}
