//! CSS Tokenizer
//!
//! Splits a stylesheet into span-carrying structural tokens. Token text is
//! never copied: every token records the byte range it covers so the parser
//! can slice the original source and reproduce it verbatim.

use crate::error::{CssError, CssResult, SourceLocation};

/// Structural token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Run of whitespace
    Space,
    /// Anything that is not structural (identifiers, numbers, hashes, ...)
    Word,
    /// At-keyword (e.g., @media, @import)
    AtWord,
    /// Quoted string, quotes included
    String,
    /// Comment, delimiters included
    Comment,
    /// Colon ':'
    Colon,
    /// Semicolon ';'
    Semicolon,
    /// Left paren '('
    LeftParen,
    /// Right paren ')'
    RightParen,
    /// Left brace '{'
    LeftBrace,
    /// Right brace '}'
    RightBrace,
    /// Left bracket '['
    LeftBracket,
    /// Right bracket ']'
    RightBracket,
}

/// A token and the byte range it covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    /// Location of the first character
    pub location: SourceLocation,
}

impl Token {
    /// Slice this token's text out of the source it was read from
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Space | TokenKind::Comment)
    }
}

/// CSS Tokenizer
pub struct Tokenizer<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    position: usize,
    line: usize,
    column: usize,
}

impl<'a> Tokenizer<'a> {
    /// Create a new tokenizer
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Get the current source location
    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column, self.position)
    }

    /// Peek at the next character without consuming
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    /// Peek at the second character without consuming
    fn peek_second(&self) -> Option<char> {
        let mut iter = self.input[self.position..].chars();
        iter.next();
        iter.next()
    }

    /// Consume the next character
    fn advance(&mut self) -> Option<char> {
        if let Some((pos, c)) = self.chars.next() {
            self.position = pos + c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            Some(c)
        } else {
            None
        }
    }

    /// Get the next token, or `None` at end of input
    pub fn next_token(&mut self) -> CssResult<Option<Token>> {
        let location = self.location();
        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(None),
        };

        let kind = match c {
            _ if c.is_ascii_whitespace() => {
                while matches!(self.peek(), Some(c) if c.is_ascii_whitespace()) {
                    self.advance();
                }
                TokenKind::Space
            }
            '/' if self.peek_second() == Some('*') => self.consume_comment(location)?,
            '"' | '\'' => self.consume_string(location)?,
            ':' => self.single(TokenKind::Colon),
            ';' => self.single(TokenKind::Semicolon),
            '(' => self.single(TokenKind::LeftParen),
            ')' => self.single(TokenKind::RightParen),
            '{' => self.single(TokenKind::LeftBrace),
            '}' => self.single(TokenKind::RightBrace),
            '[' => self.single(TokenKind::LeftBracket),
            ']' => self.single(TokenKind::RightBracket),
            '@' if self.peek_second().map(is_ident_char).unwrap_or(false) => {
                self.advance(); // consume '@'
                while matches!(self.peek(), Some(c) if is_ident_char(c)) {
                    self.advance();
                }
                TokenKind::AtWord
            }
            _ => self.consume_word(),
        };

        Ok(Some(Token {
            kind,
            start: location.offset,
            end: self.position,
            location,
        }))
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    /// Consume a comment
    fn consume_comment(&mut self, start: SourceLocation) -> CssResult<TokenKind> {
        self.advance(); // consume '/'
        self.advance(); // consume '*'

        loop {
            match self.advance() {
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    return Ok(TokenKind::Comment);
                }
                Some(_) => continue,
                None => return Err(CssError::UnclosedComment { location: start }),
            }
        }
    }

    /// Consume a string token
    fn consume_string(&mut self, start: SourceLocation) -> CssResult<TokenKind> {
        let quote = self.advance();

        loop {
            match self.advance() {
                Some(c) if Some(c) == quote => return Ok(TokenKind::String),
                Some('\\') => {
                    // Escaped quote or escaped newline
                    self.advance();
                }
                Some('\n') | None => {
                    return Err(CssError::UnclosedString { location: start });
                }
                Some(_) => {}
            }
        }
    }

    /// Consume a word, keeping `#{...}` and `@{...}` interpolation intact
    fn consume_word(&mut self) -> TokenKind {
        while let Some(c) = self.peek() {
            match c {
                '\\' => {
                    self.advance();
                    self.advance();
                }
                '#' | '@' if self.peek_second() == Some('{') => {
                    self.advance();
                    self.advance();
                    let mut depth = 1;
                    while depth > 0 {
                        match self.advance() {
                            Some('{') => depth += 1,
                            Some('}') => depth -= 1,
                            Some(_) => {}
                            None => break,
                        }
                    }
                }
                '/' if self.peek_second() == Some('*') => break,
                _ if ends_word(c) => break,
                _ => {
                    self.advance();
                }
            }
        }
        TokenKind::Word
    }

    /// Tokenize all remaining input
    pub fn tokenize_all(&mut self) -> CssResult<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }
}

/// Check if character can be part of an identifier
fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || c > '\x7F'
}

fn ends_word(c: char) -> bool {
    c.is_ascii_whitespace()
        || matches!(c, '"' | '\'' | ':' | ';' | '(' | ')' | '{' | '}' | '[' | ']')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Tokenizer::new(input)
            .tokenize_all()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn texts(input: &str) -> Vec<&str> {
        Tokenizer::new(input)
            .tokenize_all()
            .unwrap()
            .into_iter()
            .map(|t| t.text(input))
            .collect()
    }

    #[test]
    fn test_simple_rule() {
        let tokens = kinds("p { color: red; }");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Word,
                TokenKind::Space,
                TokenKind::LeftBrace,
                TokenKind::Space,
                TokenKind::Word,
                TokenKind::Colon,
                TokenKind::Space,
                TokenKind::Word,
                TokenKind::Semicolon,
                TokenKind::Space,
                TokenKind::RightBrace,
            ]
        );
    }

    #[test]
    fn test_spans_cover_input() {
        let input = "a{color:hsl(200 50% 50%)/* x */}";
        let joined: String = texts(input).concat();
        assert_eq!(joined, input);
    }

    #[test]
    fn test_function_tokens() {
        assert_eq!(texts("hsl(200deg 5%)"), vec!["hsl", "(", "200deg", " ", "5%", ")"]);
    }

    #[test]
    fn test_at_keyword() {
        let tokens = Tokenizer::new("@media screen").tokenize_all().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::AtWord);
        assert_eq!(tokens[0].text("@media screen"), "@media");
    }

    #[test]
    fn test_string_with_escaped_quote() {
        let input = r#""a\"b" c"#;
        let tokens = Tokenizer::new(input).tokenize_all().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text(input), r#""a\"b""#);
    }

    #[test]
    fn test_string_keeps_structural_chars() {
        assert_eq!(texts("'a;b{'"), vec!["'a;b{'"]);
    }

    #[test]
    fn test_comment() {
        let tokens = kinds("/* comment */ p");
        assert_eq!(tokens, vec![TokenKind::Comment, TokenKind::Space, TokenKind::Word]);
    }

    #[test]
    fn test_scss_interpolation_stays_in_word() {
        assert_eq!(texts("hsl(#{$h} 1%)"), vec!["hsl", "(", "#{$h}", " ", "1%", ")"]);
    }

    #[test]
    fn test_unterminated_string() {
        let err = Tokenizer::new("a { content: 'x").tokenize_all().unwrap_err();
        assert!(matches!(err, CssError::UnclosedString { location } if location.column == 14));
    }

    #[test]
    fn test_unterminated_comment() {
        let err = Tokenizer::new("a {}\n/* open").tokenize_all().unwrap_err();
        assert!(matches!(err, CssError::UnclosedComment { location } if location.line == 2));
    }

    #[test]
    fn test_location_tracks_lines() {
        let tokens = Tokenizer::new("a {\n  color: red;\n}").tokenize_all().unwrap();
        let color = tokens.iter().find(|t| t.kind == TokenKind::Word && t.start > 2).unwrap();
        assert_eq!(color.location, SourceLocation::new(2, 3, 6));
    }
}
