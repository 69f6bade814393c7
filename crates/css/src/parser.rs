//! CSS Parser
//!
//! Parses stylesheets into a lossless tree. Declarations keep the byte range
//! of their value so rewritten values can be spliced back into the original
//! source without disturbing anything else.

use std::ops::Range;

use crate::error::{CssError, CssResult, SourceLocation};
use crate::tokenizer::{Token, TokenKind, Tokenizer};

/// A CSS stylesheet
#[derive(Debug, Clone)]
pub struct Stylesheet {
    source: String,
    line_starts: Vec<usize>,
    /// Top-level nodes
    pub nodes: Vec<Node>,
}

/// A node of the stylesheet tree
#[derive(Debug, Clone)]
pub enum Node {
    /// Style rule (selector { ... })
    Rule(StyleRule),
    /// At-rule, with or without a block
    AtRule(AtRule),
    /// property: value
    Declaration(Declaration),
    /// Comment between statements
    Comment(Comment),
}

/// A style rule (selector block)
#[derive(Debug, Clone)]
pub struct StyleRule {
    /// Selector text, trimmed
    pub selector: String,
    pub span: Range<usize>,
    /// Declarations and nested rules
    pub nodes: Vec<Node>,
}

/// An at-rule (@media, @import, ...)
#[derive(Debug, Clone)]
pub struct AtRule {
    /// Name without the '@'
    pub name: String,
    /// Prelude text, trimmed
    pub params: String,
    pub span: Range<usize>,
    /// Block contents, `None` for statement at-rules such as @import
    pub nodes: Option<Vec<Node>>,
}

/// A comment between statements
#[derive(Debug, Clone)]
pub struct Comment {
    /// Text between the delimiters
    pub text: String,
    pub span: Range<usize>,
}

/// A CSS declaration (property: value)
#[derive(Debug, Clone)]
pub struct Declaration {
    /// Property name as written
    pub property: String,
    /// Whether !important was specified
    pub important: bool,
    pub span: Range<usize>,
    value: String,
    value_span: Range<usize>,
    modified: bool,
}

impl Declaration {
    /// Raw value text, comments included, `!important` excluded
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Byte offset of the value within the stylesheet source
    pub fn value_offset(&self) -> usize {
        self.value_span.start
    }

    /// Byte range the value originally occupied in the source
    pub fn value_span(&self) -> Range<usize> {
        self.value_span.clone()
    }

    /// Replace the value; the new text is spliced in by [`Stylesheet::to_css`]
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.modified = true;
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }
}

/// Maps byte offsets of a stylesheet to line/column positions
#[derive(Debug, Clone, Copy)]
pub struct SourceMap<'a> {
    source: &'a str,
    line_starts: &'a [usize],
}

impl<'a> SourceMap<'a> {
    /// Location of a byte offset; offsets past the end clamp to the end
    pub fn location(&self, offset: usize) -> SourceLocation {
        let offset = offset.min(self.source.len());
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts[line - 1];
        let column = self.source[line_start..offset].chars().count() + 1;
        SourceLocation::new(line, column, offset)
    }
}

impl Stylesheet {
    /// Parse a CSS stylesheet
    pub fn parse(input: &str) -> CssResult<Self> {
        let tokens = Tokenizer::new(input).tokenize_all()?;
        let mut parser = CssParser::new(input, &tokens);
        let nodes = parser.parse_stylesheet()?;

        let line_starts = std::iter::once(0)
            .chain(input.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        log::trace!("Parsed {} tokens into {} top-level nodes", tokens.len(), nodes.len());

        Ok(Self {
            source: input.to_string(),
            line_starts,
            nodes,
        })
    }

    pub fn source_map(&self) -> SourceMap<'_> {
        SourceMap {
            source: &self.source,
            line_starts: &self.line_starts,
        }
    }

    /// Visit every declaration in source order
    pub fn walk_declarations<F: FnMut(&Declaration)>(&self, mut f: F) {
        fn walk<F: FnMut(&Declaration)>(nodes: &[Node], f: &mut F) {
            for node in nodes {
                match node {
                    Node::Declaration(decl) => f(decl),
                    Node::Rule(rule) => walk(&rule.nodes, f),
                    Node::AtRule(AtRule { nodes: Some(nodes), .. }) => walk(nodes, f),
                    _ => {}
                }
            }
        }
        walk(&self.nodes, &mut f);
    }

    /// Visit every declaration mutably in source order, stopping at the first error
    pub fn try_walk_declarations_mut<E, F>(&mut self, mut f: F) -> Result<(), E>
    where
        F: FnMut(&mut Declaration, &SourceMap<'_>) -> Result<(), E>,
    {
        fn walk<E, F>(nodes: &mut [Node], map: &SourceMap<'_>, f: &mut F) -> Result<(), E>
        where
            F: FnMut(&mut Declaration, &SourceMap<'_>) -> Result<(), E>,
        {
            for node in nodes {
                match node {
                    Node::Declaration(decl) => f(decl, map)?,
                    Node::Rule(rule) => walk(&mut rule.nodes, map, f)?,
                    Node::AtRule(AtRule { nodes: Some(nodes), .. }) => walk(nodes, map, f)?,
                    _ => {}
                }
            }
            Ok(())
        }

        let map = SourceMap {
            source: &self.source,
            line_starts: &self.line_starts,
        };
        walk(&mut self.nodes, &map, &mut f)
    }

    /// Whether any declaration value was replaced
    pub fn is_modified(&self) -> bool {
        let mut modified = false;
        self.walk_declarations(|decl| modified |= decl.is_modified());
        modified
    }

    /// Serialize back to CSS; untouched text is reproduced byte for byte
    pub fn to_css(&self) -> String {
        let mut out = String::with_capacity(self.source.len());
        let mut cursor = 0;
        self.walk_declarations(|decl| {
            if decl.is_modified() {
                out.push_str(&self.source[cursor..decl.value_span.start]);
                out.push_str(&decl.value);
                cursor = decl.value_span.end;
            }
        });
        out.push_str(&self.source[cursor..]);
        out
    }
}

/// CSS Parser
struct CssParser<'a> {
    source: &'a str,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> CssParser<'a> {
    fn new(source: &'a str, tokens: &'a [Token]) -> Self {
        Self { source, tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(t) if t.kind == TokenKind::Space) {
            self.pos += 1;
        }
    }

    fn parse_stylesheet(&mut self) -> CssResult<Vec<Node>> {
        self.parse_nodes(None)
    }

    /// Parse nodes until EOF, or until the '}' closing the block opened at `open`
    fn parse_nodes(&mut self, open: Option<&Token>) -> CssResult<Vec<Node>> {
        let mut nodes = Vec::new();

        loop {
            self.skip_whitespace();

            let token = match self.peek() {
                Some(token) => token,
                None => match open {
                    Some(open) => return Err(CssError::UnclosedBlock { location: open.location }),
                    None => break,
                },
            };

            match token.kind {
                TokenKind::RightBrace => {
                    if open.is_none() {
                        return Err(CssError::UnexpectedChar {
                            character: '}',
                            location: token.location,
                        });
                    }
                    self.advance();
                    break;
                }
                TokenKind::Semicolon => {
                    self.advance();
                }
                TokenKind::Comment => {
                    self.advance();
                    let text = token.text(self.source);
                    nodes.push(Node::Comment(Comment {
                        text: text[2..text.len() - 2].to_string(),
                        span: token.start..token.end,
                    }));
                }
                TokenKind::AtWord => nodes.push(self.parse_at_rule()?),
                _ => nodes.push(self.parse_statement()?),
            }
        }

        Ok(nodes)
    }

    /// Advance to the first ';', '{' or '}' outside parens and brackets.
    /// Returns the index of that token, or `tokens.len()` at EOF.
    fn scan_statement(&mut self) -> usize {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::LeftParen | TokenKind::LeftBracket => depth += 1,
                TokenKind::RightParen | TokenKind::RightBracket => depth = depth.saturating_sub(1),
                TokenKind::Semicolon | TokenKind::LeftBrace | TokenKind::RightBrace if depth == 0 => {
                    return self.pos;
                }
                _ => {}
            }
            self.pos += 1;
        }
        self.pos
    }

    fn offset_of(&self, index: usize) -> usize {
        self.tokens
            .get(index)
            .map(|t| t.start)
            .unwrap_or(self.source.len())
    }

    fn parse_at_rule(&mut self) -> CssResult<Node> {
        let keyword = self.tokens[self.pos];
        self.pos += 1;
        let name = keyword.text(self.source)[1..].to_string();

        let end = self.scan_statement();
        let params = self.source[keyword.end..self.offset_of(end)].trim().to_string();

        let nodes = match self.peek() {
            Some(token) if token.kind == TokenKind::LeftBrace => {
                self.advance();
                Some(self.parse_nodes(Some(token))?)
            }
            Some(token) if token.kind == TokenKind::Semicolon => {
                self.advance();
                None
            }
            _ => None,
        };

        Ok(Node::AtRule(AtRule {
            name,
            params,
            span: keyword.start..self.offset_of(self.pos),
            nodes,
        }))
    }

    fn parse_statement(&mut self) -> CssResult<Node> {
        let first = self.pos;
        let end = self.scan_statement();
        let start_offset = self.offset_of(first);

        if let Some(brace) = self.peek().filter(|t| t.kind == TokenKind::LeftBrace) {
            let selector = self.source[start_offset..brace.start].trim().to_string();
            self.advance();
            let nodes = self.parse_nodes(Some(brace))?;
            return Ok(Node::Rule(StyleRule {
                selector,
                span: start_offset..self.offset_of(self.pos),
                nodes,
            }));
        }

        let decl = self.build_declaration(first, end)?;
        if matches!(self.peek(), Some(t) if t.kind == TokenKind::Semicolon) {
            self.advance();
        }
        Ok(Node::Declaration(decl))
    }

    /// Build a declaration from the tokens in `first..end`
    fn build_declaration(&self, first: usize, end: usize) -> CssResult<Declaration> {
        let tokens = &self.tokens[first..end];
        let start = tokens[0];

        let mut depth = 0usize;
        let colon = tokens.iter().position(|t| {
            match t.kind {
                TokenKind::LeftParen | TokenKind::LeftBracket => depth += 1,
                TokenKind::RightParen | TokenKind::RightBracket => depth = depth.saturating_sub(1),
                _ => {}
            }
            depth == 0 && t.kind == TokenKind::Colon
        });

        let colon = match colon {
            Some(i) if i > 0 => i,
            _ => return Err(CssError::unknown_word(start.text(self.source), start.location)),
        };

        let property = self.source[start.start..tokens[colon].start].trim_end().to_string();

        // Leading whitespace and comments belong between the colon and the value
        let value_tokens = &tokens[colon + 1..];
        let leading = value_tokens.iter().take_while(|t| t.is_trivia()).count();
        let trailing = value_tokens[leading..]
            .iter()
            .rev()
            .take_while(|t| t.kind == TokenKind::Space)
            .count();
        let value_tokens = &value_tokens[leading..value_tokens.len() - trailing];

        let value_start = value_tokens
            .first()
            .map(|t| t.start)
            .unwrap_or(tokens[colon].end);
        let mut value_end = value_tokens.last().map(|t| t.end).unwrap_or(value_start);

        let mut important = false;
        let raw = &self.source[value_start..value_end];
        if let Some(bang) = raw.rfind('!') {
            if raw[bang + 1..].trim().eq_ignore_ascii_case("important") {
                important = true;
                value_end = value_start + raw[..bang].trim_end().len();
            }
        }

        let decl_end = tokens.last().map(|t| t.end).unwrap_or(start.end);

        Ok(Declaration {
            property,
            important,
            span: start.start..decl_end,
            value: self.source[value_start..value_end].to_string(),
            value_span: value_start..value_end,
            modified: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declarations(css: &str) -> Vec<Declaration> {
        let sheet = Stylesheet::parse(css).unwrap();
        let mut decls = Vec::new();
        sheet.walk_declarations(|d| decls.push(d.clone()));
        decls
    }

    #[test]
    fn test_simple_rule() {
        let sheet = Stylesheet::parse("p { color: red; }").unwrap();
        assert_eq!(sheet.nodes.len(), 1);
        match &sheet.nodes[0] {
            Node::Rule(rule) => {
                assert_eq!(rule.selector, "p");
                assert_eq!(rule.nodes.len(), 1);
            }
            other => panic!("expected rule, got {:?}", other),
        }
    }

    #[test]
    fn test_declaration_value_and_offset() {
        let css = "a { color: hsl(200 50% 50%); }";
        let decls = declarations(css);
        assert_eq!(decls[0].property, "color");
        assert_eq!(decls[0].value(), "hsl(200 50% 50%)");
        assert_eq!(&css[decls[0].value_span()], "hsl(200 50% 50%)");
        assert_eq!(decls[0].value_offset(), 11);
    }

    #[test]
    fn test_last_declaration_without_semicolon() {
        let decls = declarations("a { margin: 0 auto }");
        assert_eq!(decls[0].value(), "0 auto");
    }

    #[test]
    fn test_important() {
        let decls = declarations("a { color: red ! IMPORTANT; }");
        assert!(decls[0].important);
        assert_eq!(decls[0].value(), "red");
    }

    #[test]
    fn test_leading_comment_is_not_part_of_value() {
        let decls = declarations("a { color: /* c */ red /* d */; }");
        assert_eq!(decls[0].value(), "red /* d */");
    }

    #[test]
    fn test_semicolon_inside_url() {
        let decls = declarations("a { background: url(data:image/png;base64,AAA); color: red }");
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].value(), "url(data:image/png;base64,AAA)");
    }

    #[test]
    fn test_nested_at_rules() {
        let css = "@media (min-width: 10px) { @supports (color: lch(0 0 0)) { a { color: red } } }";
        let sheet = Stylesheet::parse(css).unwrap();
        match &sheet.nodes[0] {
            Node::AtRule(at) => {
                assert_eq!(at.name, "media");
                assert_eq!(at.params, "(min-width: 10px)");
            }
            other => panic!("expected at-rule, got {:?}", other),
        }
        assert_eq!(declarations(css).len(), 1);
    }

    #[test]
    fn test_statement_at_rule() {
        let sheet = Stylesheet::parse("@import url(foo.css) screen;\na { b: c }").unwrap();
        assert!(matches!(&sheet.nodes[0], Node::AtRule(at) if at.nodes.is_none() && at.params == "url(foo.css) screen"));
        assert!(matches!(&sheet.nodes[1], Node::Rule(_)));
    }

    #[test]
    fn test_nested_rules() {
        let decls = declarations("a { color: red; &:hover { color: blue; } }");
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[1].value(), "blue");
    }

    #[test]
    fn test_to_css_roundtrip_untouched() {
        let css = "/* head */\na{color:red}\n@media print {\n  b { margin : 0 !important }\n}\n";
        let sheet = Stylesheet::parse(css).unwrap();
        assert!(!sheet.is_modified());
        assert_eq!(sheet.to_css(), css);
    }

    #[test]
    fn test_to_css_splices_modified_values() {
        let css = "a { color: red; background: blue !important; }";
        let mut sheet = Stylesheet::parse(css).unwrap();
        sheet
            .try_walk_declarations_mut(|decl, _| {
                if decl.property == "background" {
                    decl.set_value("green");
                }
                Ok::<(), ()>(())
            })
            .unwrap();
        assert!(sheet.is_modified());
        assert_eq!(sheet.to_css(), "a { color: red; background: green !important; }");
    }

    #[test]
    fn test_source_map_location() {
        let sheet = Stylesheet::parse("a {\n  color: hsl(1 2% 3%);\n}").unwrap();
        let map = sheet.source_map();
        assert_eq!(map.location(0), SourceLocation::new(1, 1, 0));
        assert_eq!(map.location(13), SourceLocation::new(2, 10, 13));
    }

    #[test]
    fn test_source_map_counts_characters() {
        let css = "a { content: \"é\"; color: red }";
        let sheet = Stylesheet::parse(css).unwrap();
        let offset = css.find("red").unwrap();
        assert_eq!(sheet.source_map().location(offset).column, 26);
    }

    #[test]
    fn test_unclosed_block() {
        let err = Stylesheet::parse("a { color: red;").unwrap_err();
        assert!(matches!(err, CssError::UnclosedBlock { location } if location.column == 3));
    }

    #[test]
    fn test_stray_close_brace() {
        let err = Stylesheet::parse("a {} }").unwrap_err();
        assert!(matches!(err, CssError::UnexpectedChar { character: '}', .. }));
    }

    #[test]
    fn test_unknown_word() {
        let err = Stylesheet::parse("a { color red; }").unwrap_err();
        assert!(matches!(err, CssError::UnknownWord { ref word, .. } if word == "color"));
    }
}
