//! CSS Value Parser
//!
//! Parses a declaration value into a lossless node tree. Parsing never fails:
//! anything that is not recognised becomes a word, and unterminated strings,
//! comments and functions are flagged as unclosed. Serializing the tree with
//! `to_string()` reproduces the input exactly, with edited node text
//! substituted in place.

use std::fmt;

/// Node type plus the data specific to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Keyword, number, dimension, hash, ...
    Word,
    /// Quoted string; `value` excludes the quotes
    String { quote: char, unclosed: bool },
    /// `,` `/` or `:` with the whitespace around it
    Div { before: String, after: String },
    /// Whitespace between nodes
    Space,
    /// Comment; `value` excludes the delimiters
    Comment { unclosed: bool },
    /// Function call or bare parenthesised group; `value` is the name
    Function {
        before: String,
        after: String,
        nodes: Vec<ValueNode>,
        unclosed: bool,
    },
    /// `U+0025-00FF` and friends
    UnicodeRange,
}

/// A node of a parsed value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueNode {
    pub kind: NodeKind,
    /// Text of the node (function name for functions)
    pub value: String,
    /// Byte offset of the node within the parsed text
    pub source_index: usize,
    /// Byte offset just past the node
    pub source_end_index: usize,
}

impl ValueNode {
    fn new(kind: NodeKind, value: impl Into<String>, source_index: usize, source_end_index: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            source_index,
            source_end_index,
        }
    }

    pub fn is_word(&self) -> bool {
        matches!(self.kind, NodeKind::Word)
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, NodeKind::Function { .. })
    }

    /// Child nodes of a function, empty for everything else
    pub fn nodes(&self) -> &[ValueNode] {
        match &self.kind {
            NodeKind::Function { nodes, .. } => nodes,
            _ => &[],
        }
    }

    pub fn nodes_mut(&mut self) -> Option<&mut Vec<ValueNode>> {
        match &mut self.kind {
            NodeKind::Function { nodes, .. } => Some(nodes),
            _ => None,
        }
    }
}

impl fmt::Display for ValueNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Word | NodeKind::Space | NodeKind::UnicodeRange => f.write_str(&self.value),
            NodeKind::String { quote, unclosed } => {
                write!(f, "{}{}", quote, self.value)?;
                if !unclosed {
                    write!(f, "{}", quote)?;
                }
                Ok(())
            }
            NodeKind::Div { before, after } => write!(f, "{}{}{}", before, self.value, after),
            NodeKind::Comment { unclosed } => {
                write!(f, "/*{}", self.value)?;
                if !unclosed {
                    f.write_str("*/")?;
                }
                Ok(())
            }
            NodeKind::Function {
                before,
                after,
                nodes,
                unclosed,
            } => {
                write!(f, "{}({}", self.value, before)?;
                for node in nodes {
                    write!(f, "{}", node)?;
                }
                f.write_str(after)?;
                if !unclosed {
                    f.write_str(")")?;
                }
                Ok(())
            }
        }
    }
}

/// A parsed value, owned exclusively by whoever parsed it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedValue {
    pub nodes: Vec<ValueNode>,
}

impl ParsedValue {
    /// Parse a value string
    pub fn parse(input: &str) -> Self {
        Self {
            nodes: ValueParser::new(input).parse(),
        }
    }

    /// Depth-first, pre-order traversal
    pub fn walk<F: FnMut(&ValueNode)>(&self, mut f: F) {
        fn walk<F: FnMut(&ValueNode)>(nodes: &[ValueNode], f: &mut F) {
            for node in nodes {
                f(node);
                walk(node.nodes(), f);
            }
        }
        walk(&self.nodes, &mut f);
    }

    /// Depth-first, pre-order traversal; the visitor may edit nodes in place.
    /// Children are visited after the visitor has seen their parent.
    pub fn walk_mut<F: FnMut(&mut ValueNode)>(&mut self, mut f: F) {
        fn walk<F: FnMut(&mut ValueNode)>(nodes: &mut [ValueNode], f: &mut F) {
            for node in nodes {
                f(node);
                if let Some(children) = node.nodes_mut() {
                    walk(children, f);
                }
            }
        }
        walk(&mut self.nodes, &mut f);
    }

    /// Like [`ParsedValue::walk_mut`], stopping at the first error
    pub fn try_walk_mut<E, F>(&mut self, mut f: F) -> Result<(), E>
    where
        F: FnMut(&mut ValueNode) -> Result<(), E>,
    {
        fn walk<E, F>(nodes: &mut [ValueNode], f: &mut F) -> Result<(), E>
        where
            F: FnMut(&mut ValueNode) -> Result<(), E>,
        {
            for node in nodes {
                f(node)?;
                if let Some(children) = node.nodes_mut() {
                    walk(children, f)?;
                }
            }
            Ok(())
        }
        walk(&mut self.nodes, &mut f)
    }
}

impl fmt::Display for ParsedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            write!(f, "{}", node)?;
        }
        Ok(())
    }
}

/// Value parser state
struct ValueParser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    root: Vec<ValueNode>,
    /// Open functions, innermost last
    stack: Vec<ValueNode>,
    /// Name of the function about to open
    name: String,
    /// Whitespace waiting for the next div
    before: String,
    /// Whitespace waiting for the next ')'
    after: String,
}

impl<'a> ValueParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            root: Vec::new(),
            stack: Vec::new(),
            name: String::new(),
            before: String::new(),
            after: String::new(),
        }
    }

    fn byte_at(&self, pos: usize) -> Option<u8> {
        self.bytes.get(pos).copied()
    }

    fn current(&mut self) -> &mut Vec<ValueNode> {
        match self.stack.last_mut() {
            Some(function) => match &mut function.kind {
                NodeKind::Function { nodes, .. } => nodes,
                _ => unreachable!("only functions are pushed on the stack"),
            },
            None => &mut self.root,
        }
    }

    fn in_calc(&self) -> bool {
        self.stack
            .last()
            .map(|f| f.value.eq_ignore_ascii_case("calc"))
            .unwrap_or(false)
    }

    fn parse(mut self) -> Vec<ValueNode> {
        let len = self.bytes.len();

        while self.pos < len {
            let b = self.bytes[self.pos];
            match b {
                _ if is_space(b) => self.consume_space(),
                b'\'' | b'"' => self.consume_string(b as char),
                b'/' if self.byte_at(self.pos + 1) == Some(b'*') => self.consume_comment(),
                b'/' | b'*' if self.in_calc() => {
                    let node = ValueNode::new(NodeKind::Word, &self.input[self.pos..self.pos + 1], self.pos, self.pos + 1);
                    self.current().push(node);
                    self.pos += 1;
                }
                b'/' | b',' | b':' => {
                    let before = std::mem::take(&mut self.before);
                    let node = ValueNode::new(
                        NodeKind::Div {
                            before: before.clone(),
                            after: String::new(),
                        },
                        &self.input[self.pos..self.pos + 1],
                        self.pos - before.len(),
                        self.pos + 1,
                    );
                    self.current().push(node);
                    self.pos += 1;
                }
                b'(' => self.open_function(),
                b')' if !self.stack.is_empty() => self.close_function(),
                _ => self.consume_word(),
            }
        }

        while let Some(mut function) = self.stack.pop() {
            if let NodeKind::Function { unclosed, .. } = &mut function.kind {
                *unclosed = true;
            }
            function.source_end_index = len;
            self.current().push(function);
        }

        self.root
    }

    fn consume_space(&mut self) {
        let input = self.input;
        let start = self.pos;
        let mut next = start;
        while next < self.bytes.len() && is_space(self.bytes[next]) {
            next += 1;
        }
        let token = &input[start..next];
        let code = self.byte_at(next);
        let slash_div = code == Some(b'/') && self.byte_at(next + 1) != Some(b'*') && !self.in_calc();

        if code == Some(b')') && !self.stack.is_empty() {
            self.after = token.to_string();
        } else if let Some(prev) = self.current().last_mut().filter(|n| matches!(n.kind, NodeKind::Div { .. })) {
            if let NodeKind::Div { after, .. } = &mut prev.kind {
                after.push_str(token);
            }
            prev.source_end_index += token.len();
        } else if matches!(code, Some(b',') | Some(b':')) || slash_div {
            self.before = token.to_string();
        } else {
            self.current().push(ValueNode::new(NodeKind::Space, token, start, next));
        }

        self.pos = next;
    }

    fn consume_string(&mut self, quote: char) {
        let start = self.pos;
        let mut next = start;
        let mut unclosed = false;

        loop {
            match self.input[next + 1..].find(quote) {
                Some(i) => {
                    next += 1 + i;
                    let escapes = self.bytes[start + 1..next]
                        .iter()
                        .rev()
                        .take_while(|&&b| b == b'\\')
                        .count();
                    if escapes % 2 == 0 {
                        break;
                    }
                }
                None => {
                    next = self.bytes.len();
                    unclosed = true;
                    break;
                }
            }
        }

        let end = if unclosed { next } else { next + 1 };
        let node = ValueNode::new(
            NodeKind::String { quote, unclosed },
            &self.input[start + 1..next],
            start,
            end,
        );
        self.current().push(node);
        self.pos = end;
    }

    fn consume_comment(&mut self) {
        let start = self.pos;
        let (value_end, end, unclosed) = match self.input[start + 2..].find("*/") {
            Some(i) => (start + 2 + i, start + 4 + i, false),
            None => (self.bytes.len(), self.bytes.len(), true),
        };
        let node = ValueNode::new(
            NodeKind::Comment { unclosed },
            &self.input[start + 2..value_end],
            start,
            end,
        );
        self.current().push(node);
        self.pos = end;
    }

    fn open_function(&mut self) {
        let open = self.pos;
        let mut next = open + 1;
        while next < self.bytes.len() && is_space(self.bytes[next]) {
            next += 1;
        }

        let name = std::mem::take(&mut self.name);
        let before = self.input[open + 1..next].to_string();
        let source_index = open - name.len();
        self.pos = next;

        let quoted = matches!(self.byte_at(next), Some(b'\'') | Some(b'"'));
        if name.eq_ignore_ascii_case("url") && !quoted {
            let node = self.consume_url(name, before, source_index, open);
            self.current().push(node);
        } else {
            let node = ValueNode::new(
                NodeKind::Function {
                    before,
                    after: String::new(),
                    nodes: Vec::new(),
                    unclosed: false,
                },
                name,
                source_index,
                next,
            );
            self.stack.push(node);
        }
    }

    /// Unquoted `url(...)`: the whole body is one word
    fn consume_url(&mut self, name: String, before: String, source_index: usize, open: usize) -> ValueNode {
        let len = self.bytes.len();
        let body = self.pos;

        let mut close = body;
        let mut unclosed = false;
        loop {
            match self.input[close..].find(')') {
                Some(i) => {
                    close += i;
                    let escapes = self.bytes[body..close]
                        .iter()
                        .rev()
                        .take_while(|&&b| b == b'\\')
                        .count();
                    if escapes % 2 == 0 {
                        break;
                    }
                    close += 1;
                }
                None => {
                    close = len;
                    unclosed = true;
                    break;
                }
            }
        }

        // Last non-space byte of the body
        let mut last = close;
        loop {
            last -= 1;
            if !is_space(self.bytes[last]) {
                break;
            }
        }

        let mut nodes = Vec::new();
        let mut after = String::new();
        if open < last {
            nodes.push(ValueNode::new(NodeKind::Word, &self.input[body..last + 1], body, last + 1));
            if unclosed && last + 1 != close {
                nodes.push(ValueNode::new(NodeKind::Space, &self.input[last + 1..close], last + 1, close));
            } else {
                after = self.input[last + 1..close].to_string();
            }
        }

        self.pos = close + 1;
        let end = if unclosed { close } else { self.pos };
        ValueNode::new(
            NodeKind::Function {
                before,
                after,
                nodes,
                unclosed,
            },
            name,
            source_index,
            end,
        )
    }

    fn close_function(&mut self) {
        self.pos += 1;
        let after = std::mem::take(&mut self.after);
        if let Some(mut function) = self.stack.pop() {
            if let NodeKind::Function { after: slot, .. } = &mut function.kind {
                *slot = after;
            }
            function.source_end_index = self.pos;
            self.current().push(function);
        }
    }

    fn consume_word(&mut self) {
        let input = self.input;
        let len = self.bytes.len();
        let start = self.pos;
        let mut next = start;
        let in_calc = self.in_calc();
        let balanced = !self.stack.is_empty();

        loop {
            if self.bytes[next] == b'\\' {
                next += 1;
            }
            next += 1;
            if next >= len {
                break;
            }
            let c = self.bytes[next];
            let stop = is_space(c)
                || matches!(c, b'\'' | b'"' | b',' | b':' | b'/' | b'(')
                || (c == b'*' && in_calc)
                || (c == b')' && balanced);
            if stop {
                break;
            }
        }
        let next = next.min(len);

        let token = &input[start..next];
        if self.byte_at(next) == Some(b'(') {
            self.name = token.to_string();
        } else {
            let kind = if is_unicode_range(token) {
                NodeKind::UnicodeRange
            } else {
                NodeKind::Word
            };
            self.current().push(ValueNode::new(kind, token, start, next));
        }
        self.pos = next;
    }
}

fn is_space(b: u8) -> bool {
    b <= b' '
}

fn is_unicode_range(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.len() > 2
        && matches!(bytes[0], b'u' | b'U')
        && bytes[1] == b'+'
        && (bytes[2].is_ascii_hexdigit() || bytes[2] == b'?' || bytes[2] == b'-')
}
