//! Tinct CSS
//!
//! Lossless stylesheet and value parsing for the linter: every parsed
//! structure remembers where it came from and serializes back to exactly the
//! text it was parsed from, apart from the parts that were edited.

pub mod error;
pub mod parser;
pub mod syntax;
pub mod tokenizer;
pub mod unit;
pub mod value;

pub use error::{CssError, CssResult, SourceLocation};
pub use parser::{AtRule, Comment, Declaration, Node, SourceMap, StyleRule, Stylesheet};
pub use syntax::is_standard_syntax_value;
pub use unit::{is_degree, is_number, unit, Dimension};
pub use value::{NodeKind, ParsedValue, ValueNode};
