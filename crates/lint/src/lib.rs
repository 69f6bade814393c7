//! Tinct Lint
//!
//! Rule framework and built-in rules. A [`Linter`] is built from a
//! [`Config`] and a [`RuleRegistry`]; it walks the declarations of a parsed
//! stylesheet and either reports [`Diagnostic`]s or fixes values in place.

pub mod config;
pub mod diagnostic;
pub mod error;
pub mod linter;
pub mod rule;
pub mod rules;

pub use config::{Config, RuleSettings, SecondaryOptions, Severity, DEFAULT_CONFIG_FILE};
pub use diagnostic::Diagnostic;
pub use error::{LintError, LintResult};
pub use linter::{lint_source, LintReport, Linter};
pub use rule::{Rule, RuleContext, RuleMeta, RuleRegistry};
