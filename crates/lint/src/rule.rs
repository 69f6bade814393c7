//! Rule interface and registry

use rustc_hash::FxHashMap;
use tinct_css::{Declaration, SourceMap};

use crate::config::{RuleSettings, SecondaryOptions, Severity};
use crate::diagnostic::Diagnostic;
use crate::error::LintResult;

/// Static description of a rule
#[derive(Debug)]
pub struct RuleMeta {
    pub name: &'static str,
    pub description: &'static str,
    pub url: &'static str,
    pub fixable: bool,
}

/// A configured rule, checked against one declaration at a time
pub trait Rule {
    fn meta(&self) -> &'static RuleMeta;

    /// Check a declaration, reporting through `ctx` or fixing the value in place
    fn check(&self, decl: &mut Declaration, ctx: &mut RuleContext<'_>) -> LintResult<()>;
}

/// Builds a rule from its settings, rejecting invalid options
pub type RuleFactory = fn(&RuleSettings) -> LintResult<Box<dyn Rule>>;

/// Everything a rule may touch while checking a declaration
pub struct RuleContext<'a> {
    meta: &'static RuleMeta,
    fix: bool,
    options: &'a SecondaryOptions,
    source_map: &'a SourceMap<'a>,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        meta: &'static RuleMeta,
        fix: bool,
        options: &'a SecondaryOptions,
        source_map: &'a SourceMap<'a>,
        diagnostics: &'a mut Vec<Diagnostic>,
    ) -> Self {
        Self {
            meta,
            fix: fix && meta.fixable && !options.disable_fix,
            options,
            source_map,
            diagnostics,
        }
    }

    /// Whether problems should be fixed instead of reported
    pub fn fix(&self) -> bool {
        self.fix
    }

    pub fn severity(&self) -> Severity {
        self.options.severity
    }

    /// Report a problem spanning the byte range `start..end` of the stylesheet.
    /// `args` fill the `%s` placeholders of a configured custom message.
    pub fn report(&mut self, decl: &Declaration, start: usize, end: usize, message: String, args: &[&str]) {
        let message = match &self.options.message {
            Some(custom) => substitute(custom, args),
            None => message,
        };
        let from = self.source_map.location(start);
        let to = self.source_map.location(end);

        self.diagnostics.push(Diagnostic {
            rule: self.meta.name,
            severity: self.options.severity,
            message,
            property: decl.property.clone(),
            start,
            end,
            line: from.line,
            column: from.column,
            end_line: to.line,
            end_column: to.column,
        });
    }
}

fn substitute(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut parts = template.split("%s");
    if let Some(first) = parts.next() {
        out.push_str(first);
    }
    for part in parts {
        out.push_str(args.next().copied().unwrap_or("%s"));
        out.push_str(part);
    }
    out
}

/// Rule names mapped to their factories, built once at startup
#[derive(Default)]
pub struct RuleRegistry {
    rules: FxHashMap<&'static str, (&'static RuleMeta, RuleFactory)>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every rule that ships with tinct
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        crate::rules::register_builtin(&mut registry);
        registry
    }

    pub fn register(&mut self, meta: &'static RuleMeta, factory: RuleFactory) {
        self.rules.insert(meta.name, (meta, factory));
    }

    pub fn meta(&self, name: &str) -> Option<&'static RuleMeta> {
        self.rules.get(name).map(|(meta, _)| *meta)
    }

    pub fn factory(&self, name: &str) -> Option<(&'static RuleMeta, RuleFactory)> {
        self.rules.get(name).copied()
    }

    /// Registered rule names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.rules.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
