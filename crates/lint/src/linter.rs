//! Lint driver
//!
//! Builds the configured rules once, then runs them over stylesheets.

use log::{debug, info};
use tinct_css::Stylesheet;

use crate::config::{Config, RuleSettings, SecondaryOptions, Severity};
use crate::diagnostic::Diagnostic;
use crate::error::{LintError, LintResult};
use crate::rule::{Rule, RuleContext, RuleRegistry};

/// An enabled rule and its secondary options
struct ConfiguredRule {
    rule: Box<dyn Rule>,
    options: SecondaryOptions,
}

/// Runs a fixed set of configured rules
pub struct Linter {
    rules: Vec<ConfiguredRule>,
}

/// Outcome of linting one stylesheet
#[derive(Debug, Clone, Default)]
pub struct LintReport {
    /// Remaining problems, sorted by offset
    pub diagnostics: Vec<Diagnostic>,
    /// Fixed stylesheet text, only when fixing changed something
    pub output: Option<String>,
}

impl LintReport {
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == severity).count()
    }
}

impl Linter {
    /// Build every rule enabled in `config`. Unknown rules and bad options fail here,
    /// before any stylesheet is looked at.
    pub fn new(config: &Config, registry: &RuleRegistry) -> LintResult<Self> {
        let mut rules = Vec::new();

        for name in config.rule_names() {
            let (meta, factory) = registry
                .factory(name)
                .ok_or_else(|| LintError::UnknownRule(name.to_string()))?;

            let settings = match RuleSettings::from_value(meta.name, &config.rules[name])? {
                Some(settings) => settings,
                None => {
                    debug!("Rule {} is disabled", meta.name);
                    continue;
                }
            };

            let rule = factory(&settings)?;
            debug!("Enabled rule {} with {}", meta.name, settings.primary);
            rules.push(ConfiguredRule {
                rule,
                options: settings.secondary,
            });
        }

        Ok(Self { rules })
    }

    /// Number of enabled rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Lint a parsed stylesheet. In fix mode fixable problems are rewritten in
    /// the stylesheet instead of being reported.
    pub fn lint(&self, stylesheet: &mut Stylesheet, fix: bool) -> LintResult<LintReport> {
        let mut diagnostics = Vec::new();

        for configured in &self.rules {
            let meta = configured.rule.meta();
            stylesheet.try_walk_declarations_mut(|decl, source_map| {
                let mut ctx = RuleContext::new(meta, fix, &configured.options, source_map, &mut diagnostics);
                configured.rule.check(decl, &mut ctx)
            })?;
        }

        diagnostics.sort_by_key(|d| (d.start, d.end));

        let output = if fix && stylesheet.is_modified() {
            Some(stylesheet.to_css())
        } else {
            None
        };

        info!(
            "Linted with {} rule(s): {} problem(s){}",
            self.rules.len(),
            diagnostics.len(),
            if output.is_some() { ", fixed" } else { "" }
        );

        Ok(LintReport { diagnostics, output })
    }
}

/// Parse `source`, lint it and serialize any fixes
pub fn lint_source(source: &str, linter: &Linter, fix: bool) -> LintResult<LintReport> {
    let mut stylesheet = Stylesheet::parse(source)?;
    linter.lint(&mut stylesheet, fix)
}
