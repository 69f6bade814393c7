//! hue-degree-notation
//!
//! Require the hue of `hsl()`, `hsla()`, `hwb()`, `lch()` and `oklch()` to
//! be written either with the `deg` unit (`"angle"`) or as a bare number
//! (`"number"`).
//!
//! Only hues that are already a bare number or a `deg` dimension are
//! considered. Other angle units, variables, interpolation and nested
//! functions are left alone.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use log::{debug, trace};
use regex::Regex;
use serde_json::Value;
use smallvec::SmallVec;
use tinct_css::{is_degree, is_number, is_standard_syntax_value, unit, Declaration, ParsedValue, ValueNode};

use crate::config::RuleSettings;
use crate::error::{LintError, LintResult};
use crate::rule::{Rule, RuleContext, RuleMeta};

pub static META: RuleMeta = RuleMeta {
    name: "hue-degree-notation",
    description: "Specify number or angle notation for degree hues",
    url: "https://stylelint.io/user-guide/rules/hue-degree-notation",
    fixable: true,
};

/// Position of the hue among the arguments of each hue-bearing function.
/// HSL-style spaces lead with the hue; LCH-style spaces end with it.
const HUE_POSITIONS: &[(&str, usize)] = &[
    ("hsl", 0),
    ("hsla", 0),
    ("hwb", 0),
    ("lch", 2),
    ("oklch", 2),
];

static HAS_HUE_COLOR_FUNC: LazyLock<Regex> = LazyLock::new(|| {
    let names: Vec<&str> = HUE_POSITIONS.iter().map(|(name, _)| *name).collect();
    Regex::new(&format!(r"(?i)\b(?:{})\(", names.join("|"))).expect("invalid hue function pattern")
});

/// Message for a hue written the wrong way
pub fn expected(unfixed: &str, fixed: &str) -> String {
    format!("Expected \"{}\" to be \"{}\"", unfixed, fixed)
}

/// Required hue notation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HueNotation {
    /// `200deg`
    Angle,
    /// `200`
    Number,
}

impl HueNotation {
    /// Whether a hue already uses this notation
    pub fn accepts(self, hue: &str) -> bool {
        match self {
            HueNotation::Angle => is_degree(hue),
            HueNotation::Number => is_number(hue),
        }
    }

    /// Rewrite a hue into this notation
    pub fn apply(self, hue: &str) -> LintResult<String> {
        match self {
            HueNotation::Angle => Ok(to_angle(hue)),
            HueNotation::Number => to_number(hue),
        }
    }

    fn from_settings(settings: &RuleSettings) -> LintResult<Self> {
        settings
            .primary
            .as_str()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| LintError::invalid_option(META.name, &settings.primary))
    }
}

impl FromStr for HueNotation {
    type Err = LintError;

    fn from_str(s: &str) -> LintResult<Self> {
        match s {
            "angle" => Ok(HueNotation::Angle),
            "number" => Ok(HueNotation::Number),
            _ => Err(LintError::invalid_option(META.name, &Value::from(s))),
        }
    }
}

impl fmt::Display for HueNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HueNotation::Angle => f.write_str("angle"),
            HueNotation::Number => f.write_str("number"),
        }
    }
}

/// `200` -> `200deg`
pub fn to_angle(hue: &str) -> String {
    format!("{}deg", hue)
}

/// `200deg` -> `200`. Only valid for hues that carry a unit.
pub fn to_number(hue: &str) -> LintResult<String> {
    match unit(hue) {
        Some(dimension) if !dimension.is_unitless() => Ok(dimension.number.to_string()),
        _ => Err(LintError::MissingUnit(hue.to_string())),
    }
}

/// Index of the hue argument for a function name, `None` if the function has no hue
pub fn hue_position(function: &str) -> Option<usize> {
    HUE_POSITIONS
        .iter()
        .find(|(name, _)| function.eq_ignore_ascii_case(name))
        .map(|&(_, position)| position)
}

/// Positional arguments of a function: words and nested functions only
pub fn arguments(function: &mut ValueNode) -> SmallVec<[&mut ValueNode; 4]> {
    match function.nodes_mut() {
        Some(nodes) => nodes
            .iter_mut()
            .filter(|node| node.is_word() || node.is_function())
            .collect(),
        None => SmallVec::new(),
    }
}

/// The hue argument of a hue-bearing function call, if it has enough arguments
pub fn locate_hue(function: &mut ValueNode) -> Option<&mut ValueNode> {
    if !function.is_function() {
        return None;
    }
    let position = hue_position(&function.value)?;
    arguments(function).into_iter().nth(position)
}

/// The hue-degree-notation rule
#[derive(Debug, Clone)]
pub struct HueDegreeNotation {
    notation: HueNotation,
}

impl HueDegreeNotation {
    pub fn new(notation: HueNotation) -> Self {
        Self { notation }
    }
}

/// Factory used by the rule registry
pub fn create(settings: &RuleSettings) -> LintResult<Box<dyn Rule>> {
    let notation = HueNotation::from_settings(settings)?;
    Ok(Box::new(HueDegreeNotation::new(notation)))
}

impl Rule for HueDegreeNotation {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn check(&self, decl: &mut Declaration, ctx: &mut RuleContext<'_>) -> LintResult<()> {
        if !HAS_HUE_COLOR_FUNC.is_match(decl.value()) {
            return Ok(());
        }

        let mut parsed = ParsedValue::parse(decl.value());
        let value_offset = decl.value_offset();
        let mut needs_fix = false;

        parsed.try_walk_mut(|node| -> LintResult<()> {
            let hue = match locate_hue(node) {
                Some(hue) => hue,
                None => return Ok(()),
            };

            let unfixed = hue.value.as_str();
            if !is_standard_syntax_value(unfixed) {
                trace!("Skipping non-standard hue {:?}", unfixed);
                return Ok(());
            }
            if !is_degree(unfixed) && !is_number(unfixed) {
                trace!("Skipping hue {:?} with unsupported unit", unfixed);
                return Ok(());
            }
            if self.notation.accepts(unfixed) {
                return Ok(());
            }

            let fixed = self.notation.apply(unfixed)?;

            if ctx.fix() {
                hue.value = fixed;
                needs_fix = true;
                return Ok(());
            }

            ctx.report(
                &*decl,
                value_offset + hue.source_index,
                value_offset + hue.source_end_index,
                expected(unfixed, &fixed),
                &[unfixed, &fixed],
            );
            Ok(())
        })?;

        if needs_fix {
            let value = parsed.to_string();
            debug!("Rewrote {}: {:?} -> {:?}", decl.property, decl.value(), value);
            decl.set_value(value);
        }

        Ok(())
    }
}
