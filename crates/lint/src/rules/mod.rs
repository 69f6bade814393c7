//! Built-in rules

pub mod hue_degree_notation;

use crate::rule::RuleRegistry;

pub use hue_degree_notation::{HueDegreeNotation, HueNotation};

/// Register every built-in rule
pub fn register_builtin(registry: &mut RuleRegistry) {
    registry.register(&hue_degree_notation::META, hue_degree_notation::create);
}
