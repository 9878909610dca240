//! Built-in rules and rulesets

mod controls;
mod images;
mod keyboard;
mod links;
mod structure;
mod timing;

use crate::rules::definition::RuleCategory;
use crate::rules::registry::{RuleSelector, RulesetDefinition};
use crate::rules::StaticRule;

/// Every built-in rule, in registry order
pub fn builtin_rules() -> Vec<StaticRule> {
    let mut rules = Vec::new();
    rules.extend(controls::rules());
    rules.extend(images::rules());
    rules.extend(links::rules());
    rules.extend(structure::rules());
    rules.extend(timing::rules());
    rules.extend(keyboard::rules());
    rules
}

/// Built-in named rulesets
pub fn builtin_rulesets() -> Vec<RulesetDefinition> {
    vec![
        RulesetDefinition::new("WCAG20", "WCAG 2.0 Level A and AA")
            .with_selector(RuleSelector::All)
            .recommend("LINK_2")
            .recommend("TIMING_1"),
        RulesetDefinition::new("FORMS", "Form controls").with_category(RuleCategory::Forms),
        RulesetDefinition::new("PAGE_STRUCTURE", "Page structure")
            .with_category(RuleCategory::Landmarks)
            .with_category(RuleCategory::Headings)
            .with_category(RuleCategory::StylesReadability),
    ]
}
