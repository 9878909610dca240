use crate::error::{EvalError, Result};
use crate::rules::catalog;
use crate::rules::definition::RuleCategory;
use crate::rules::Rule;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Picks rules for a ruleset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSelector {
    /// Every registered rule
    All,
    /// A single rule by id
    Id(String),
    /// Every rule of a category
    Category(RuleCategory),
}

/// Declarative description of a named ruleset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesetDefinition {
    pub id: String,
    pub title: String,
    pub selectors: Vec<RuleSelector>,

    /// Rules whose failures count as warnings instead of violations
    #[serde(default)]
    pub recommended: IndexSet<String>,

    /// Rules selected but switched off
    #[serde(default)]
    pub disabled: IndexSet<String>,
}

impl RulesetDefinition {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            selectors: Vec::new(),
            recommended: IndexSet::new(),
            disabled: IndexSet::new(),
        }
    }

    /// Builder method: add a selector
    pub fn with_selector(mut self, selector: RuleSelector) -> Self {
        self.selectors.push(selector);
        self
    }

    /// Builder method: select a rule by id
    pub fn with_rule(self, rule_id: impl Into<String>) -> Self {
        self.with_selector(RuleSelector::Id(rule_id.into()))
    }

    /// Builder method: select a category
    pub fn with_category(self, category: RuleCategory) -> Self {
        self.with_selector(RuleSelector::Category(category))
    }

    /// Builder method: mark a rule as recommended
    pub fn recommend(mut self, rule_id: impl Into<String>) -> Self {
        self.recommended.insert(rule_id.into());
        self
    }

    /// Builder method: disable a rule
    pub fn disable(mut self, rule_id: impl Into<String>) -> Self {
        self.disabled.insert(rule_id.into());
        self
    }

    fn selects(&self, rule: &dyn Rule) -> bool {
        self.selectors.iter().any(|selector| match selector {
            RuleSelector::All => true,
            RuleSelector::Id(id) => id == rule.id(),
            RuleSelector::Category(category) => *category == rule.definition().category,
        })
    }
}

/// A rule as it participates in a ruleset
#[derive(Clone)]
pub struct RuleMapping {
    pub rule: Arc<dyn Rule>,

    /// Failures count as violations (otherwise as warnings)
    pub required: bool,

    /// Disabled rules are not evaluated
    pub enabled: bool,
}

impl std::fmt::Debug for RuleMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleMapping")
            .field("rule", &self.rule.id())
            .field("required", &self.required)
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// A resolved, ordered selection of rules
#[derive(Debug, Clone)]
pub struct Ruleset {
    id: String,
    title: String,
    mappings: Vec<RuleMapping>,
}

impl Ruleset {
    /// Ruleset from a caller-supplied rule sequence (all required and enabled)
    pub fn from_rules(id: impl Into<String>, rules: Vec<Arc<dyn Rule>>) -> Result<Self> {
        let id = id.into();
        let mut seen = IndexSet::new();
        let mut mappings = Vec::with_capacity(rules.len());
        for rule in rules {
            if !seen.insert(rule.id().to_string()) {
                return Err(EvalError::DuplicateRuleId(rule.id().to_string()));
            }
            mappings.push(RuleMapping {
                rule,
                required: true,
                enabled: true,
            });
        }
        Ok(Self {
            title: id.clone(),
            id,
            mappings,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// All mappings, in registry order
    pub fn mappings(&self) -> &[RuleMapping] {
        &self.mappings
    }

    /// Mappings that will be evaluated
    pub fn enabled(&self) -> impl Iterator<Item = &RuleMapping> {
        self.mappings.iter().filter(|m| m.enabled)
    }

    pub fn mapping(&self, rule_id: &str) -> Option<&RuleMapping> {
        self.mappings.iter().find(|m| m.rule.id() == rule_id)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

/// Registry of rules and named rulesets
pub struct RuleRegistry {
    rules: IndexMap<String, Arc<dyn Rule>>,
    rulesets: IndexMap<String, RulesetDefinition>,
}

impl RuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            rules: IndexMap::new(),
            rulesets: IndexMap::new(),
        }
    }

    /// Create a registry with the built-in rules and rulesets
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        for rule in catalog::builtin_rules() {
            if let Err(e) = registry.register(rule) {
                log::warn!("Skipping built-in rule: {}", e);
            }
        }
        for ruleset in catalog::builtin_rulesets() {
            if let Err(e) = registry.register_ruleset(ruleset) {
                log::warn!("Skipping built-in ruleset: {}", e);
            }
        }

        registry
    }

    /// Register a rule
    pub fn register<R: Rule + 'static>(&mut self, rule: R) -> Result<()> {
        self.register_arc(Arc::new(rule))
    }

    /// Register a shared rule
    pub fn register_arc(&mut self, rule: Arc<dyn Rule>) -> Result<()> {
        let id = rule.id().to_string();
        if self.rules.contains_key(&id) {
            return Err(EvalError::DuplicateRuleId(id));
        }
        self.rules.insert(id, rule);
        Ok(())
    }

    /// Register a named ruleset; every id selector must name a registered rule
    pub fn register_ruleset(&mut self, definition: RulesetDefinition) -> Result<()> {
        for selector in &definition.selectors {
            if let RuleSelector::Id(rule_id) = selector {
                if !self.rules.contains_key(rule_id) {
                    return Err(EvalError::UnknownRule {
                        ruleset: definition.id.clone(),
                        rule_id: rule_id.clone(),
                    });
                }
            }
        }
        if self.rulesets.contains_key(&definition.id) {
            log::debug!("Replacing ruleset definition '{}'", definition.id);
        }
        self.rulesets.insert(definition.id.clone(), definition);
        Ok(())
    }

    /// Get a rule by id
    pub fn get(&self, rule_id: &str) -> Option<&Arc<dyn Rule>> {
        self.rules.get(rule_id)
    }

    /// Check if a rule exists
    pub fn has(&self, rule_id: &str) -> bool {
        self.rules.contains_key(rule_id)
    }

    /// Resolve a named ruleset in registry order
    pub fn get_ruleset(&self, name: &str) -> Result<Ruleset> {
        let definition = self
            .rulesets
            .get(name)
            .ok_or_else(|| EvalError::UnknownRuleset(name.to_string()))?;

        let mappings = self
            .rules
            .values()
            .filter(|rule| definition.selects(rule.as_ref()))
            .map(|rule| RuleMapping {
                rule: Arc::clone(rule),
                required: !definition.recommended.contains(rule.id()),
                enabled: !definition.disabled.contains(rule.id()),
            })
            .collect();

        Ok(Ruleset {
            id: definition.id.clone(),
            title: definition.title.clone(),
            mappings,
        })
    }

    /// Registered rules in registry order
    pub fn rules(&self) -> impl Iterator<Item = &Arc<dyn Rule>> {
        self.rules.values()
    }

    /// Registered ruleset definitions
    pub fn rulesets(&self) -> impl Iterator<Item = &RulesetDefinition> {
        self.rulesets.values()
    }

    pub fn ruleset_names(&self) -> Vec<&str> {
        self.rulesets.keys().map(String::as_str).collect()
    }

    /// Number of registered rules
    pub fn count(&self) -> usize {
        self.rules.len()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::definition::{RuleDefinition, RuleGroup, RuleScope};
    use crate::rules::{RuleContext, StaticRule};

    fn noop(_context: &mut RuleContext<'_>) -> Result<()> {
        Ok(())
    }

    fn rule(id: &str, category: RuleCategory) -> StaticRule {
        StaticRule::new(
            RuleDefinition::new(id, RuleScope::Element, category, RuleGroup::Group1, "1.1.1"),
            noop,
        )
    }

    #[test]
    fn test_registry_creation() {
        let registry = RuleRegistry::new();
        assert_eq!(registry.count(), 0);
        assert!(registry.ruleset_names().is_empty());
    }

    #[test]
    fn test_with_defaults() {
        let registry = RuleRegistry::with_defaults();
        assert!(registry.has("CONTROL_1"));
        assert!(registry.has("KEYBOARD_1"));
        assert_eq!(registry.ruleset_names(), vec!["WCAG20", "FORMS", "PAGE_STRUCTURE"]);

        let wcag = registry.get_ruleset("WCAG20").unwrap();
        assert_eq!(wcag.len(), registry.count());
    }

    #[test]
    fn test_duplicate_rule_id() {
        let mut registry = RuleRegistry::new();
        registry.register(rule("A_1", RuleCategory::Forms)).unwrap();

        let err = registry.register(rule("A_1", RuleCategory::Links)).unwrap_err();
        assert!(matches!(err, EvalError::DuplicateRuleId(id) if id == "A_1"));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_unknown_ruleset() {
        let registry = RuleRegistry::with_defaults();
        let err = registry.get_ruleset("WCAG99").unwrap_err();
        assert!(matches!(err, EvalError::UnknownRuleset(name) if name == "WCAG99"));
    }

    #[test]
    fn test_ruleset_selection_keeps_registry_order() {
        let mut registry = RuleRegistry::new();
        registry.register(rule("B_1", RuleCategory::Links)).unwrap();
        registry.register(rule("A_1", RuleCategory::Forms)).unwrap();
        registry.register(rule("C_1", RuleCategory::Forms)).unwrap();
        registry
            .register_ruleset(
                RulesetDefinition::new("MIX", "Mixed")
                    .with_category(RuleCategory::Forms)
                    .with_rule("B_1")
                    .recommend("C_1")
                    .disable("A_1"),
            )
            .unwrap();

        let ruleset = registry.get_ruleset("MIX").unwrap();
        let ids: Vec<_> = ruleset.mappings().iter().map(|m| m.rule.id()).collect();
        assert_eq!(ids, vec!["B_1", "A_1", "C_1"]);
        assert!(!ruleset.mapping("C_1").unwrap().required);
        assert!(!ruleset.mapping("A_1").unwrap().enabled);
        assert_eq!(ruleset.enabled().count(), 2);
    }

    #[test]
    fn test_ruleset_with_unknown_rule() {
        let mut registry = RuleRegistry::new();
        let err = registry
            .register_ruleset(RulesetDefinition::new("BAD", "Bad").with_rule("NOPE_1"))
            .unwrap_err();
        assert!(matches!(err, EvalError::UnknownRule { .. }));
    }

    #[test]
    fn test_ruleset_from_rules() {
        let rules: Vec<Arc<dyn Rule>> = vec![
            Arc::new(rule("X_1", RuleCategory::Images)),
            Arc::new(rule("X_1", RuleCategory::Images)),
        ];
        assert!(matches!(
            Ruleset::from_rules("custom", rules),
            Err(EvalError::DuplicateRuleId(_))
        ));
    }
}
