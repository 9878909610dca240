//! Ruleset execution
//!
//! The evaluator builds one [`DomCache`] per document and runs the enabled
//! rules of its ruleset against it, one after another, in registry order. Each
//! rule gets a fresh [`RuleContext`]; an error or panic inside a rule becomes a
//! `RULE_EXECUTION_ERROR` diagnostic for that rule only.

use crate::cache::{DomCache, DomCacheBuilder};
use crate::dom::HostNode;
use crate::error::{EvalError, Result};
use crate::result::{EvaluationResult, RuleDiagnostic, RuleRun};
use crate::rules::{RuleContext, RuleMapping, Ruleset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;

/// Whether rules may inspect inline event handlers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventProcessing {
    #[default]
    None,
    Allowed,
}

impl FromStr for EventProcessing {
    type Err = EvalError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(EventProcessing::None),
            "allowed" => Ok(EventProcessing::Allowed),
            _ => Err(EvalError::InvalidFeatureValue {
                feature: Features::EVENT_PROCESSING.to_string(),
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for EventProcessing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventProcessing::None => f.write_str("none"),
            EventProcessing::Allowed => f.write_str("allowed"),
        }
    }
}

/// A loosely typed feature value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureValue {
    Bool(bool),
    Text(String),
}

impl From<bool> for FeatureValue {
    fn from(value: bool) -> Self {
        FeatureValue::Bool(value)
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::Text(value.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        FeatureValue::Text(value)
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Bool(value) => write!(f, "{}", value),
            FeatureValue::Text(value) => f.write_str(value),
        }
    }
}

/// Read-only configuration consulted by individual rules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    /// Inline event handler checks
    #[serde(default)]
    pub event_processing: EventProcessing,

    /// Report links whose targets need to be checked
    #[serde(default)]
    pub broken_link_testing: bool,
}

impl Features {
    pub const EVENT_PROCESSING: &'static str = "eventProcessing";
    pub const BROKEN_LINK_TESTING: &'static str = "brokenLinkTesting";

    /// Builder method: set event processing
    pub fn with_event_processing(mut self, value: EventProcessing) -> Self {
        self.event_processing = value;
        self
    }

    /// Builder method: set broken link testing
    pub fn with_broken_link_testing(mut self, enabled: bool) -> Self {
        self.broken_link_testing = enabled;
        self
    }

    /// Set one feature by name (case-insensitive)
    pub fn set(&mut self, name: &str, value: FeatureValue) -> Result<()> {
        let invalid = |value: &FeatureValue, feature: &str| EvalError::InvalidFeatureValue {
            feature: feature.to_string(),
            value: value.to_string(),
        };

        if name.eq_ignore_ascii_case(Self::EVENT_PROCESSING) {
            self.event_processing = match &value {
                FeatureValue::Text(text) => text.parse()?,
                FeatureValue::Bool(_) => return Err(invalid(&value, Self::EVENT_PROCESSING)),
            };
        } else if name.eq_ignore_ascii_case(Self::BROKEN_LINK_TESTING) {
            self.broken_link_testing = match &value {
                FeatureValue::Bool(enabled) => *enabled,
                FeatureValue::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                    "true" => true,
                    "false" => false,
                    _ => return Err(invalid(&value, Self::BROKEN_LINK_TESTING)),
                },
            };
        } else {
            return Err(EvalError::UnknownFeature(name.to_string()));
        }
        Ok(())
    }

    /// Build features from name/value pairs, failing on the first bad entry
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FeatureValue>,
    {
        let mut features = Features::default();
        for (name, value) in pairs {
            features.set(name.as_ref(), value.into())?;
        }
        Ok(features)
    }

    /// Parse a JSON object of features
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(|e| EvalError::InvalidFeatureValue {
            feature: "features".to_string(),
            value: e.to_string(),
        })?;
        let serde_json::Value::Object(map) = value else {
            return Err(EvalError::InvalidFeatureValue {
                feature: "features".to_string(),
                value: value.to_string(),
            });
        };

        let mut features = Features::default();
        for (name, value) in map {
            let value = match value {
                serde_json::Value::Bool(b) => FeatureValue::Bool(b),
                serde_json::Value::String(s) => FeatureValue::Text(s),
                other => {
                    return Err(EvalError::InvalidFeatureValue {
                        feature: name,
                        value: other.to_string(),
                    });
                }
            };
            features.set(&name, value)?;
        }
        Ok(features)
    }
}

/// Runs a ruleset against documents
#[derive(Debug, Clone)]
pub struct Evaluator {
    ruleset: Ruleset,
    features: Features,
}

impl Evaluator {
    pub fn new(ruleset: Ruleset, features: Features) -> Self {
        Self { ruleset, features }
    }

    /// Create an evaluator from loosely typed feature pairs
    ///
    /// Fails before any document is touched when a feature is invalid.
    pub fn with_feature_pairs<I, K, V>(ruleset: Ruleset, features: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FeatureValue>,
    {
        Ok(Self::new(ruleset, Features::from_pairs(features)?))
    }

    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    pub fn features(&self) -> &Features {
        &self.features
    }

    /// Build the cache for `document` and evaluate it
    pub fn evaluate<N: HostNode>(&self, document: &N) -> EvaluationResult {
        let cache = DomCacheBuilder::build(document);
        self.evaluate_cache(cache)
    }

    /// Evaluate an already built cache
    pub fn evaluate_cache(&self, cache: DomCache) -> EvaluationResult {
        log::info!(
            "Evaluating ruleset '{}' ({} rules) against {} nodes",
            self.ruleset.id(),
            self.ruleset.enabled().count(),
            cache.len()
        );

        let runs: Vec<RuleRun> = self
            .ruleset
            .enabled()
            .map(|mapping| self.run_rule(mapping, &cache))
            .collect();

        let failed = runs.iter().filter(|run| run.is_error()).count();
        if failed > 0 {
            log::warn!("{} rule(s) failed during evaluation", failed);
        }

        let definitions = self
            .ruleset
            .enabled()
            .map(|m| (m.rule.definition().clone(), m.required))
            .collect();

        EvaluationResult::new(self.ruleset.id(), cache, definitions, runs)
    }

    fn run_rule(&self, mapping: &RuleMapping, cache: &DomCache) -> RuleRun {
        let rule = mapping.rule.as_ref();
        let rule_id = rule.id();
        log::debug!("Running rule {}", rule_id);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut context = RuleContext::new(cache, &self.features, rule.definition());
            rule.evaluate(&mut context).map(|()| context.into_results())
        }));

        match outcome {
            Ok(Ok(results)) => {
                log::debug!("Rule {} produced {} result(s)", rule_id, results.len());
                RuleRun::completed(rule_id, mapping.required, results)
            }
            Ok(Err(e)) => {
                log::warn!("Rule {} failed: {}", rule_id, e);
                let diagnostic = RuleDiagnostic::execution_error(rule_id, e.to_string());
                RuleRun::failed(rule_id, mapping.required, diagnostic)
            }
            Err(payload) => {
                let reason = if let Some(s) = payload.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = payload.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "unknown panic".to_string()
                };
                log::warn!("Rule {} panicked: {}", rule_id, reason);
                let message = EvalError::rule(rule_id, format!("panicked: {}", reason)).to_string();
                RuleRun::failed(rule_id, mapping.required, RuleDiagnostic::execution_error(rule_id, message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::SnapshotNode;
    use crate::result::{ResultType, RULE_EXECUTION_ERROR};
    use crate::rules::{Rule, RuleCategory, RuleDefinition, RuleGroup, RuleScope, StaticRule};
    use std::sync::Arc;

    fn definition(id: &str) -> RuleDefinition {
        RuleDefinition::new(id, RuleScope::Page, RuleCategory::Headings, RuleGroup::Group1, "1.3.1")
    }

    fn page_pass(context: &mut RuleContext<'_>) -> Result<()> {
        if let Some(page) = context.page_element() {
            context.pass(page, "PAGE_PASS_1", vec![])?;
        }
        Ok(())
    }

    fn fails(context: &mut RuleContext<'_>) -> Result<()> {
        if let Some(page) = context.page_element() {
            context.pass(page, "PAGE_PASS_1", vec![])?;
        }
        Err(EvalError::rule(&context.definition().rule_id, "boom"))
    }

    fn panics(_context: &mut RuleContext<'_>) -> Result<()> {
        panic!("rule exploded");
    }

    fn ruleset(rules: Vec<StaticRule>) -> Ruleset {
        let rules: Vec<Arc<dyn Rule>> = rules.into_iter().map(|r| Arc::new(r) as Arc<dyn Rule>).collect();
        Ruleset::from_rules("TEST", rules).unwrap()
    }

    fn page() -> SnapshotNode {
        SnapshotNode::document(SnapshotNode::element("html").with_child(SnapshotNode::element("body")))
    }

    #[test]
    fn test_features_from_pairs() {
        let features = Features::from_pairs([
            ("EventProcessing", FeatureValue::from("Allowed")),
            ("brokenlinktesting", FeatureValue::from(true)),
        ])
        .unwrap();
        assert_eq!(features.event_processing, EventProcessing::Allowed);
        assert!(features.broken_link_testing);
    }

    #[test]
    fn test_invalid_feature_value() {
        let err = Features::from_pairs([("eventProcessing", "sometimes")]).unwrap_err();
        assert!(matches!(err, EvalError::InvalidFeatureValue { .. }));

        let err = Features::from_pairs([("brokenLinkTesting", "maybe")]).unwrap_err();
        assert!(matches!(err, EvalError::InvalidFeatureValue { .. }));

        let err = Features::from_pairs([("colorContrast", true)]).unwrap_err();
        assert!(matches!(err, EvalError::UnknownFeature(name) if name == "colorContrast"));
    }

    #[test]
    fn test_features_from_json() {
        let features = Features::from_json(r#"{"eventProcessing": "none", "brokenLinkTesting": true}"#).unwrap();
        assert_eq!(features, Features::default().with_broken_link_testing(true));

        assert!(Features::from_json(r#"{"brokenLinkTesting": 1}"#).is_err());
        assert!(Features::from_json("[]").is_err());
    }

    #[test]
    fn test_invalid_features_fail_at_construction() {
        let result = Evaluator::with_feature_pairs(ruleset(vec![]), [("eventProcessing", "bogus")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rule_isolation() {
        let evaluator = Evaluator::new(
            ruleset(vec![
                StaticRule::new(definition("FIRST_1"), page_pass),
                StaticRule::new(definition("BROKEN_1"), fails),
                StaticRule::new(definition("PANIC_1"), panics),
                StaticRule::new(definition("LAST_1"), page_pass),
            ]),
            Features::default(),
        );

        let result = evaluator.evaluate(&page());

        let diagnostics: Vec<_> = result.diagnostics().collect();
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.code == RULE_EXECUTION_ERROR));
        assert_eq!(diagnostics[0].rule_id, "BROKEN_1");
        assert_eq!(diagnostics[1].rule_id, "PANIC_1");
        assert!(diagnostics[1].message.contains("rule exploded"));

        // Partial results of the failing rule are discarded
        assert!(result.results_for("BROKEN_1").is_empty());
        assert_eq!(result.results_for("FIRST_1").len(), 1);
        assert_eq!(result.results_for("LAST_1").len(), 1);
        assert_eq!(result.summary().totals.pass, 2);
    }

    #[test]
    fn test_disabled_rules_are_skipped() {
        let mut registry = crate::rules::RuleRegistry::new();
        registry.register(StaticRule::new(definition("A_1"), page_pass)).unwrap();
        registry.register(StaticRule::new(definition("B_1"), page_pass)).unwrap();
        registry
            .register_ruleset(crate::rules::RulesetDefinition::new("R", "R").with_rule("A_1").with_rule("B_1").disable("B_1"))
            .unwrap();

        let evaluator = Evaluator::new(registry.get_ruleset("R").unwrap(), Features::default());
        let result = evaluator.evaluate(&page());
        assert_eq!(result.runs().len(), 1);
        assert_eq!(result.results().next().unwrap().result_type, ResultType::Pass);
    }
}
