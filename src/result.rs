use crate::aggregate::{ResultAggregator, ResultCounts, Summary};
use crate::cache::{DomCache, NodeCache, NodeId};
use crate::error::{EvalError, Result};
use crate::rules::{RuleCategory, RuleDefinition};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Diagnostic code attached to a rule whose evaluation failed
pub const RULE_EXECUTION_ERROR: &str = "RULE_EXECUTION_ERROR";

/// Outcome of a rule on one node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultType {
    Pass,
    Fail,
    ManualCheck,
    NotApplicable,
    Hidden,
}

impl ResultType {
    /// Dominance rank: FAIL > MANUAL_CHECK > PASS > NOT_APPLICABLE > HIDDEN
    pub fn severity(self) -> u8 {
        match self {
            ResultType::Hidden => 0,
            ResultType::NotApplicable => 1,
            ResultType::Pass => 2,
            ResultType::ManualCheck => 3,
            ResultType::Fail => 4,
        }
    }

    /// The dominant of two result types
    pub fn worst(self, other: ResultType) -> ResultType {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }
}

/// A single typed finding of a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleResult {
    pub rule_id: String,
    pub result_type: ResultType,
    /// Node of the cache the result refers to
    pub target: NodeId,
    pub message_id: String,
    #[serde(default)]
    pub message_args: Vec<String>,
}

/// A problem that prevented a rule from producing results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDiagnostic {
    pub rule_id: String,
    pub code: String,
    pub message: String,
}

impl RuleDiagnostic {
    pub fn execution_error(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            code: RULE_EXECUTION_ERROR.to_string(),
            message: message.into(),
        }
    }
}

/// Rule-level outcome derived from a rule's results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleOutcome {
    NotApplicable,
    Pass,
    ManualCheck,
    Warning,
    Violation,
    Error,
}

/// Everything one rule produced during an evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleRun {
    pub rule_id: String,
    pub required: bool,
    pub results: Vec<RuleResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<RuleDiagnostic>,
}

impl RuleRun {
    pub fn completed(rule_id: impl Into<String>, required: bool, results: Vec<RuleResult>) -> Self {
        Self {
            rule_id: rule_id.into(),
            required,
            results,
            diagnostic: None,
        }
    }

    /// A failed run keeps no partial results
    pub fn failed(rule_id: impl Into<String>, required: bool, diagnostic: RuleDiagnostic) -> Self {
        Self {
            rule_id: rule_id.into(),
            required,
            results: Vec::new(),
            diagnostic: Some(diagnostic),
        }
    }

    pub fn is_error(&self) -> bool {
        self.diagnostic.is_some()
    }

    /// Result counts for this rule
    pub fn counts(&self) -> ResultCounts {
        let mut counts = ResultCounts::default();
        for result in &self.results {
            counts.record(result.result_type, self.required);
        }
        counts
    }

    /// Worst element result, mapped onto the rule's requirement level
    pub fn outcome(&self) -> RuleOutcome {
        if self.is_error() {
            return RuleOutcome::Error;
        }
        let worst = self
            .results
            .iter()
            .map(|r| r.result_type)
            .reduce(ResultType::worst);
        match worst {
            Some(ResultType::Fail) if self.required => RuleOutcome::Violation,
            Some(ResultType::Fail) => RuleOutcome::Warning,
            Some(ResultType::ManualCheck) => RuleOutcome::ManualCheck,
            Some(ResultType::Pass) => RuleOutcome::Pass,
            _ => RuleOutcome::NotApplicable,
        }
    }
}

/// Result of evaluating one document against one ruleset
///
/// Owns the [`DomCache`] its results point into.
#[derive(Debug, Clone)]
pub struct EvaluationResult {
    ruleset_id: String,
    cache: DomCache,
    definitions: Vec<(RuleDefinition, bool)>,
    runs: Vec<RuleRun>,
    summary: Summary,
}

impl EvaluationResult {
    pub(crate) fn new(
        ruleset_id: impl Into<String>,
        cache: DomCache,
        definitions: Vec<(RuleDefinition, bool)>,
        runs: Vec<RuleRun>,
    ) -> Self {
        let aggregator = ResultAggregator::from_definitions(
            definitions.iter().map(|(definition, required)| (definition, *required)),
        );
        let summary = aggregator.aggregate(runs.iter().flat_map(|run| run.results.iter()));
        Self {
            ruleset_id: ruleset_id.into(),
            cache,
            definitions,
            runs,
            summary,
        }
    }

    pub fn ruleset_id(&self) -> &str {
        &self.ruleset_id
    }

    /// The cache results refer to
    pub fn cache(&self) -> &DomCache {
        &self.cache
    }

    /// Per-rule runs in registry order
    pub fn runs(&self) -> &[RuleRun] {
        &self.runs
    }

    pub fn run(&self, rule_id: &str) -> Option<&RuleRun> {
        self.runs.iter().find(|run| run.rule_id == rule_id)
    }

    /// All results in registry order
    pub fn results(&self) -> impl Iterator<Item = &RuleResult> {
        self.runs.iter().flat_map(|run| run.results.iter())
    }

    /// Results of one rule
    pub fn results_for(&self, rule_id: &str) -> &[RuleResult] {
        self.run(rule_id).map(|run| run.results.as_slice()).unwrap_or(&[])
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &RuleDiagnostic> {
        self.runs.iter().filter_map(|run| run.diagnostic.as_ref())
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Node a result points at
    pub fn target(&self, result: &RuleResult) -> Option<&NodeCache> {
        self.cache.get(result.target)
    }

    /// Accessible name of a result's target
    pub fn target_name(&self, result: &RuleResult) -> &str {
        self.cache.name_of(result.target)
    }

    /// Serializable view of the evaluation
    pub fn to_export(&self) -> EvaluationExport {
        let rules = self
            .definitions
            .iter()
            .filter_map(|(definition, required)| {
                let run = self.run(&definition.rule_id)?;
                Some(RuleExport {
                    definition: definition.clone(),
                    required: *required,
                    outcome: run.outcome(),
                    counts: run.counts(),
                })
            })
            .collect();

        let mut rule_categories: IndexMap<RuleCategory, ResultCounts> = IndexMap::new();
        for category in RuleCategory::ALL {
            if let Some(counts) = self.summary.by_category.get(&category) {
                rule_categories.insert(category, *counts);
            }
        }

        let results = self
            .results()
            .map(|result| ResultExport {
                result: result.clone(),
                element: self
                    .target(result)
                    .map(NodeCache::element_name)
                    .unwrap_or_default(),
                accessible_name: self.target_name(result).to_string(),
            })
            .collect();

        EvaluationExport {
            ruleset: self.ruleset_id.clone(),
            rules,
            rule_categories,
            wcag20: self.summary.wcag.clone(),
            results,
            diagnostics: self.diagnostics().cloned().collect(),
        }
    }

    /// Encode the evaluation as JSON
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let export = self.to_export();
        let encoded = if pretty {
            serde_json::to_string_pretty(&export)
        } else {
            serde_json::to_string(&export)
        };
        encoded.map_err(|e| EvalError::Serialization(format!("Failed to serialize evaluation: {}", e)))
    }
}

/// Rule metadata with its outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleExport {
    #[serde(flatten)]
    pub definition: RuleDefinition,
    pub required: bool,
    pub outcome: RuleOutcome,
    pub counts: ResultCounts,
}

/// A result with display information about its target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultExport {
    #[serde(flatten)]
    pub result: RuleResult,
    pub element: String,
    pub accessible_name: String,
}

/// JSON document produced by [`EvaluationResult::to_json`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationExport {
    pub ruleset: String,
    pub rules: Vec<RuleExport>,
    pub rule_categories: IndexMap<RuleCategory, ResultCounts>,
    pub wcag20: BTreeMap<String, ResultType>,
    pub results: Vec<ResultExport>,
    pub diagnostics: Vec<RuleDiagnostic>,
}
