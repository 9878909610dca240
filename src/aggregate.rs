//! Roll-up of rule results into summary statistics
//!
//! Aggregation is a pure fold: counts are commutative and the per-criterion
//! status uses the fixed [`ResultType::severity`] order, so the input order
//! never changes the summary.

use crate::result::{ResultType, RuleResult};
use crate::rules::{RuleCategory, RuleDefinition, RuleGroup, Ruleset};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Occurrences of each result type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultCounts {
    pub pass: usize,
    pub fail: usize,
    /// Failures of required rules
    pub violations: usize,
    /// Failures of recommended rules
    pub warnings: usize,
    pub manual_check: usize,
    pub not_applicable: usize,
    pub hidden: usize,
}

impl ResultCounts {
    pub fn record(&mut self, result_type: ResultType, required: bool) {
        match result_type {
            ResultType::Pass => self.pass += 1,
            ResultType::Fail => {
                self.fail += 1;
                if required {
                    self.violations += 1;
                } else {
                    self.warnings += 1;
                }
            }
            ResultType::ManualCheck => self.manual_check += 1,
            ResultType::NotApplicable => self.not_applicable += 1,
            ResultType::Hidden => self.hidden += 1,
        }
    }

    /// Total number of recorded results
    pub fn total(&self) -> usize {
        self.pass + self.fail + self.manual_check + self.not_applicable + self.hidden
    }
}

/// Aggregated view of an evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub totals: ResultCounts,
    pub by_category: BTreeMap<RuleCategory, ResultCounts>,
    pub by_group: BTreeMap<RuleGroup, ResultCounts>,
    pub by_rule: BTreeMap<String, ResultCounts>,
    /// Worst result observed per WCAG success criterion
    pub wcag: BTreeMap<String, ResultType>,
}

impl Summary {
    /// Number of failures of required rules
    pub fn violations(&self) -> usize {
        self.totals.violations
    }

    /// Status of one success criterion
    pub fn criterion(&self, wcag_id: &str) -> Option<ResultType> {
        self.wcag.get(wcag_id).copied()
    }
}

#[derive(Debug, Clone)]
struct RuleInfo {
    category: RuleCategory,
    group: RuleGroup,
    wcag_primary_id: String,
    required: bool,
}

/// Folds rule results into a [`Summary`]
#[derive(Debug, Clone, Default)]
pub struct ResultAggregator {
    rules: HashMap<String, RuleInfo>,
}

impl ResultAggregator {
    /// Aggregator for the rules of a ruleset
    pub fn new(ruleset: &Ruleset) -> Self {
        Self::from_definitions(
            ruleset
                .mappings()
                .iter()
                .map(|m| (m.rule.definition(), m.required)),
        )
    }

    /// Aggregator from `(definition, required)` pairs
    pub fn from_definitions<'a>(
        definitions: impl IntoIterator<Item = (&'a RuleDefinition, bool)>,
    ) -> Self {
        let rules = definitions
            .into_iter()
            .map(|(definition, required)| {
                (
                    definition.rule_id.clone(),
                    RuleInfo {
                        category: definition.category,
                        group: definition.group,
                        wcag_primary_id: definition.wcag_primary_id.clone(),
                        required,
                    },
                )
            })
            .collect();
        Self { rules }
    }

    /// Summarize a sequence of results
    pub fn aggregate<'r>(&self, results: impl IntoIterator<Item = &'r RuleResult>) -> Summary {
        let mut summary = Summary::default();

        for result in results {
            let Some(info) = self.rules.get(&result.rule_id) else {
                log::debug!("Result for unknown rule '{}' only counted in totals", result.rule_id);
                summary.totals.record(result.result_type, true);
                continue;
            };

            summary.totals.record(result.result_type, info.required);
            summary
                .by_category
                .entry(info.category)
                .or_default()
                .record(result.result_type, info.required);
            summary
                .by_group
                .entry(info.group)
                .or_default()
                .record(result.result_type, info.required);
            summary
                .by_rule
                .entry(result.rule_id.clone())
                .or_default()
                .record(result.result_type, info.required);
            summary
                .wcag
                .entry(info.wcag_primary_id.clone())
                .and_modify(|worst| *worst = worst.worst(result.result_type))
                .or_insert(result.result_type);
        }

        summary
    }
}
