//! Rule framework
//!
//! A rule is immutable metadata ([`RuleDefinition`]) plus one evaluation entry
//! point. Rules receive a [`RuleContext`] giving read-only access to the
//! [`DomCache`] and the evaluation [`Features`], and collect their results
//! into it.

pub mod catalog;
pub mod definition;
pub mod registry;

pub use definition::{RuleCategory, RuleDefinition, RuleGroup, RuleScope, TargetResource};
pub use registry::{RuleMapping, RuleRegistry, RuleSelector, Ruleset, RulesetDefinition};

use crate::cache::{DomCache, NodeCache, NodeId};
use crate::error::{EvalError, Result};
use crate::evaluator::Features;
use crate::result::{ResultType, RuleResult};

/// An accessibility rule
pub trait Rule: Send + Sync {
    /// Rule metadata
    fn definition(&self) -> &RuleDefinition;

    /// Evaluate the rule, adding results to `context`
    fn evaluate(&self, context: &mut RuleContext<'_>) -> Result<()>;

    /// Rule id
    fn id(&self) -> &str {
        &self.definition().rule_id
    }
}

/// Evaluation entry point of a [`StaticRule`]
pub type RuleFn = fn(&mut RuleContext<'_>) -> Result<()>;

/// A rule backed by a plain function pointer
#[derive(Debug, Clone)]
pub struct StaticRule {
    definition: RuleDefinition,
    evaluate: RuleFn,
}

impl StaticRule {
    pub fn new(definition: RuleDefinition, evaluate: RuleFn) -> Self {
        Self { definition, evaluate }
    }
}

impl Rule for StaticRule {
    fn definition(&self) -> &RuleDefinition {
        &self.definition
    }

    fn evaluate(&self, context: &mut RuleContext<'_>) -> Result<()> {
        (self.evaluate)(context)
    }
}

/// Per-rule view of the evaluation and collector of its results
pub struct RuleContext<'a> {
    /// The cache being evaluated
    pub cache: &'a DomCache,

    /// Feature configuration
    pub features: &'a Features,

    definition: &'a RuleDefinition,
    results: Vec<RuleResult>,
}

impl<'a> RuleContext<'a> {
    pub fn new(cache: &'a DomCache, features: &'a Features, definition: &'a RuleDefinition) -> Self {
        Self {
            cache,
            features,
            definition,
            results: Vec::new(),
        }
    }

    /// Definition of the rule being evaluated
    pub fn definition(&self) -> &RuleDefinition {
        self.definition
    }

    /// Elements matching the rule's target resources, in document order
    pub fn targets(&self) -> Vec<&'a NodeCache> {
        let cache = self.cache;
        let definition = self.definition;
        cache.elements().filter(|n| definition.applies_to(n)).collect()
    }

    /// Indexed candidates matching the rule's target resources
    pub fn targets_in(&self, index: &'a [NodeId]) -> Vec<&'a NodeCache> {
        let definition = self.definition;
        self.cache
            .resolve(index)
            .filter(|n| definition.applies_to(n))
            .collect()
    }

    /// Representative node for page-scoped results
    pub fn page_element(&self) -> Option<&'a NodeCache> {
        self.cache.page_element()
    }

    /// Accessible name of a node
    pub fn name(&self, node: &NodeCache) -> &'a str {
        self.cache.name_of(node.node_id())
    }

    /// True if the rule's scope allows a result on `node`
    ///
    /// Element rules report on their target resources only. Page rules may
    /// also report on the page element. Website rules are unrestricted.
    fn admits(&self, node: &NodeCache) -> bool {
        match self.definition.scope {
            RuleScope::Element => self.definition.applies_to(node),
            RuleScope::Page => {
                self.definition.applies_to(node)
                    || self.cache.page_element().is_some_and(|page| page.node_id() == node.node_id())
            }
            RuleScope::Website => true,
        }
    }

    /// Record a result for `target`
    ///
    /// Fails when `target` does not belong to the cache under evaluation or
    /// lies outside the rule's scope.
    pub fn add_result(
        &mut self,
        result_type: ResultType,
        target: NodeId,
        message_id: &str,
        message_args: Vec<String>,
    ) -> Result<()> {
        let Some(node) = self.cache.get(target) else {
            return Err(EvalError::rule(
                &self.definition.rule_id,
                format!("result target {} is not part of the DOM cache", target),
            ));
        };
        if !self.admits(node) {
            return Err(EvalError::rule(
                &self.definition.rule_id,
                format!("result target {} is outside the rule's target resources", target),
            ));
        }
        self.results.push(RuleResult {
            rule_id: self.definition.rule_id.clone(),
            result_type,
            target,
            message_id: message_id.to_string(),
            message_args,
        });
        Ok(())
    }

    pub fn pass(&mut self, node: &NodeCache, message_id: &str, args: Vec<String>) -> Result<()> {
        self.add_result(ResultType::Pass, node.node_id(), message_id, args)
    }

    pub fn fail(&mut self, node: &NodeCache, message_id: &str, args: Vec<String>) -> Result<()> {
        self.add_result(ResultType::Fail, node.node_id(), message_id, args)
    }

    pub fn manual_check(&mut self, node: &NodeCache, message_id: &str, args: Vec<String>) -> Result<()> {
        self.add_result(ResultType::ManualCheck, node.node_id(), message_id, args)
    }

    /// Record that `node` was skipped because it is not visible
    pub fn hidden(&mut self, node: &NodeCache) -> Result<()> {
        self.add_result(
            ResultType::Hidden,
            node.node_id(),
            "ELEMENT_HIDDEN_1",
            vec![node.element_name()],
        )
    }

    /// Results collected so far
    pub fn results(&self) -> &[RuleResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<RuleResult> {
        self.results
    }
}
