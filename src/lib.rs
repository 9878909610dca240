//! # a11y-eval
//!
//! A Rust library for static accessibility evaluation of web pages against WCAG-based rules.
//!
//! ## Features
//!
//! - **DOM Cache**: One-pass, shadow-aware snapshot of a document with memoized visibility and roles
//! - **Accessible Names**: Priority-chain name computation (aria-labelledby, aria-label, labels, title, contents)
//! - **Rule Registry**: Built-in rules and named rulesets, extensible with your own rules
//! - **Evaluator**: Runs a ruleset with per-rule isolation and aggregates results by category, group and WCAG criterion
//! - **Browser Capture**: Snapshot live pages through Chrome DevTools Protocol (CDP)
//!
//! ## Command Line
//!
//! ```bash
//! # Evaluate a live page with the WCAG20 ruleset
//! cargo run --bin a11y-eval -- https://example.com
//!
//! # Evaluate a captured snapshot
//! cargo run --bin a11y-eval -- --snapshot page.json --ruleset FORMS
//! ```
//!
//! ## Library Usage
//!
//! ### Evaluating a Document
//!
//! ```rust
//! use a11y_eval::{Evaluator, Features, ResultType, RuleRegistry, SnapshotNode};
//!
//! # fn main() -> a11y_eval::Result<()> {
//! let page = SnapshotNode::document(
//!     SnapshotNode::element("html").with_attribute("lang", "en").with_child(
//!         SnapshotNode::element("body")
//!             .with_child(
//!                 SnapshotNode::element("label")
//!                     .with_attribute("for", "email")
//!                     .with_text("Email"),
//!             )
//!             .with_child(SnapshotNode::element("input").with_attribute("id", "email")),
//!     ),
//! );
//!
//! let registry = RuleRegistry::with_defaults();
//! let evaluator = Evaluator::new(registry.get_ruleset("FORMS")?, Features::default());
//! let result = evaluator.evaluate(&page);
//!
//! let control = &result.results_for("CONTROL_1")[0];
//! assert_eq!(control.result_type, ResultType::Pass);
//! assert_eq!(result.target_name(control), "Email");
//! # Ok(())
//! # }
//! ```
//!
//! ### Evaluating a Live Page
//!
//! ```rust,no_run
//! use a11y_eval::{BrowserSession, Evaluator, Features, LaunchOptions, RuleRegistry};
//!
//! # fn main() -> a11y_eval::Result<()> {
//! let session = BrowserSession::launch(LaunchOptions::default())?;
//! let registry = RuleRegistry::with_defaults();
//! let evaluator = Evaluator::new(registry.get_ruleset("WCAG20")?, Features::default());
//!
//! let result = session.evaluate_url("https://example.com", &evaluator)?;
//! println!("{} violations", result.summary().violations());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`dom`]: Host document abstraction and the serde snapshot host
//! - [`cache`]: DOM cache, visibility, roles and page indexes
//! - [`accname`]: Accessible name and description computation
//! - [`rules`]: Rule trait, registry, rulesets and the built-in catalog
//! - [`evaluator`]: Feature configuration and ruleset execution
//! - [`result`] / [`aggregate`]: Results, per-rule runs, summaries and JSON export
//! - [`browser`]: Browser session management and page capture
//! - [`error`]: Error types and result aliases

pub mod accname;
pub mod aggregate;
pub mod browser;
pub mod cache;
pub mod dom;
pub mod error;
pub mod evaluator;
pub mod result;
pub mod rules;

pub use accname::{AccessibleName, NameSource};
pub use aggregate::{ResultAggregator, ResultCounts, Summary};
pub use browser::{BrowserSession, ConnectionOptions, LaunchOptions};
pub use cache::{DomCache, DomCacheBuilder, NodeCache, NodeId};
pub use dom::{HostNode, NodeKind, SnapshotNode};
pub use error::{EvalError, Result};
pub use evaluator::{EventProcessing, Evaluator, FeatureValue, Features};
pub use result::{EvaluationResult, ResultType, RuleDiagnostic, RuleOutcome, RuleResult, RuleRun};
pub use rules::{Rule, RuleCategory, RuleContext, RuleDefinition, RuleGroup, RuleRegistry, RuleScope, Ruleset, StaticRule};
