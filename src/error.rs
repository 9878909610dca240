use thiserror::Error;

/// Errors produced while configuring or running an accessibility evaluation
#[derive(Debug, Error)]
pub enum EvalError {
    /// A rule with the same id is already registered
    #[error("Duplicate rule id: {0}")]
    DuplicateRuleId(String),

    /// No ruleset is registered under the requested name
    #[error("Unknown ruleset: {0}")]
    UnknownRuleset(String),

    /// A ruleset definition names a rule that was never registered
    #[error("Ruleset '{ruleset}' references unknown rule '{rule_id}'")]
    UnknownRule { ruleset: String, rule_id: String },

    /// A rule's evaluate function failed
    #[error("Rule '{rule_id}' failed: {reason}")]
    RuleExecution { rule_id: String, reason: String },

    /// A feature was given a value it does not accept
    #[error("Invalid value '{value}' for feature '{feature}'")]
    InvalidFeatureValue { feature: String, value: String },

    /// The feature name is not recognized
    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    /// A captured document snapshot could not be decoded
    #[error("Failed to parse document snapshot: {0}")]
    SnapshotParse(String),

    /// Encoding a snapshot or evaluation failed
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Failed to launch the browser
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Failed to connect to an existing browser
    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    /// Navigation did not complete
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// The in-page capture script failed or returned nothing
    #[error("Failed to capture document: {0}")]
    CaptureFailed(String),
}

impl EvalError {
    /// Convenience constructor used by rule implementations
    pub fn rule(rule_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RuleExecution {
            rule_id: rule_id.into(),
            reason: reason.into(),
        }
    }

    /// True for errors raised while building the evaluator configuration
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateRuleId(_)
                | Self::UnknownRuleset(_)
                | Self::UnknownRule { .. }
                | Self::InvalidFeatureValue { .. }
                | Self::UnknownFeature(_)
        )
    }
}

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, EvalError>;
