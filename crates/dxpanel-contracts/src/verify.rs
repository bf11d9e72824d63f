//! Validation schema and report types for generated verdicts.
//!
//! A generated `FinalConsensus` is checked against a `ConsensusSchema` before
//! it is accepted. A failing `ValidationReport` sends the synthesizer down its
//! deterministic fallback path instead.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structural and semantic expectations for a generated verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusSchema {
    /// Unique identifier for this schema (e.g. "final-consensus-v1").
    pub schema_id: String,
    /// A JSON Schema document used for structural validation.
    pub json_schema: Value,
    /// Additional rules evaluated after structural validation.
    pub rules: Vec<ValidationRule>,
}

/// A single validation rule applied to a generated verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRule {
    /// Unique identifier for this rule, referenced in failure reports.
    pub rule_id: String,
    /// Human-readable description for logs.
    pub description: String,
    pub rule_type: ValidationRuleType,
}

/// The kinds of checks the validator supports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ValidationRuleType {
    /// The field at `field_path` must be present and non-null.
    RequiredField {
        /// Dotted path, e.g. "analysis_summary.overall_risk_level".
        field_path: String,
    },

    /// The field at `field_path` must equal one of `allowed`.
    AllowedValues {
        field_path: String,
        allowed: Vec<Value>,
    },

    /// When present, the numeric field at `field_path` must lie in `[min, max]`.
    NumericRange {
        field_path: String,
        min: f64,
        max: f64,
    },
}

/// The result of running a `ConsensusSchema` against a verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True only if every check passed.
    pub passed: bool,
    /// All failures collected during this run. Empty on pass.
    pub failures: Vec<ValidationFailure>,
}

impl ValidationReport {
    /// One-line summary of every failure, `"[rule] message; ..."`.
    pub fn summary(&self) -> String {
        self.failures
            .iter()
            .map(|f| format!("[{}] {}", f.rule_id, f.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// A single failed check within a `ValidationReport`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub rule_id: String,
    pub message: String,
}
