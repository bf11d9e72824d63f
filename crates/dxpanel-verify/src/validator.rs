//! Schema-based verdict validator.
//!
//! `SchemaConsensusValidator` implements the `ConsensusValidator` trait from
//! `dxpanel-core`. Validation runs in two phases:
//!
//! 1. **Structural**: the verdict is validated against
//!    `ConsensusSchema::json_schema` using the `jsonschema` crate.
//! 2. **Semantic**: each `ValidationRule` is evaluated in order. All failures
//!    are collected before returning.

use serde_json::{json, Value};
use tracing::{debug, warn};

use dxpanel_contracts::{
    error::{PanelError, PanelResult},
    path::resolve_path,
    verify::{ConsensusSchema, ValidationFailure, ValidationReport, ValidationRule, ValidationRuleType},
};
use dxpanel_core::traits::ConsensusValidator;

pub const DEFAULT_SCHEMA_ID: &str = "final-consensus-v1";

/// Validates generated verdicts against one `ConsensusSchema`.
#[derive(Debug, Clone)]
pub struct SchemaConsensusValidator {
    schema: ConsensusSchema,
}

impl SchemaConsensusValidator {
    /// Build a validator for `schema`.
    ///
    /// Returns `PanelError::SchemaValidation` if the JSON Schema document
    /// does not compile.
    pub fn new(schema: ConsensusSchema) -> PanelResult<Self> {
        if !schema.json_schema.is_null() {
            jsonschema::validator_for(&schema.json_schema).map_err(|e| {
                PanelError::SchemaValidation {
                    reason: format!("schema '{}' does not compile: {e}", schema.schema_id),
                }
            })?;
        }
        Ok(Self { schema })
    }

    pub fn schema(&self) -> &ConsensusSchema {
        &self.schema
    }

    fn check_rule(rule: &ValidationRule, verdict: &Value) -> Option<String> {
        match &rule.rule_type {
            ValidationRuleType::RequiredField { field_path } => {
                if resolve_path(verdict, field_path).is_none() {
                    Some(format!("required field '{field_path}' is missing or null"))
                } else {
                    None
                }
            }

            ValidationRuleType::AllowedValues { field_path, allowed } => {
                match resolve_path(verdict, field_path) {
                    None => Some(format!(
                        "field '{field_path}' is missing; cannot check allowed values"
                    )),
                    Some(actual) if allowed.contains(actual) => None,
                    Some(actual) => Some(format!(
                        "field '{field_path}' has value {actual} which is not in the allowed set"
                    )),
                }
            }

            // Absent fields pass; the rule only constrains values that exist.
            ValidationRuleType::NumericRange { field_path, min, max } => {
                match resolve_path(verdict, field_path) {
                    None => None,
                    Some(v) => match v.as_f64() {
                        Some(n) if n >= *min && n <= *max => None,
                        Some(n) => Some(format!(
                            "field '{field_path}' is {n}, outside [{min}, {max}]"
                        )),
                        None => Some(format!("field '{field_path}' is not a number")),
                    },
                }
            }
        }
    }
}

impl ConsensusValidator for SchemaConsensusValidator {
    fn validate(&self, verdict: &Value) -> PanelResult<ValidationReport> {
        let schema = &self.schema;
        let mut failures: Vec<ValidationFailure> = Vec::new();

        // ── Phase 1: JSON Schema structural validation ────────────────────────
        if !schema.json_schema.is_null() {
            let validator = jsonschema::validator_for(&schema.json_schema).map_err(|e| {
                PanelError::SchemaValidation {
                    reason: format!("schema '{}' does not compile: {e}", schema.schema_id),
                }
            })?;
            for error in validator.iter_errors(verdict) {
                let message = format!("JSON Schema violation at {}: {}", error.instance_path, error);
                warn!(schema_id = %schema.schema_id, %message, "structural validation failure");
                failures.push(ValidationFailure {
                    rule_id: "json-schema".to_string(),
                    message,
                });
            }
        }

        // ── Phase 2: Semantic rules ───────────────────────────────────────────
        for rule in &schema.rules {
            debug!(rule_id = %rule.rule_id, description = %rule.description, "evaluating rule");

            if let Some(message) = Self::check_rule(rule, verdict) {
                warn!(rule_id = %rule.rule_id, %message, "semantic rule failed");
                failures.push(ValidationFailure {
                    rule_id: rule.rule_id.clone(),
                    message,
                });
            }
        }

        let passed = failures.is_empty();
        debug!(
            schema_id = %schema.schema_id,
            passed,
            failure_count = failures.len(),
            "verdict validation complete"
        );

        Ok(ValidationReport { passed, failures })
    }
}

/// The schema every generated verdict must satisfy.
///
/// Requires an `analysis_summary` object whose risk level is one of
/// low/medium/high, with a confidence score in `[0, 1]` when one is given.
pub fn default_consensus_schema() -> ConsensusSchema {
    ConsensusSchema {
        schema_id: DEFAULT_SCHEMA_ID.to_string(),
        json_schema: json!({
            "type": "object",
            "properties": {
                "analysis_summary": {
                    "type": "object",
                    "properties": {
                        "overall_risk_level": { "type": "string" },
                        "confidence_score": { "type": "number" },
                        "primary_concerns": {
                            "type": "array",
                            "items": { "type": "string" }
                        }
                    },
                    "required": ["overall_risk_level"]
                }
            },
            "required": ["analysis_summary"]
        }),
        rules: vec![
            ValidationRule {
                rule_id: "risk-level-allowed".to_string(),
                description: "overall risk must be low, medium or high".to_string(),
                rule_type: ValidationRuleType::AllowedValues {
                    field_path: "analysis_summary.overall_risk_level".to_string(),
                    allowed: vec![json!("low"), json!("medium"), json!("high")],
                },
            },
            ValidationRule {
                rule_id: "confidence-range".to_string(),
                description: "confidence score is a probability".to_string(),
                rule_type: ValidationRuleType::NumericRange {
                    field_path: "analysis_summary.confidence_score".to_string(),
                    min: 0.0,
                    max: 1.0,
                },
            },
        ],
    }
}

/// A validator over [`default_consensus_schema`].
pub fn default_validator() -> SchemaConsensusValidator {
    SchemaConsensusValidator { schema: default_consensus_schema() }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use dxpanel_contracts::verify::{ConsensusSchema, ValidationRule, ValidationRuleType};
    use dxpanel_core::traits::ConsensusValidator;

    use super::*;

    fn make_schema(json_schema: Value, rules: Vec<ValidationRule>) -> ConsensusSchema {
        ConsensusSchema {
            schema_id: "test-schema-v1".to_string(),
            json_schema,
            rules,
        }
    }

    fn rule(id: &str, rule_type: ValidationRuleType) -> ValidationRule {
        ValidationRule {
            rule_id: id.to_string(),
            description: format!("test rule {id}"),
            rule_type,
        }
    }

    // ── Default schema ────────────────────────────────────────────────────────

    #[test]
    fn test_well_formed_verdict_passes() {
        let verdict = json!({
            "analysis_summary": {
                "overall_risk_level": "high",
                "confidence_score": 0.85,
                "primary_concerns": ["tachycardia"]
            },
            "recommendations": { "immediate_actions": ["ECG"] }
        });
        let report = default_validator().validate(&verdict).unwrap();
        assert!(report.passed, "failures: {:?}", report.failures);
    }

    #[test]
    fn test_missing_summary_fails_structurally() {
        let report = default_validator().validate(&json!({ "notes": "fine" })).unwrap();
        assert!(!report.passed);
        assert_eq!(report.failures[0].rule_id, "json-schema");
    }

    #[test]
    fn test_unknown_risk_level_fails() {
        let verdict = json!({ "analysis_summary": { "overall_risk_level": "extreme" } });
        let report = default_validator().validate(&verdict).unwrap();
        assert!(!report.passed);
        assert!(report.failures.iter().any(|f| f.rule_id == "risk-level-allowed"));
        assert!(report.summary().contains("[risk-level-allowed]"));
    }

    #[test]
    fn test_confidence_out_of_range_fails() {
        let verdict = json!({
            "analysis_summary": { "overall_risk_level": "low", "confidence_score": 85 }
        });
        let report = default_validator().validate(&verdict).unwrap();
        assert!(!report.passed);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].rule_id, "confidence-range");
    }

    #[test]
    fn test_fallback_shape_passes() {
        // The deterministic fallback verdict must satisfy its own schema.
        let verdict = json!({
            "analysis_summary": {
                "overall_risk_level": "medium",
                "confidence_score": 0.7,
                "primary_concerns": [],
                "key_recommendations": [],
                "follow_up_needed": true,
                "consensus_urgency": "routine"
            }
        });
        assert!(default_validator().validate(&verdict).unwrap().passed);
    }

    // ── Individual rules ──────────────────────────────────────────────────────

    #[test]
    fn test_required_field() {
        let v = SchemaConsensusValidator::new(make_schema(
            Value::Null,
            vec![rule(
                "req-urgency",
                ValidationRuleType::RequiredField {
                    field_path: "recommendations.specialist_consultation.urgency".to_string(),
                },
            )],
        ))
        .unwrap();

        let report = v.validate(&json!({ "recommendations": {} })).unwrap();
        assert!(!report.passed);
        assert!(report.failures[0].message.contains("specialist_consultation.urgency"));

        let ok = json!({ "recommendations": { "specialist_consultation": { "urgency": "routine" } } });
        assert!(v.validate(&ok).unwrap().passed);
    }

    #[test]
    fn test_numeric_range_ignores_absent_and_rejects_non_numbers() {
        let v = SchemaConsensusValidator::new(make_schema(
            Value::Null,
            vec![rule(
                "score",
                ValidationRuleType::NumericRange {
                    field_path: "panel_metadata.consensus_score".to_string(),
                    min: 0.0,
                    max: 1.0,
                },
            )],
        ))
        .unwrap();

        assert!(v.validate(&json!({})).unwrap().passed);
        let report = v
            .validate(&json!({ "panel_metadata": { "consensus_score": "high" } }))
            .unwrap();
        assert!(!report.passed);
        assert!(report.failures[0].message.contains("not a number"));
    }

    #[test]
    fn test_uncompilable_schema_rejected() {
        let result = SchemaConsensusValidator::new(make_schema(json!({ "type": 12 }), vec![]));
        match result {
            Err(PanelError::SchemaValidation { reason }) => {
                assert!(reason.contains("test-schema-v1"))
            }
            other => panic!("expected SchemaValidation, got {:?}", other.map(|_| ())),
        }
    }
}
