//! # dxpanel-contracts
//!
//! Shared types, schemas, and error contracts for the deliberation panel.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate: only data definitions, path lookup and error types.

pub mod assessment;
pub mod consensus;
pub mod debate;
pub mod error;
pub mod path;
pub mod patient;
pub mod settings;
pub mod specialist;
pub mod verify;

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use assessment::{Analysis, RawTextFallback, SpecialistAssessment};
    use consensus::{FinalConsensus, SynthesisSource};
    use debate::{DebateHistory, DebateRound};
    use error::{PanelError, ParseError};
    use patient::PatientRecord;
    use specialist::{DeliberationId, SpecialistId, SpecialistRole};

    fn assessment(id: &str, analysis: Analysis) -> SpecialistAssessment {
        SpecialistAssessment {
            specialist_id: SpecialistId::new(id),
            role: SpecialistRole::Challenger,
            analysis,
            produced_at: Utc::now(),
        }
    }

    // ── Analysis ─────────────────────────────────────────────────────────────

    #[test]
    fn test_analysis_validity() {
        let structured = Analysis::Structured(
            json!({ "core_assessment": { "risk_level": "high" } })
                .as_object()
                .cloned()
                .unwrap(),
        );
        assert!(structured.is_valid());
        assert!(!Analysis::error("quota exceeded").is_valid());
        assert!(!Analysis::RawText(RawTextFallback::new("hello", "bad json")).is_valid());
    }

    #[test]
    fn test_analysis_serializes_in_natural_shape() {
        let err = serde_json::to_value(Analysis::error("timeout")).unwrap();
        assert_eq!(err, json!({ "error": "timeout" }));

        let raw = serde_json::to_value(Analysis::RawText(RawTextFallback::new("x", "eof"))).unwrap();
        assert_eq!(raw["raw_response"], "x");
        assert_eq!(raw["note"], RawTextFallback::NOTE);
        assert_eq!(raw["parsing_error"], "eof");
    }

    #[test]
    fn test_analysis_deserializes_to_the_matching_variant() {
        let err: Analysis = serde_json::from_value(json!({ "error": "boom" })).unwrap();
        assert!(matches!(err, Analysis::Error(_)));

        // An object that merely contains an "error" key among others is a
        // structured analysis, not an error result.
        let structured: Analysis =
            serde_json::from_value(json!({ "error": "x", "core_assessment": {} })).unwrap();
        assert!(matches!(structured, Analysis::Structured(_)));
    }

    // ── DebateRound / DebateHistory ──────────────────────────────────────────

    #[test]
    fn test_round_serializes_responses_as_map_in_roster_order() {
        let round = DebateRound {
            round_number: 1,
            specialist_responses: vec![
                assessment("zeta", Analysis::error("a")),
                assessment("alpha", Analysis::error("b")),
            ],
            consensus_level: 0.0,
            key_disagreements: vec![],
        };
        let text = serde_json::to_string(&round).unwrap();
        let zeta = text.find("\"zeta\"").unwrap();
        let alpha = text.find("\"alpha\"").unwrap();
        assert!(zeta < alpha, "roster order must be preserved: {text}");
        assert!(round.response(&SpecialistId::new("alpha")).is_some());
        assert_eq!(round.valid_responses().count(), 0);
    }

    #[test]
    fn test_history_is_append_only() {
        let mut history = DebateHistory::new();
        assert!(history.is_empty());
        assert!(history.latest().is_none());

        for n in 1..=3 {
            history.push(DebateRound {
                round_number: n,
                specialist_responses: vec![],
                consensus_level: 0.5,
                key_disagreements: vec![],
            });
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.latest().unwrap().round_number, 3);
        let numbers: Vec<u32> = history.iter().map(|r| r.round_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    // ── PatientRecord / FinalConsensus ───────────────────────────────────────

    #[test]
    fn test_patient_record_lookups() {
        let record = PatientRecord::new(json!({
            "symptoms_context": { "chief_complaint": "chest_pain" },
            "vital_signs_data": { "ecg_analysis": { "heart_rate_bpm": 95.1 } }
        }));
        assert_eq!(record.chief_complaint(), Some("chest_pain"));
        assert_eq!(record.ecg_heart_rate(), Some(95.1));
        assert!(record.lookup("medical_history.allergies").is_none());
    }

    #[test]
    fn test_final_consensus_accessors() {
        let verdict = json!({
            "analysis_summary": {
                "overall_risk_level": "high",
                "confidence_score": 0.9,
                "primary_concerns": ["tachycardia", "hypoxemia"]
            }
        });
        let consensus = FinalConsensus::new(
            SynthesisSource::Generated,
            verdict.as_object().cloned().unwrap(),
        );
        assert_eq!(consensus.overall_risk_level(), Some("high"));
        assert_eq!(consensus.confidence_score(), Some(0.9));
        assert_eq!(consensus.primary_concerns(), vec!["tachycardia", "hypoxemia"]);

        // Source is metadata, not part of the serialized verdict.
        let out = serde_json::to_value(&consensus).unwrap();
        assert!(out.get("source").is_none());
        assert_eq!(out["analysis_summary"]["overall_risk_level"], "high");
    }

    #[test]
    fn test_deliberation_id_new_produces_unique_values() {
        let unique: std::collections::HashSet<String> =
            (0..100).map(|_| DeliberationId::new().to_string()).collect();
        assert_eq!(unique.len(), 100);
    }

    #[test]
    fn test_roster_is_fixed_and_ordered() {
        assert_eq!(SpecialistRole::ROSTER.len(), 5);
        assert_eq!(SpecialistRole::ROSTER[0], SpecialistRole::DifferentialAssessment);
        assert_eq!(SpecialistRole::ROSTER[4], SpecialistRole::Validator);
        let json = serde_json::to_value(SpecialistRole::ResourceSteward).unwrap();
        assert_eq!(json, "resource-steward");
    }

    // ── Error display messages ───────────────────────────────────────────────

    #[test]
    fn test_error_generation_failed_display() {
        let err = PanelError::GenerationFailed {
            reason: "HTTP 429".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("generation call failed"));
        assert!(msg.contains("HTTP 429"));
    }

    #[test]
    fn test_error_generation_timeout_display() {
        let err = PanelError::GenerationTimeout { seconds: 60 };
        assert!(err.to_string().contains("60s"));
    }

    #[test]
    fn test_error_config_error_display() {
        let err = PanelError::ConfigError {
            reason: "max_rounds must be at least 1".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("configuration error"));
        assert!(msg.contains("max_rounds"));
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::NotAnObject { found: "array" };
        assert!(err.to_string().contains("array"));
        let err = ParseError::NotJson("expected value at line 1".to_string());
        assert!(err.to_string().contains("not valid JSON"));
    }
}
