//! A network-free `Generator` with canned, role-appropriate answers.
//!
//! The offline generator recognises which specialist is asking by the role
//! title in the prompt opening. Four of the five roles answer medium/urgent
//! and the devil's advocate answers high/emergent, which scores 0.8 and ends
//! the debate after one round at the default threshold. The synthesis prompt
//! gets a complete verdict. Any other prompt fails like an upstream error.

use serde_json::{json, Value};
use tracing::debug;

use dxpanel_contracts::{
    error::{PanelError, PanelResult},
    specialist::SpecialistRole,
};
use dxpanel_core::{synthesizer::SYNTHESIS_PROMPT_OPENING, traits::Generator};

pub const OFFLINE_MODEL: &str = "offline-canned";

#[derive(Debug, Clone, Default)]
pub struct OfflineGenerator;

impl OfflineGenerator {
    pub fn new() -> Self {
        Self
    }

    fn role_for(prompt: &str) -> Option<SpecialistRole> {
        SpecialistRole::ROSTER
            .into_iter()
            .find(|role| prompt.starts_with(&format!("You are the {} ", role.title())))
    }

    fn answer(role: SpecialistRole) -> Value {
        let core = |risk: &str, urgency: &str, concerns: &[&str]| {
            json!({
                "risk_level": risk,
                "confidence": 0.8,
                "primary_concerns": concerns,
                "urgency": urgency
            })
        };

        match role {
            SpecialistRole::DifferentialAssessment => json!({
                "core_assessment": core("medium", "urgent", &["Chest pain", "Tachycardia"]),
                "differential_assessments": [
                    {
                        "condition": "Acute coronary syndrome",
                        "probability": 0.55,
                        "supporting_evidence": ["chest pain", "diaphoresis", "hypertension"],
                        "contradicting_evidence": ["sinus rhythm"]
                    },
                    {
                        "condition": "Anxiety-related chest pain",
                        "probability": 0.25,
                        "supporting_evidence": ["anxious appearance"],
                        "contradicting_evidence": ["borderline SpO2"]
                    }
                ],
                "key_physiological_concerns": ["Chest pain", "Tachycardia"],
                "clinical_findings": [
                    { "finding": "Heart rate above 90 bpm", "severity": "medium", "confidence": 0.85 }
                ],
                "reasoning": "Cardiac cause cannot be excluded without an ECG review."
            }),
            SpecialistRole::MonitoringStrategy => json!({
                "core_assessment": core("medium", "urgent", &["Chest pain", "Borderline SpO2"]),
                "risk_stratification": {
                    "immediate_risk": "medium",
                    "short_term_risk": "medium",
                    "rationale": "Stable vitals with concerning symptoms"
                },
                "selected_monitoring": [
                    { "parameter": "SpO2", "frequency": "every 15 minutes", "method": "pulse oximeter" }
                ],
                "follow_up_strategy": {
                    "timeframe": "within 24 hours",
                    "specialist_referral": { "recommended": true, "urgency": "urgent", "specialty": "cardiology" }
                },
                "monitoring_confidence": 0.8
            }),
            SpecialistRole::Challenger => json!({
                "core_assessment": core("high", "emergent", &["Possible myocardial infarction", "Chest pain"]),
                "challenges_raised": [
                    {
                        "target": "differential-assessor",
                        "challenge": "Probability of ACS is understated given diaphoresis",
                        "severity": "high"
                    }
                ],
                "bias_alerts": ["anchoring on anxiety"],
                "alternative_hypotheses": [
                    { "condition": "Pulmonary embolism", "why_considered": "tachypnea with low SpO2", "must_not_miss": true }
                ],
                "challenger_confidence": 0.75
            }),
            SpecialistRole::ResourceSteward => json!({
                "core_assessment": core("medium", "urgent", &["Chest pain"]),
                "stewardship_decision": {
                    "overall_approval": "approved",
                    "cost_effectiveness_score": 0.82,
                    "rationale": "Local ECG before referral avoids an unnecessary transfer"
                },
                "final_recommendations": [
                    { "recommendation": "12-lead ECG on site", "feasible_locally": true, "estimated_cost": "low" }
                ]
            }),
            SpecialistRole::Validator => json!({
                "core_assessment": core("medium", "urgent", &["Chest pain", "Tachycardia"]),
                "validation_decision": { "approval_status": "approved", "issues_found": [] },
                "quality_metrics": {
                    "overall_quality_score": 0.86,
                    "evidence_consistency": 0.8,
                    "safety_coverage": 0.9
                }
            }),
        }
    }

    fn verdict() -> Value {
        json!({
            "analysis_summary": {
                "overall_risk_level": "medium",
                "confidence_score": 0.82,
                "primary_concerns": ["Chest pain", "Tachycardia", "Borderline SpO2"]
            },
            "vital_signs_interpretation": {
                "spo2_assessment": { "status": "borderline_low", "clinical_significance": "Monitor closely" },
                "cardiovascular_assessment": {
                    "heart_rate_status": "tachycardic",
                    "rhythm_assessment": "sinus rhythm",
                    "clinical_significance": "Mild tachycardia with chest pain"
                },
                "respiratory_assessment": { "rate_status": "tachypneic", "clinical_significance": "Raised rate" }
            },
            "clinical_findings": [
                {
                    "category": "cardiovascular",
                    "finding": "Chest pain with diaphoresis",
                    "severity": "moderate",
                    "confidence": 0.8
                }
            ],
            "risk_assessment": {
                "immediate_risk": "medium",
                "risk_factors": ["hypertension", "chest pain"],
                "escalation_triggers": ["SpO2 below 90%", "worsening chest pain"]
            },
            "recommendations": {
                "immediate_actions": ["Obtain 12-lead ECG"],
                "specialist_consultation": { "urgency": "within_24_hours", "specialty": "cardiology" },
                "monitoring_recommendations": ["Repeat vitals every 30 minutes"]
            },
            "patient_communication": {
                "summary_for_patient": "Your heart needs a closer look today.",
                "warning_signs": ["pain spreading to arm or jaw", "shortness of breath"]
            },
            "data_quality_assessment": { "overall_quality": "good", "limitations": ["no troponin"] }
        })
    }
}

impl Generator for OfflineGenerator {
    fn generate(&self, prompt: &str) -> PanelResult<String> {
        let answer = if prompt.starts_with(SYNTHESIS_PROMPT_OPENING) {
            debug!("offline generator answering synthesis prompt");
            Self::verdict()
        } else if let Some(role) = Self::role_for(prompt) {
            debug!(specialist = role.title(), "offline generator answering specialist prompt");
            Self::answer(role)
        } else {
            return Err(PanelError::GenerationFailed {
                reason: "offline generator has no canned answer for this prompt".to_string(),
            });
        };

        serde_json::to_string_pretty(&answer).map_err(|e| PanelError::Serialization {
            reason: e.to_string(),
        })
    }

    fn model_identifier(&self) -> &str {
        OFFLINE_MODEL
    }
}
