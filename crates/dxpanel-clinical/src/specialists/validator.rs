//! Quality control over the latest round.

use dxpanel_contracts::{
    debate::DebateHistory,
    patient::PatientRecord,
    specialist::{SpecialistId, SpecialistRole},
};
use dxpanel_core::traits::Specialist;

use super::{closing, latest_round_responses, opening, CORE_ASSESSMENT_FIELDS};

pub struct QualityValidator {
    id: SpecialistId,
}

impl QualityValidator {
    pub const ID: &'static str = "validator";

    pub fn new() -> Self {
        Self {
            id: SpecialistId::new(Self::ID),
        }
    }
}

impl Default for QualityValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Specialist for QualityValidator {
    fn id(&self) -> &SpecialistId {
        &self.id
    }

    fn role(&self) -> SpecialistRole {
        SpecialistRole::Validator
    }

    fn build_prompt(&self, record: &PatientRecord, history: &DebateHistory) -> String {
        let latest = match latest_round_responses(history) {
            Some(text) => format!("LATEST PANEL RESPONSES:\n{text}\n\n"),
            None => String::new(),
        };

        format!(
            r#"{opening}
Check the panel's work for internal consistency, safety gaps and claims the
record does not support. Flag anything a supervising physician would send back.

PATIENT RECORD:
{record}

{latest}Respond with this structure:
{{
{core},
    "validation_decision": {{
        "approval_status": "approved|conditional|rejected",
        "issues_found": ["issue"]
    }},
    "quality_metrics": {{
        "overall_quality_score": 0.0,
        "evidence_consistency": 0.0,
        "safety_coverage": 0.0
    }},
    "required_corrections": ["correction"]
}}

{closing}"#,
            opening = opening(self.role()),
            record = record.to_pretty_json(),
            core = CORE_ASSESSMENT_FIELDS,
            closing = closing(),
        )
    }
}
