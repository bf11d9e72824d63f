//! Differential assessment: a probability-ranked list of candidate conditions.

use dxpanel_contracts::{
    debate::DebateHistory,
    patient::PatientRecord,
    specialist::{SpecialistId, SpecialistRole},
};
use dxpanel_core::traits::Specialist;

use super::{closing, full_debate, opening, CORE_ASSESSMENT_FIELDS};

pub struct DifferentialAssessor {
    id: SpecialistId,
}

impl DifferentialAssessor {
    pub const ID: &'static str = "differential-assessor";

    pub fn new() -> Self {
        Self {
            id: SpecialistId::new(Self::ID),
        }
    }
}

impl Default for DifferentialAssessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Specialist for DifferentialAssessor {
    fn id(&self) -> &SpecialistId {
        &self.id
    }

    fn role(&self) -> SpecialistRole {
        SpecialistRole::DifferentialAssessment
    }

    fn build_prompt(&self, record: &PatientRecord, history: &DebateHistory) -> String {
        format!(
            r#"{opening}
Your job is to keep a ranked differential: the conditions that could explain this
presentation, each with a probability between 0 and 1, the findings that support
it and the findings that argue against it. Revise the list when other panel
members raise points you had not weighed.

PATIENT RECORD:
{record}

{debate}Respond with this structure:
{{
{core},
    "differential_assessments": [
        {{
            "condition": "name",
            "probability": 0.0,
            "supporting_evidence": ["finding"],
            "contradicting_evidence": ["finding"]
        }}
    ],
    "key_physiological_concerns": ["concern"],
    "recommended_investigations": ["investigation"],
    "clinical_findings": [
        {{ "finding": "description", "severity": "low|medium|high|critical", "confidence": 0.0 }}
    ],
    "reasoning": "short explanation"
}}

{closing}"#,
            opening = opening(self.role()),
            record = record.to_pretty_json(),
            debate = full_debate(history),
            core = CORE_ASSESSMENT_FIELDS,
            closing = closing(),
        )
    }
}
