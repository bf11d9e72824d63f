//! The panel's devil's advocate.

use dxpanel_contracts::{
    debate::DebateHistory,
    patient::PatientRecord,
    specialist::{SpecialistId, SpecialistRole},
};
use dxpanel_core::traits::Specialist;

use super::{closing, full_debate, opening, CORE_ASSESSMENT_FIELDS};

pub struct Challenger {
    id: SpecialistId,
}

impl Challenger {
    pub const ID: &'static str = "challenger";

    pub fn new() -> Self {
        Self {
            id: SpecialistId::new(Self::ID),
        }
    }
}

impl Default for Challenger {
    fn default() -> Self {
        Self::new()
    }
}

impl Specialist for Challenger {
    fn id(&self) -> &SpecialistId {
        &self.id
    }

    fn role(&self) -> SpecialistRole {
        SpecialistRole::Challenger
    }

    fn build_prompt(&self, record: &PatientRecord, history: &DebateHistory) -> String {
        format!(
            r#"{opening}
Argue against the emerging view. Look for anchoring, premature closure and
conditions nobody has named that would be dangerous to miss. Say plainly where
the panel is under- or over-calling risk.

PATIENT RECORD:
{record}

{debate}Respond with this structure:
{{
{core},
    "challenges_raised": [
        {{ "target": "specialist id or claim", "challenge": "what is wrong", "severity": "low|medium|high" }}
    ],
    "bias_alerts": ["bias"],
    "alternative_hypotheses": [
        {{ "condition": "name", "why_considered": "reason", "must_not_miss": true }}
    ],
    "immediate_actions": ["action"],
    "challenger_confidence": 0.0
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
