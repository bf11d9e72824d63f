//! Resource stewardship for a rural clinic.

use dxpanel_contracts::{
    debate::DebateHistory,
    patient::PatientRecord,
    specialist::{SpecialistId, SpecialistRole},
};
use dxpanel_core::traits::Specialist;

use super::{closing, latest_round_responses, opening, CORE_ASSESSMENT_FIELDS};

pub struct ResourceSteward {
    id: SpecialistId,
}

impl ResourceSteward {
    pub const ID: &'static str = "resource-steward";

    pub fn new() -> Self {
        Self {
            id: SpecialistId::new(Self::ID),
        }
    }
}

impl Default for ResourceSteward {
    fn default() -> Self {
        Self::new()
    }
}

impl Specialist for ResourceSteward {
    fn id(&self) -> &SpecialistId {
        &self.id
    }

    fn role(&self) -> SpecialistRole {
        SpecialistRole::ResourceSteward
    }

    fn build_prompt(&self, record: &PatientRecord, history: &DebateHistory) -> String {
        let latest = match latest_round_responses(history) {
            Some(text) => format!("LATEST PANEL RECOMMENDATIONS:\n{text}\n\n"),
            None => String::new(),
        };

        format!(
            r#"{opening}
Weigh every proposed test, treatment and referral against cost, travel distance
and what the clinic can do on site. Approve what is worth it, modify what is
not, and never trade away safety for savings.

PATIENT RECORD:
{record}

{latest}Respond with this structure:
{{
{core},
    "stewardship_decision": {{
        "overall_approval": "approved|modified|rejected",
        "cost_effectiveness_score": 0.0,
        "rationale": "short explanation"
    }},
    "resource_constraints": ["constraint"],
    "final_recommendations": [
        {{ "recommendation": "action", "feasible_locally": true, "estimated_cost": "low|medium|high" }}
    ]
}}

{closing}"#,
            opening = opening(self.role()),
            record = record.to_pretty_json(),
            core = CORE_ASSESSMENT_FIELDS,
            closing = closing(),
        )
    }
}
