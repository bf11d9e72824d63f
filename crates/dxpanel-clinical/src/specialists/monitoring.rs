//! Monitoring strategy. Reads only the differential assessor's first word on
//! the case so that its plan is anchored to the initial differential.

use dxpanel_contracts::{
    debate::DebateHistory,
    patient::PatientRecord,
    specialist::{SpecialistId, SpecialistRole},
};
use dxpanel_core::traits::Specialist;

use super::{closing, opening, pretty, DifferentialAssessor, CORE_ASSESSMENT_FIELDS};

pub struct MonitoringStrategist {
    id: SpecialistId,
}

impl MonitoringStrategist {
    pub const ID: &'static str = "monitoring-strategist";

    pub fn new() -> Self {
        Self {
            id: SpecialistId::new(Self::ID),
        }
    }

    /// The differential assessor's response from the earliest round that
    /// contains one.
    fn initial_differential(history: &DebateHistory) -> Option<String> {
        let id = SpecialistId::new(DifferentialAssessor::ID);
        history
            .iter()
            .find_map(|round| round.response(&id))
            .and_then(|r| serde_json::to_value(&r.analysis).ok())
            .map(|v| pretty(&v))
    }
}

impl Default for MonitoringStrategist {
    fn default() -> Self {
        Self::new()
    }
}

impl Specialist for MonitoringStrategist {
    fn id(&self) -> &SpecialistId {
        &self.id
    }

    fn role(&self) -> SpecialistRole {
        SpecialistRole::MonitoringStrategy
    }

    fn build_prompt(&self, record: &PatientRecord, history: &DebateHistory) -> String {
        let differential = match Self::initial_differential(history) {
            Some(text) => format!("INITIAL DIFFERENTIAL FROM THE PANEL:\n{text}\n\n"),
            None => String::new(),
        };

        format!(
            r#"{opening}
Decide how this patient should be watched and followed up with what the clinic
actually has: repeat vitals, bedside tests, home observation, or referral.
Stratify immediate and short-term risk before choosing.

PATIENT RECORD:
{record}

{differential}Respond with this structure:
{{
{core},
    "risk_stratification": {{
        "immediate_risk": "low|medium|high",
        "short_term_risk": "low|medium|high",
        "rationale": "short explanation"
    }},
    "selected_monitoring": [
        {{ "parameter": "name", "frequency": "interval", "method": "how it is measured" }}
    ],
    "follow_up_strategy": {{
        "timeframe": "when to review",
        "specialist_referral": {{
            "recommended": false,
            "urgency": "routine|expedited|urgent|emergent",
            "specialty": "specialty"
        }}
    }},
    "immediate_actions": ["action"],
    "monitoring_confidence": 0.0
}}

{closing}"#,
            opening = opening(self.role()),
            record = record.to_pretty_json(),
            core = CORE_ASSESSMENT_FIELDS,
            closing = closing(),
        )
    }
}
