//! The five panel specialists.
//!
//! Every specialist asks for the same `core_assessment` block (risk level,
//! confidence, primary concerns, urgency) so the moderator can score
//! agreement, then adds role-specific fields. Roles differ in how much of
//! the debate they read:
//!
//! | role | prior context |
//! |---|---|
//! | differential assessor | every completed round |
//! | monitoring strategist | the differential assessor's first response only |
//! | challenger | every completed round |
//! | resource steward | the latest round |
//! | validator | the latest round |

pub mod challenger;
pub mod differential;
pub mod monitoring;
pub mod steward;
pub mod validator;

use serde_json::Value;

use dxpanel_contracts::{
    debate::DebateHistory,
    specialist::SpecialistRole,
};
use dxpanel_core::traits::Specialist;

pub use challenger::Challenger;
pub use differential::DifferentialAssessor;
pub use monitoring::MonitoringStrategist;
pub use steward::ResourceSteward;
pub use validator::QualityValidator;

/// Shared by every prompt. Kept byte-stable: prompts must be deterministic.
pub(crate) const CORE_ASSESSMENT_FIELDS: &str = r#"    "core_assessment": {
        "risk_level": "low|medium|high",
        "confidence": 0.0,
        "primary_concerns": ["concern1", "concern2"],
        "urgency": "routine|expedited|urgent|emergent"
    }"#;

pub(crate) const PANEL_SETTING: &str = "The panel supports a rural primary-care clinic (Puskesmas) in Indonesia: \
basic equipment, limited staff, specialists reachable only by referral to a district or provincial hospital.";

pub(crate) fn opening(role: SpecialistRole) -> String {
    format!(
        "You are the {} on a five-member virtual clinical panel.\n{}",
        role.title(),
        PANEL_SETTING
    )
}

pub(crate) fn closing() -> &'static str {
    "Answer with one JSON object only. No prose before or after it, no Markdown."
}

/// Every completed round, or an empty string before round 1.
pub(crate) fn full_debate(history: &DebateHistory) -> String {
    if history.is_empty() {
        String::new()
    } else {
        format!("PANEL DISCUSSION SO FAR:\n{}\n", history.to_pretty_json())
    }
}

/// The response map of the most recent round, pretty-printed.
pub(crate) fn latest_round_responses(history: &DebateHistory) -> Option<String> {
    let round = history.latest()?;
    let value = serde_json::to_value(round).ok()?;
    value
        .get("specialist_responses")
        .and_then(|r| serde_json::to_string_pretty(r).ok())
}

pub(crate) fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// The standard roster, in speaking order.
pub fn standard_roster() -> Vec<Box<dyn Specialist>> {
    vec![
        Box::new(DifferentialAssessor::new()),
        Box::new(MonitoringStrategist::new()),
        Box::new(Challenger::new()),
        Box::new(ResourceSteward::new()),
        Box::new(QualityValidator::new()),
    ]
}
