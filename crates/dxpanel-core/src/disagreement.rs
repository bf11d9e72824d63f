//! Disagreement detection over a round's valid responses.
//!
//! Output is coarse: one string per signal that is not
//! unanimous, naming every specialist that reported a value.

use dxpanel_contracts::assessment::SpecialistAssessment;

use crate::signals;

/// More distinct concerns than this across the panel is flagged.
pub const CONCERN_SPREAD_LIMIT: usize = 3;

pub fn detect(responses: &[SpecialistAssessment]) -> Vec<String> {
    let valid: Vec<_> = responses
        .iter()
        .filter_map(|r| r.analysis.as_structured().map(|a| (r, a)))
        .collect();

    let mut disagreements = Vec::new();

    let risks: Vec<(&str, String)> = valid
        .iter()
        .filter_map(|(r, a)| signals::risk_level(a).map(|v| (r.specialist_id.as_str(), v)))
        .collect();
    if let Some(line) = summarize("Risk assessment disagreement", &risks) {
        disagreements.push(line);
    }

    let urgencies: Vec<(&str, String)> = valid
        .iter()
        .filter_map(|(r, a)| signals::urgency(a).map(|v| (r.specialist_id.as_str(), v)))
        .collect();
    if let Some(line) = summarize("Urgency disagreement", &urgencies) {
        disagreements.push(line);
    }

    let mut concerns: Vec<String> = Vec::new();
    for (_, analysis) in &valid {
        for concern in signals::primary_concerns(analysis) {
            if !concerns.contains(&concern) {
                concerns.push(concern);
            }
        }
    }
    if concerns.len() > CONCERN_SPREAD_LIMIT {
        disagreements.push(format!(
            "Multiple different concerns identified: {}",
            concerns.join(", ")
        ));
    }

    disagreements
}

fn summarize(label: &str, values: &[(&str, String)]) -> Option<String> {
    let first = &values.first()?.1;
    if values.iter().all(|(_, v)| v == first) {
        return None;
    }
    let parts: Vec<String> = values
        .iter()
        .map(|(id, value)| format!("{id}({value})"))
        .collect();
    Some(format!("{label}: {}", parts.join(", ")))
}
