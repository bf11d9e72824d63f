//! Signal extraction from structured analyses.
//!
//! Specialists return overlapping but not identical JSON shapes. Each signal
//! (risk level, urgency, primary concerns, referral) is read through an
//! ordered lookup chain: the first key present in the analysis decides, even
//! if the value under it turns out to be empty. Extracted strings are trimmed
//! and lower-cased so "High" and "high" count as the same vote.

use serde_json::Value;

use dxpanel_contracts::{
    assessment::StructuredAnalysis,
    path::resolve_str,
};

/// Probability above which the leading differential implies high risk.
pub const HIGH_RISK_PROBABILITY: f64 = 0.7;
/// Probability above which the leading differential implies medium risk.
pub const MEDIUM_RISK_PROBABILITY: f64 = 0.4;

type Extractor<T> = fn(&Value) -> Option<T>;

const RISK_CHAIN: [(&str, Extractor<String>); 4] = [
    ("core_assessment", risk_from_core),
    ("risk_stratification", risk_from_stratification),
    ("differential_assessments", risk_from_differentials),
    ("analysis_summary", risk_from_summary),
];

const URGENCY_CHAIN: [(&str, Extractor<String>); 4] = [
    ("core_assessment", urgency_from_core),
    ("follow_up_strategy", urgency_from_follow_up),
    ("specialist_consultation", urgency_from_consultation),
    ("immediate_actions", urgency_from_immediate_actions),
];

const CONCERNS_CHAIN: [(&str, Extractor<Vec<String>>); 4] = [
    ("core_assessment", concerns_from_core),
    ("key_physiological_concerns", string_list),
    ("primary_concerns", string_list),
    ("analysis_summary", concerns_from_summary),
];

const REFERRAL_CHAIN: [(&str, Extractor<String>); 2] = [
    ("follow_up_strategy", referral_from_follow_up),
    ("specialist_consultation", referral_from_consultation),
];

/// Every signal the panel reads from one valid analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signals {
    pub risk_level: Option<String>,
    pub urgency: Option<String>,
    pub primary_concerns: Vec<String>,
    pub referral: Option<String>,
}

impl Signals {
    pub fn extract(analysis: &StructuredAnalysis) -> Self {
        Self {
            risk_level: risk_level(analysis),
            urgency: urgency(analysis),
            primary_concerns: primary_concerns(analysis),
            referral: referral(analysis),
        }
    }
}

pub fn risk_level(analysis: &StructuredAnalysis) -> Option<String> {
    first_present(analysis, &RISK_CHAIN)
}

pub fn urgency(analysis: &StructuredAnalysis) -> Option<String> {
    first_present(analysis, &URGENCY_CHAIN)
}

pub fn primary_concerns(analysis: &StructuredAnalysis) -> Vec<String> {
    first_present(analysis, &CONCERNS_CHAIN).unwrap_or_default()
}

/// A specialist-referral recommendation, e.g. "cardiology referral".
pub fn referral(analysis: &StructuredAnalysis) -> Option<String> {
    first_present(analysis, &REFERRAL_CHAIN)
}

fn first_present<T>(analysis: &StructuredAnalysis, chain: &[(&str, Extractor<T>)]) -> Option<T> {
    chain
        .iter()
        .find_map(|(key, extract)| analysis.get(*key).map(|value| extract(value)))
        .flatten()
}

fn normalized(value: &Value, path: &str) -> Option<String> {
    resolve_str(value, path)
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

// ── Risk ─────────────────────────────────────────────────────────────────────

fn risk_from_core(core: &Value) -> Option<String> {
    normalized(core, "risk_level")
}

fn risk_from_stratification(strat: &Value) -> Option<String> {
    normalized(strat, "immediate_risk")
}

fn risk_from_summary(summary: &Value) -> Option<String> {
    normalized(summary, "overall_risk_level")
}

/// Derive a risk level from the highest-probability differential.
///
/// Ties keep the earliest entry. Missing probabilities count as 0.
fn risk_from_differentials(differentials: &Value) -> Option<String> {
    let entries = differentials.as_array().filter(|a| !a.is_empty())?;
    let probability = |entry: &Value| entry.get("probability").and_then(Value::as_f64).unwrap_or(0.0);

    let top = entries
        .iter()
        .map(probability)
        .fold(f64::NEG_INFINITY, f64::max);

    let level = if top > HIGH_RISK_PROBABILITY {
        "high"
    } else if top > MEDIUM_RISK_PROBABILITY {
        "medium"
    } else {
        "low"
    };
    Some(level.to_string())
}

// ── Urgency ──────────────────────────────────────────────────────────────────

fn urgency_from_core(core: &Value) -> Option<String> {
    normalized(core, "urgency")
}

fn urgency_from_follow_up(follow_up: &Value) -> Option<String> {
    normalized(follow_up, "specialist_referral.urgency")
}

fn urgency_from_consultation(consultation: &Value) -> Option<String> {
    normalized(consultation, "urgency")
}

fn urgency_from_immediate_actions(actions: &Value) -> Option<String> {
    actions
        .as_array()
        .filter(|a| !a.is_empty())
        .map(|_| "immediate".to_string())
}

// ── Concerns ─────────────────────────────────────────────────────────────────

fn string_list(value: &Value) -> Option<Vec<String>> {
    value.as_array().map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
}

fn concerns_from_core(core: &Value) -> Option<Vec<String>> {
    core.get("primary_concerns").and_then(string_list)
}

fn concerns_from_summary(summary: &Value) -> Option<Vec<String>> {
    summary.get("primary_concerns").and_then(string_list)
}

// ── Referral ─────────────────────────────────────────────────────────────────

fn referral_from_follow_up(follow_up: &Value) -> Option<String> {
    let referral = follow_up.get("specialist_referral")?;
    if referral.get("recommended").and_then(Value::as_bool) != Some(true) {
        return None;
    }
    let specialty = resolve_str(referral, "specialty").unwrap_or("specialist");
    Some(format!("{specialty} referral"))
}

fn referral_from_consultation(consultation: &Value) -> Option<String> {
    let urgency = resolve_str(consultation, "urgency")?;
    let specialty = resolve_str(consultation, "specialty").unwrap_or("specialist");
    Some(format!("{specialty} referral ({urgency})"))
}
