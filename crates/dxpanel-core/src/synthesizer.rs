//! The consensus synthesizer.
//!
//! Primary path: one generation call over the full debate history, parsed
//! and (optionally) validated. Any failure on that path routes to
//! [`fallback_consensus`], a pure aggregate over the debate history that
//! always produces a verdict. `synthesize` therefore never fails.

use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use dxpanel_contracts::{
    consensus::{FinalConsensus, SynthesisSource},
    debate::DebateHistory,
    patient::PatientRecord,
};

use crate::{
    consensus::plurality,
    parser,
    signals::Signals,
    traits::{ConsensusValidator, Generator},
};

/// Fixed confidence reported by the fallback verdict. Not computed.
pub const FALLBACK_CONFIDENCE: f64 = 0.7;
pub const FALLBACK_RISK_LEVEL: &str = "medium";
pub const FALLBACK_URGENCY: &str = "routine";
pub const MAX_SUMMARY_ITEMS: usize = 5;

pub const ESCALATION_TRIGGERS: [&str; 4] = [
    "Worsening symptoms",
    "SpO2 < 90%",
    "Heart rate > 120 bpm",
    "Severe chest pain",
];

/// First line of every synthesis prompt.
pub const SYNTHESIS_PROMPT_OPENING: &str = "You chair a virtual clinical panel.";

const TACHYCARDIA_BPM: f64 = 90.0;
const TACHYPNEA_RPM: f64 = 20.0;
const BRADYPNEA_RPM: f64 = 12.0;

pub struct ConsensusSynthesizer {
    generator: Arc<dyn Generator>,
    validator: Option<Box<dyn ConsensusValidator>>,
}

impl ConsensusSynthesizer {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator, validator: None }
    }

    /// Check generated verdicts with `validator` before accepting them.
    pub fn with_validator(mut self, validator: Box<dyn ConsensusValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn synthesize(&self, history: &DebateHistory, record: &PatientRecord) -> FinalConsensus {
        if history.is_empty() {
            warn!("no debate history, returning placeholder consensus");
            return placeholder_consensus();
        }

        let prompt = synthesis_prompt(history, record);
        debug!(rounds = history.len(), prompt_bytes = prompt.len(), "requesting synthesis");

        let call = panic::catch_unwind(AssertUnwindSafe(|| self.generator.generate(&prompt)));
        let raw = match call {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                warn!(error = %e, "synthesis call failed, using fallback consensus");
                return fallback_consensus(history, record, &format!("Error: {e}"));
            }
            Err(_) => {
                warn!("synthesis call panicked, using fallback consensus");
                return fallback_consensus(history, record, "Error: synthesis call panicked");
            }
        };

        let verdict = match parser::parse(&raw) {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(error = %e, "synthesis response unparsable, using fallback consensus");
                return fallback_consensus(history, record, &raw);
            }
        };

        if let Some(validator) = &self.validator {
            let candidate = Value::Object(verdict.clone());
            match validator.validate(&candidate) {
                Ok(report) if report.passed => {}
                Ok(report) => {
                    let summary = report.summary();
                    warn!(failures = %summary, "synthesis verdict rejected, using fallback consensus");
                    return fallback_consensus(
                        history,
                        record,
                        &format!("Validation failed ({summary}): {raw}"),
                    );
                }
                Err(e) => {
                    warn!(error = %e, "synthesis validator errored, using fallback consensus");
                    return fallback_consensus(
                        history,
                        record,
                        &format!("Validation failed ({e}): {raw}"),
                    );
                }
            }
        }

        info!(rounds = history.len(), "synthesis verdict accepted");
        FinalConsensus::new(SynthesisSource::Generated, verdict)
    }
}

fn placeholder_consensus() -> FinalConsensus {
    let verdict = json!({
        "analysis_summary": {
            "overall_risk_level": FALLBACK_RISK_LEVEL,
            "primary_concerns": ["Insufficient data for complete assessment"],
            "key_recommendations": ["Collect additional clinical data"],
            "follow_up_needed": true
        },
        "consensus_notes": "No specialist debate available"
    });
    FinalConsensus::new(SynthesisSource::Fallback, into_map(verdict))
}

/// Rebuild a verdict from every valid response of every round.
///
/// Pure: the same history, record and raw text always produce an identical
/// verdict. Ties in plurality picks go to the value seen first.
pub fn fallback_consensus(history: &DebateHistory, record: &PatientRecord, raw: &str) -> FinalConsensus {
    let mut risks = Vec::new();
    let mut urgencies = Vec::new();
    let mut concerns: Vec<String> = Vec::new();
    let mut referrals: Vec<String> = Vec::new();
    let mut valid_responses = 0usize;

    for round in history.iter() {
        for analysis in round.valid_responses().filter_map(|r| r.analysis.as_structured()) {
            valid_responses += 1;
            let signals = Signals::extract(analysis);
            risks.extend(signals.risk_level);
            urgencies.extend(signals.urgency);
            push_unique(&mut concerns, signals.primary_concerns);
            push_unique(&mut referrals, signals.referral);
        }
    }

    let risk = plurality(risks.iter().map(String::as_str))
        .map_or(FALLBACK_RISK_LEVEL, |(value, _)| value);
    let urgency = plurality(urgencies.iter().map(String::as_str))
        .map_or(FALLBACK_URGENCY, |(value, _)| value);

    let specialty = if concerns.iter().any(|c| c.to_lowercase().contains("chest pain")) {
        "cardiology"
    } else {
        "internal_medicine"
    };

    let heart_rate_status = match record.ecg_heart_rate() {
        Some(bpm) if bpm > TACHYCARDIA_BPM => "elevated",
        _ => "normal",
    };
    let respiratory_rate_status = match respiratory_rate(record) {
        Some(rpm) if rpm > TACHYPNEA_RPM => "tachypneic",
        Some(rpm) if rpm < BRADYPNEA_RPM => "bradypneic",
        _ => "normal",
    };

    let verdict = json!({
        "analysis_summary": {
            "overall_risk_level": risk,
            "confidence_score": FALLBACK_CONFIDENCE,
            "primary_concerns": concerns.iter().take(MAX_SUMMARY_ITEMS).collect::<Vec<_>>(),
            "key_recommendations": referrals.iter().take(MAX_SUMMARY_ITEMS).collect::<Vec<_>>(),
            "follow_up_needed": true,
            "consensus_urgency": urgency
        },
        "vital_signs_interpretation": {
            "cardiovascular_assessment": {
                "heart_rate_status": heart_rate_status,
                "clinical_significance": "Requires monitoring and specialist evaluation"
            },
            "respiratory_assessment": {
                "rate_status": respiratory_rate_status,
                "clinical_significance": "Derived from video vitals when available"
            }
        },
        "risk_assessment": {
            "immediate_risk": risk,
            "risk_factors": concerns,
            "escalation_triggers": ESCALATION_TRIGGERS
        },
        "recommendations": {
            "immediate_actions": ["Continuous monitoring", "Specialist consultation"],
            "specialist_consultation": {
                "urgency": urgency,
                "specialty": specialty
            }
        },
        "consensus_notes": format!(
            "Consensus built from {} debate rounds with {} valid specialist responses",
            history.len(),
            valid_responses
        ),
        "raw_consensus_response": raw
    });

    FinalConsensus::new(SynthesisSource::Fallback, into_map(verdict))
}

/// Video-derived respiratory rate; uploads report either key.
fn respiratory_rate(record: &PatientRecord) -> Option<f64> {
    ["respiratory_rate_bpm", "respiratory_rate_mean"]
        .iter()
        .find_map(|key| {
            record
                .lookup(&format!("vital_signs_data.video_vitals_analysis.{key}"))
                .and_then(Value::as_f64)
        })
}

fn push_unique(into: &mut Vec<String>, items: impl IntoIterator<Item = String>) {
    for item in items {
        if !into.contains(&item) {
            into.push(item);
        }
    }
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// The synthesis prompt: full history, the record and the output template.
pub fn synthesis_prompt(history: &DebateHistory, record: &PatientRecord) -> String {
    format!(
        r#"{opening} Five specialists have debated the case below over {rounds} round(s).
Merge their positions into one verdict. Weigh the challenger's objections and the validator's safety checks, keep
recommendations feasible for a rural primary-care clinic, and settle disagreements on the strength of the evidence.

DEBATE HISTORY:
{history}

PATIENT RECORD:
{record}

Respond with a single JSON object and nothing else, using this structure:
{{
  "analysis_summary": {{
    "overall_risk_level": "low|medium|high",
    "confidence_score": 0.0,
    "primary_concerns": ["..."]
  }},
  "vital_signs_interpretation": {{
    "spo2_assessment": {{ "status": "normal|borderline_low|low|critically_low", "clinical_significance": "..." }},
    "cardiovascular_assessment": {{ "heart_rate_status": "bradycardic|normal|tachycardic", "rhythm_assessment": "...", "clinical_significance": "..." }},
    "respiratory_assessment": {{ "rate_status": "bradypneic|normal|tachypneic", "clinical_significance": "..." }}
  }},
  "clinical_findings": [
    {{ "category": "cardiovascular|respiratory|neurological|general", "finding": "...", "severity": "mild|moderate|severe", "confidence": 0.0 }}
  ],
  "risk_assessment": {{
    "immediate_risk": "low|medium|high",
    "risk_factors": ["..."],
    "escalation_triggers": ["..."]
  }},
  "recommendations": {{
    "immediate_actions": ["..."],
    "specialist_consultation": {{ "urgency": "immediate|within_4_hours|within_24_hours|routine", "specialty": "..." }},
    "monitoring_recommendations": ["..."]
  }},
  "patient_communication": {{ "summary_for_patient": "...", "warning_signs": ["..."] }},
  "data_quality_assessment": {{ "overall_quality": "excellent|good|fair|poor", "limitations": ["..."] }},
  "panel_metadata": {{ "debate_rounds_completed": {rounds}, "remaining_uncertainties": ["..."] }}
}}"#,
        opening = SYNTHESIS_PROMPT_OPENING,
        rounds = history.len(),
        history = history.to_pretty_json(),
        record = record.to_pretty_json(),
    )
}
