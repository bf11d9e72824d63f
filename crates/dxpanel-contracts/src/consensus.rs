//! Final verdicts and the per-call deliberation result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    debate::{DebateHistory, Termination},
    path::{resolve_path, resolve_str},
    patient::PatientRecord,
    specialist::DeliberationId,
};

/// Where a `FinalConsensus` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisSource {
    /// Produced by the synthesis generation call and accepted.
    Generated,
    /// Rebuilt deterministically from the debate history.
    Fallback,
}

/// The panel's unified verdict.
///
/// The verdict body is a JSON object. Generated and fallback verdicts share
/// the `analysis_summary` block; consumers must not assume anything beyond it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalConsensus {
    #[serde(skip)]
    pub source: SynthesisSource,
    #[serde(flatten)]
    pub verdict: Map<String, Value>,
}

impl FinalConsensus {
    pub fn new(source: SynthesisSource, verdict: Map<String, Value>) -> Self {
        Self { source, verdict }
    }

    /// Look up a dot-separated path in the verdict body.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let first = self.verdict.get(head).filter(|v| !v.is_null())?;
        match rest {
            Some(rest) => resolve_path(first, rest),
            None => Some(first),
        }
    }

    pub fn overall_risk_level(&self) -> Option<&str> {
        self.verdict
            .get("analysis_summary")
            .and_then(|s| resolve_str(s, "overall_risk_level"))
    }

    pub fn confidence_score(&self) -> Option<f64> {
        self.lookup("analysis_summary.confidence_score")
            .and_then(Value::as_f64)
    }

    pub fn primary_concerns(&self) -> Vec<&str> {
        self.lookup("analysis_summary.primary_concerns")
            .and_then(Value::as_array)
            .map(|a| a.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// Bookkeeping attached to every deliberation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelMetadata {
    pub deliberation_id: DeliberationId,
    pub rounds_completed: usize,
    /// Consensus level of the last executed round.
    pub final_consensus_level: f64,
    pub termination: Termination,
    pub synthesis_source: SynthesisSource,
    pub model_identifier: String,
    pub timestamp: DateTime<Utc>,
    /// Terminal hash of the round transcript, when one was recorded.
    pub transcript_hash: Option<String>,
}

/// Everything one call to `deliberate` returns. Owned by the caller.
#[derive(Debug, Clone, Serialize)]
pub struct DeliberationResult {
    /// The caller's record, exactly as supplied (not anonymized).
    pub original_patient_record: PatientRecord,
    pub debate_history: DebateHistory,
    pub final_consensus: FinalConsensus,
    pub panel_metadata: PanelMetadata,
}
