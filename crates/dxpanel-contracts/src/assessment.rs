//! Specialist assessments and the tagged union of analysis shapes.
//!
//! A specialist's output is one of three things: a parsed JSON object, the
//! raw text that failed to parse, or the error from a failed generation call.
//! Only the first kind takes part in consensus and disagreement math.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::specialist::{SpecialistId, SpecialistRole};

/// A parsed specialist response. Any JSON object is accepted; the common
/// `core_assessment` block is read through the signal extractors.
pub type StructuredAnalysis = Map<String, Value>;

/// Generated text that could not be parsed as a JSON object.
///
/// Kept verbatim for debugging and excluded from every consensus computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawTextFallback {
    pub raw_response: String,
    pub note: String,
    pub parsing_error: String,
}

impl RawTextFallback {
    pub const NOTE: &'static str = "Response not in valid JSON format, stored as raw text";

    pub fn new(raw_response: impl Into<String>, parsing_error: impl Into<String>) -> Self {
        Self {
            raw_response: raw_response.into(),
            note: Self::NOTE.to_string(),
            parsing_error: parsing_error.into(),
        }
    }
}

/// The generation call for this specialist failed or timed out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorResult {
    pub error: String,
}

/// What a specialist produced in one round.
///
/// Serialized untagged so each variant keeps its natural JSON shape:
/// `{"error": ..}`, `{"raw_response": .., "note": .., "parsing_error": ..}`
/// or the parsed object itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Analysis {
    Error(ErrorResult),
    RawText(RawTextFallback),
    Structured(StructuredAnalysis),
}

impl Analysis {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(ErrorResult { error: message.into() })
    }

    /// True only for parsed analyses. Errors and raw-text fallbacks are invalid.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Structured(_))
    }

    pub fn as_structured(&self) -> Option<&StructuredAnalysis> {
        match self {
            Self::Structured(map) => Some(map),
            _ => None,
        }
    }
}

/// One specialist's contribution to one debate round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialistAssessment {
    pub specialist_id: SpecialistId,
    pub role: SpecialistRole,
    pub analysis: Analysis,
    pub produced_at: DateTime<Utc>,
}

impl SpecialistAssessment {
    pub fn is_valid(&self) -> bool {
        self.analysis.is_valid()
    }
}
