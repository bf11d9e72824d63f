//! Consulting one specialist: prompt, generate, parse.
//!
//! A consultation never fails. A failed generation call becomes an
//! `{"error": ..}` analysis; text that is not a JSON object is kept as a
//! raw-text fallback. Both are excluded from consensus math downstream.

use chrono::Utc;
use tracing::{debug, warn};

use dxpanel_contracts::{
    assessment::{Analysis, SpecialistAssessment},
    debate::DebateHistory,
    patient::PatientRecord,
};

use crate::{
    parser,
    traits::{Generator, Specialist},
};

/// Ask `specialist` for its assessment of `record` given the completed rounds.
pub fn consult(
    specialist: &dyn Specialist,
    generator: &dyn Generator,
    record: &PatientRecord,
    history: &DebateHistory,
) -> SpecialistAssessment {
    let prompt = specialist.build_prompt(record, history);

    debug!(
        specialist = %specialist.id(),
        prior_rounds = history.len(),
        prompt_bytes = prompt.len(),
        "consulting specialist"
    );

    let analysis = match generator.generate(&prompt) {
        Ok(text) => {
            let analysis = parser::parse_or_fallback(&text);
            if let Analysis::RawText(fallback) = &analysis {
                warn!(
                    specialist = %specialist.id(),
                    parsing_error = %fallback.parsing_error,
                    "specialist response kept as raw text"
                );
            }
            analysis
        }
        Err(e) => {
            warn!(
                specialist = %specialist.id(),
                error = %e,
                "specialist generation call failed"
            );
            Analysis::error(e.to_string())
        }
    };

    SpecialistAssessment {
        specialist_id: specialist.id().clone(),
        role: specialist.role(),
        analysis,
        produced_at: Utc::now(),
    }
}
