//! The top-level deliberation entry point.
//!
//!   anonymize → moderator rounds → synthesis → seal transcript → result
//!
//! `deliberate` is total: generation failures, unparsable responses and
//! recorder errors are all absorbed into the result.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use dxpanel_contracts::{
    consensus::{DeliberationResult, PanelMetadata},
    debate::DebateRound,
    error::PanelResult,
    patient::PatientRecord,
    settings::PanelSettings,
    specialist::DeliberationId,
};

use crate::{
    anonymize::anonymize,
    moderator::DebateModerator,
    synthesizer::ConsensusSynthesizer,
    traits::{ConsensusValidator, Generator, RoundRecorder, Specialist},
};

/// A recorder that keeps nothing.
pub struct NullRecorder;

impl RoundRecorder for NullRecorder {
    fn record(&self, _id: &DeliberationId, _round: &DebateRound) -> PanelResult<()> {
        Ok(())
    }

    fn finalize(&self, _id: &DeliberationId) -> PanelResult<Option<String>> {
        Ok(None)
    }
}

/// A configured panel: generator, roster and round settings fixed at
/// construction. Holds no per-deliberation state, so one panel can serve
/// any number of independent calls.
pub struct Panel {
    generator: Arc<dyn Generator>,
    moderator: DebateModerator,
    synthesizer: ConsensusSynthesizer,
}

impl Panel {
    pub fn new(
        generator: Arc<dyn Generator>,
        roster: Vec<Box<dyn Specialist>>,
        settings: PanelSettings,
    ) -> Self {
        Self {
            moderator: DebateModerator::new(generator.clone(), roster, settings),
            synthesizer: ConsensusSynthesizer::new(generator.clone()),
            generator,
        }
    }

    pub fn with_validator(mut self, validator: Box<dyn ConsensusValidator>) -> Self {
        self.synthesizer = self.synthesizer.with_validator(validator);
        self
    }

    pub fn settings(&self) -> &PanelSettings {
        self.moderator.settings()
    }

    pub fn deliberate(&self, record: &PatientRecord) -> DeliberationResult {
        self.deliberate_recorded(record, &NullRecorder)
    }

    /// Run a deliberation, streaming every completed round to `recorder`.
    ///
    /// Identifying fields are stripped before any prompt is built; the
    /// caller's record is attached to the result unchanged.
    pub fn deliberate_recorded(
        &self,
        record: &PatientRecord,
        recorder: &dyn RoundRecorder,
    ) -> DeliberationResult {
        let deliberation_id = DeliberationId::new();
        info!(
            deliberation_id = %deliberation_id,
            chief_complaint = record.chief_complaint().unwrap_or("unspecified"),
            max_rounds = self.settings().max_rounds,
            threshold = self.settings().consensus_threshold,
            "deliberation starting"
        );

        let anonymized = anonymize(record);
        let outcome = self.moderator.run(&deliberation_id, &anonymized, recorder);
        let final_consensus = self.synthesizer.synthesize(&outcome.history, &anonymized);

        let transcript_hash = recorder.finalize(&deliberation_id).unwrap_or_else(|e| {
            warn!(deliberation_id = %deliberation_id, error = %e, "failed to seal transcript");
            None
        });

        let panel_metadata = PanelMetadata {
            deliberation_id: deliberation_id.clone(),
            rounds_completed: outcome.history.len(),
            final_consensus_level: outcome
                .history
                .latest()
                .map_or(0.0, |round| round.consensus_level),
            termination: outcome.termination,
            synthesis_source: final_consensus.source,
            model_identifier: self.generator.model_identifier().to_string(),
            timestamp: Utc::now(),
            transcript_hash,
        };

        info!(
            deliberation_id = %deliberation_id,
            rounds = panel_metadata.rounds_completed,
            consensus_level = panel_metadata.final_consensus_level,
            source = ?panel_metadata.synthesis_source,
            "deliberation complete"
        );

        DeliberationResult {
            original_patient_record: record.clone(),
            debate_history: outcome.history,
            final_consensus,
            panel_metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use dxpanel_contracts::{consensus::SynthesisSource, debate::Termination};

    use super::*;
    use crate::testing::{echo_roster, MockRecorder, ScriptedGenerator};

    fn record() -> PatientRecord {
        PatientRecord::new(json!({
            "personal_information": {
                "full_name": "Siti Rahma",
                "phone_number": "+62 812 0000 0000",
                "age": 58
            },
            "symptoms_context": { "chief_complaint": "chest_pain" }
        }))
    }

    fn panel(generator: ScriptedGenerator) -> Panel {
        Panel::new(Arc::new(generator), echo_roster(), PanelSettings::default())
    }

    #[test]
    fn test_always_failing_generator_still_yields_a_result() {
        let result = panel(ScriptedGenerator::failing()).deliberate(&record());

        assert_eq!(result.panel_metadata.rounds_completed, 3);
        assert_eq!(result.panel_metadata.termination, Termination::RoundsExhausted);
        assert_eq!(result.panel_metadata.final_consensus_level, 0.0);
        assert_eq!(result.panel_metadata.synthesis_source, SynthesisSource::Fallback);
        assert_eq!(result.final_consensus.overall_risk_level(), Some("medium"));
        assert_eq!(result.panel_metadata.model_identifier, "scripted-test-model");
    }

    #[test]
    fn test_always_unparsable_generator_still_yields_a_result() {
        let result = panel(ScriptedGenerator::constant("I am unable to comply.")).deliberate(&record());

        assert_eq!(result.debate_history.len(), 3);
        assert!(result.debate_history.iter().all(|r| r.valid_responses().count() == 0));
        assert_eq!(result.final_consensus.source, SynthesisSource::Fallback);
        assert_eq!(
            result.final_consensus.lookup("raw_consensus_response").unwrap(),
            "I am unable to comply."
        );
    }

    #[test]
    fn test_prompts_never_carry_identifiers_but_result_keeps_the_original() {
        let generator = ScriptedGenerator::unanimous("high", "urgent");
        let prompts = generator.prompts.clone();
        let input = record();

        let result = panel(generator).deliberate(&input);

        let prompts = prompts.lock().unwrap();
        assert!(!prompts.is_empty());
        assert!(prompts.iter().all(|p| !p.contains("Siti Rahma") && !p.contains("+62 812")));
        assert!(prompts.iter().any(|p| p.contains("\"age\"")));
        assert_eq!(result.original_patient_record, input);
        assert_eq!(result.original_patient_record, record());
    }

    #[test]
    fn test_unanimous_panel_reaches_consensus_in_one_round() {
        let result = panel(ScriptedGenerator::unanimous("high", "urgent")).deliberate(&record());

        assert_eq!(result.panel_metadata.rounds_completed, 1);
        assert_eq!(result.panel_metadata.termination, Termination::ConsensusReached);
        assert_eq!(result.panel_metadata.final_consensus_level, 1.0);
        // The unanimous stub is not a verdict shape, but no validator is set.
        assert_eq!(result.panel_metadata.synthesis_source, SynthesisSource::Generated);
    }

    #[test]
    fn test_recorder_sees_rounds_and_seals_the_transcript() {
        let recorder = MockRecorder::new();
        let result = panel(ScriptedGenerator::failing()).deliberate_recorded(&record(), &recorder);

        assert_eq!(*recorder.rounds.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(*recorder.finalized.lock().unwrap(), 1);
        assert_eq!(result.panel_metadata.transcript_hash.as_deref(), Some("feedface"));
    }

    #[test]
    fn test_failing_recorder_is_not_fatal() {
        let result = panel(ScriptedGenerator::failing())
            .deliberate_recorded(&record(), &MockRecorder::failing());
        assert!(result.panel_metadata.transcript_hash.is_none());
        assert_eq!(result.debate_history.len(), 3);
    }

    #[test]
    fn test_result_serializes_with_expected_top_level_keys() {
        let result = panel(ScriptedGenerator::failing()).deliberate(&record());
        let value = serde_json::to_value(&result).unwrap();
        for key in ["original_patient_record", "debate_history", "final_consensus", "panel_metadata"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert!(value["debate_history"][0]["specialist_responses"]["s1"]["analysis"]["error"].is_string());
    }
}
