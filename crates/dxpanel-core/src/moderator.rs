//! The debate moderator: a bounded round loop.
//!
//! ```text
//!   InProgress(1) ─▶ consult all ─▶ score ─▶ detect ─▶ append ─┬─▶ ConsensusReached
//!        ▲                                                     ├─▶ RoundsExhausted
//!        └──────────────────── InProgress(k+1) ◀───────────────┘
//! ```
//!
//! Every specialist in round `k` sees exactly rounds `1..k-1`. That holds in
//! both scheduling modes: the round's history snapshot is borrowed immutably
//! while the specialists run, and the new round is appended only after all
//! of them have returned.

use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    thread,
};

use chrono::Utc;
use tracing::{debug, info, warn};

use dxpanel_contracts::{
    assessment::{Analysis, SpecialistAssessment},
    debate::{DebateHistory, DebateRound, Termination},
    patient::PatientRecord,
    settings::PanelSettings,
    specialist::DeliberationId,
};

use crate::{
    consensus, disagreement,
    specialist::consult,
    traits::{Generator, RoundRecorder, Specialist},
};

/// Error text recorded for a specialist call that panicked.
pub const PANICKED_CALL: &str = "specialist call panicked";

/// Position of the round loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    /// Round `k` (1-based) is next to run.
    InProgress(u32),
    Terminated(Termination),
}

/// The transition taken after round `round` scored `level`.
pub fn next_state(round: u32, level: f64, max_rounds: u32, threshold: f64) -> RoundState {
    if level >= threshold {
        RoundState::Terminated(Termination::ConsensusReached)
    } else if round < max_rounds {
        RoundState::InProgress(round + 1)
    } else {
        RoundState::Terminated(Termination::RoundsExhausted)
    }
}

/// What the round loop hands to synthesis.
#[derive(Debug, Clone)]
pub struct DebateOutcome {
    pub history: DebateHistory,
    pub termination: Termination,
}

pub struct DebateModerator {
    generator: Arc<dyn Generator>,
    roster: Vec<Box<dyn Specialist>>,
    settings: PanelSettings,
}

impl DebateModerator {
    pub fn new(
        generator: Arc<dyn Generator>,
        roster: Vec<Box<dyn Specialist>>,
        settings: PanelSettings,
    ) -> Self {
        Self { generator, roster, settings }
    }

    pub fn settings(&self) -> &PanelSettings {
        &self.settings
    }

    /// Run rounds until consensus or the round cap. At least one round always
    /// runs, so a configured cap of zero behaves like one.
    pub fn run(
        &self,
        deliberation_id: &DeliberationId,
        record: &PatientRecord,
        recorder: &dyn RoundRecorder,
    ) -> DebateOutcome {
        let max_rounds = self.settings.max_rounds.max(1);
        let threshold = self.settings.consensus_threshold;
        let mut history = DebateHistory::new();
        let mut state = RoundState::InProgress(1);

        loop {
            let round_number = match state {
                RoundState::InProgress(k) => k,
                RoundState::Terminated(termination) => {
                    info!(
                        deliberation_id = %deliberation_id,
                        rounds = history.len(),
                        termination = ?termination,
                        "debate finished"
                    );
                    return DebateOutcome { history, termination };
                }
            };

            debug!(
                deliberation_id = %deliberation_id,
                round = round_number,
                concurrent = self.settings.concurrent_rounds,
                "debate round starting"
            );

            let responses = self.consult_all(record, &history);
            let consensus_level = consensus::score(&responses);
            let key_disagreements = disagreement::detect(&responses);

            info!(
                deliberation_id = %deliberation_id,
                round = round_number,
                consensus_level,
                disagreements = key_disagreements.len(),
                "debate round scored"
            );

            let round = DebateRound {
                round_number,
                specialist_responses: responses,
                consensus_level,
                key_disagreements,
            };

            if let Err(e) = recorder.record(deliberation_id, &round) {
                warn!(
                    deliberation_id = %deliberation_id,
                    round = round_number,
                    error = %e,
                    "failed to record debate round"
                );
            }

            history.push(round);
            state = next_state(round_number, consensus_level, max_rounds, threshold);
        }
    }

    /// One assessment per specialist, in roster order.
    ///
    /// A specialist call that panics becomes an error analysis in both
    /// scheduling modes.
    fn consult_all(&self, record: &PatientRecord, history: &DebateHistory) -> Vec<SpecialistAssessment> {
        let generator = self.generator.as_ref();

        if !self.settings.concurrent_rounds {
            return self
                .roster
                .iter()
                .map(|s| consult_contained(s.as_ref(), generator, record, history))
                .collect();
        }

        thread::scope(|scope| {
            let handles: Vec<_> = self
                .roster
                .iter()
                .map(|s| {
                    let specialist = s.as_ref();
                    let handle = scope
                        .spawn(move || consult_contained(specialist, generator, record, history));
                    (specialist, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(specialist, handle)| {
                    handle.join().unwrap_or_else(|_| panicked(specialist))
                })
                .collect()
        })
    }
}

fn consult_contained(
    specialist: &dyn Specialist,
    generator: &dyn Generator,
    record: &PatientRecord,
    history: &DebateHistory,
) -> SpecialistAssessment {
    panic::catch_unwind(AssertUnwindSafe(|| consult(specialist, generator, record, history)))
        .unwrap_or_else(|_| panicked(specialist))
}

fn panicked(specialist: &dyn Specialist) -> SpecialistAssessment {
    warn!(specialist = %specialist.id(), "specialist call panicked");
    SpecialistAssessment {
        specialist_id: specialist.id().clone(),
        role: specialist.role(),
        analysis: Analysis::error(PANICKED_CALL),
        produced_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use dxpanel_contracts::specialist::SpecialistId;

    use super::*;
    use crate::testing::{echo_roster, MockRecorder, ScriptedGenerator};

    fn record() -> PatientRecord {
        PatientRecord::new(json!({ "symptoms_context": { "chief_complaint": "chest_pain" } }))
    }

    fn moderator(generator: ScriptedGenerator, settings: PanelSettings) -> DebateModerator {
        DebateModerator::new(Arc::new(generator), echo_roster(), settings)
    }

    // ── State transitions ────────────────────────────────────────────────────

    #[test]
    fn test_transitions() {
        assert_eq!(
            next_state(1, 0.8, 3, 0.8),
            RoundState::Terminated(Termination::ConsensusReached)
        );
        assert_eq!(next_state(1, 0.6, 3, 0.8), RoundState::InProgress(2));
        assert_eq!(
            next_state(3, 0.6, 3, 0.8),
            RoundState::Terminated(Termination::RoundsExhausted)
        );
    }

    // ── Round loop ───────────────────────────────────────────────────────────

    #[test]
    fn test_unanimous_first_round_stops_early() {
        let generator = ScriptedGenerator::unanimous("high", "urgent");
        let calls = generator.calls.clone();
        let m = moderator(generator, PanelSettings::default());
        let recorder = MockRecorder::new();

        let out = m.run(&DeliberationId::new(), &record(), &recorder);

        assert_eq!(out.termination, Termination::ConsensusReached);
        assert_eq!(out.history.len(), 1);
        assert_eq!(out.history.rounds()[0].consensus_level, 1.0);
        assert!(out.history.rounds()[0].key_disagreements.is_empty());
        assert_eq!(*calls.lock().unwrap(), 5);
        assert_eq!(*recorder.rounds.lock().unwrap(), vec![1]);
    }

    #[test]
    fn test_never_more_than_max_rounds() {
        let generator = ScriptedGenerator::failing();
        let m = moderator(generator, PanelSettings::with_limits(3, 0.8));

        let out = m.run(&DeliberationId::new(), &record(), &MockRecorder::new());

        assert_eq!(out.termination, Termination::RoundsExhausted);
        assert_eq!(out.history.len(), 3);
        let numbers: Vec<u32> = out.history.iter().map(|r| r.round_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(out.history.iter().all(|r| r.consensus_level == 0.0));
    }

    #[test]
    fn test_zero_round_cap_still_runs_one_round() {
        let m = moderator(ScriptedGenerator::failing(), PanelSettings::with_limits(0, 0.8));
        let out = m.run(&DeliberationId::new(), &record(), &MockRecorder::new());
        assert_eq!(out.history.len(), 1);
    }

    #[test]
    fn test_each_round_sees_only_completed_rounds() {
        let generator = ScriptedGenerator::constant("not json");
        let prompts = generator.prompts.clone();
        let m = moderator(generator, PanelSettings::with_limits(2, 0.8));

        m.run(&DeliberationId::new(), &record(), &MockRecorder::new());

        let prompts = prompts.lock().unwrap();
        assert_eq!(prompts.len(), 10);
        assert!(prompts[..5].iter().all(|p| p.contains("|rounds=0|")));
        assert!(prompts[5..].iter().all(|p| p.contains("|rounds=1|")));
    }

    #[test]
    fn test_responses_are_in_roster_order() {
        let m = moderator(ScriptedGenerator::unanimous("low", "routine"), PanelSettings::default());
        let out = m.run(&DeliberationId::new(), &record(), &MockRecorder::new());

        let ids: Vec<&str> = out.history.rounds()[0]
            .specialist_responses
            .iter()
            .map(|r| r.specialist_id.as_str())
            .collect();
        assert_eq!(ids, vec!["s1", "s2", "s3", "s4", "s5"]);
    }

    #[test]
    fn test_concurrent_rounds_keep_roster_order_and_isolation() {
        let settings = PanelSettings {
            concurrent_rounds: true,
            ..PanelSettings::with_limits(2, 0.99)
        };
        // s1 says high, everyone else medium: never unanimous.
        let generator = ScriptedGenerator::new(|prompt| {
            let risk = if prompt.starts_with("s1|") { "high" } else { "medium" };
            Ok(json!({ "core_assessment": { "risk_level": risk, "urgency": "urgent" } }).to_string())
        });
        let prompts = generator.prompts.clone();
        let m = moderator(generator, settings);

        let out = m.run(&DeliberationId::new(), &record(), &MockRecorder::new());

        assert_eq!(out.history.len(), 2);
        for round in out.history.iter() {
            let ids: Vec<&str> = round
                .specialist_responses
                .iter()
                .map(|r| r.specialist_id.as_str())
                .collect();
            assert_eq!(ids, vec!["s1", "s2", "s3", "s4", "s5"]);
            assert!((round.consensus_level - 0.9).abs() < 1e-9);
        }
        let first = out.history.rounds()[0].response(&SpecialistId::new("s1")).unwrap();
        assert!(first.is_valid());

        let prompts = prompts.lock().unwrap();
        assert_eq!(prompts.iter().filter(|p| p.contains("|rounds=0|")).count(), 5);
        assert_eq!(prompts.iter().filter(|p| p.contains("|rounds=1|")).count(), 5);
    }

    #[test]
    fn test_recorder_failure_does_not_abort() {
        let m = moderator(ScriptedGenerator::unanimous("low", "routine"), PanelSettings::default());
        let out = m.run(&DeliberationId::new(), &record(), &MockRecorder::failing());
        assert_eq!(out.history.len(), 1);
    }

    #[test]
    fn test_mixed_round_excludes_invalid_responses() {
        let counter = Arc::new(Mutex::new(0u32));
        let seen = counter.clone();
        // Calls 2 and 4 of the round fail in different ways.
        let generator = ScriptedGenerator::new(move |_| {
            let mut n = seen.lock().unwrap();
            *n += 1;
            match *n {
                2 => Err(dxpanel_contracts::error::PanelError::GenerationFailed {
                    reason: "quota".to_string(),
                }),
                4 => Ok("sorry, I cannot answer".to_string()),
                5 => Ok(json!({ "core_assessment": { "risk_level": "medium", "urgency": "urgent" } }).to_string()),
                _ => Ok(json!({ "core_assessment": { "risk_level": "high", "urgency": "urgent" } }).to_string()),
            }
        });
        let m = moderator(generator, PanelSettings::with_limits(1, 0.8));
        let out = m.run(&DeliberationId::new(), &record(), &MockRecorder::new());

        let round = &out.history.rounds()[0];
        assert_eq!(round.valid_responses().count(), 3);
        let expected = (2.0 / 3.0 + 1.0) / 2.0;
        assert!((round.consensus_level - expected).abs() < 1e-9);
        assert_eq!(round.key_disagreements.len(), 1);
        assert!(!round.key_disagreements[0].contains("s2"));
        assert!(!round.key_disagreements[0].contains("s4"));
        assert!(round.key_disagreements[0].contains("s5(medium)"));
    }

    #[test]
    fn test_panicking_specialist_is_contained_in_both_modes() {
        for concurrent_rounds in [false, true] {
            let settings = PanelSettings {
                concurrent_rounds,
                ..PanelSettings::with_limits(1, 0.8)
            };
            let generator = ScriptedGenerator::new(|prompt| {
                if prompt.starts_with("s3|") {
                    panic!("upstream client bug");
                }
                Ok(json!({ "core_assessment": { "risk_level": "high", "urgency": "urgent" } }).to_string())
            });
            let m = moderator(generator, settings);

            let out = m.run(&DeliberationId::new(), &record(), &MockRecorder::new());

            let round = &out.history.rounds()[0];
            assert_eq!(round.specialist_responses.len(), 5, "concurrent={concurrent_rounds}");
            assert_eq!(round.valid_responses().count(), 4);
            assert_eq!(round.consensus_level, 1.0);
            let s3 = round.response(&SpecialistId::new("s3")).unwrap();
            match &s3.analysis {
                Analysis::Error(e) => assert_eq!(e.error, PANICKED_CALL),
                other => panic!("expected error analysis, got {other:?}"),
            }
        }
    }
}
