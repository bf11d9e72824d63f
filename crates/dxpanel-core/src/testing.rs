//! Test doubles shared by the engine's unit tests.

use std::sync::{Arc, Mutex};

use serde_json::json;

use dxpanel_contracts::{
    debate::{DebateHistory, DebateRound},
    error::{PanelError, PanelResult},
    patient::PatientRecord,
    specialist::{DeliberationId, SpecialistId, SpecialistRole},
    verify::{ValidationFailure, ValidationReport},
};

use crate::traits::{ConsensusValidator, Generator, RoundRecorder, Specialist};

type Script = Box<dyn Fn(&str) -> PanelResult<String> + Send + Sync>;

/// A generator driven by a closure. Records every prompt it receives.
pub struct ScriptedGenerator {
    script: Script,
    pub calls: Arc<Mutex<u32>>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedGenerator {
    pub fn new(script: impl Fn(&str) -> PanelResult<String> + Send + Sync + 'static) -> Self {
        Self {
            script: Box::new(script),
            calls: Arc::new(Mutex::new(0)),
            prompts: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn constant(text: &'static str) -> Self {
        Self::new(move |_| Ok(text.to_string()))
    }

    pub fn failing() -> Self {
        Self::new(|_| {
            Err(PanelError::GenerationFailed {
                reason: "HTTP 503 from upstream".to_string(),
            })
        })
    }

    /// Every specialist reports the same risk and urgency.
    pub fn unanimous(risk: &'static str, urgency: &'static str) -> Self {
        Self::new(move |_| {
            Ok(json!({
                "core_assessment": {
                    "risk_level": risk,
                    "confidence": 0.8,
                    "primary_concerns": ["tachycardia"],
                    "urgency": urgency
                }
            })
            .to_string())
        })
    }
}

impl Generator for ScriptedGenerator {
    fn generate(&self, prompt: &str) -> PanelResult<String> {
        *self.calls.lock().unwrap() += 1;
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.script)(prompt)
    }

    fn model_identifier(&self) -> &str {
        "scripted-test-model"
    }
}

/// A specialist whose prompt is `"{id}|rounds={n}|{record json}"`.
pub struct EchoSpecialist {
    id: SpecialistId,
    role: SpecialistRole,
}

impl EchoSpecialist {
    pub fn new(id: &str, role: SpecialistRole) -> Self {
        Self { id: SpecialistId::new(id), role }
    }
}

impl Specialist for EchoSpecialist {
    fn id(&self) -> &SpecialistId {
        &self.id
    }

    fn role(&self) -> SpecialistRole {
        self.role
    }

    fn build_prompt(&self, record: &PatientRecord, history: &DebateHistory) -> String {
        format!("{}|rounds={}|{}", self.id, history.len(), record.0)
    }
}

/// One echo specialist per roster role, ids "s1".."s5".
pub fn echo_roster() -> Vec<Box<dyn Specialist>> {
    SpecialistRole::ROSTER
        .iter()
        .enumerate()
        .map(|(i, role)| {
            Box::new(EchoSpecialist::new(&format!("s{}", i + 1), *role)) as Box<dyn Specialist>
        })
        .collect()
}

/// Records round numbers; can be told to fail every write.
pub struct MockRecorder {
    pub rounds: Arc<Mutex<Vec<u32>>>,
    pub finalized: Arc<Mutex<u32>>,
    pub fail: bool,
}

impl MockRecorder {
    pub fn new() -> Self {
        Self {
            rounds: Arc::new(Mutex::new(vec![])),
            finalized: Arc::new(Mutex::new(0)),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::new() }
    }
}

impl RoundRecorder for MockRecorder {
    fn record(&self, _id: &DeliberationId, round: &DebateRound) -> PanelResult<()> {
        if self.fail {
            return Err(PanelError::TranscriptWriteFailed {
                reason: "disk full".to_string(),
            });
        }
        self.rounds.lock().unwrap().push(round.round_number);
        Ok(())
    }

    fn finalize(&self, _id: &DeliberationId) -> PanelResult<Option<String>> {
        if self.fail {
            return Err(PanelError::TranscriptWriteFailed {
                reason: "disk full".to_string(),
            });
        }
        *self.finalized.lock().unwrap() += 1;
        Ok(Some("feedface".to_string()))
    }
}

/// A validator that passes or fails every verdict.
pub struct MockValidator {
    pub pass: bool,
}

impl ConsensusValidator for MockValidator {
    fn validate(&self, _verdict: &serde_json::Value) -> PanelResult<ValidationReport> {
        if self.pass {
            Ok(ValidationReport { passed: true, failures: vec![] })
        } else {
            Ok(ValidationReport {
                passed: false,
                failures: vec![ValidationFailure {
                    rule_id: "risk-level-allowed".to_string(),
                    message: "overall_risk_level 'extreme' not allowed".to_string(),
                }],
            })
        }
    }
}
