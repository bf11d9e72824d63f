//! Trait seams of the deliberation engine.
//!
//! - `Generator`: the external text-generation service. Untrusted; it may
//!   fail or return anything.
//! - `Specialist`: one panel role. Builds its prompt from the record and the
//!   prior rounds.
//! - `RoundRecorder`: sink for completed rounds (audit transcript).
//! - `ConsensusValidator`: checks a generated verdict before it is accepted.
//!
//! The moderator and synthesizer wire them together. Every trait object is
//! `Send + Sync` so a round's specialists can be consulted concurrently.

use dxpanel_contracts::{
    debate::{DebateHistory, DebateRound},
    error::PanelResult,
    patient::PatientRecord,
    specialist::{DeliberationId, SpecialistId, SpecialistRole},
    verify::ValidationReport,
};

/// The text-generation service: prompt in, free-form text out.
///
/// Implementations own their timeout. A timeout is reported as an error like
/// any other failure; the engine never retries.
pub trait Generator: Send + Sync {
    /// Run one completion for `prompt`.
    fn generate(&self, prompt: &str) -> PanelResult<String>;

    /// Identifier of the underlying model, recorded in result metadata.
    fn model_identifier(&self) -> &str;
}

/// One fixed reasoning role on the panel.
///
/// Specialists are stateless. All continuity between rounds is carried by the
/// `history` argument, which only ever contains completed rounds.
pub trait Specialist: Send + Sync {
    fn id(&self) -> &SpecialistId;

    fn role(&self) -> SpecialistRole;

    /// Build the prompt for this role.
    ///
    /// Must be deterministic: the same record and history always produce the
    /// same prompt. `record` is already anonymized.
    fn build_prompt(&self, record: &PatientRecord, history: &DebateHistory) -> String;
}

/// Receives every completed debate round, in order.
///
/// Failures are logged by the moderator and never abort a deliberation.
pub trait RoundRecorder: Send + Sync {
    /// Append one completed round for the given deliberation.
    fn record(&self, deliberation_id: &DeliberationId, round: &DebateRound) -> PanelResult<()>;

    /// Seal the deliberation's transcript.
    ///
    /// Returns a compact commitment to everything recorded (e.g. a terminal
    /// hash) when the implementation has one.
    fn finalize(&self, deliberation_id: &DeliberationId) -> PanelResult<Option<String>>;
}

/// Checks a generated verdict before the synthesizer accepts it.
///
/// A failing report routes synthesis to the deterministic fallback.
pub trait ConsensusValidator: Send + Sync {
    fn validate(&self, verdict: &serde_json::Value) -> PanelResult<ValidationReport>;
}
