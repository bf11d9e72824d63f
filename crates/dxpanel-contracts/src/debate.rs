//! Debate rounds and the append-only debate history.
//!
//! `DebateRound` is what the moderator produces after every specialist has
//! spoken once. `DebateHistory` is the ordered sequence of rounds for one
//! deliberation; rounds are appended and never rewritten.

use serde::{Deserialize, Serialize, Serializer};

use crate::{
    assessment::SpecialistAssessment,
    specialist::SpecialistId,
};

/// An immutable record of one round of panel discussion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebateRound {
    /// 1-based position of this round in the deliberation.
    pub round_number: u32,
    /// One assessment per specialist, in roster order.
    ///
    /// Serialized as a JSON object keyed by specialist id.
    #[serde(serialize_with = "serialize_responses")]
    pub specialist_responses: Vec<SpecialistAssessment>,
    /// Plurality agreement over the round's valid responses, in `[0, 1]`.
    pub consensus_level: f64,
    /// Human-readable conflict summaries. Empty when the panel agrees.
    pub key_disagreements: Vec<String>,
}

impl DebateRound {
    /// The response from the given specialist, if it spoke in this round.
    pub fn response(&self, id: &SpecialistId) -> Option<&SpecialistAssessment> {
        self.specialist_responses
            .iter()
            .find(|r| &r.specialist_id == id)
    }

    /// Responses that count towards consensus (neither errors nor raw text).
    pub fn valid_responses(&self) -> impl Iterator<Item = &SpecialistAssessment> {
        self.specialist_responses.iter().filter(|r| r.is_valid())
    }
}

fn serialize_responses<S: Serializer>(
    responses: &[SpecialistAssessment],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(responses.iter().map(|r| (r.specialist_id.as_str(), r)))
}

/// The ordered rounds of a single deliberation.
///
/// The only mutating operation is `push`; earlier rounds are never exposed
/// mutably.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DebateHistory {
    rounds: Vec<DebateRound>,
}

impl DebateHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed round.
    pub fn push(&mut self, round: DebateRound) {
        self.rounds.push(round);
    }

    pub fn rounds(&self) -> &[DebateRound] {
        &self.rounds
    }

    pub fn latest(&self) -> Option<&DebateRound> {
        self.rounds.last()
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DebateRound> {
        self.rounds.iter()
    }

    /// Pretty JSON of every round, as embedded in prompts.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "[]".to_string())
    }
}

/// How the moderator's round loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// A round met the consensus threshold.
    ConsensusReached,
    /// The round cap was hit without meeting the threshold.
    RoundsExhausted,
}
