//! Specialist identity and role types.
//!
//! The panel has a fixed roster of five roles. Identities are plain strings so
//! they can key response maps, appear in disagreement summaries and be
//! matched by later prompts without depending on the full type hierarchy.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable, human-readable identifier for a specialist.
///
/// Example: SpecialistId("differential-assessor")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpecialistId(pub String);

impl SpecialistId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpecialistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a single deliberation.
///
/// Every call to `Panel::deliberate()` gets a fresh id, which appears in log
/// lines, in the round transcript and in the result metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliberationId(pub uuid::Uuid);

impl DeliberationId {
    /// Create a new, unique deliberation ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for DeliberationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DeliberationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The five fixed roles on the panel, in roster order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpecialistRole {
    /// Maintains a probability-ranked differential of the patient's condition.
    DifferentialAssessment,
    /// Chooses monitoring and follow-up strategy.
    MonitoringStrategy,
    /// Challenges the other specialists' reasoning.
    Challenger,
    /// Keeps recommendations feasible for a resource-limited clinic.
    ResourceSteward,
    /// Checks clinical consistency and safety across the panel.
    Validator,
}

impl SpecialistRole {
    /// Every role, in the order the moderator consults them.
    pub const ROSTER: [SpecialistRole; 5] = [
        SpecialistRole::DifferentialAssessment,
        SpecialistRole::MonitoringStrategy,
        SpecialistRole::Challenger,
        SpecialistRole::ResourceSteward,
        SpecialistRole::Validator,
    ];

    /// Role title used in prompts and result payloads.
    pub fn title(&self) -> &'static str {
        match self {
            Self::DifferentialAssessment => "Differential Assessment Specialist",
            Self::MonitoringStrategy => "Clinical Monitoring Specialist",
            Self::Challenger => "Devil's Advocate",
            Self::ResourceSteward => "Rural Healthcare Resource Steward",
            Self::Validator => "Quality Control Validator",
        }
    }
}

impl fmt::Display for SpecialistRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
