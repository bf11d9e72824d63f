//! Panel run settings shared by the moderator and the configuration loader.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_ROUNDS: u32 = 3;
pub const DEFAULT_CONSENSUS_THRESHOLD: f64 = 0.8;

/// Round cap, stopping threshold and scheduling mode for one panel.
///
/// Fixed at construction; every deliberation run by the panel uses the same
/// settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelSettings {
    /// Maximum number of debate rounds. Always at least one round runs.
    pub max_rounds: u32,
    /// A round whose consensus level reaches this value ends the debate.
    pub consensus_threshold: f64,
    /// Consult the five specialists of a round concurrently.
    pub concurrent_rounds: bool,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            consensus_threshold: DEFAULT_CONSENSUS_THRESHOLD,
            concurrent_rounds: false,
        }
    }
}

impl PanelSettings {
    pub fn with_limits(max_rounds: u32, consensus_threshold: f64) -> Self {
        Self {
            max_rounds,
            consensus_threshold,
            ..Self::default()
        }
    }
}
