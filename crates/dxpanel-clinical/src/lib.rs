//! # dxpanel-clinical
//!
//! The clinical side of the deliberation panel.
//!
//! - [`specialists`]: the five roles and their prompts
//! - [`offline::OfflineGenerator`]: canned answers for runs without network
//! - [`dashboard::format_for_dashboard`]: the flattened clinic view
//! - [`mock_data::sample_patient_record`]: a fictional chest-pain case
//!
//! [`build_panel`] wires the standard roster and the default verdict
//! validator into a `Panel`; [`deliberate`] is the one-call entry point.

pub mod dashboard;
pub mod mock_data;
pub mod offline;
pub mod specialists;

use std::sync::Arc;

use dxpanel_config::PanelConfig;
use dxpanel_contracts::{
    consensus::DeliberationResult,
    error::PanelResult,
    patient::PatientRecord,
    settings::PanelSettings,
};
use dxpanel_core::{traits::Generator, Panel};
use dxpanel_verify::default_validator;
use tracing::debug;

pub use dashboard::{format_for_dashboard, DashboardView};
pub use offline::OfflineGenerator;
pub use specialists::standard_roster;

/// The bundled `config/panel.toml`.
pub const DEFAULT_CONFIG: &str = include_str!("../config/panel.toml");

pub fn default_config() -> PanelResult<PanelConfig> {
    PanelConfig::from_toml_str(DEFAULT_CONFIG)
}

/// A panel with the standard roster whose generated verdicts are checked
/// against the default consensus schema.
pub fn build_panel(settings: &PanelSettings, generator: Arc<dyn Generator>) -> Panel {
    let validator = default_validator();
    debug!(
        schema_id = %validator.schema().schema_id,
        rules = validator.schema().rules.len(),
        "attaching consensus validator"
    );
    Panel::new(generator, standard_roster(), settings.clone()).with_validator(Box::new(validator))
}

/// Run one deliberation with the standard panel.
pub fn deliberate(
    generator: Arc<dyn Generator>,
    record: &PatientRecord,
    max_rounds: u32,
    consensus_threshold: f64,
) -> DeliberationResult {
    let settings = PanelSettings::with_limits(max_rounds, consensus_threshold);
    build_panel(&settings, generator).deliberate(record)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
