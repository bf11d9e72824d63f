//! Loading and validating a `PanelConfig`.
//!
//! Parsing is strict about types but lenient about presence: missing tables
//! and fields take their defaults. Range checks run after parsing, so a
//! document that parses can still be rejected.

use std::path::Path;

use tracing::debug;

use dxpanel_contracts::error::{PanelError, PanelResult};

use crate::schema::PanelConfig;

impl PanelConfig {
    /// Parse `s` as TOML and validate the result.
    ///
    /// Returns `PanelError::ConfigError` if the TOML is malformed, does not
    /// match the schema, or fails validation.
    pub fn from_toml_str(s: &str) -> PanelResult<Self> {
        let config: PanelConfig = toml::from_str(s).map_err(|e| PanelError::ConfigError {
            reason: format!("failed to parse panel TOML: {}", e),
        })?;
        config.validate()?;

        debug!(
            max_rounds = config.panel.max_rounds,
            consensus_threshold = config.panel.consensus_threshold,
            concurrent_rounds = config.panel.concurrent_rounds,
            model = %config.generator.model,
            "panel configuration loaded"
        );
        Ok(config)
    }

    /// Read the file at `path` and parse it as panel configuration.
    pub fn from_file(path: &Path) -> PanelResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| PanelError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Check value ranges.
    ///
    /// - `panel.max_rounds >= 1`
    /// - `0 < panel.consensus_threshold <= 1`
    /// - `generator.timeout_secs > 0`
    pub fn validate(&self) -> PanelResult<()> {
        if self.panel.max_rounds < 1 {
            return Err(config_error("panel.max_rounds must be at least 1"));
        }
        let threshold = self.panel.consensus_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(config_error(format!(
                "panel.consensus_threshold must be in (0, 1], got {threshold}"
            )));
        }
        if self.generator.timeout_secs == 0 {
            return Err(config_error("generator.timeout_secs must be greater than 0"));
        }
        if self.generator.api_key_env.trim().is_empty() {
            return Err(config_error("generator.api_key_env must name an environment variable"));
        }
        Ok(())
    }
}

fn config_error(reason: impl Into<String>) -> PanelError {
    PanelError::ConfigError { reason: reason.into() }
}
