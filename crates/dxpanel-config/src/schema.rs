//! Configuration schema.
//!
//! A `PanelConfig` is deserialized from TOML. Both tables are optional and
//! every field has a default, so an empty document yields a working
//! configuration.
//!
//! ```toml
//! [panel]
//! max_rounds = 3
//! consensus_threshold = 0.8
//! concurrent_rounds = false
//!
//! [generator]
//! model = "gemini-2.0-flash"
//! api_key_env = "GOOGLE_AI_API_KEY"
//! timeout_secs = 60
//! ```

use serde::{Deserialize, Serialize};

pub use dxpanel_contracts::settings::PanelSettings;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";
pub const DEFAULT_API_KEY_ENV: &str = "GOOGLE_AI_API_KEY";

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub panel: PanelSettings,
    pub generator: GeneratorSettings,
}

/// Connection and sampling settings for the remote generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Full `generateContent` URL.
    pub endpoint: String,
    /// Model name recorded in result metadata.
    pub model: String,
    /// Name of the environment variable holding the API key. The key itself
    /// never appears in configuration files.
    pub api_key_env: String,
    /// Per-call timeout. A timed-out call counts as a failed call.
    pub timeout_secs: u64,
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
    pub max_output_tokens: u32,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_secs: 60,
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 8192,
        }
    }
}
