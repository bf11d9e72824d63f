//! # dxpanel-config
//!
//! TOML configuration for the deliberation panel.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use dxpanel_config::PanelConfig;
//!
//! let config = PanelConfig::from_file(Path::new("config/panel.toml"))?;
//! // config.panel feeds the moderator, config.generator the HTTP client.
//! ```
//!
//! ## Validation
//!
//! Loading always validates. Out-of-range values are reported as
//! `PanelError::ConfigError` naming the offending key.

pub mod loader;
pub mod schema;

pub use schema::{GeneratorSettings, PanelConfig, PanelSettings};

// ── Tests ─────────────────────────────────────────────────────────────────────
