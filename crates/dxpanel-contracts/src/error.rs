//! Error types for the deliberation panel.
//!
//! Fallible setup and plumbing operations return `PanelResult<T>`. The
//! deliberation itself is total: errors raised inside a deliberation are
//! converted into content (error analyses, fallback notes) and never escape.

use thiserror::Error;

/// The unified error type for the panel crates.
#[derive(Debug, Error)]
pub enum PanelError {
    /// The generation service rejected the request or returned no usable text.
    #[error("generation call failed: {reason}")]
    GenerationFailed { reason: String },

    /// The generation call did not complete within its configured timeout.
    #[error("generation call timed out after {seconds}s")]
    GenerationTimeout { seconds: u64 },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The round transcript could not record a debate round.
    #[error("transcript write failed: {reason}")]
    TranscriptWriteFailed { reason: String },

    /// A JSON Schema document could not be compiled or applied.
    #[error("schema validation error: {reason}")]
    SchemaValidation { reason: String },

    /// A value could not be serialized for a prompt or an export.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}

/// Convenience alias used throughout the panel crates.
pub type PanelResult<T> = Result<T, PanelError>;

/// Why a block of generated text could not be read as a structured analysis.
///
/// Parse failures are ordinary values: the caller turns them into a
/// `RawTextFallback` instead of propagating them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The cleaned text is not valid JSON.
    #[error("response is not valid JSON: {0}")]
    NotJson(String),

    /// The text is valid JSON but its top-level value is not an object.
    #[error("response JSON is a {found}, expected an object")]
    NotAnObject { found: &'static str },
}
