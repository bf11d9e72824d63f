//! # dxpanel-verify
//!
//! Validation of generated panel verdicts.
//!
//! This crate provides [`validator::SchemaConsensusValidator`], which
//! implements [`dxpanel_core::traits::ConsensusValidator`]. A verdict is
//! checked in two phases:
//!
//! 1. **Structural**: JSON Schema validation via the `jsonschema` crate.
//! 2. **Semantic**: rules (`RequiredField`, `AllowedValues`, `NumericRange`)
//!    evaluated against the verdict.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use dxpanel_verify::default_validator;
//!
//! let synthesizer = ConsensusSynthesizer::new(generator)
//!     .with_validator(Box::new(default_validator()));
//! ```

pub mod validator;

pub use validator::{default_consensus_schema, default_validator, SchemaConsensusValidator};
