//! # dxpanel-core
//!
//! The bounded-round deliberation engine for the clinical specialist panel.
//!
//! This crate provides:
//! - The trait seams (`Generator`, `Specialist`, `RoundRecorder`,
//!   `ConsensusValidator`)
//! - The response parser, anonymization filter and signal extractors
//! - Consensus scoring and disagreement detection for one round
//! - The `DebateModerator` round loop and the `ConsensusSynthesizer`
//! - `Panel`, which wires them together behind `deliberate()`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dxpanel_core::{Panel, traits::{Generator, Specialist}};
//!
//! let panel = Panel::new(generator, roster, PanelSettings::default());
//! let result = panel.deliberate(&record);
//! ```

pub mod anonymize;
pub mod consensus;
pub mod disagreement;
pub mod moderator;
pub mod panel;
pub mod parser;
pub mod signals;
pub mod specialist;
pub mod synthesizer;
pub mod traits;

#[cfg(test)]
mod testing;

pub use moderator::{DebateModerator, DebateOutcome, RoundState};
pub use panel::{NullRecorder, Panel};
pub use synthesizer::ConsensusSynthesizer;
