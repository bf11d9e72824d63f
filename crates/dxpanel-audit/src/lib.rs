//! # dxpanel-audit
//!
//! Append-only, SHA-256 hash-chained transcript of debate rounds.
//!
//! Every round the moderator completes is wrapped in a `TranscriptEvent`
//! linked to the previous event by hash. Changing any recorded byte breaks
//! the chain, which `verify_chain` detects.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dxpanel_audit::InMemoryTranscript;
//!
//! let transcript = InMemoryTranscript::new();
//! let result = panel.deliberate_recorded(&record, &transcript);
//!
//! assert!(transcript.verify_integrity());
//! assert_eq!(result.panel_metadata.transcript_hash, Some(transcript.export()?.terminal_hash));
//! ```

pub mod chain;
pub mod event;
pub mod memory;

pub use chain::{hash_event, verify_chain};
pub use event::{Transcript, TranscriptEvent};
pub use memory::InMemoryTranscript;

// ── Tests ─────────────────────────────────────────────────────────────────────
