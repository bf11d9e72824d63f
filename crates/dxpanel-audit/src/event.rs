//! Transcript event and export types.
//!
//! `TranscriptEvent` is one entry in the hash chain: a completed
//! `DebateRound` plus sequence numbering and the SHA-256 hashes that make
//! tampering detectable. `Transcript` is the sealed export of one
//! deliberation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use dxpanel_contracts::{debate::DebateRound, specialist::DeliberationId};

/// A single entry in the hash chain for one deliberation.
///
/// Modifying any field, including anything inside `round`, invalidates
/// `this_hash` and every later `prev_hash`.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEvent {
    /// Position in the chain, starting at 0.
    pub sequence: u64,

    pub deliberation_id: DeliberationId,

    /// The completed round as the moderator appended it.
    pub round: DebateRound,

    /// Hash (hex) of the previous event, or `GENESIS_HASH` for the first.
    pub prev_hash: String,

    /// Hash (hex) over (deliberation_id, sequence, prev_hash, canonical JSON
    /// of round).
    pub this_hash: String,
}

impl TranscriptEvent {
    /// The `prev_hash` of the first event in every chain: 64 hex zeros.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// A sealed transcript for one deliberation.
#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    pub deliberation_id: Option<DeliberationId>,

    /// All events in chain order.
    pub events: Vec<TranscriptEvent>,

    pub exported_at: DateTime<Utc>,

    /// `this_hash` of the last event. Empty if nothing was recorded.
    pub terminal_hash: String,
}
