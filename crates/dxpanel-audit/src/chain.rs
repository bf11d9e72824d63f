//! Hash-chain primitives: hashing and chain integrity verification.
//!
//! Hash input layout (bytes, in order):
//!   1. deliberation_id as its hyphenated UUID string
//!   2. sequence as 8-byte little-endian
//!   3. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   4. compact JSON of the round (responses in roster order)

use sha2::{Digest, Sha256};

use dxpanel_contracts::{
    debate::DebateRound,
    error::{PanelError, PanelResult},
    specialist::DeliberationId,
};

use crate::event::TranscriptEvent;

/// Compute the SHA-256 hash for one transcript event.
///
/// Returns a lowercase 64-character hex string.
pub fn hash_event(
    deliberation_id: &DeliberationId,
    sequence: u64,
    round: &DebateRound,
    prev_hash: &str,
) -> PanelResult<String> {
    let round_json = serde_json::to_vec(round).map_err(|e| PanelError::Serialization {
        reason: format!("debate round {} not serializable: {}", round.round_number, e),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(deliberation_id.to_string().as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&round_json);

    Ok(hex::encode(hasher.finalize()))
}

/// Verify the integrity of a hash chain.
///
/// Valid when every `prev_hash` links to the preceding event (or the genesis
/// hash) and every `this_hash` matches its recomputed value. An empty chain
/// is valid.
pub fn verify_chain(events: &[TranscriptEvent]) -> bool {
    let mut expected_prev = TranscriptEvent::GENESIS_HASH.to_string();

    for event in events {
        if event.prev_hash != expected_prev {
            return false;
        }

        match hash_event(&event.deliberation_id, event.sequence, &event.round, &event.prev_hash) {
            Ok(recomputed) if recomputed == event.this_hash => {}
            _ => return false,
        }

        expected_prev = event.this_hash.clone();
    }

    true
}
