//! In-memory implementation of `RoundRecorder`.
//!
//! `InMemoryTranscript` keeps every event in a `Vec` behind a `Mutex`, so it
//! can be shared with the moderator while a deliberation runs. `finalize`
//! seals the transcript and returns its terminal hash, which the panel
//! stores in the result metadata.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, info};

use dxpanel_contracts::{
    debate::DebateRound,
    error::{PanelError, PanelResult},
    specialist::DeliberationId,
};
use dxpanel_core::traits::RoundRecorder;

use crate::{
    chain::{hash_event, verify_chain},
    event::{Transcript, TranscriptEvent},
};

// ── Internal mutable state ────────────────────────────────────────────────────

pub(crate) struct TranscriptState {
    pub(crate) events: Vec<TranscriptEvent>,
    pub(crate) sequence: u64,
    pub(crate) last_hash: String,
    /// Set by `finalize`; later writes are rejected.
    pub(crate) sealed: bool,
}

// ── Public recorder ───────────────────────────────────────────────────────────

/// An append-only round transcript backed by a SHA-256 hash chain.
///
/// Intended for a single deliberation. Rounds from a different deliberation
/// id are rejected.
pub struct InMemoryTranscript {
    pub(crate) state: Arc<Mutex<TranscriptState>>,
}

impl InMemoryTranscript {
    pub fn new() -> Self {
        let state = TranscriptState {
            events: Vec::new(),
            sequence: 0,
            last_hash: TranscriptEvent::GENESIS_HASH.to_string(),
            sealed: false,
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> PanelResult<std::sync::MutexGuard<'_, TranscriptState>> {
        self.state.lock().map_err(|e| PanelError::TranscriptWriteFailed {
            reason: format!("transcript state lock poisoned: {}", e),
        })
    }

    /// Export every event recorded so far.
    pub fn export(&self) -> PanelResult<Transcript> {
        let state = self.lock()?;
        let terminal_hash = state
            .events
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_default();

        Ok(Transcript {
            deliberation_id: state.events.first().map(|e| e.deliberation_id.clone()),
            events: state.events.clone(),
            exported_at: Utc::now(),
            terminal_hash,
        })
    }

    /// True when the in-memory chain is intact.
    pub fn verify_integrity(&self) -> bool {
        match self.lock() {
            Ok(state) => verify_chain(&state.events),
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().map(|s| s.events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryTranscript {
    fn default() -> Self {
        Self::new()
    }
}

// ── RoundRecorder impl ────────────────────────────────────────────────────────

impl RoundRecorder for InMemoryTranscript {
    fn record(&self, deliberation_id: &DeliberationId, round: &DebateRound) -> PanelResult<()> {
        let mut state = self.lock()?;

        if state.sealed {
            return Err(PanelError::TranscriptWriteFailed {
                reason: format!("transcript already sealed, round {} rejected", round.round_number),
            });
        }
        if let Some(first) = state.events.first() {
            if &first.deliberation_id != deliberation_id {
                return Err(PanelError::TranscriptWriteFailed {
                    reason: format!(
                        "transcript belongs to deliberation {}, not {}",
                        first.deliberation_id, deliberation_id
                    ),
                });
            }
        }

        let prev_hash = state.last_hash.clone();
        let sequence = state.sequence;
        let this_hash = hash_event(deliberation_id, sequence, round, &prev_hash)?;

        debug!(
            deliberation_id = %deliberation_id,
            round = round.round_number,
            sequence,
            "round recorded"
        );

        state.events.push(TranscriptEvent {
            sequence,
            deliberation_id: deliberation_id.clone(),
            round: round.clone(),
            prev_hash,
            this_hash: this_hash.clone(),
        });
        state.sequence += 1;
        state.last_hash = this_hash;

        Ok(())
    }

    /// Seal the transcript. Returns the terminal hash, or `None` when no
    /// round was recorded.
    fn finalize(&self, deliberation_id: &DeliberationId) -> PanelResult<Option<String>> {
        let mut state = self.lock()?;
        state.sealed = true;

        info!(
            deliberation_id = %deliberation_id,
            event_count = state.events.len(),
            terminal_hash = %state.last_hash,
            "transcript sealed"
        );

        Ok(state.events.last().map(|e| e.this_hash.clone()))
    }
}
