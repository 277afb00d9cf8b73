//! Append-only transcript log
//!
//! The single source of truth for everything downstream. Turns are never
//! mutated or removed after append, so full-log recomputation by the
//! metrics aggregator is always correct.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Trainee,
    Counterpart,
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Speaker::Trainee => write!(f, "trainee"),
            Speaker::Counterpart => write!(f, "counterpart"),
        }
    }
}

/// One utterance, immutable once created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptTurn {
    /// Strictly increasing with arrival order
    pub sequence: u64,
    pub speaker: Speaker,
    pub text: String,
    pub arrived_at: DateTime<Utc>,
}

/// Append-only, sequence-numbered list of turns
#[derive(Debug, Default)]
pub struct TranscriptLog {
    turns: Vec<TranscriptTurn>,
    next_sequence: u64,
}

impl TranscriptLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new turn, assigning the next sequence number.
    ///
    /// Empty or whitespace-only text is a malformed payload: the turn is
    /// dropped with a warning and `None` is returned. This is never an
    /// error to the caller; scanning and metrics continue for all other
    /// turns.
    pub fn append(
        &mut self,
        speaker: Speaker,
        text: &str,
        arrived_at: DateTime<Utc>,
    ) -> Option<TranscriptTurn> {
        if text.trim().is_empty() {
            warn!("dropping malformed turn from {}: empty text", speaker);
            return None;
        }

        let turn = TranscriptTurn {
            sequence: self.next_sequence,
            speaker,
            text: text.to_string(),
            arrived_at,
        };
        self.next_sequence += 1;
        self.turns.push(turn.clone());
        Some(turn)
    }

    pub fn turns(&self) -> &[TranscriptTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
