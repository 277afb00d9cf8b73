//! Incremental pattern scanner
//!
//! Matches a single newly appended turn against the pattern library.
//! Stateless: only the new turn is ever scanned, never prior turns, so a
//! scan runs in constant time relative to the log and is trivially
//! re-derivable.

use chrono::{DateTime, Utc};
use pitchcoach_patterns::{
    DetectionCategory, ImbalanceDirection, ObjectionCategory, TechniqueCategory,
    INTERROGATIVE_OPENERS,
};

use crate::transcript::{Speaker, TranscriptTurn};

/// A candidate coaching event, derived purely from one turn's text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub category: DetectionCategory,
    pub turn_sequence: u64,
    pub detected_at: DateTime<Utc>,
    /// Present only on synthetic talk-time detections
    pub direction: Option<ImbalanceDirection>,
}

impl Detection {
    pub fn new(category: DetectionCategory, turn_sequence: u64, detected_at: DateTime<Utc>) -> Self {
        Self {
            category,
            turn_sequence,
            detected_at,
            direction: None,
        }
    }
}

/// Scan one turn against the pattern library for its speaker role.
///
/// Counterpart text is tested against objection phrases, trainee text
/// against technique phrases plus the structural open-ended-question rule.
/// At most one detection per category per turn, in declaration order.
pub fn scan_turn(turn: &TranscriptTurn) -> Vec<Detection> {
    let text = turn.text.to_lowercase();
    let mut detections = Vec::new();

    match turn.speaker {
        Speaker::Counterpart => {
            for category in ObjectionCategory::ALL {
                if category.phrases().iter().any(|p| text.contains(p)) {
                    detections.push(Detection::new(
                        DetectionCategory::Objection(category),
                        turn.sequence,
                        turn.arrived_at,
                    ));
                }
            }
        }
        Speaker::Trainee => {
            for category in TechniqueCategory::ALL {
                let keyword_hit = category.phrases().iter().any(|p| text.contains(p));
                // Text opening with an interrogative always counts as an
                // open-ended question, keyword hit or not.
                let structural_hit = category == TechniqueCategory::OpenEndedQuestion
                    && starts_with_interrogative(&text);

                if keyword_hit || structural_hit {
                    detections.push(Detection::new(
                        DetectionCategory::Technique(category),
                        turn.sequence,
                        turn.arrived_at,
                    ));
                }
            }
        }
    }

    detections
}

fn starts_with_interrogative(lowercased: &str) -> bool {
    let trimmed = lowercased.trim_start();
    INTERROGATIVE_OPENERS.iter().any(|opener| trimmed.starts_with(opener))
}
