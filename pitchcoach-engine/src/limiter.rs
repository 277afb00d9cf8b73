//! Dedup and rate-limiting of candidate detections
//!
//! Converts raw detections into emitted feedback items. Two suppression
//! rules, applied in order: exact `(category, turn_sequence)` keys emit at
//! most once, and recurring categories (metrics-derived warnings) are
//! cooldown-suppressed against their most recent emission. The cooldown is
//! evaluated lazily when a candidate arrives; no background timer exists.
//!
//! All suppression state lives on this struct, one instance per session.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use pitchcoach_patterns::DetectionCategory;
use tracing::debug;
use uuid::Uuid;

use crate::feedback::FeedbackItem;
use crate::scanner::Detection;

pub const DEFAULT_COOLDOWN_SECS: i64 = 60;

pub struct FeedbackLimiter {
    cooldown: Duration,
    emitted_keys: HashSet<(DetectionCategory, u64)>,
    last_emitted: HashMap<DetectionCategory, DateTime<Utc>>,
}

impl FeedbackLimiter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            emitted_keys: HashSet::new(),
            last_emitted: HashMap::new(),
        }
    }

    /// Accept or suppress a candidate detection.
    ///
    /// Returns the constructed feedback item on acceptance, `None` when
    /// suppressed. `now` is the emission timestamp; callers pass the turn
    /// arrival time so behavior is deterministic under test.
    pub fn accept(&mut self, detection: &Detection, now: DateTime<Utc>) -> Option<FeedbackItem> {
        if detection.category.is_recurring() {
            if let Some(last) = self.last_emitted.get(&detection.category) {
                if now.signed_duration_since(*last) < self.cooldown {
                    debug!(
                        "suppressing {} within cooldown window",
                        detection.category
                    );
                    return None;
                }
            }
        } else if !self
            .emitted_keys
            .insert((detection.category, detection.turn_sequence))
        {
            debug!(
                "suppressing repeat {} for turn {}",
                detection.category, detection.turn_sequence
            );
            return None;
        }

        self.last_emitted.insert(detection.category, now);

        Some(FeedbackItem {
            id: Uuid::new_v4().to_string(),
            timestamp: now,
            category: detection.category.label(),
            message: detection.category.message(detection.direction),
            severity: detection.category.severity(),
        })
    }
}

impl Default for FeedbackLimiter {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_COOLDOWN_SECS))
    }
}
