//! Rolling session metrics
//!
//! Recomputed wholesale from the transcript log after every append. The
//! recomputation is a pure function of log contents, so repeated calls on
//! the same log are idempotent. Character length is the talk-time proxy:
//! the cheapest measure that is monotonically stable and needs no external
//! timing signal.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use pitchcoach_patterns::{DetectionCategory, ImbalanceDirection, TechniqueCategory};
use serde::{Deserialize, Serialize};

use crate::scanner::{scan_turn, Detection};
use crate::transcript::{Speaker, TranscriptLog};

/// Ratio reported for an empty log
pub const NEUTRAL_RATIO: u8 = 50;

/// Derived snapshot with no independent identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetrics {
    /// Trainee share of total conversation text, 0-100
    pub talk_time_ratio: u8,
    /// Counterpart turns containing at least one objection
    pub objection_count: u32,
    /// Distinct techniques detected across all trainee turns
    pub techniques_used: BTreeSet<TechniqueCategory>,
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self {
            talk_time_ratio: NEUTRAL_RATIO,
            objection_count: 0,
            techniques_used: BTreeSet::new(),
        }
    }
}

impl SessionMetrics {
    /// Recompute all metrics from the full log
    pub fn recompute(log: &TranscriptLog) -> Self {
        let mut trainee_chars: u64 = 0;
        let mut total_chars: u64 = 0;
        let mut objection_count: u32 = 0;
        let mut techniques_used = BTreeSet::new();

        for turn in log.turns() {
            let chars = turn.text.chars().count() as u64;
            total_chars += chars;
            if turn.speaker == Speaker::Trainee {
                trainee_chars += chars;
            }

            let detections = scan_turn(turn);
            match turn.speaker {
                Speaker::Counterpart => {
                    if detections
                        .iter()
                        .any(|d| matches!(d.category, DetectionCategory::Objection(_)))
                    {
                        objection_count += 1;
                    }
                }
                Speaker::Trainee => {
                    for detection in detections {
                        if let DetectionCategory::Technique(technique) = detection.category {
                            techniques_used.insert(technique);
                        }
                    }
                }
            }
        }

        let talk_time_ratio = if total_chars == 0 {
            NEUTRAL_RATIO
        } else {
            ((trainee_chars as f64 / total_chars as f64) * 100.0).round() as u8
        };

        Self {
            talk_time_ratio,
            objection_count,
            techniques_used,
        }
    }

    /// Which side of the target band the ratio sits on, if any
    pub fn imbalance(&self, ratio_low: u8, ratio_high: u8) -> Option<ImbalanceDirection> {
        if self.talk_time_ratio < ratio_low {
            Some(ImbalanceDirection::BelowBand)
        } else if self.talk_time_ratio > ratio_high {
            Some(ImbalanceDirection::AboveBand)
        } else {
            None
        }
    }

    /// Synthetic detection for an out-of-band ratio, routed through the
    /// limiter exactly like a pattern-based detection
    pub fn imbalance_detection(
        &self,
        ratio_low: u8,
        ratio_high: u8,
        turn_sequence: u64,
        detected_at: DateTime<Utc>,
    ) -> Option<Detection> {
        self.imbalance(ratio_low, ratio_high).map(|direction| Detection {
            category: DetectionCategory::TalkTimeImbalance,
            turn_sequence,
            detected_at,
            direction: Some(direction),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        "2025-06-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_empty_log_defaults_to_neutral_ratio() {
        let log = TranscriptLog::new();
        let metrics = SessionMetrics::recompute(&log);
        assert_eq!(metrics.talk_time_ratio, NEUTRAL_RATIO);
        assert_eq!(metrics.objection_count, 0);
        assert!(metrics.techniques_used.is_empty());
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut log = TranscriptLog::new();
        log.append(Speaker::Trainee, "tell me about your lawn", now());
        log.append(Speaker::Counterpart, "it's too expensive", now());

        let first = SessionMetrics::recompute(&log);
        let second = SessionMetrics::recompute(&log);
        assert_eq!(first, second);
    }

    #[test]
    fn test_ratio_always_in_bounds() {
        let mut log = TranscriptLog::new();
        for _ in 0..20 {
            log.append(Speaker::Trainee, "only the trainee talks here", now());
        }
        let metrics = SessionMetrics::recompute(&log);
        assert_eq!(metrics.talk_time_ratio, 100);

        let mut log = TranscriptLog::new();
        log.append(Speaker::Counterpart, "only the counterpart", now());
        assert_eq!(SessionMetrics::recompute(&log).talk_time_ratio, 0);
    }

    #[test]
    fn test_ratio_five_long_trainee_turns_one_short_counterpart() {
        let mut log = TranscriptLog::new();
        let long_turn = "a".repeat(100);
        for _ in 0..5 {
            log.append(Speaker::Trainee, &long_turn, now());
        }
        log.append(Speaker::Counterpart, &"b".repeat(20), now());

        // 500 / 520 rounds to 96
        assert_eq!(SessionMetrics::recompute(&log).talk_time_ratio, 96);
    }

    #[test]
    fn test_objection_count_per_turn_not_per_phrase() {
        let mut log = TranscriptLog::new();
        log.append(
            Speaker::Counterpart,
            "too expensive and over budget",
            now(),
        );
        log.append(Speaker::Counterpart, "I'd have to talk to my boss", now());
        log.append(Speaker::Counterpart, "nice weather though", now());

        assert_eq!(SessionMetrics::recompute(&log).objection_count, 2);
    }

    #[test]
    fn test_techniques_used_is_distinct_set() {
        let mut log = TranscriptLog::new();
        log.append(Speaker::Trainee, "I understand your concern", now());
        log.append(Speaker::Trainee, "I understand completely", now());
        log.append(Speaker::Trainee, "what worries you most?", now());

        let metrics = SessionMetrics::recompute(&log);
        assert_eq!(metrics.techniques_used.len(), 2);
        assert!(metrics
            .techniques_used
            .contains(&TechniqueCategory::EmpathyFraming));
        assert!(metrics
            .techniques_used
            .contains(&TechniqueCategory::OpenEndedQuestion));
    }

    #[test]
    fn test_imbalance_band_edges() {
        let metrics = SessionMetrics {
            talk_time_ratio: 35,
            ..Default::default()
        };
        assert_eq!(metrics.imbalance(35, 70), None);

        let metrics = SessionMetrics {
            talk_time_ratio: 34,
            ..Default::default()
        };
        assert_eq!(metrics.imbalance(35, 70), Some(ImbalanceDirection::BelowBand));

        let metrics = SessionMetrics {
            talk_time_ratio: 70,
            ..Default::default()
        };
        assert_eq!(metrics.imbalance(35, 70), None);

        let metrics = SessionMetrics {
            talk_time_ratio: 71,
            ..Default::default()
        };
        assert_eq!(metrics.imbalance(35, 70), Some(ImbalanceDirection::AboveBand));
    }
}
