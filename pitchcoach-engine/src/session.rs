//! Per-session coaching facade
//!
//! One `CoachingSession` per active conversation owns the transcript log,
//! the limiter's suppression maps, the feedback queue and the latest
//! metrics snapshot. Instances never share state, so concurrent sessions
//! cannot cross-contaminate and tests construct isolated engines.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::feedback::{FeedbackItem, FeedbackQueue, DEFAULT_CAPACITY};
use crate::limiter::{FeedbackLimiter, DEFAULT_COOLDOWN_SECS};
use crate::metrics::SessionMetrics;
use crate::scanner::scan_turn;
use crate::transcript::{Speaker, TranscriptLog};

/// Engine tunables. The band and cooldown defaults are inherited
/// heuristics; they are configuration, not constants.
#[derive(Debug, Clone)]
pub struct CoachConfig {
    /// Minimum spacing between emissions of a recurring category
    pub cooldown: Duration,
    /// Talk-time ratio below this warns that the trainee is too quiet
    pub ratio_low: u8,
    /// Talk-time ratio above this warns that the trainee dominates
    pub ratio_high: u8,
    /// Feedback queue capacity
    pub queue_capacity: usize,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::seconds(DEFAULT_COOLDOWN_SECS),
            ratio_low: 35,
            ratio_high: 70,
            queue_capacity: DEFAULT_CAPACITY,
        }
    }
}

/// The analysis pipeline for one live conversation
pub struct CoachingSession {
    config: CoachConfig,
    log: TranscriptLog,
    limiter: FeedbackLimiter,
    queue: FeedbackQueue,
    metrics: SessionMetrics,
}

impl CoachingSession {
    pub fn new(config: CoachConfig) -> Self {
        let limiter = FeedbackLimiter::new(config.cooldown);
        let queue = FeedbackQueue::new(config.queue_capacity);
        Self {
            config,
            log: TranscriptLog::new(),
            limiter,
            queue,
            metrics: SessionMetrics::default(),
        }
    }

    /// Ingest one inbound turn: append, scan, throttle, recompute.
    ///
    /// Turns are processed strictly one at a time in arrival order. No
    /// failure on this path is ever fatal; a malformed turn is dropped
    /// upstream by the log and a non-matching turn simply produces no
    /// detections.
    pub fn on_transcript(&mut self, speaker: Speaker, text: &str, arrived_at: DateTime<Utc>) {
        let Some(turn) = self.log.append(speaker, text, arrived_at) else {
            return;
        };

        for detection in scan_turn(&turn) {
            if let Some(item) = self.limiter.accept(&detection, arrived_at) {
                debug!("feedback emitted: {}", item.category);
                self.queue.push(item);
            }
        }

        self.metrics = SessionMetrics::recompute(&self.log);

        if let Some(detection) = self.metrics.imbalance_detection(
            self.config.ratio_low,
            self.config.ratio_high,
            turn.sequence,
            arrived_at,
        ) {
            if let Some(item) = self.limiter.accept(&detection, arrived_at) {
                debug!("feedback emitted: {}", item.category);
                self.queue.push(item);
            }
        }
    }

    /// Current feedback items, oldest first
    pub fn feedback(&self) -> Vec<FeedbackItem> {
        self.queue.list()
    }

    /// Latest metrics snapshot
    pub fn metrics(&self) -> SessionMetrics {
        self.metrics.clone()
    }

    /// The transcript log, for the owning caller to persist at session end
    pub fn transcript(&self) -> &TranscriptLog {
        &self.log
    }

    pub fn config(&self) -> &CoachConfig {
        &self.config
    }
}

impl Default for CoachingSession {
    fn default() -> Self {
        Self::new(CoachConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(offset_secs: i64) -> DateTime<Utc> {
        chrono::DateTime::from_timestamp(1_750_000_000 + offset_secs, 0).unwrap()
    }

    #[test]
    fn test_turn_flows_into_feedback_and_metrics() {
        let mut session = CoachingSession::default();
        session.on_transcript(Speaker::Counterpart, "that's too expensive for us", ts(0));

        let feedback = session.feedback();
        assert_eq!(feedback.len(), 1);
        assert_eq!(feedback[0].category, "objection:price");
        assert_eq!(session.metrics().objection_count, 1);
    }

    #[test]
    fn test_malformed_turn_is_ignored() {
        let mut session = CoachingSession::default();
        session.on_transcript(Speaker::Counterpart, "   ", ts(0));
        assert!(session.feedback().is_empty());
        assert!(session.transcript().is_empty());
    }

    #[test]
    fn test_imbalance_warning_cooldown() {
        let mut session = CoachingSession::new(CoachConfig {
            cooldown: Duration::seconds(60),
            ..Default::default()
        });

        // Trainee-only turns keep the ratio at 100, far above the band
        session.on_transcript(Speaker::Trainee, "let me show you our plans", ts(0));
        session.on_transcript(Speaker::Trainee, "we treat the whole perimeter", ts(10));
        session.on_transcript(Speaker::Trainee, "and the warranty covers it all", ts(20));

        let warnings: Vec<_> = session
            .feedback()
            .into_iter()
            .filter(|i| i.category == "talk-time-imbalance")
            .collect();
        assert_eq!(warnings.len(), 1, "cooldown suppresses repeat warnings");

        // Past the window a fresh warning is allowed
        session.on_transcript(Speaker::Trainee, "did I mention the discount", ts(61));
        let warnings: Vec<_> = session
            .feedback()
            .into_iter()
            .filter(|i| i.category == "talk-time-imbalance")
            .collect();
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_feedback_is_time_ordered() {
        let mut session = CoachingSession::default();
        session.on_transcript(Speaker::Counterpart, "it's not a good time", ts(0));
        session.on_transcript(Speaker::Trainee, "I understand", ts(5));
        session.on_transcript(Speaker::Counterpart, "and it's too expensive", ts(10));

        let feedback = session.feedback();
        assert!(feedback.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }
}
