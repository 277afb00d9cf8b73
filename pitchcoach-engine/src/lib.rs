//! Live conversation coaching engine
//!
//! Turns an append-only transcript of a trainee/counterpart conversation
//! into throttled, deduplicated coaching feedback plus a rolling metrics
//! snapshot. The pipeline is synchronous and processes one turn at a time:
//!
//! ```text
//! turn arrival
//!   │
//!   ├─> TranscriptLog (append-only, sequence-numbered)
//!   │     │
//!   │     ├─> scan_turn (pattern library, new turn only)
//!   │     │     └─> FeedbackLimiter (dedup + cooldown) ─> FeedbackQueue
//!   │     │
//!   │     └─> SessionMetrics::recompute (pure, full log)
//!   │           └─> synthetic imbalance detection ─> FeedbackLimiter ─> FeedbackQueue
//! ```
//!
//! Nothing in this crate performs I/O or blocks; errors in analysis are
//! never fatal to the session.

pub mod feedback;
pub mod limiter;
pub mod metrics;
pub mod scanner;
pub mod session;
pub mod transcript;

// Re-export main types
pub use feedback::{FeedbackItem, FeedbackQueue};
pub use limiter::FeedbackLimiter;
pub use metrics::SessionMetrics;
pub use scanner::{scan_turn, Detection};
pub use session::{CoachConfig, CoachingSession};
pub use transcript::{Speaker, TranscriptLog, TranscriptTurn};
