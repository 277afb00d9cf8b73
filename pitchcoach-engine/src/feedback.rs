//! Bounded feedback queue
//!
//! Time-ordered, evict-oldest collection read by the presentation layer.
//! The hard cap keeps a long session from growing memory with elapsed
//! time.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use pitchcoach_patterns::Severity;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_CAPACITY: usize = 50;

/// One user-facing feedback item, immutable after creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackItem {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Category label, e.g. `objection:price` or `talk-time-imbalance`
    pub category: String,
    pub message: String,
    pub severity: Severity,
}

/// Capacity-bounded queue, oldest first
#[derive(Debug)]
pub struct FeedbackQueue {
    items: VecDeque<FeedbackItem>,
    capacity: usize,
}

impl FeedbackQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a new item, evicting the oldest when over capacity
    pub fn push(&mut self, item: FeedbackItem) {
        if self.items.len() == self.capacity {
            if let Some(evicted) = self.items.pop_front() {
                debug!("feedback queue full, evicting {}", evicted.id);
            }
        }
        self.items.push_back(item);
    }

    /// Items in emission order, oldest first
    pub fn list(&self) -> Vec<FeedbackItem> {
        self.items.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for FeedbackQueue {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
