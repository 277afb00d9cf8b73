//! Live session facade
//!
//! Ties one connection to one coaching engine and exposes the output
//! boundary the presentation layer reads: feedback list, metrics snapshot
//! and connection status. Reads are wholesale clones of the engine's
//! snapshots, so a presentation task can poll without coordination.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use pitchcoach_audio::CaptureControl;
use pitchcoach_engine::{CoachConfig, CoachingSession, FeedbackItem, SessionMetrics};

use crate::connection::{ChannelTransport, Connection};
use crate::state::{ConnectionState, ConnectionStatus, Result};

/// Handed to the owning caller at session end; the engine itself persists
/// nothing.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub turns: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub duration_s: f64,
}

/// One live coaching session: connection lifecycle plus analysis pipeline
pub struct LiveSession {
    engine: Arc<Mutex<CoachingSession>>,
    connection: Connection,
    started_at: Option<DateTime<Utc>>,
}

impl LiveSession {
    pub fn new(
        config: CoachConfig,
        transport: Arc<dyn ChannelTransport>,
        capture: Box<dyn CaptureControl>,
    ) -> Self {
        let engine = Arc::new(Mutex::new(CoachingSession::new(config)));
        let connection = Connection::new(transport, capture, Arc::clone(&engine));
        Self {
            engine,
            connection,
            started_at: None,
        }
    }

    pub fn with_handshake_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.connection = self.connection.with_handshake_timeout(timeout);
        self
    }

    /// Start the live channel; see [`Connection::start`] for the error
    /// contract
    pub async fn start(&mut self) -> Result<()> {
        self.connection.start().await?;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// Stop the live channel. Idempotent from any state.
    pub fn stop(&mut self) {
        self.connection.stop();
    }

    /// Current feedback items, oldest first
    pub fn list_feedback(&self) -> Vec<FeedbackItem> {
        self.engine.lock().feedback()
    }

    /// Latest metrics snapshot
    pub fn current_metrics(&self) -> SessionMetrics {
        self.engine.lock().metrics()
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.connection.status()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Final transcript size and elapsed time for the persistence-owning
    /// caller
    pub fn session_summary(&self, now: DateTime<Utc>) -> SessionSummary {
        let turns = self.engine.lock().transcript().len();
        let duration_s = self
            .started_at
            .map(|start| (now - start).num_milliseconds() as f64 / 1000.0)
            .unwrap_or(0.0);
        SessionSummary {
            turns,
            started_at: self.started_at,
            duration_s,
        }
    }
}
