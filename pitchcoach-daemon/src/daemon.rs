//! Daemon facade over one live session
//!
//! Serializes lifecycle commands behind an RwLock so IPC clients cannot
//! interleave start/stop, while read-only queries share the lock.

use tokio::sync::RwLock;
use tracing::info;

use pitchcoach_session::LiveSession;

pub struct CoachDaemon {
    session: RwLock<LiveSession>,
}

impl CoachDaemon {
    pub fn new(session: LiveSession) -> Self {
        Self {
            session: RwLock::new(session),
        }
    }

    /// Start the live channel
    pub async fn start(&self) -> pitchcoach_session::Result<()> {
        info!("starting session");
        self.session.write().await.start().await
    }

    /// Stop the live channel; idempotent
    pub async fn stop(&self) {
        info!("stopping session");
        self.session.write().await.stop();
    }

    /// Connection status as JSON
    pub async fn status_json(&self) -> Result<String, serde_json::Error> {
        let session = self.session.read().await;
        serde_json::to_string(&session.connection_status())
    }

    /// Current feedback items as JSON, oldest first
    pub async fn feedback_json(&self) -> Result<String, serde_json::Error> {
        let session = self.session.read().await;
        serde_json::to_string(&session.list_feedback())
    }

    /// Latest metrics snapshot as JSON
    pub async fn metrics_json(&self) -> Result<String, serde_json::Error> {
        let session = self.session.read().await;
        serde_json::to_string(&session.current_metrics())
    }

    /// Final summary for the caller that owns persistence
    pub async fn summary_json(&self) -> Result<String, serde_json::Error> {
        let session = self.session.read().await;
        serde_json::to_string(&session.session_summary(chrono::Utc::now()))
    }
}
