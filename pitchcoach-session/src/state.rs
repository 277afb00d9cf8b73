//! Connection state and error taxonomy

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConnectionError>;

/// Lifecycle state of the live channel, independent of analysis state.
///
/// Legal transitions: `disconnected → connecting → connected` and
/// `connecting|connected → disconnected`. A restart always passes through
/// `disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Fatal to the start attempt; never retried automatically
    #[error("capture permission denied")]
    PermissionDenied,

    /// Capture failed for a reason other than permission
    #[error("capture failed: {0}")]
    CaptureFailed(String),

    #[error("handshake failed: {0}")]
    HandshakeFailure(String),

    #[error("handshake timed out")]
    HandshakeTimeout,

    /// The event stream closed without a remote end signal
    #[error("channel closed: {0}")]
    ChannelClosed(String),

    #[error("connection already active")]
    AlreadyConnected,
}

/// Snapshot exposed to the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display_and_serde() {
        assert_eq!(ConnectionState::Disconnected.to_string(), "disconnected");
        assert_eq!(
            serde_json::to_string(&ConnectionState::Connecting).unwrap(),
            "\"connecting\""
        );
    }

    #[test]
    fn test_status_serializes_error_string() {
        let status = ConnectionStatus {
            state: ConnectionState::Disconnected,
            last_error: Some(ConnectionError::HandshakeTimeout.to_string()),
        };
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"state\":\"disconnected\""));
        assert!(json.contains("handshake timed out"));
    }
}
