//! Typed events arriving from the realtime channel
//!
//! The connection publishes these onto a single channel consumed by the
//! forwarding task; there is no listener registry. The wire encoding is
//! newline-delimited JSON.

use chrono::{DateTime, Utc};
use pitchcoach_engine::Speaker;
use serde::{Deserialize, Serialize};

/// Events consumed from the live audio/transcript channel
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// One finished dialogue turn
    Transcript {
        speaker: Speaker,
        text: String,
        timestamp: DateTime<Utc>,
    },

    /// Opaque counterpart audio; playback is handled outside the engine
    AudioChunk { samples: Vec<f32> },

    /// Remote end-of-call signal
    End { reason: String },

    /// Channel-level error
    Error { message: String },
}

impl InboundEvent {
    /// Encode as one JSON line, the channel wire format
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{}\n", json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_serialization() {
        let event = InboundEvent::Transcript {
            speaker: Speaker::Counterpart,
            text: "that's too expensive".to_string(),
            timestamp: "2025-06-01T12:00:00Z".parse().unwrap(),
        };
        let json = event.to_json_line().unwrap();
        assert!(json.contains("\"type\":\"transcript\""));
        assert!(json.contains("\"speaker\":\"counterpart\""));
        assert!(json.ends_with('\n'));
    }

    #[test]
    fn test_end_serialization() {
        let event = InboundEvent::End {
            reason: "caller hung up".to_string(),
        };
        let json = event.to_json_line().unwrap();
        assert!(json.contains("\"type\":\"end\""));
        assert!(json.contains("\"reason\":\"caller hung up\""));
    }

    #[test]
    fn test_roundtrip() {
        let line = r#"{"type":"transcript","speaker":"trainee","text":"hi","timestamp":"2025-06-01T12:00:00Z"}"#;
        let event: InboundEvent = serde_json::from_str(line).unwrap();
        match event {
            InboundEvent::Transcript { speaker, text, .. } => {
                assert_eq!(speaker, Speaker::Trainee);
                assert_eq!(text, "hi");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        assert!(serde_json::from_str::<InboundEvent>("{\"type\":\"transcript\"}").is_err());
        assert!(serde_json::from_str::<InboundEvent>("not json").is_err());
    }
}
