//! Local capture resource for pitchcoach sessions
//!
//! The coaching engine treats audio as an opaque resource it starts and
//! stops; this crate is that resource. Capture runs on a dedicated thread
//! owning the cpal stream (so the controlling handle stays `Send`) and
//! archives the trainee microphone to a WAV file for later review.
//!
//! ```text
//! ConnectionStateMachine
//!   │  acquire() / release()        (CaptureControl seam)
//!   ▼
//! MicCapture ── spawns ──> capture thread (cpal stream)
//!                             │
//!                             └─> CaptureSink (WavArchiveSink, hound)
//! ```

pub mod capture;
pub mod error;
pub mod sink;

pub use capture::{CaptureControl, MicCapture};
pub use error::{CaptureError, Result};
pub use sink::{CaptureSink, WavArchiveSink};

use std::path::PathBuf;

/// Capture sample rate (16 kHz mono, the realtime-channel convention)
pub const TARGET_SAMPLE_RATE: u32 = 16000;

/// Capture configuration
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Capture sample rate (default: 16000 Hz)
    pub sample_rate: u32,
    /// Number of channels (default: 1 = mono)
    pub channels: u16,
    /// Device index (None = default input device)
    pub device_index: Option<usize>,
    /// Directory for archival WAV files (None = capture without archival)
    pub archive_dir: Option<PathBuf>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: TARGET_SAMPLE_RATE,
            channels: 1,
            device_index: None,
            archive_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CaptureConfig::default();
        assert_eq!(config.sample_rate, 16000);
        assert_eq!(config.channels, 1);
        assert!(config.device_index.is_none());
        assert!(config.archive_dir.is_none());
    }
}
