//! Configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use pitchcoach_audio::CaptureConfig;
use pitchcoach_engine::CoachConfig;

/// Daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Path to configuration file
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Unix socket path for control commands
    pub control_socket_path: String,

    /// Unix socket path the conversation channel connects to
    pub channel_socket_path: String,

    /// Directory for archival WAV captures (None disables archival)
    pub archive_dir: Option<PathBuf>,

    /// Audio device index (None = default device)
    pub audio_device_index: Option<usize>,

    /// Minimum spacing between recurring warnings (seconds)
    pub cooldown_secs: i64,

    /// Talk-time ratio band: warn below this
    pub talk_ratio_low: u8,

    /// Talk-time ratio band: warn above this
    pub talk_ratio_high: u8,

    /// Feedback queue capacity
    pub feedback_capacity: usize,

    /// Channel handshake timeout (seconds)
    pub handshake_timeout_secs: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            config_path: Self::default_config_path(),
            control_socket_path: "/tmp/pitchcoach.sock".to_string(),
            channel_socket_path: "/tmp/pitchcoach_channel.sock".to_string(),
            archive_dir: Some(Self::default_archive_dir()),
            audio_device_index: None,
            cooldown_secs: 60,
            talk_ratio_low: 35,
            talk_ratio_high: 70,
            feedback_capacity: 50,
            handshake_timeout_secs: 10,
        }
    }
}

impl DaemonConfig {
    /// Load configuration from the default location, or create it
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_config_path())
    }

    /// Load configuration from a specific file, creating it with defaults
    /// when missing
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .context("Failed to read config file")?;

            let mut config: DaemonConfig = toml::from_str(&contents)
                .context("Failed to parse config file")?;

            config.config_path = config_path.to_path_buf();
            Ok(config)
        } else {
            let config = Self {
                config_path: config_path.to_path_buf(),
                ..Self::default()
            };
            config.save().context("Failed to save default config")?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(&self.config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Engine tunables derived from this config
    pub fn coach_config(&self) -> CoachConfig {
        CoachConfig {
            cooldown: chrono::Duration::seconds(self.cooldown_secs),
            ratio_low: self.talk_ratio_low,
            ratio_high: self.talk_ratio_high,
            queue_capacity: self.feedback_capacity,
        }
    }

    /// Capture settings derived from this config
    pub fn capture_config(&self) -> CaptureConfig {
        CaptureConfig {
            device_index: self.audio_device_index,
            archive_dir: self.archive_dir.clone(),
            ..CaptureConfig::default()
        }
    }

    pub fn handshake_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.handshake_timeout_secs)
    }

    /// Get default config path
    fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pitchcoach")
            .join("config.toml")
    }

    /// Default directory for session capture archives
    fn default_archive_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pitchcoach")
            .join("recordings")
    }
}
