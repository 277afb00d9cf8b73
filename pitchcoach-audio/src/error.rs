//! Error types for the capture resource

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CaptureError>;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("capture permission denied")]
    PermissionDenied,

    #[error("audio device error: {0}")]
    DeviceError(String),

    #[error("audio stream error: {0}")]
    StreamError(String),

    #[error("already capturing")]
    AlreadyCapturing,

    #[error("not capturing")]
    NotCapturing,

    #[error("archive error: {0}")]
    Archive(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CaptureError {
    pub fn device<S: Into<String>>(msg: S) -> Self {
        Self::DeviceError(msg.into())
    }

    pub fn stream<S: Into<String>>(msg: S) -> Self {
        Self::StreamError(msg.into())
    }
}
