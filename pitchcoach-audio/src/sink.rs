//! Archival sinks for captured audio

use std::path::{Path, PathBuf};

use chrono::Local;
use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::info;

use crate::error::{CaptureError, Result};

/// Destination for captured sample chunks
pub trait CaptureSink: Send {
    fn write_chunk(&mut self, samples: &[f32]) -> Result<()>;

    /// Flush and close the sink. Called once when capture stops.
    fn finalize(&mut self) -> Result<()>;
}

/// WAV file sink (16-bit PCM) for local session archival
pub struct WavArchiveSink {
    writer: Option<WavWriter<std::io::BufWriter<std::fs::File>>>,
    path: PathBuf,
}

impl WavArchiveSink {
    /// Create `capture-YYYYmmdd-HHMMSS.wav` under `dir`, creating the
    /// directory if needed
    pub fn create(dir: &Path, sample_rate: u32, channels: u16) -> Result<Self> {
        std::fs::create_dir_all(dir)?;

        let filename = format!("capture-{}.wav", Local::now().format("%Y%m%d-%H%M%S"));
        let path = dir.join(filename);

        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let writer = WavWriter::create(&path, spec)?;

        info!("archiving capture to {}", path.display());

        Ok(Self {
            writer: Some(writer),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CaptureSink for WavArchiveSink {
    fn write_chunk(&mut self, samples: &[f32]) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| CaptureError::stream("archive sink already finalized"))?;

        for sample in samples {
            let scaled = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer.write_sample(scaled)?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            writer.finalize()?;
            info!("capture archive closed: {}", self.path.display());
        }
        Ok(())
    }
}
