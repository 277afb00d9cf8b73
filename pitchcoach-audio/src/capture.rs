//! Microphone capture on a dedicated thread
//!
//! The cpal stream is `!Send`, so the stream lives on its own thread and
//! the controlling handle only exchanges channel messages with it. That
//! keeps `MicCapture` usable from async tasks while preserving the
//! acquire-on-connect / release-on-teardown discipline the connection
//! layer needs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Host};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::{CaptureError, Result};
use crate::sink::{CaptureSink, WavArchiveSink};
use crate::CaptureConfig;

/// The seam the connection state machine holds: acquire capture on entering
/// the connected state, release it on every exit edge.
pub trait CaptureControl: Send {
    /// Acquire the capture resource. A missing or refused input device is
    /// a permission denial.
    fn acquire(&mut self) -> Result<()>;

    /// Release the capture resource. Must be safe to call when not held.
    fn release(&mut self);

    fn is_active(&self) -> bool;
}

/// Microphone capture backed by cpal
pub struct MicCapture {
    config: CaptureConfig,
    worker: Option<CaptureWorker>,
}

struct CaptureWorker {
    stop_tx: mpsc::Sender<()>,
    handle: thread::JoinHandle<()>,
}

impl MicCapture {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            worker: None,
        }
    }
}

impl CaptureControl for MicCapture {
    fn acquire(&mut self) -> Result<()> {
        if self.worker.is_some() {
            return Err(CaptureError::AlreadyCapturing);
        }

        let (ready_tx, ready_rx) = mpsc::channel();
        let (stop_tx, stop_rx) = mpsc::channel();
        let config = self.config.clone();

        let handle = thread::Builder::new()
            .name("pitchcoach-capture".to_string())
            .spawn(move || capture_thread(config, ready_tx, stop_rx))
            .map_err(CaptureError::Io)?;

        // The thread reports once the stream is playing (or why it can't)
        match ready_rx.recv() {
            Ok(Ok(())) => {
                info!("audio capture acquired");
                self.worker = Some(CaptureWorker { stop_tx, handle });
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(CaptureError::stream("capture thread exited before ready"))
            }
        }
    }

    fn release(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            let _ = worker.handle.join();
            info!("audio capture released");
        }
    }

    fn is_active(&self) -> bool {
        self.worker.is_some()
    }
}

impl Drop for MicCapture {
    fn drop(&mut self) {
        self.release();
    }
}

fn capture_thread(
    config: CaptureConfig,
    ready_tx: mpsc::Sender<Result<()>>,
    stop_rx: mpsc::Receiver<()>,
) {
    let host = cpal::default_host();

    let device = match select_device(&host, config.device_index) {
        Ok(device) => device,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());
    debug!("capturing from input device: {}", device_name);

    let sink: Option<Box<dyn CaptureSink>> = match &config.archive_dir {
        Some(dir) => {
            match WavArchiveSink::create(dir, config.sample_rate, config.channels) {
                Ok(sink) => Some(Box::new(sink)),
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            }
        }
        None => None,
    };
    let sink = Arc::new(Mutex::new(sink));
    let total_frames = Arc::new(AtomicUsize::new(0));

    let stream_config = cpal::StreamConfig {
        channels: config.channels,
        sample_rate: cpal::SampleRate(config.sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let cb_sink = Arc::clone(&sink);
    let cb_frames = Arc::clone(&total_frames);

    let stream = match device.build_input_stream(
        &stream_config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            cb_frames.fetch_add(data.len(), Ordering::Relaxed);
            if let Some(sink) = cb_sink.lock().as_mut() {
                if let Err(e) = sink.write_chunk(data) {
                    warn!("archive write failed: {}", e);
                }
            }
        },
        |err| {
            warn!("capture stream error: {}", err);
        },
        None,
    ) {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready_tx.send(Err(CaptureError::stream(format!(
                "failed to build input stream: {}",
                e
            ))));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready_tx.send(Err(CaptureError::stream(format!(
            "failed to start input stream: {}",
            e
        ))));
        return;
    }

    let _ = ready_tx.send(Ok(()));

    // Park until release (or until the controlling handle is dropped)
    let _ = stop_rx.recv();
    drop(stream);

    let frames = total_frames.load(Ordering::Relaxed);
    debug!(
        "capture stopped after {} frames ({:.2}s)",
        frames,
        frames as f32 / config.sample_rate as f32
    );

    if let Some(sink) = sink.lock().as_mut() {
        if let Err(e) = sink.finalize() {
            warn!("archive finalize failed: {}", e);
        }
    };
}

fn select_device(host: &Host, device_index: Option<usize>) -> Result<Device> {
    match device_index {
        Some(index) => {
            let mut devices = host
                .input_devices()
                .map_err(|e| CaptureError::device(format!("failed to enumerate devices: {}", e)))?;
            devices
                .nth(index)
                .ok_or_else(|| CaptureError::device(format!("device index {} not found", index)))
        }
        // No usable default input is indistinguishable from a denied
        // microphone here; both block the start attempt the same way.
        None => host
            .default_input_device()
            .ok_or(CaptureError::PermissionDenied),
    }
}
