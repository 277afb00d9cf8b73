//! Connection state machine for the live audio/transcript channel
//!
//! Orchestrates permission acquisition, handshake, event forwarding and
//! teardown. Teardown is the resource-safety contract: whichever of
//! {manual stop, remote end, channel error, permission denial} triggers
//! it, capture is released exactly once and the state lands in
//! `disconnected`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use pitchcoach_audio::{CaptureControl, CaptureError};
use pitchcoach_engine::CoachingSession;

use crate::events::InboundEvent;
use crate::state::{ConnectionError, ConnectionState, ConnectionStatus, Result};

pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// The live channel behind a seam: anything that can hand over an event
/// stream after an awaited handshake
#[async_trait]
pub trait ChannelTransport: Send + Sync {
    async fn handshake(&self) -> Result<mpsc::Receiver<InboundEvent>>;
}

/// Scoped holder for the capture resource. `release` is idempotent; the
/// underlying control is only invoked while the guard is held.
struct CaptureGuard {
    control: Box<dyn CaptureControl>,
    held: bool,
}

impl CaptureGuard {
    fn acquire(&mut self) -> std::result::Result<(), CaptureError> {
        if self.held {
            return Ok(());
        }
        self.control.acquire()?;
        self.held = true;
        Ok(())
    }

    fn release(&mut self) {
        if self.held {
            self.control.release();
            self.held = false;
        }
    }
}

/// State shared between the owning handle and the forwarding task
struct Shared {
    state: ConnectionState,
    last_error: Option<String>,
    guard: CaptureGuard,
}

impl Shared {
    /// Every exit edge back to `disconnected` goes through here
    fn teardown(&mut self, error: Option<ConnectionError>) {
        self.guard.release();
        if let Some(e) = error {
            self.last_error = Some(e.to_string());
        }
        if self.state != ConnectionState::Disconnected {
            info!("connection: {} -> disconnected", self.state);
            self.state = ConnectionState::Disconnected;
        }
    }
}

/// The connection state machine
pub struct Connection {
    shared: Arc<Mutex<Shared>>,
    transport: Arc<dyn ChannelTransport>,
    engine: Arc<Mutex<CoachingSession>>,
    handshake_timeout: Duration,
    forward_task: Option<JoinHandle<()>>,
}

impl Connection {
    pub fn new(
        transport: Arc<dyn ChannelTransport>,
        capture: Box<dyn CaptureControl>,
        engine: Arc<Mutex<CoachingSession>>,
    ) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                state: ConnectionState::Disconnected,
                last_error: None,
                guard: CaptureGuard {
                    control: capture,
                    held: false,
                },
            })),
            transport,
            engine,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            forward_task: None,
        }
    }

    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Start the connection: acquire capture, handshake, begin forwarding.
    ///
    /// Only legal from `disconnected`. On any failure the state lands back
    /// in `disconnected` with `last_error` set and the error is returned;
    /// the caller may retry by calling `start()` again.
    pub async fn start(&mut self) -> Result<()> {
        {
            let mut shared = self.shared.lock();
            if shared.state != ConnectionState::Disconnected {
                return Err(ConnectionError::AlreadyConnected);
            }
            shared.state = ConnectionState::Connecting;
            shared.last_error = None;
            info!("connection: disconnected -> connecting");
        }

        // teardown() re-locks shared; the guard must drop before the
        // error branch runs
        let acquired = self.shared.lock().guard.acquire();
        if let Err(e) = acquired {
            let error = match e {
                CaptureError::PermissionDenied => ConnectionError::PermissionDenied,
                other => ConnectionError::CaptureFailed(other.to_string()),
            };
            warn!("capture acquisition failed: {}", error);
            self.shared.lock().teardown(Some(error.clone()));
            return Err(error);
        }

        let handshake = self.transport.handshake();
        let rx = match tokio::time::timeout(self.handshake_timeout, handshake).await {
            Ok(Ok(rx)) => rx,
            Ok(Err(e)) => {
                warn!("handshake failed: {}", e);
                self.shared.lock().teardown(Some(e.clone()));
                return Err(e);
            }
            Err(_) => {
                let error = ConnectionError::HandshakeTimeout;
                warn!("{}", error);
                self.shared.lock().teardown(Some(error.clone()));
                return Err(error);
            }
        };

        {
            let mut shared = self.shared.lock();
            shared.state = ConnectionState::Connected;
            info!("connection: connecting -> connected");
        }

        let shared = Arc::clone(&self.shared);
        let engine = Arc::clone(&self.engine);
        self.forward_task = Some(tokio::spawn(forward_loop(rx, engine, shared)));

        Ok(())
    }

    /// Stop the connection. Callable from any state and idempotent:
    /// repeated calls all land in `disconnected` and capture is released
    /// at most once.
    pub fn stop(&mut self) {
        if let Some(task) = self.forward_task.take() {
            task.abort();
        }
        self.shared.lock().teardown(None);
    }

    pub fn status(&self) -> ConnectionStatus {
        let shared = self.shared.lock();
        ConnectionStatus {
            state: shared.state,
            last_error: shared.last_error.clone(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.lock().state
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Consume inbound events one at a time, in arrival order. Analysis never
/// blocks on I/O, so there is nothing to cancel mid-turn.
async fn forward_loop(
    mut rx: mpsc::Receiver<InboundEvent>,
    engine: Arc<Mutex<CoachingSession>>,
    shared: Arc<Mutex<Shared>>,
) {
    loop {
        match rx.recv().await {
            Some(InboundEvent::Transcript {
                speaker,
                text,
                timestamp,
            }) => {
                engine.lock().on_transcript(speaker, &text, timestamp);
            }
            Some(InboundEvent::AudioChunk { samples }) => {
                // Playback is outside the engine; the chunk is opaque here
                debug!("inbound audio chunk: {} samples", samples.len());
            }
            Some(InboundEvent::End { reason }) => {
                info!("remote ended the session: {}", reason);
                shared.lock().teardown(None);
                break;
            }
            Some(InboundEvent::Error { message }) => {
                warn!("channel error: {}", message);
                shared
                    .lock()
                    .teardown(Some(ConnectionError::ChannelClosed(message)));
                break;
            }
            None => {
                shared.lock().teardown(Some(ConnectionError::ChannelClosed(
                    "event stream closed".to_string(),
                )));
                break;
            }
        }
    }
}
