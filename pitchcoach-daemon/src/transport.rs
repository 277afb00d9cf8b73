//! Unix-socket event source for the conversation channel
//!
//! The simulated-counterpart frontend connects to this socket and streams
//! newline-delimited JSON [`InboundEvent`]s. The handshake is the accept:
//! the connection layer applies its timeout around it.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;
use tracing::{info, warn};

use pitchcoach_session::{ChannelTransport, ConnectionError, InboundEvent};

const EVENT_BUFFER: usize = 256;

pub struct SocketEventSource {
    socket_path: PathBuf,
}

impl SocketEventSource {
    pub fn new(socket_path: impl AsRef<Path>) -> Self {
        Self {
            socket_path: socket_path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl ChannelTransport for SocketEventSource {
    async fn handshake(&self) -> pitchcoach_session::Result<mpsc::Receiver<InboundEvent>> {
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)
                .map_err(|e| ConnectionError::HandshakeFailure(e.to_string()))?;
        }

        let listener = UnixListener::bind(&self.socket_path)
            .map_err(|e| ConnectionError::HandshakeFailure(e.to_string()))?;

        info!(
            "waiting for conversation channel on {}",
            self.socket_path.display()
        );

        let (stream, _addr) = listener
            .accept()
            .await
            .map_err(|e| ConnectionError::HandshakeFailure(e.to_string()))?;

        info!("conversation channel connected");

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        tokio::spawn(read_loop(stream, tx));

        Ok(rx)
    }
}

/// Parse JSON lines into events. A malformed payload drops that line only;
/// the stream keeps going.
async fn read_loop(stream: UnixStream, tx: mpsc::Sender<InboundEvent>) {
    let mut lines = BufReader::new(stream).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<InboundEvent>(&line) {
                    Ok(event) => {
                        if tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("dropping malformed channel payload: {}", e);
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!("channel read error: {}", e);
                break;
            }
        }
    }
    // Dropping the sender closes the event stream; the connection treats
    // that as a channel close unless an End arrived first.
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchcoach_engine::Speaker;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_handshake_accepts_and_parses_events() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("channel.sock");

        let source = SocketEventSource::new(&path);
        let accept = tokio::spawn(async move { source.handshake().await });

        // Wait for the listener to bind
        for _ in 0..100 {
            if path.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let mut client = UnixStream::connect(&path).await.unwrap();
        let mut rx = accept.await.unwrap().unwrap();

        let turn = InboundEvent::Transcript {
            speaker: Speaker::Counterpart,
            text: "too expensive".to_string(),
            timestamp: "2025-06-01T12:00:00Z".parse().unwrap(),
        };
        client
            .write_all(turn.to_json_line().unwrap().as_bytes())
            .await
            .unwrap();
        client.write_all(b"this is not json\n").await.unwrap();
        client
            .write_all(
                InboundEvent::End {
                    reason: "done".to_string(),
                }
                .to_json_line()
                .unwrap()
                .as_bytes(),
            )
            .await
            .unwrap();

        match rx.recv().await.unwrap() {
            InboundEvent::Transcript { speaker, text, .. } => {
                assert_eq!(speaker, Speaker::Counterpart);
                assert_eq!(text, "too expensive");
            }
            other => panic!("unexpected event: {:?}", other),
        }

        // The malformed line was dropped, not fatal
        match rx.recv().await.unwrap() {
            InboundEvent::End { reason } => assert_eq!(reason, "done"),
            other => panic!("unexpected event: {:?}", other),
        }

        drop(client);
        assert!(rx.recv().await.is_none(), "stream should close");
    }
}
