//! Unix socket IPC server for control commands

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, info};

use crate::daemon::CoachDaemon;

/// IPC command
#[derive(Debug)]
enum IpcCommand {
    Start,
    Stop,
    Status,
    Feedback,
    Metrics,
    Summary,
    Quit,
}

impl IpcCommand {
    fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "status" => Ok(Self::Status),
            "feedback" => Ok(Self::Feedback),
            "metrics" => Ok(Self::Metrics),
            "summary" => Ok(Self::Summary),
            "quit" | "exit" | "shutdown" => Ok(Self::Quit),
            _ => anyhow::bail!("Unknown command: {}", s),
        }
    }
}

/// Unix socket IPC server
pub struct IpcServer {
    listener: UnixListener,
    daemon: Arc<CoachDaemon>,
}

impl IpcServer {
    /// Create new IPC server
    pub fn new(socket_path: &str, daemon: Arc<CoachDaemon>) -> Result<Self> {
        // Remove existing socket if it exists
        let _ = std::fs::remove_file(socket_path);

        let listener = UnixListener::bind(socket_path)
            .context("Failed to bind Unix socket")?;

        info!("IPC server listening on {}", socket_path);

        Ok(Self { listener, daemon })
    }

    /// Accept and serve connections until an accept error
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let (stream, _) = self.listener.accept().await
                .context("Failed to accept connection")?;
            let daemon = self.daemon.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, daemon).await {
                    error!("IPC connection error: {}", e);
                }
            });
        }
    }
}

/// Handle a single IPC connection
pub async fn handle_connection(mut stream: UnixStream, daemon: Arc<CoachDaemon>) -> Result<()> {
    let mut buffer = [0u8; 1024];
    let n = stream.read(&mut buffer).await?;

    if n == 0 {
        return Ok(());
    }

    let request = String::from_utf8_lossy(&buffer[..n]);
    debug!("Received IPC command: {}", request.trim());

    let response = match IpcCommand::parse(&request) {
        Ok(IpcCommand::Start) => {
            match daemon.start().await {
                Ok(()) => "session started".to_string(),
                Err(e) => format!("Error: {}", e),
            }
        }
        Ok(IpcCommand::Stop) => {
            daemon.stop().await;
            "session stopped".to_string()
        }
        Ok(IpcCommand::Status) => daemon.status_json().await?,
        Ok(IpcCommand::Feedback) => daemon.feedback_json().await?,
        Ok(IpcCommand::Metrics) => daemon.metrics_json().await?,
        Ok(IpcCommand::Summary) => daemon.summary_json().await?,
        Ok(IpcCommand::Quit) => {
            info!("Received quit command");
            daemon.stop().await;
            std::process::exit(0);
        }
        Err(e) => {
            format!("Error: {}", e)
        }
    };

    stream.write_all(response.as_bytes()).await?;
    stream.flush().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parsing() {
        assert!(matches!(IpcCommand::parse("start"), Ok(IpcCommand::Start)));
        assert!(matches!(IpcCommand::parse(" STOP \n"), Ok(IpcCommand::Stop)));
        assert!(matches!(IpcCommand::parse("feedback"), Ok(IpcCommand::Feedback)));
        assert!(matches!(IpcCommand::parse("metrics"), Ok(IpcCommand::Metrics)));
        assert!(matches!(IpcCommand::parse("shutdown"), Ok(IpcCommand::Quit)));
        assert!(IpcCommand::parse("toggle").is_err());
    }
}
