//! Pitchcoach Daemon - live sales-coaching engine
//!
//! Runs as a background service holding one live coaching session. The
//! conversation frontend streams dialogue turns over a Unix socket; a
//! second control socket serves start/stop commands and the coaching
//! output (feedback, metrics, connection status) to the presentation
//! layer.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use pitchcoach_audio::MicCapture;
use pitchcoach_daemon::{CoachDaemon, DaemonConfig, IpcServer, SocketEventSource};
use pitchcoach_session::LiveSession;

#[derive(Parser, Debug)]
#[command(name = "pitchcoach-daemon", about = "Live sales-coaching daemon")]
struct Args {
    /// Path to the configuration file (default: platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the control socket path
    #[arg(long)]
    socket: Option<String>,

    /// Override the audio input device index
    #[arg(long)]
    device: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    info!("starting pitchcoach daemon v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => DaemonConfig::load_from(path),
        None => DaemonConfig::load(),
    }
    .context("Failed to load configuration")?;

    if let Some(socket) = args.socket {
        config.control_socket_path = socket;
    }
    if let Some(device) = args.device {
        config.audio_device_index = Some(device);
    }

    info!("configuration loaded from {}", config.config_path.display());

    // Assemble the session: mic capture + socket-fed conversation channel
    let capture = MicCapture::new(config.capture_config());
    let transport = Arc::new(SocketEventSource::new(&config.channel_socket_path));
    let session = LiveSession::new(config.coach_config(), transport, Box::new(capture))
        .with_handshake_timeout(config.handshake_timeout());

    let daemon = Arc::new(CoachDaemon::new(session));

    let mut ipc_server = IpcServer::new(&config.control_socket_path, daemon.clone())
        .context("Failed to start IPC server")?;

    info!("pitchcoach daemon ready");
    info!("  control socket: {}", config.control_socket_path);
    info!("  channel socket: {}", config.channel_socket_path);
    info!("  cooldown: {}s, talk-time band: {}-{}",
          config.cooldown_secs, config.talk_ratio_low, config.talk_ratio_high);

    tokio::select! {
        result = ipc_server.run() => {
            if let Err(e) = result {
                error!("IPC server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("received shutdown signal");
        }
    }

    // Teardown releases capture and lands the connection in disconnected
    daemon.stop().await;
    info!("pitchcoach daemon stopped");

    Ok(())
}
