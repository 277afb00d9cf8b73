//! Pitchcoach daemon library
//!
//! Re-exports the daemon's modules for integration testing.

pub mod config;
pub mod daemon;
pub mod ipc;
pub mod transport;

pub use config::DaemonConfig;
pub use daemon::CoachDaemon;
pub use ipc::IpcServer;
pub use transport::SocketEventSource;
