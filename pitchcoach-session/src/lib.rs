//! Live session orchestration for pitchcoach
//!
//! Owns the connection state machine that governs the realtime
//! audio/transcript channel and wires inbound events into the coaching
//! engine. The channel itself is opaque: anything that can hand over a
//! stream of [`InboundEvent`]s after a handshake can drive a session.
//!
//! # Lifecycle
//!
//! ```text
//! disconnected ──start()──> connecting ──handshake ok──> connected
//!      ▲                        │                            │
//!      │   permission denied /  │        stop() / remote end │
//!      └── handshake failure ───┴──── channel error ─────────┘
//! ```
//!
//! Capture is acquired on the way into `connected` and released exactly
//! once on every path back to `disconnected`.

pub mod connection;
pub mod events;
pub mod session;
pub mod state;

// Re-exports
pub use connection::{ChannelTransport, Connection};
pub use events::InboundEvent;
pub use session::{LiveSession, SessionSummary};
pub use state::{ConnectionError, ConnectionState, ConnectionStatus, Result};
