//! Error types for the relay and session seams.

use thiserror::Error;

/// Errors surfaced by serial sources and sessions.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// `send_text` was called while the session was down. The line is the
    /// caller's to drop or retry; nothing is queued.
    #[error("session is not connected")]
    NotConnected,

    /// The bounded outbound queue is full; the transport is not draining
    /// fast enough.
    #[error("outbound queue is full")]
    QueueFull,

    /// The underlying transport failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The serial driver failed to service buffered bytes.
    #[error("serial read failed: {0}")]
    Serial(String),
}
