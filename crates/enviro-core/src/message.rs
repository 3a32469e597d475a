//! Outbound telemetry line construction.
//!
//! The wire format is plain text: `"<H>:<MM>:<SS> <raw-serial-text>"`, one
//! WebSocket text frame per non-empty serial read. There is no framing beyond
//! the single separating space and no validation of the payload; whatever the
//! sensor wrote to the UART is forwarded verbatim.

use std::fmt;

use crate::uptime::format_uptime;

/// A single timestamped line bound for the WebSocket session.
///
/// Built fresh each loop iteration when serial data is present, sent, and
/// discarded. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryLine {
    timestamp: String,
    payload: String,
}

impl TelemetryLine {
    /// Build a line from elapsed uptime and the raw serial payload.
    pub fn new(elapsed_ms: u64, payload: impl Into<String>) -> Self {
        Self {
            timestamp: format_uptime(elapsed_ms),
            payload: payload.into(),
        }
    }

    /// The `H:MM:SS` uptime prefix.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// The raw serial text, untouched.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Render the wire form: timestamp, one space, payload.
    pub fn encode(&self) -> String {
        format!("{} {}", self.timestamp, self.payload)
    }
}

impl fmt::Display for TelemetryLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.timestamp, self.payload)
    }
}
