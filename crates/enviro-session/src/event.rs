//! Session lifecycle events.

/// Events reported by a WebSocket session.
///
/// Delivered to the single registered handler during
/// [`Session::service_tick`](crate::Session::service_tick). Transitions are
/// driven by the transport, not polled by the relay loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session reached the server.
    Connected,
    /// The transport dropped the session.
    Disconnected,
    /// The server sent a text frame.
    MessageReceived(String),
}
