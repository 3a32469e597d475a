//! The two seams the relay loop is written against.

use crate::error::BridgeError;
use crate::event::SessionEvent;

/// Handler invoked for each [`SessionEvent`] during `service_tick`.
pub type EventHandler = Box<dyn FnMut(SessionEvent) + Send>;

/// Non-blocking view of the sensor serial interface.
pub trait SerialSource {
    /// Whether the receive buffer currently holds bytes. Never blocks.
    fn has_data(&mut self) -> bool;

    /// Drain currently buffered bytes into a string. Blocks only as long as
    /// the driver needs to service bytes already received; never waits for
    /// more to arrive. An empty buffer yields an empty string.
    fn read_all(&mut self) -> Result<String, BridgeError>;
}

/// A single outbound WebSocket session.
pub trait Session {
    /// Current transport state, as last reported by the transport's events.
    fn is_connected(&self) -> bool;

    /// Transmit a text frame on the session.
    ///
    /// Fails loudly with [`BridgeError::NotConnected`] while the session is
    /// down; lines are never queued across a disconnect.
    fn send_text(&mut self, text: &str) -> Result<(), BridgeError>;

    /// Drive the session: drain pending transport events and dispatch each to
    /// the registered handler. Must run once per relay iteration; starving it
    /// stalls event delivery.
    fn service_tick(&mut self);

    /// Register the event handler. There is exactly one; registering again
    /// replaces the prior handler.
    fn on_event(&mut self, handler: EventHandler);
}
