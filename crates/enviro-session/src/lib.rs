//! # enviro-session
//!
//! Session management and the serial-to-WebSocket relay loop.
//!
//! The relay is written against two seams:
//! - [`SerialSource`] - a non-blocking view of the sensor UART
//! - [`Session`] - an outbound WebSocket session with event delivery
//!
//! Platform implementations plug in at those seams:
//! - `tokio-runtime` (default) - [`ws::WsClient`] for Linux/desktop
//! - ESP32 - `enviro-esp32` provides UART and `EspWebSocketClient` backends

pub mod error;
pub mod event;
pub mod relay;
pub mod session;

#[cfg(feature = "tokio-runtime")]
pub mod ws;

pub use enviro_core::RetryPolicy;
pub use error::BridgeError;
pub use event::SessionEvent;
pub use relay::Relay;
pub use session::{EventHandler, SerialSource, Session};

#[cfg(feature = "tokio-runtime")]
pub use ws::WsClient;
