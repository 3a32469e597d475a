//! WebSocket client session backed by `EspWebSocketClient`.
//!
//! The ESP-IDF client runs its own task and reports state through a
//! constructor callback. The callback translates transport events into
//! [`SessionEvent`]s over a channel; `service_tick` drains that channel and
//! dispatches to the registered handler, keeping event delivery on the main
//! loop's thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use anyhow::Result;
use esp_idf_svc::ws::client::{
    EspWebSocketClient, EspWebSocketClientConfig, WebSocketEventType,
};
use esp_idf_svc::ws::FrameType;
use log::{debug, info, warn};

use enviro_core::WsEndpoint;
use enviro_session::{BridgeError, EventHandler, Session, SessionEvent};

/// Handshake timeout for the underlying client.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A single persistent WebSocket session to the fixed endpoint.
///
/// Reconnection after a drop is handled by the ESP-IDF client's own
/// auto-reconnect; this wrapper reports the transitions and refuses sends
/// while the session is down.
pub struct EspWsSession {
    client: EspWebSocketClient<'static>,
    events_rx: mpsc::Receiver<SessionEvent>,
    connected: Arc<AtomicBool>,
    handler: Option<EventHandler>,
}

impl EspWsSession {
    /// Open the session. Establishment is asynchronous; progress arrives as
    /// [`SessionEvent`]s during `service_tick`.
    pub fn connect(endpoint: &WsEndpoint) -> Result<Self> {
        let url = endpoint.url();
        info!("Opening WebSocket session to {}", url);

        let (events_tx, events_rx) = mpsc::channel();
        let connected = Arc::new(AtomicBool::new(false));
        let flag = connected.clone();

        let config = EspWebSocketClientConfig::default();
        let client = EspWebSocketClient::new(&url, &config, CONNECT_TIMEOUT, move |event| {
            match event {
                Ok(event) => match event.event_type {
                    WebSocketEventType::Connected => {
                        flag.store(true, Ordering::SeqCst);
                        let _ = events_tx.send(SessionEvent::Connected);
                    }
                    WebSocketEventType::Disconnected | WebSocketEventType::Closed => {
                        flag.store(false, Ordering::SeqCst);
                        let _ = events_tx.send(SessionEvent::Disconnected);
                    }
                    WebSocketEventType::Text(text) => {
                        let _ = events_tx.send(SessionEvent::MessageReceived(text.to_string()));
                    }
                    _ => {}
                },
                Err(e) => warn!("WebSocket event error: {}", e),
            }
        })?;

        Ok(Self {
            client,
            events_rx,
            connected,
            handler: None,
        })
    }
}

impl Session for EspWsSession {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn send_text(&mut self, text: &str) -> Result<(), BridgeError> {
        if !self.is_connected() {
            return Err(BridgeError::NotConnected);
        }
        self.client
            .send(FrameType::Text(false), text.as_bytes())
            .map_err(|e| BridgeError::Transport(e.to_string()))
    }

    fn service_tick(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match &event {
                SessionEvent::Connected => info!("Connected to WebSocket server"),
                SessionEvent::Disconnected => warn!("Disconnected from WebSocket server"),
                SessionEvent::MessageReceived(text) => {
                    debug!("Received message from WebSocket server: {}", text)
                }
            }
            if let Some(handler) = self.handler.as_mut() {
                handler(event);
            }
        }
    }

    fn on_event(&mut self, handler: EventHandler) {
        self.handler = Some(handler);
    }
}
