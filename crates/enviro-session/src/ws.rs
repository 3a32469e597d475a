//! Tokio WebSocket client session.
//!
//! [`WsClient`] presents the blocking [`Session`] interface the relay loop
//! expects while a background thread runs a current-thread tokio runtime that
//! owns the actual connection. Outbound lines cross a bounded channel into the
//! client task; transport events cross back and are dispatched by
//! `service_tick`.
//!
//! Reconnect policy: on connect failure or disconnect the task retries at the
//! configured fixed interval, forever unless the policy carries a bound.
//! Consecutive-failure count resets on every successful connection.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc as std_mpsc, Arc};

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, info, warn};

use enviro_core::RetryPolicy;

use crate::error::BridgeError;
use crate::event::SessionEvent;
use crate::session::{EventHandler, Session};

/// Depth of the outbound text-frame queue. A full queue means the transport
/// is not draining; callers see [`BridgeError::QueueFull`].
const OUTBOUND_QUEUE_DEPTH: usize = 32;

/// WebSocket client session backed by tokio-tungstenite.
pub struct WsClient {
    outbound_tx: mpsc::Sender<String>,
    events_rx: std_mpsc::Receiver<SessionEvent>,
    connected: Arc<AtomicBool>,
    handler: Option<EventHandler>,
}

impl WsClient {
    /// Start the client task for `url`.
    ///
    /// Returns immediately; connection establishment is asynchronous and
    /// reported through [`SessionEvent::Connected`]. `send_text` fails with
    /// `NotConnected` until then.
    pub fn connect(url: impl Into<String>, retry: RetryPolicy) -> Result<Self, BridgeError> {
        let url = url.into();
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_QUEUE_DEPTH);
        let (events_tx, events_rx) = std_mpsc::channel();
        let connected = Arc::new(AtomicBool::new(false));

        let flag = connected.clone();
        std::thread::Builder::new()
            .name("enviro-ws".to_string())
            .spawn(move || {
                let rt = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        warn!("failed to start client runtime: {}", e);
                        return;
                    }
                };
                rt.block_on(client_task(url, retry, outbound_rx, events_tx, flag));
            })
            .map_err(|e| BridgeError::Transport(format!("failed to spawn client thread: {}", e)))?;

        Ok(Self {
            outbound_tx,
            events_rx,
            connected,
            handler: None,
        })
    }

    #[cfg(test)]
    fn test_pair() -> (Self, std_mpsc::Sender<SessionEvent>, mpsc::Receiver<String>) {
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_QUEUE_DEPTH);
        let (events_tx, events_rx) = std_mpsc::channel();
        let client = Self {
            outbound_tx,
            events_rx,
            connected: Arc::new(AtomicBool::new(false)),
            handler: None,
        };
        (client, events_tx, outbound_rx)
    }
}

impl Session for WsClient {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn send_text(&mut self, text: &str) -> Result<(), BridgeError> {
        if !self.is_connected() {
            return Err(BridgeError::NotConnected);
        }
        self.outbound_tx
            .try_send(text.to_string())
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => BridgeError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => {
                    BridgeError::Transport("client task stopped".to_string())
                }
            })
    }

    fn service_tick(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match &event {
                SessionEvent::Connected => info!("WebSocket session established"),
                SessionEvent::Disconnected => warn!("WebSocket session lost"),
                SessionEvent::MessageReceived(text) => debug!("server message: {}", text),
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

/// Connection supervisor: connect, run the session, reconnect per policy.
async fn client_task(
    url: String,
    retry: RetryPolicy,
    mut outbound_rx: mpsc::Receiver<String>,
    events_tx: std_mpsc::Sender<SessionEvent>,
    connected: Arc<AtomicBool>,
) {
    let mut failed_attempts = 0u32;
    loop {
        match tokio_tungstenite::connect_async(url.as_str()).await {
            Ok((stream, _response)) => {
                failed_attempts = 0;
                connected.store(true, Ordering::SeqCst);
                if events_tx.send(SessionEvent::Connected).is_err() {
                    // Session handle dropped; nobody is listening.
                    return;
                }

                let keep_running = run_session(stream, &mut outbound_rx, &events_tx).await;

                connected.store(false, Ordering::SeqCst);
                let _ = events_tx.send(SessionEvent::Disconnected);
                if !keep_running {
                    return;
                }
            }
            Err(e) => {
                failed_attempts += 1;
                debug!("connect to {} failed (attempt {}): {}", url, failed_attempts, e);
                if retry.exhausted(failed_attempts) {
                    warn!(
                        "giving up on {} after {} failed connection attempts",
                        url, failed_attempts
                    );
                    return;
                }
            }
        }

        tokio::time::sleep(retry.interval()).await;
    }
}

/// Drive one established session until it drops.
///
/// Returns `false` when the owning [`WsClient`] has gone away and the task
/// should stop instead of reconnecting.
async fn run_session<S>(
    stream: WebSocketStream<S>,
    outbound_rx: &mut mpsc::Receiver<String>,
    events_tx: &std_mpsc::Sender<SessionEvent>,
) -> bool
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut ws_tx, mut ws_rx) = stream.split();

    loop {
        tokio::select! {
            out = outbound_rx.recv() => match out {
                Some(text) => {
                    if let Err(e) = ws_tx.send(Message::Text(text)).await {
                        warn!("failed to send text frame: {}", e);
                        return true;
                    }
                }
                None => return false,
            },
            msg = ws_rx.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    if events_tx.send(SessionEvent::MessageReceived(text)).is_err() {
                        return false;
                    }
                }
                Some(Ok(Message::Ping(data))) => {
                    let _ = ws_tx.send(Message::Pong(data)).await;
                }
                Some(Ok(Message::Close(_))) | None => return true,
                Some(Err(e)) => {
                    warn!("WebSocket error: {}", e);
                    return true;
                }
                _ => {}
            }
        }
    }
}
