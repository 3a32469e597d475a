//! EnviroSense gateway bridge for Linux.
//!
//! Development stand-in for the ESP32 firmware: stdin plays the role of the
//! sensor UART, and each line typed (or piped) is forwarded to the WebSocket
//! endpoint with the same uptime-timestamp framing the device uses.

use std::sync::mpsc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use enviro_core::{RetryPolicy, SystemUptime, WsEndpoint};
use enviro_session::{BridgeError, Relay, SerialSource, Session, SessionEvent, WsClient};

// Fixed endpoint, mirroring the firmware's compile-time constants. Point this
// at a local server when developing against one.
const WS_HOST: &str = "127.0.0.1";
const WS_PORT: u16 = 8888;
const WS_PATH: &str = "/websocket_esp32";

/// Serial source backed by stdin.
///
/// A reader thread feeds lines into a channel; the relay side polls it
/// without blocking, matching the non-blocking UART contract.
struct StdinSource {
    rx: mpsc::Receiver<String>,
    pending: Option<String>,
}

impl StdinSource {
    fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            use std::io::BufRead;
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("stdin read failed: {}", e);
                        break;
                    }
                }
            }
        });
        Self { rx, pending: None }
    }
}

impl SerialSource for StdinSource {
    fn has_data(&mut self) -> bool {
        if self.pending.is_none() {
            self.pending = self.rx.try_recv().ok();
        }
        self.pending.is_some()
    }

    fn read_all(&mut self) -> Result<String, BridgeError> {
        if self.pending.is_none() {
            self.pending = self.rx.try_recv().ok();
        }
        Ok(self.pending.take().unwrap_or_default())
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,enviro_session=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let endpoint = WsEndpoint {
        host: WS_HOST.to_string(),
        port: WS_PORT,
        path: WS_PATH.to_string(),
    };

    tracing::info!("EnviroSense gateway bridge starting");
    tracing::info!("   Endpoint: {}", endpoint.url());
    tracing::info!("   Type lines on stdin to forward them");

    let mut session = WsClient::connect(endpoint.url(), RetryPolicy::default())?;
    session.on_event(Box::new(|event| {
        if let SessionEvent::MessageReceived(text) = event {
            tracing::info!("Server says: {}", text);
        }
    }));

    // A short idle delay keeps the loop from spinning a core; the firmware
    // runs with none.
    Relay::new(StdinSource::spawn(), session, SystemUptime::new())
        .with_idle_delay(Duration::from_millis(5))
        .run()
}
