//! Integration tests for the tokio WebSocket client session.
//!
//! These tests start an in-process WebSocket server and drive a real client
//! through connect, forward, receive, and reconnect.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;

use enviro_core::RetryPolicy;
use enviro_session::{BridgeError, Session, SessionEvent, WsClient};

/// Retry policy tuned for tests: fast and finite.
fn test_retry() -> RetryPolicy {
    RetryPolicy {
        interval_ms: 50,
        max_attempts: Some(100),
    }
}

/// Bind an ephemeral port and return the listener with its address.
async fn bind_server() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

fn ws_url(addr: SocketAddr) -> String {
    format!("ws://{}/websocket_esp32", addr)
}

/// Poll the client until it reports connected, servicing events as we go.
async fn wait_connected(client: &mut WsClient) {
    timeout(Duration::from_secs(5), async {
        while !client.is_connected() {
            client.service_tick();
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("client did not connect in time");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn forwards_text_frames_to_the_server() {
    let (listener, addr) = bind_server().await;
    let (received_tx, mut received_rx) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        let (_tx, mut rx) = ws.split();
        while let Some(Ok(Message::Text(text))) = rx.next().await {
            let _ = received_tx.send(text);
        }
    });

    let mut client = WsClient::connect(ws_url(addr), test_retry()).unwrap();
    wait_connected(&mut client).await;

    client.send_text("0:2:5 TEMP:23.5").unwrap();

    let received = timeout(Duration::from_secs(5), received_rx.recv())
        .await
        .expect("timed out waiting for forwarded line")
        .expect("server task dropped");
    assert_eq!(received, "0:2:5 TEMP:23.5");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn server_messages_surface_as_events() {
    let (listener, addr) = bind_server().await;

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.send(Message::Text("ack".to_string())).await.unwrap();
        // Keep the connection open while the client drains events.
        tokio::time::sleep(Duration::from_secs(10)).await;
    });

    let mut client = WsClient::connect(ws_url(addr), test_retry()).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    client.on_event(Box::new(move |event| sink.lock().unwrap().push(event)));

    timeout(Duration::from_secs(5), async {
        loop {
            client.service_tick();
            {
                let seen = seen.lock().unwrap();
                if seen.contains(&SessionEvent::MessageReceived("ack".to_string())) {
                    assert!(seen.contains(&SessionEvent::Connected));
                    break;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("never observed the server message");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn send_before_connect_fails_loudly() {
    // Bind and immediately drop so nothing is listening on the port.
    let (listener, addr) = bind_server().await;
    drop(listener);

    let mut client = WsClient::connect(ws_url(addr), test_retry()).unwrap();
    let err = client.send_text("0:0:1 TEMP:23.5").unwrap_err();
    assert!(matches!(err, BridgeError::NotConnected));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn bounded_retry_gives_up() {
    let (listener, addr) = bind_server().await;
    drop(listener);

    let retry = RetryPolicy {
        interval_ms: 10,
        max_attempts: Some(2),
    };
    let mut client = WsClient::connect(ws_url(addr), retry).unwrap();

    // Give the client task time to burn through both attempts.
    tokio::time::sleep(Duration::from_millis(500)).await;
    client.service_tick();

    assert!(!client.is_connected());
    assert!(matches!(
        client.send_text("0:0:1 TEMP:23.5").unwrap_err(),
        BridgeError::NotConnected
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn reconnects_after_a_dropped_session() {
    let (listener, addr) = bind_server().await;
    let (received_tx, mut received_rx) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        // First connection: complete the handshake, then drop it.
        let (stream, _) = listener.accept().await.unwrap();
        let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        drop(ws);

        // Second connection: collect forwarded lines.
        let (stream, _) = listener.accept().await.unwrap();
        let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        let (_tx, mut rx) = ws.split();
        while let Some(Ok(Message::Text(text))) = rx.next().await {
            let _ = received_tx.send(text);
        }
    });

    let mut client = WsClient::connect(ws_url(addr), test_retry()).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    client.on_event(Box::new(move |event| sink.lock().unwrap().push(event)));

    // Wait for the full drop/reconnect cycle: Connected, Disconnected,
    // Connected again.
    timeout(Duration::from_secs(10), async {
        loop {
            client.service_tick();
            {
                let seen = seen.lock().unwrap();
                let connects = seen
                    .iter()
                    .filter(|e| **e == SessionEvent::Connected)
                    .count();
                let disconnects = seen
                    .iter()
                    .filter(|e| **e == SessionEvent::Disconnected)
                    .count();
                if connects >= 2 && disconnects >= 1 {
                    break;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("client never re-established the session");

    client.send_text("0:0:5 TEMP:24.0").unwrap();
    let received = timeout(Duration::from_secs(5), received_rx.recv())
        .await
        .expect("timed out waiting for line after reconnect")
        .expect("server task dropped");
    assert_eq!(received, "0:0:5 TEMP:24.0");
}
