//! Gateway configuration.
//!
//! All parameters are fixed at startup: the firmware bakes them in as
//! compile-time constants and the host binary sets them in `main`. The structs
//! exist so the session manager and relay take explicit configuration instead
//! of reading module-level globals, and so tests can inject bounded retry
//! policies.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by [`GatewayConfig::validate`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("WiFi SSID cannot be empty")]
    EmptySsid,

    #[error("WebSocket host cannot be empty")]
    EmptyHost,

    #[error("WebSocket port cannot be zero")]
    ZeroPort,

    #[error("WebSocket path must start with '/': {0:?}")]
    BadPath(String),
}

/// WiFi station credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WifiConfig {
    /// Network SSID.
    pub ssid: String,

    /// Network password; empty selects an open network.
    pub password: String,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            ssid: String::new(),
            password: String::new(),
        }
    }
}

/// The fixed WebSocket endpoint the gateway forwards to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsEndpoint {
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl WsEndpoint {
    /// The `ws://` URL for this endpoint. No TLS.
    pub fn url(&self) -> String {
        format!("ws://{}:{}{}", self.host, self.port, self.path)
    }
}

impl Default for WsEndpoint {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 8888,
            path: "/websocket_esp32".to_string(),
        }
    }
}

/// Secondary UART settings. Framing is fixed 8N1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SerialConfig {
    pub baud_rate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self { baud_rate: 9600 }
    }
}

/// Fixed-interval retry policy for WiFi association and session reconnect.
///
/// The firmware default is unbounded: the device has no other duties, so it
/// retries forever at one-second intervals. Tests inject `max_attempts` to
/// keep failure scenarios finite.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Delay between attempts, in milliseconds.
    pub interval_ms: u64,

    /// Maximum number of failed attempts before giving up; `None` retries
    /// forever.
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// Whether `failed_attempts` failures exhaust this policy.
    pub fn exhausted(&self, failed_attempts: u32) -> bool {
        match self.max_attempts {
            Some(max) => failed_attempts >= max,
            None => false,
        }
    }

    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.interval_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            max_attempts: None,
        }
    }
}

/// Complete gateway configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub wifi: WifiConfig,
    pub endpoint: WsEndpoint,
    pub serial: SerialConfig,
    pub retry: RetryPolicy,
}

impl GatewayConfig {
    /// Reject configurations that can never connect.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wifi.ssid.is_empty() {
            return Err(ConfigError::EmptySsid);
        }
        if self.endpoint.host.is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.endpoint.port == 0 {
            return Err(ConfigError::ZeroPort);
        }
        if !self.endpoint.path.starts_with('/') {
            return Err(ConfigError::BadPath(self.endpoint.path.clone()));
        }
        Ok(())
    }
}
