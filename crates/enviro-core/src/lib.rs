//! # enviro-core
//!
//! Core types for the EnviroSense gateway.
//!
//! This crate provides:
//! - Uptime clock and `H:MM:SS` timestamp formatting
//! - Outbound telemetry line construction
//! - Configuration structs (WiFi, endpoint, serial, retry policy)
//!
//! This crate is intentionally runtime-agnostic and contains no I/O or async
//! code, making it usable on both Linux (tokio) and ESP32 (esp-idf) targets.

pub mod config;
pub mod message;
pub mod uptime;

pub use config::{ConfigError, GatewayConfig, RetryPolicy, SerialConfig, WifiConfig, WsEndpoint};
pub use message::TelemetryLine;
pub use uptime::{format_uptime, SystemUptime, UptimeClock};
