//! ESP32-specific components for the EnviroSense gateway.
//!
//! This crate provides the device-side implementations of the seams defined
//! in `enviro-session`:
//! - WiFi station association with fixed-interval retry
//! - Secondary-UART serial source
//! - `EspWebSocketClient`-backed session
//!
//! # Architecture
//!
//! The gateway binary (`enviro-gateway-esp32`) wires these together with the
//! platform-agnostic relay loop. Diagnostics go through `log`/`EspLogger` on
//! the primary UART; the data path uses the secondary UART only.
//!
//! # Example
//!
//! ```ignore
//! let _wifi = wifi::connect(&config.wifi, &config.retry, peripherals.modem, sysloop)?;
//! let serial = uart::UartSource::new(peripherals.uart2, tx_pin, rx_pin, &config.serial)?;
//! let session = ws::EspWsSession::connect(&config.endpoint)?;
//! Relay::new(serial, session, SystemUptime::new()).run()
//! ```

pub mod uart;
pub mod wifi;
pub mod ws;
