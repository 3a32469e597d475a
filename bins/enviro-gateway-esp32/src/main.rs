//! EnviroSense gateway firmware for ESP32.
//!
//! Reads line-oriented sensor text from the secondary UART and forwards each
//! read, prefixed with an uptime timestamp, as a WebSocket text frame to the
//! fixed server endpoint. The primary UART carries diagnostic logs only.
//!
//! This binary requires the ESP32 Rust toolchain; it is excluded from the
//! default workspace build.

use anyhow::Result;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::peripherals::Peripherals;
use log::info;

use enviro_core::{GatewayConfig, RetryPolicy, SerialConfig, SystemUptime, WifiConfig, WsEndpoint};
use enviro_esp32::{uart::UartSource, wifi, ws::EspWsSession};
use enviro_session::{Relay, Session, SessionEvent};

// All parameters are compile-time constants; there is no CLI, config file, or
// environment lookup on the device.
const WIFI_SSID: &str = "";
const WIFI_PASSWORD: &str = "";
const WS_HOST: &str = "18.218.206.202";
const WS_PORT: u16 = 8888;
const WS_PATH: &str = "/websocket_esp32";
const SERIAL_BAUD: u32 = 9600;

fn main() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    let config = GatewayConfig {
        wifi: WifiConfig {
            ssid: WIFI_SSID.to_string(),
            password: WIFI_PASSWORD.to_string(),
        },
        endpoint: WsEndpoint {
            host: WS_HOST.to_string(),
            port: WS_PORT,
            path: WS_PATH.to_string(),
        },
        serial: SerialConfig {
            baud_rate: SERIAL_BAUD,
        },
        retry: RetryPolicy::default(),
    };
    config.validate()?;

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;

    // Must stay alive for the lifetime of the process.
    let _wifi = wifi::connect(&config.wifi, &config.retry, peripherals.modem, sysloop)?;

    // Sensor UART: TX on GPIO16, RX on GPIO17. 8N1 framing.
    let serial = UartSource::new(
        peripherals.uart2,
        peripherals.pins.gpio16,
        peripherals.pins.gpio17,
        &config.serial,
    )?;

    let mut session = EspWsSession::connect(&config.endpoint)?;
    session.on_event(Box::new(|event| {
        if let SessionEvent::MessageReceived(text) = event {
            info!("Server says: {}", text);
        }
    }));

    info!(
        "Gateway up: {} baud serial -> {}",
        config.serial.baud_rate,
        config.endpoint.url()
    );

    Relay::new(serial, session, SystemUptime::new()).run()
}
