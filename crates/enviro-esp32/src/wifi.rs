//! WiFi station association for ESP32.
//!
//! Association is the one place the gateway blocks: it retries at the
//! policy's fixed interval until the network comes up (unbounded by default,
//! since the device has nothing else to do before it is online).

use anyhow::{bail, Result};
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::peripheral,
    wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi},
};
use log::{info, warn};

use enviro_core::{RetryPolicy, WifiConfig};

/// Associate with the configured network and wait for a DHCP lease.
///
/// The full process:
/// 1. Scans for the target network to learn its channel
/// 2. Configures station mode with the provided credentials
/// 3. Connects, retrying at the policy's fixed interval
/// 4. Waits for the DHCP lease
///
/// Returns a boxed `EspWifi` instance that must be kept alive for the
/// connection to remain active. Fails only when the retry policy carries a
/// bound and it is exhausted.
pub fn connect(
    config: &WifiConfig,
    retry: &RetryPolicy,
    modem: impl peripheral::Peripheral<P = esp_idf_svc::hal::modem::Modem> + 'static,
    sysloop: EspSystemEventLoop,
) -> Result<Box<EspWifi<'static>>> {
    if config.ssid.is_empty() {
        bail!("WiFi SSID cannot be empty");
    }

    let auth_method = if config.password.is_empty() {
        info!("WiFi password is empty, using open network");
        AuthMethod::None
    } else {
        AuthMethod::WPA2Personal
    };

    let mut esp_wifi = EspWifi::new(modem, sysloop.clone(), None)?;
    let mut wifi = BlockingWifi::wrap(&mut esp_wifi, sysloop)?;

    // Initial configuration for scanning
    wifi.set_configuration(&Configuration::Client(ClientConfiguration::default()))?;
    wifi.start()?;

    info!("Scanning for WiFi networks...");
    let ap_infos = wifi.scan()?;

    let channel = ap_infos
        .into_iter()
        .find(|ap| ap.ssid == config.ssid.as_str())
        .map(|ap| {
            info!("Found '{}' on channel {}", config.ssid, ap.channel);
            ap.channel
        });

    if channel.is_none() {
        info!("Network '{}' not found in scan, will try anyway", config.ssid);
    }

    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: config
            .ssid
            .as_str()
            .try_into()
            .expect("SSID too long (max 32 chars)"),
        password: config
            .password
            .as_str()
            .try_into()
            .expect("Password too long (max 64 chars)"),
        channel,
        auth_method,
        ..Default::default()
    }))?;

    let mut failed_attempts = 0u32;
    loop {
        info!("Connecting to '{}'...", config.ssid);
        match wifi.connect().and_then(|_| wifi.wait_netif_up()) {
            Ok(()) => break,
            Err(e) => {
                failed_attempts += 1;
                if retry.exhausted(failed_attempts) {
                    bail!(
                        "WiFi association failed after {} attempts: {}",
                        failed_attempts,
                        e
                    );
                }
                warn!("WiFi association attempt {} failed: {}", failed_attempts, e);
                std::thread::sleep(retry.interval());
            }
        }
    }

    let ip_info = wifi.wifi().sta_netif().get_ip_info()?;
    info!("WiFi connected!");
    info!("  IP address: {}", ip_info.ip);
    info!("  Gateway:    {}", ip_info.subnet.gateway);
    info!("  Netmask:    {}", ip_info.subnet.mask);

    Ok(Box::new(esp_wifi))
}
