//! Secondary-UART serial source.
//!
//! The sensor writes line-oriented text at a fixed baud rate, 8N1. Reads are
//! non-blocking: each call drains whatever the driver has buffered and
//! nothing more.

use esp_idf_svc::hal::{
    delay::NON_BLOCK,
    gpio::{AnyIOPin, InputPin, OutputPin},
    peripheral::Peripheral,
    uart::{config::Config, Uart, UartDriver},
    units::Hertz,
};
use esp_idf_svc::sys::EspError;
use log::warn;

use enviro_core::SerialConfig;
use enviro_session::{BridgeError, SerialSource};

/// Serial source backed by an ESP32 hardware UART.
pub struct UartSource {
    uart: UartDriver<'static>,
    pending: Vec<u8>,
}

impl UartSource {
    /// Open a UART with 8N1 framing at the configured baud rate.
    ///
    /// Flow control is unused; CTS/RTS stay unassigned.
    pub fn new(
        uart: impl Peripheral<P = impl Uart> + 'static,
        tx: impl Peripheral<P = impl OutputPin> + 'static,
        rx: impl Peripheral<P = impl InputPin> + 'static,
        config: &SerialConfig,
    ) -> Result<Self, EspError> {
        let uart_config = Config::new().baudrate(Hertz(config.baud_rate));
        let driver = UartDriver::new(
            uart,
            tx,
            rx,
            Option::<AnyIOPin>::None,
            Option::<AnyIOPin>::None,
            &uart_config,
        )?;

        Ok(Self {
            uart: driver,
            pending: Vec::new(),
        })
    }

    /// Pull everything the driver currently holds into `pending`.
    fn fill_pending(&mut self) {
        let mut buf = [0u8; 256];
        loop {
            match self.uart.read(&mut buf, NON_BLOCK) {
                Ok(0) => break,
                Ok(n) => self.pending.extend_from_slice(&buf[..n]),
                Err(e) => {
                    warn!("UART read error: {}", e);
                    break;
                }
            }
        }
    }
}

impl SerialSource for UartSource {
    fn has_data(&mut self) -> bool {
        self.fill_pending();
        !self.pending.is_empty()
    }

    fn read_all(&mut self) -> Result<String, BridgeError> {
        self.fill_pending();
        let bytes = std::mem::take(&mut self.pending);
        // Sensor output is expected to be ASCII; anything else is forwarded
        // lossily rather than dropped.
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
