//! The read-timestamp-forward loop.

use std::time::Duration;

use tracing::{debug, warn};

use enviro_core::{TelemetryLine, UptimeClock};

use crate::session::{SerialSource, Session};

/// The gateway's main loop: serial in, timestamped text frame out.
///
/// Single-threaded and cooperative. Each iteration checks the serial source,
/// forwards at most one line, and always services the session's event tick.
/// Send failures are logged and the line is dropped; the loop never stops for
/// them.
pub struct Relay<R, S, C> {
    serial: R,
    session: S,
    clock: C,
    idle_delay: Option<Duration>,
}

impl<R, S, C> Relay<R, S, C>
where
    R: SerialSource,
    S: Session,
    C: UptimeClock,
{
    pub fn new(serial: R, session: S, clock: C) -> Self {
        Self {
            serial,
            session,
            clock,
            idle_delay: None,
        }
    }

    /// Sleep between iterations. The firmware runs with none (loop rate bound
    /// only by the cost of the checks); host targets set a few milliseconds to
    /// avoid spinning a core.
    pub fn with_idle_delay(mut self, delay: Duration) -> Self {
        self.idle_delay = Some(delay);
        self
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    /// One loop iteration. Returns the encoded line that was forwarded, if
    /// any, so tests can observe the cycle.
    pub fn run_once(&mut self) -> Option<String> {
        let forwarded = if self.serial.has_data() {
            match self.serial.read_all() {
                Ok(raw) if raw.is_empty() => None,
                Ok(raw) => {
                    let line = TelemetryLine::new(self.clock.elapsed_ms(), raw);
                    let encoded = line.encode();
                    match self.session.send_text(&encoded) {
                        Ok(()) => {
                            debug!("forwarded: {}", encoded);
                            Some(encoded)
                        }
                        Err(e) => {
                            warn!("dropping line ({}): {}", e, encoded);
                            None
                        }
                    }
                }
                Err(e) => {
                    warn!("serial read failed: {}", e);
                    None
                }
            }
        } else {
            None
        };

        self.session.service_tick();
        forwarded
    }

    /// Run forever. The process ends only by external reset.
    pub fn run(mut self) -> ! {
        loop {
            self.run_once();
            if let Some(delay) = self.idle_delay {
                std::thread::sleep(delay);
            }
        }
    }
}
