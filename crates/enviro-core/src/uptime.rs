//! Uptime clock and timestamp formatting.
//!
//! Timestamps are derived from milliseconds elapsed since process start, not
//! wall-clock time. The gateway has no RTC and no NTP; uptime is the only
//! monotonic reference available on the device.

use std::time::Instant;

/// Format an elapsed-milliseconds value as `H:MM:SS`.
///
/// Fields are not zero-padded. The hours field grows without bound: there is
/// no wrap at 24, so a device up for five days reports `120:0:0`-style
/// timestamps. Receivers treat the value as a relative offset, not a time of
/// day.
pub fn format_uptime(elapsed_ms: u64) -> String {
    let seconds = elapsed_ms / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;

    format!("{}:{}:{}", hours, minutes % 60, seconds % 60)
}

/// Source of elapsed time for timestamping outbound lines.
///
/// Abstracted so tests can inject a fixed value and the relay loop stays
/// deterministic.
pub trait UptimeClock {
    /// Milliseconds elapsed since the clock was created.
    fn elapsed_ms(&self) -> u64;
}

/// Uptime clock backed by [`Instant`].
///
/// Construct once at startup so `elapsed_ms` measures time since boot.
#[derive(Debug, Clone)]
pub struct SystemUptime {
    started: Instant,
}

impl SystemUptime {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for SystemUptime {
    fn default() -> Self {
        Self::new()
    }
}

impl UptimeClock for SystemUptime {
    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn formats_one_hour_one_minute_one_second() {
        assert_eq!(format_uptime(3_661_000), "1:1:1");
    }

    #[test]
    fn formats_just_under_a_minute() {
        assert_eq!(format_uptime(59_000), "0:0:59");
    }

    #[test]
    fn formats_zero() {
        assert_eq!(format_uptime(0), "0:0:0");
    }

    #[test]
    fn sub_second_remainder_is_truncated() {
        assert_eq!(format_uptime(999), "0:0:0");
        assert_eq!(format_uptime(1_001), "0:0:1");
    }

    #[test]
    fn minutes_and_seconds_stay_within_modulus() {
        for ms in [0u64, 59_999, 60_000, 3_599_000, 3_600_000, 86_400_000] {
            let formatted = format_uptime(ms);
            let parts: Vec<u64> = formatted.split(':').map(|p| p.parse().unwrap()).collect();
            assert_eq!(parts.len(), 3);
            assert_eq!(parts[0], ms / 3_600_000);
            assert!(parts[1] < 60, "minutes out of range in {}", formatted);
            assert!(parts[2] < 60, "seconds out of range in {}", formatted);
        }
    }

    #[test]
    fn hours_do_not_wrap_at_twenty_four() {
        // 5 days of uptime
        assert_eq!(format_uptime(5 * 24 * 3_600_000), "120:0:0");
    }

    #[test]
    fn formatting_is_pure() {
        assert_eq!(format_uptime(125_000), format_uptime(125_000));
    }

    #[test]
    fn system_uptime_is_monotonic() {
        let clock = SystemUptime::new();
        let first = clock.elapsed_ms();
        let second = clock.elapsed_ms();
        assert!(second >= first);
    }
}
