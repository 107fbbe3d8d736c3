//! Clock and timestamp formatting
//!
//! Entry timestamps are `f64` seconds since the Unix epoch with microsecond
//! resolution. [`Clock`] produces them; [`TimestampFormat`] renders them for
//! the console sink.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::sync::atomic::{AtomicI64, Ordering};

/// Wall-clock source for entry timestamps
///
/// Readings from one clock never go backwards: if the system clock is stepped
/// back, the last returned value is repeated until wall time catches up.
#[derive(Debug, Default)]
pub struct Clock {
    last_micros: AtomicI64,
}

impl Clock {
    pub const fn new() -> Self {
        Self {
            last_micros: AtomicI64::new(0),
        }
    }

    /// Current time as seconds since epoch
    pub fn now(&self) -> f64 {
        micros_to_seconds(self.now_micros())
    }

    /// Current time as whole microseconds since epoch
    pub fn now_micros(&self) -> i64 {
        let wall = Utc::now().timestamp_micros();
        let previous = self.last_micros.fetch_max(wall, Ordering::AcqRel);
        previous.max(wall)
    }
}

#[inline]
pub fn micros_to_seconds(micros: i64) -> f64 {
    micros as f64 / 1e6
}

/// Convert an entry timestamp back to a `DateTime`
pub fn seconds_to_datetime(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    DateTime::from_timestamp_micros((seconds * 1e6).round() as i64)
}

/// Timestamp rendering options for text output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,

    /// ISO 8601 with microseconds: `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// Raw seconds since epoch: `1736332245.123456`
    Epoch,

    /// Custom strftime format
    Custom(String),
}

impl TimestampFormat {
    /// Format an entry timestamp (seconds since epoch)
    #[must_use]
    pub fn format(&self, seconds: f64) -> String {
        let datetime = match (self, seconds_to_datetime(seconds)) {
            (TimestampFormat::Epoch, _) | (_, None) => return format!("{:.6}", seconds),
            (_, Some(datetime)) => datetime,
        };

        match self {
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimestampFormat::Iso8601Micros => datetime.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            TimestampFormat::Custom(format_str) => {
                // Invalid specifiers surface as a fmt error instead of a panic
                let mut out = String::new();
                match write!(out, "{}", datetime.format(format_str)) {
                    Ok(()) => out,
                    Err(_) => datetime.to_rfc3339(),
                }
            }
            TimestampFormat::Epoch => format!("{:.6}", seconds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2025-01-08 10:30:45.123456 UTC
    const FIXED: f64 = 1_736_332_245.123_456;

    #[test]
    fn test_clock_is_non_decreasing() {
        let clock = Clock::new();
        let mut previous = clock.now();
        for _ in 0..1000 {
            let current = clock.now();
            assert!(current >= previous, "{} < {}", current, previous);
            previous = current;
        }
    }

    #[test]
    fn test_clock_near_wall_time() {
        let clock = Clock::new();
        let wall = Utc::now().timestamp() as f64;
        assert!((clock.now() - wall).abs() < 5.0);
    }

    #[test]
    fn test_clock_holds_after_backwards_step() {
        let clock = Clock::new();
        let future = Utc::now().timestamp_micros() + 60_000_000;
        clock.last_micros.store(future, Ordering::Release);
        assert_eq!(clock.now_micros(), future);
    }

    #[test]
    fn test_iso8601_format() {
        assert_eq!(TimestampFormat::Iso8601.format(FIXED), "2025-01-08T10:30:45.123Z");
    }

    #[test]
    fn test_iso8601_micros_format() {
        assert_eq!(
            TimestampFormat::Iso8601Micros.format(FIXED),
            "2025-01-08T10:30:45.123456Z"
        );
    }

    #[test]
    fn test_epoch_format() {
        assert_eq!(TimestampFormat::Epoch.format(FIXED), "1736332245.123456");
    }

    #[test]
    fn test_custom_format() {
        let format = TimestampFormat::Custom("%Y/%m/%d %H:%M".to_string());
        assert_eq!(format.format(FIXED), "2025/01/08 10:30");
    }

    #[test]
    fn test_invalid_custom_format_does_not_panic() {
        let format = TimestampFormat::Custom("%Q".to_string());
        assert!(format.format(FIXED).starts_with("2025-01-08T10:30:45"));
    }

    #[test]
    fn test_non_finite_falls_back_to_raw() {
        assert_eq!(TimestampFormat::Iso8601.format(f64::NAN), "NaN");
    }
}
