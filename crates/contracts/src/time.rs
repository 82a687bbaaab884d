//! Time helpers
//!
//! All timestamps are integer nanoseconds. Durations in configuration files are
//! written in seconds and converted once at load time.

/// Nanoseconds per second
pub const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Period used when a rate is missing or non-positive (10 Hz)
pub const DEFAULT_PERIOD_NS: i64 = 100_000_000;

/// Convert seconds to nanoseconds (truncating)
pub fn seconds_to_ns(seconds: f64) -> i64 {
    (seconds * NANOS_PER_SEC as f64) as i64
}

/// Convert nanoseconds to seconds
pub fn ns_to_seconds(ns: i64) -> f64 {
    ns as f64 / NANOS_PER_SEC as f64
}

/// Tick period for a rate, rounded to the nearest nanosecond
pub fn hz_to_period_ns(hz: f64) -> i64 {
    if hz <= 0.0 || !hz.is_finite() {
        return DEFAULT_PERIOD_NS;
    }
    (1e9 / hz).round() as i64
}

/// Serde adapter: seconds (f64) on the wire, nanoseconds (i64) in memory
pub mod secs_as_ns {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ns: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(super::ns_to_seconds(*ns))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let seconds = f64::deserialize(deserializer)?;
        Ok(super::seconds_to_ns(seconds))
    }
}
