//! Common time helpers for cane_core.

/// Number of milliseconds in one second.
pub const MILLIS_PER_SEC: u64 = 1_000;

/// Milliseconds as fractional seconds.
#[inline]
pub fn ms_to_secs(ms: u64) -> f32 {
    ms as f32 / MILLIS_PER_SEC as f32
}

/// Fractional microseconds in a duration, without truncating sub-µs parts.
#[inline]
pub fn duration_us_f64(d: std::time::Duration) -> f64 {
    d.as_nanos() as f64 / 1_000.0
}
