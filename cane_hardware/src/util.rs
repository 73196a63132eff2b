use std::time::Duration;

use cane_traits::Clock;

use crate::error::{HwError, Result};

/// Time how long a line stays asserted, the way an echo pin is measured.
///
/// Waits for `is_asserted` to become true, then for it to become false again.
/// Each phase is bounded by `timeout`; exceeding either yields
/// [`HwError::EchoTimeout`]. Polls without sleeping, since the pulse width is
/// measured in microseconds.
pub fn pulse_width_with_timeout<C: Clock + ?Sized>(
    mut is_asserted: impl FnMut() -> bool,
    timeout: Duration,
    clock: &C,
) -> Result<Duration> {
    let armed = clock.now();
    while !is_asserted() {
        if clock.now().saturating_duration_since(armed) >= timeout {
            return Err(HwError::EchoTimeout);
        }
        std::hint::spin_loop();
    }

    let rise = clock.now();
    while is_asserted() {
        if clock.now().saturating_duration_since(rise) >= timeout {
            return Err(HwError::EchoTimeout);
        }
        std::hint::spin_loop();
    }
    Ok(clock.now().saturating_duration_since(rise))
}

/// Round-trip echo time for an obstacle `cm` away at the given speed of sound.
///
/// Inverse of the range conversion; used by the simulated echo line.
#[inline]
pub fn echo_time_for_distance(cm: f32, speed_of_sound_cm_per_us: f32) -> Duration {
    if !(cm.is_finite() && cm > 0.0) || speed_of_sound_cm_per_us <= 0.0 {
        return Duration::ZERO;
    }
    let us = (cm * 2.0 / speed_of_sound_cm_per_us).round();
    Duration::from_micros(us as u64)
}
