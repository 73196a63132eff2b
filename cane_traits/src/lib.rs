//! Peripheral capabilities consumed by the cane control loop.
//!
//! Every method reports faults as a boxed error so that simulated and real
//! backends can use their own error types; `cane_core` maps them to typed
//! errors at the boundary.
pub mod clock;

pub use clock::{Clock, MonotonicClock};

use std::time::Duration;

/// Boxed error returned across the peripheral trait boundary.
pub type HwResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Full-scale duty value for [`ToneOutput::set_duty`] (10-bit PWM).
pub const MAX_DUTY: u16 = 1023;

/// Full-scale reading of an [`AnalogInput`] (12-bit ADC, 0..=3.3 V).
pub const MAX_ANALOG: u16 = 4095;

/// Logic level of a digital line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

/// Push-pull digital output (trigger line, LED).
pub trait DigitalOutput {
    fn set_high(&mut self) -> HwResult<()>;
    fn set_low(&mut self) -> HwResult<()>;

    fn set_level(&mut self, level: Level) -> HwResult<()> {
        match level {
            Level::High => self.set_high(),
            Level::Low => self.set_low(),
        }
    }
}

/// Digital input able to time a pulse (echo line).
pub trait PulseInput {
    /// Wait for the line to reach `level`, then return how long it stays there.
    ///
    /// Returns `Ok(None)` when either phase exceeds `timeout`.
    fn pulse_width(&mut self, level: Level, timeout: Duration) -> HwResult<Option<Duration>>;
}

/// Tone generator with settable frequency and duty (buzzer).
pub trait ToneOutput {
    fn set_frequency(&mut self, hz: u32) -> HwResult<()>;
    /// Duty on the `0..=MAX_DUTY` scale; 0 silences the output.
    fn set_duty(&mut self, duty: u16) -> HwResult<()>;
}

/// Single-channel analog input (light sensor).
pub trait AnalogInput {
    /// Raw reading in `0..=MAX_ANALOG`.
    fn read(&mut self) -> HwResult<u16>;
}

impl<T: DigitalOutput + ?Sized> DigitalOutput for Box<T> {
    fn set_high(&mut self) -> HwResult<()> {
        (**self).set_high()
    }
    fn set_low(&mut self) -> HwResult<()> {
        (**self).set_low()
    }
}

impl<T: PulseInput + ?Sized> PulseInput for Box<T> {
    fn pulse_width(&mut self, level: Level, timeout: Duration) -> HwResult<Option<Duration>> {
        (**self).pulse_width(level, timeout)
    }
}

impl<T: ToneOutput + ?Sized> ToneOutput for Box<T> {
    fn set_frequency(&mut self, hz: u32) -> HwResult<()> {
        (**self).set_frequency(hz)
    }
    fn set_duty(&mut self, duty: u16) -> HwResult<()> {
        (**self).set_duty(duty)
    }
}

impl<T: AnalogInput + ?Sized> AnalogInput for Box<T> {
    fn read(&mut self) -> HwResult<u16> {
        (**self).read()
    }
}
