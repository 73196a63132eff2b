//! Failing peripherals for exercising fault paths.

use cane_traits::{AnalogInput, DigitalOutput, HwResult, ToneOutput};
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, AtomicU32, Ordering};

/// Buzzer whose non-zero duty writes fail after `ok_writes` successes.
/// Silencing (duty 0) always succeeds and is recorded.
#[derive(Debug, Clone, Default)]
pub struct FlakyBuzzer {
    ok_writes: u32,
    writes: Arc<AtomicU32>,
    duty: Arc<AtomicU16>,
}

impl FlakyBuzzer {
    pub fn failing_after(ok_writes: u32) -> Self {
        Self {
            ok_writes,
            ..Self::default()
        }
    }

    pub fn duty(&self) -> u16 {
        self.duty.load(Ordering::Relaxed)
    }
}

impl ToneOutput for FlakyBuzzer {
    fn set_frequency(&mut self, _hz: u32) -> HwResult<()> {
        if self.writes.fetch_add(1, Ordering::Relaxed) >= self.ok_writes {
            return Err(Box::new(std::io::Error::other("buzzer frequency write failed")));
        }
        Ok(())
    }

    fn set_duty(&mut self, duty: u16) -> HwResult<()> {
        if duty > 0 && self.writes.fetch_add(1, Ordering::Relaxed) >= self.ok_writes {
            return Err(Box::new(std::io::Error::other("buzzer duty write failed")));
        }
        self.duty.store(duty, Ordering::Relaxed);
        Ok(())
    }
}

/// Light sensor that always errors.
pub struct DeadLightSensor;

impl AnalogInput for DeadLightSensor {
    fn read(&mut self) -> HwResult<u16> {
        Err(Box::new(std::io::Error::other("adc not responding")))
    }
}

/// Output that discards writes.
pub struct NoopOutput;

impl DigitalOutput for NoopOutput {
    fn set_high(&mut self) -> HwResult<()> {
        Ok(())
    }
    fn set_low(&mut self) -> HwResult<()> {
        Ok(())
    }
}
