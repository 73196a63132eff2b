//! Night light: LED follows ambient darkness. Shares nothing with the risk path.

use cane_traits::{AnalogInput, DigitalOutput};
use eyre::WrapErr;

use crate::config::LightCfg;
use crate::error::Result;
use crate::hw_error::hw;

/// What the light path observed and did this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightState {
    pub reading: u16,
    pub led_on: bool,
}

pub struct NightLight<A: AnalogInput, O: DigitalOutput> {
    sensor: A,
    led: O,
    cfg: LightCfg,
}

impl<A: AnalogInput, O: DigitalOutput> NightLight<A, O> {
    pub fn new(sensor: A, led: O, cfg: LightCfg) -> Self {
        Self { sensor, led, cfg }
    }

    #[inline]
    pub fn is_dark(&self, reading: u16) -> bool {
        reading < self.cfg.dark_below
    }

    /// Read the sensor and drive the LED.
    pub fn update(&mut self) -> Result<LightState> {
        let reading = self
            .sensor
            .read()
            .map_err(|e| eyre::Report::new(hw(e)))
            .wrap_err("reading light sensor")?;
        let led_on = self.is_dark(reading);
        let written = if led_on {
            self.led.set_high()
        } else {
            self.led.set_low()
        };
        written
            .map_err(|e| eyre::Report::new(hw(e)))
            .wrap_err("driving led")?;
        Ok(LightState { reading, led_on })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cane_hardware::{SimLightSensor, SimOutput};

    #[test]
    fn threshold_is_strict() {
        let led = SimOutput::new();
        let mut nl = NightLight::new(
            SimLightSensor::new([1499, 1500, 0, 4095]),
            led.clone(),
            LightCfg::default(),
        );
        let on: Vec<bool> = (0..4).map(|_| nl.update().unwrap().led_on).collect();
        assert_eq!(on, vec![true, false, true, false]);
        assert!(!led.is_high());
    }
}
