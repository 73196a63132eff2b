//! Raspberry Pi backend: GPIO trigger/echo/LED, software-PWM buzzer, and an
//! MCP3208 12-bit ADC on SPI for the light sensor.
use std::time::Duration;

use cane_traits::{AnalogInput, DigitalOutput, HwResult, Level, MonotonicClock, PulseInput, ToneOutput};
use rppal::gpio::{Gpio, InputPin, OutputPin};
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use tracing::{debug, trace};

use crate::error::{HwError, Result};
use crate::util::pulse_width_with_timeout;

const MCP3208_CLOCK_HZ: u32 = 1_000_000;

fn gpio_err(e: rppal::gpio::Error) -> HwError {
    HwError::Gpio(e.to_string())
}

pub struct GpioOutput {
    pin: OutputPin,
}

impl GpioOutput {
    pub fn open(gpio: &Gpio, bcm: u8) -> Result<Self> {
        let mut pin = gpio.get(bcm).map_err(gpio_err)?.into_output();
        pin.set_low();
        Ok(Self { pin })
    }
}

impl DigitalOutput for GpioOutput {
    fn set_high(&mut self) -> HwResult<()> {
        self.pin.set_high();
        Ok(())
    }
    fn set_low(&mut self) -> HwResult<()> {
        self.pin.set_low();
        Ok(())
    }
}

pub struct GpioEcho {
    pin: InputPin,
    clock: MonotonicClock,
}

impl GpioEcho {
    pub fn open(gpio: &Gpio, bcm: u8) -> Result<Self> {
        let pin = gpio.get(bcm).map_err(gpio_err)?.into_input();
        Ok(Self {
            pin,
            clock: MonotonicClock::new(),
        })
    }
}

impl PulseInput for GpioEcho {
    fn pulse_width(&mut self, level: Level, timeout: Duration) -> HwResult<Option<Duration>> {
        let want_high = level == Level::High;
        let pin = &self.pin;
        match pulse_width_with_timeout(|| pin.is_high() == want_high, timeout, &self.clock) {
            Ok(width) => {
                trace!(width_us = width.as_micros() as u64, "echo pulse");
                Ok(Some(width))
            }
            Err(HwError::EchoTimeout) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }
}

/// Passive buzzer driven by rppal's software PWM.
pub struct PwmBuzzer {
    pin: OutputPin,
    frequency_hz: u32,
    duty: u16,
}

impl PwmBuzzer {
    pub fn open(gpio: &Gpio, bcm: u8, frequency_hz: u32) -> Result<Self> {
        let mut pin = gpio.get(bcm).map_err(gpio_err)?.into_output();
        pin.set_low();
        Ok(Self {
            pin,
            frequency_hz,
            duty: 0,
        })
    }

    fn apply(&mut self) -> Result<()> {
        if self.duty == 0 || self.frequency_hz == 0 {
            self.pin.clear_pwm().map_err(|e| HwError::Pwm(e.to_string()))?;
            self.pin.set_low();
            return Ok(());
        }
        let ratio = f64::from(self.duty) / f64::from(cane_traits::MAX_DUTY);
        self.pin
            .set_pwm_frequency(f64::from(self.frequency_hz), ratio)
            .map_err(|e| HwError::Pwm(e.to_string()))
    }
}

impl ToneOutput for PwmBuzzer {
    fn set_frequency(&mut self, hz: u32) -> HwResult<()> {
        self.frequency_hz = hz;
        self.apply()?;
        Ok(())
    }

    fn set_duty(&mut self, duty: u16) -> HwResult<()> {
        self.duty = duty.min(cane_traits::MAX_DUTY);
        self.apply()?;
        Ok(())
    }
}

/// One single-ended channel of an MCP3208 (0..=4095).
pub struct Mcp3208 {
    spi: Spi,
    channel: u8,
}

impl Mcp3208 {
    pub fn open(bus: u8, chip_select: u8, channel: u8) -> Result<Self> {
        if channel > 7 {
            return Err(HwError::Spi(format!("mcp3208 channel {channel} out of range 0..=7")));
        }
        let bus = match bus {
            0 => Bus::Spi0,
            1 => Bus::Spi1,
            other => return Err(HwError::Spi(format!("unsupported spi bus {other}"))),
        };
        let ss = match chip_select {
            0 => SlaveSelect::Ss0,
            1 => SlaveSelect::Ss1,
            2 => SlaveSelect::Ss2,
            other => return Err(HwError::Spi(format!("unsupported chip select {other}"))),
        };
        let spi = Spi::new(bus, ss, MCP3208_CLOCK_HZ, Mode::Mode0)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        debug!(channel, "mcp3208 opened");
        Ok(Self { spi, channel })
    }
}

impl AnalogInput for Mcp3208 {
    fn read(&mut self) -> HwResult<u16> {
        // start bit, single-ended, channel D2..D0
        let tx = [0x06 | (self.channel >> 2), (self.channel & 0x03) << 6, 0x00];
        let mut rx = [0u8; 3];
        self.spi
            .transfer(&mut rx, &tx)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        let raw = (u16::from(rx[1] & 0x0F) << 8) | u16::from(rx[2]);
        Ok(raw)
    }
}

/// Open every peripheral of a cane on the given BCM pins.
pub struct RpiRig {
    pub trigger: GpioOutput,
    pub echo: GpioEcho,
    pub buzzer: PwmBuzzer,
    pub light: Mcp3208,
    pub led: GpioOutput,
}

pub struct RpiPins {
    pub trigger: u8,
    pub echo: u8,
    pub buzzer: u8,
    pub led: u8,
    pub adc_bus: u8,
    pub adc_chip_select: u8,
    pub adc_channel: u8,
}

impl RpiRig {
    pub fn open(pins: &RpiPins) -> Result<Self> {
        let gpio = Gpio::new().map_err(gpio_err)?;
        Ok(Self {
            trigger: GpioOutput::open(&gpio, pins.trigger)?,
            echo: GpioEcho::open(&gpio, pins.echo)?,
            buzzer: PwmBuzzer::open(&gpio, pins.buzzer, 1000)?,
            light: Mcp3208::open(pins.adc_bus, pins.adc_chip_select, pins.adc_channel)?,
            led: GpioOutput::open(&gpio, pins.led)?,
        })
    }
}
