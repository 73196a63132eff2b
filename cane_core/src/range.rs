//! Ultrasonic ranging: trigger pulse, echo timing, time-of-flight conversion.
//!
//! `try_measure` reports faults as a named [`EchoFault`]; `measure` applies the
//! substitution policy and never fails. A missing echo reads as the sentinel
//! distance, which sits past the near threshold, so a dead sensor is quiet
//! rather than alarming.

use std::sync::Arc;

use cane_traits::{Clock, DigitalOutput, Level, PulseInput};
use thiserror::Error;

use crate::config::RangeCfg;
use crate::util::duration_us_f64;

/// Why a measurement produced no distance.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EchoFault {
    #[error("no echo within timeout")]
    NoEcho,
    #[error("pulse measurement fault: {0}")]
    Pulse(String),
}

impl EchoFault {
    fn pulse(e: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::Pulse(e.to_string())
    }
}

/// Where a sample's distance came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    Echo,
    /// Sentinel substituted for a fault.
    NoEcho,
}

/// One range reading in centimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceSample {
    pub cm: f32,
    pub kind: SampleKind,
}

impl DistanceSample {
    #[inline]
    pub fn is_echo(&self) -> bool {
        self.kind == SampleKind::Echo
    }
}

/// Convert an echo round-trip time to a one-way distance.
#[inline]
pub fn echo_to_cm(width: std::time::Duration, speed_of_sound_cm_per_us: f32) -> f32 {
    (duration_us_f64(width) * f64::from(speed_of_sound_cm_per_us) / 2.0) as f32
}

pub struct RangeSensor<T: DigitalOutput, E: PulseInput> {
    trigger: T,
    echo: E,
    cfg: RangeCfg,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl<T: DigitalOutput, E: PulseInput> RangeSensor<T, E> {
    pub fn new(trigger: T, echo: E, cfg: RangeCfg, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            trigger,
            echo,
            cfg,
            clock,
        }
    }

    pub fn cfg(&self) -> &RangeCfg {
        &self.cfg
    }

    /// Fire one ping and return the distance, or why there is none.
    pub fn try_measure(&mut self) -> Result<f32, EchoFault> {
        self.trigger.set_low().map_err(EchoFault::pulse)?;
        self.clock.delay_us(self.cfg.trigger_settle_us);
        self.trigger.set_high().map_err(EchoFault::pulse)?;
        self.clock.delay_us(self.cfg.trigger_pulse_us);
        self.trigger.set_low().map_err(EchoFault::pulse)?;

        let timeout = self.cfg.echo_timeout();
        let width = self
            .echo
            .pulse_width(Level::High, timeout)
            .map_err(EchoFault::pulse)?
            .ok_or(EchoFault::NoEcho)?;
        if width > timeout {
            return Err(EchoFault::NoEcho);
        }
        Ok(echo_to_cm(width, self.cfg.speed_of_sound_cm_per_us))
    }

    /// Fire one ping; any fault reads as the sentinel distance.
    pub fn measure(&mut self) -> DistanceSample {
        match self.try_measure() {
            Ok(cm) => DistanceSample {
                cm,
                kind: SampleKind::Echo,
            },
            Err(_) => DistanceSample {
                cm: self.cfg.sentinel_cm,
                kind: SampleKind::NoEcho,
            },
        }
    }
}
