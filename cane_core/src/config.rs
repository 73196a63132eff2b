//! Configuration types for the cane engine.
//!
//! These are the runtime configuration structs used by `ControlLoop`.
//! They are separate from the TOML-deserialized config in `cane_config`.

use std::time::Duration;

/// Ultrasonic ranging parameters.
#[derive(Debug, Clone)]
pub struct RangeCfg {
    /// Trigger held low before the pulse (µs).
    pub trigger_settle_us: u64,
    /// Trigger pulse width (µs).
    pub trigger_pulse_us: u64,
    /// Echo wait bound (µs). 30 ms is the round trip for ~5 m.
    pub echo_timeout_us: u64,
    /// Speed of sound in cm/µs.
    pub speed_of_sound_cm_per_us: f32,
    /// Distance substituted when no echo is measured (cm).
    pub sentinel_cm: f32,
}

impl Default for RangeCfg {
    fn default() -> Self {
        Self {
            trigger_settle_us: 2,
            trigger_pulse_us: 10,
            echo_timeout_us: 30_000,
            speed_of_sound_cm_per_us: 0.0343,
            sentinel_cm: 200.0,
        }
    }
}

impl RangeCfg {
    #[inline]
    pub fn echo_timeout(&self) -> Duration {
        Duration::from_micros(self.echo_timeout_us)
    }
}

/// Velocity estimation parameters.
#[derive(Debug, Clone)]
pub struct VelocityCfg {
    /// Estimates are produced only when strictly more than this has elapsed.
    pub min_elapsed_ms: u64,
}

impl Default for VelocityCfg {
    fn default() -> Self {
        Self { min_elapsed_ms: 100 }
    }
}

/// Decision thresholds.
#[derive(Debug, Clone)]
pub struct RiskCfg {
    pub critical_cm: f32,
    pub near_cm: f32,
    pub approach_speed_cm_s: f32,
}

impl Default for RiskCfg {
    fn default() -> Self {
        Self {
            critical_cm: 30.0,
            near_cm: 100.0,
            approach_speed_cm_s: 20.0,
        }
    }
}

/// One audible pattern: a single beep followed by a pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertPattern {
    pub frequency_hz: u32,
    /// 0..=1023
    pub duty: u16,
    pub on_ms: u64,
    pub off_ms: u64,
}

impl AlertPattern {
    pub const CRITICAL: Self = Self {
        frequency_hz: 2000,
        duty: 512,
        on_ms: 50,
        off_ms: 50,
    };
    pub const WARNING: Self = Self {
        frequency_hz: 1000,
        duty: 512,
        on_ms: 100,
        off_ms: 300,
    };

    /// Total time the pattern blocks its caller.
    #[inline]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.on_ms.saturating_add(self.off_ms))
    }
}

/// Where alert patterns are played.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlertMode {
    /// Inline on the loop thread; sensing pauses while a pattern sounds.
    #[default]
    Blocking,
    /// On a dedicated worker; alerts offered while it is busy are dropped.
    Background,
}

#[derive(Debug, Clone)]
pub struct AlertCfg {
    pub mode: AlertMode,
    pub critical: AlertPattern,
    pub warning: AlertPattern,
}

impl Default for AlertCfg {
    fn default() -> Self {
        Self {
            mode: AlertMode::Blocking,
            critical: AlertPattern::CRITICAL,
            warning: AlertPattern::WARNING,
        }
    }
}

/// Night light threshold.
#[derive(Debug, Clone)]
pub struct LightCfg {
    /// LED on when the reading is strictly below this.
    pub dark_below: u16,
}

impl Default for LightCfg {
    fn default() -> Self {
        Self { dark_below: 1500 }
    }
}

/// Loop cadence.
#[derive(Debug, Clone)]
pub struct LoopCfg {
    /// Fixed pause after every iteration (ms).
    pub cycle_delay_ms: u64,
}

impl Default for LoopCfg {
    fn default() -> Self {
        Self { cycle_delay_ms: 50 }
    }
}
