//! Builder for `ControlLoop`.
//!
//! Peripherals are checked on `build()`, which reports the first missing one
//! as a typed `BuildError`. Configuration sections default to the stock cane
//! constants when not provided.

use std::sync::Arc;

use cane_traits::clock::{Clock, MonotonicClock};
use cane_traits::{AnalogInput, DigitalOutput, PulseInput, ToneOutput};

use crate::alert::AlertActuator;
use crate::config::*;
use crate::control::{Alerter, BoxedAnalog, BoxedBuzzer, BoxedEcho, BoxedOutput, ControlLoop};
use crate::error::{BuildError, Result};
use crate::light::NightLight;
use crate::range::RangeSensor;
use crate::risk::RiskClassifier;
use crate::velocity::VelocityEstimator;

#[derive(Default)]
pub struct ControlLoopBuilder {
    trigger: Option<BoxedOutput>,
    echo: Option<BoxedEcho>,
    buzzer: Option<BoxedBuzzer>,
    light_sensor: Option<BoxedAnalog>,
    led: Option<BoxedOutput>,
    range: Option<RangeCfg>,
    velocity: Option<VelocityCfg>,
    risk: Option<RiskCfg>,
    alert: Option<AlertCfg>,
    light: Option<LightCfg>,
    loop_cfg: Option<LoopCfg>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
}

impl ControlLoop {
    /// Start building a ControlLoop.
    pub fn builder() -> ControlLoopBuilder {
        ControlLoopBuilder::default()
    }
}

fn invalid(msg: &'static str) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

fn validate(
    range: &RangeCfg,
    velocity: &VelocityCfg,
    risk: &RiskCfg,
    alert: &AlertCfg,
) -> Result<()> {
    if range.echo_timeout_us == 0 {
        return Err(invalid("echo_timeout_us must be >= 1"));
    }
    if !(range.speed_of_sound_cm_per_us.is_finite() && range.speed_of_sound_cm_per_us > 0.0) {
        return Err(invalid("speed_of_sound_cm_per_us must be > 0"));
    }
    if velocity.min_elapsed_ms == 0 {
        return Err(invalid("min_elapsed_ms must be >= 1"));
    }
    if !(risk.critical_cm.is_finite() && risk.critical_cm > 0.0) {
        return Err(invalid("critical_cm must be > 0"));
    }
    if !(risk.near_cm.is_finite() && risk.near_cm > risk.critical_cm) {
        return Err(invalid("near_cm must be > critical_cm"));
    }
    if !(range.sentinel_cm.is_finite() && range.sentinel_cm >= risk.near_cm) {
        return Err(invalid("sentinel_cm must be >= near_cm"));
    }
    for p in [&alert.critical, &alert.warning] {
        if p.duty == 0 || p.duty > cane_traits::MAX_DUTY {
            return Err(invalid("alert duty must be in 1..=1023"));
        }
        if p.frequency_hz == 0 {
            return Err(invalid("alert frequency must be > 0"));
        }
    }
    Ok(())
}

impl ControlLoopBuilder {
    pub fn with_trigger(mut self, trigger: impl DigitalOutput + Send + 'static) -> Self {
        self.trigger = Some(Box::new(trigger));
        self
    }
    pub fn with_echo(mut self, echo: impl PulseInput + Send + 'static) -> Self {
        self.echo = Some(Box::new(echo));
        self
    }
    pub fn with_buzzer(mut self, buzzer: impl ToneOutput + Send + 'static) -> Self {
        self.buzzer = Some(Box::new(buzzer));
        self
    }
    pub fn with_light_sensor(mut self, sensor: impl AnalogInput + Send + 'static) -> Self {
        self.light_sensor = Some(Box::new(sensor));
        self
    }
    pub fn with_led(mut self, led: impl DigitalOutput + Send + 'static) -> Self {
        self.led = Some(Box::new(led));
        self
    }

    pub fn with_range(mut self, range: RangeCfg) -> Self {
        self.range = Some(range);
        self
    }
    pub fn with_velocity(mut self, velocity: VelocityCfg) -> Self {
        self.velocity = Some(velocity);
        self
    }
    pub fn with_risk(mut self, risk: RiskCfg) -> Self {
        self.risk = Some(risk);
        self
    }
    pub fn with_alert(mut self, alert: AlertCfg) -> Self {
        self.alert = Some(alert);
        self
    }
    pub fn with_alert_mode(mut self, mode: AlertMode) -> Self {
        let mut a = self.alert.unwrap_or_default();
        a.mode = mode;
        self.alert = Some(a);
        self
    }
    pub fn with_light(mut self, light: LightCfg) -> Self {
        self.light = Some(light);
        self
    }
    pub fn with_loop(mut self, loop_cfg: LoopCfg) -> Self {
        self.loop_cfg = Some(loop_cfg);
        self
    }

    /// Apply every tunable section of a loaded config file.
    pub fn with_config(self, cfg: &cane_config::Config) -> Self {
        self.with_range((&cfg.range).into())
            .with_velocity((&cfg.velocity).into())
            .with_risk((&cfg.risk).into())
            .with_alert((&cfg.alert).into())
            .with_light((&cfg.light).into())
            .with_loop((&cfg.runner).into())
    }

    /// Provide a custom clock implementation; defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<ControlLoop> {
        let trigger = self
            .trigger
            .ok_or_else(|| eyre::Report::new(BuildError::MissingTrigger))?;
        let echo = self
            .echo
            .ok_or_else(|| eyre::Report::new(BuildError::MissingEcho))?;
        let buzzer = self
            .buzzer
            .ok_or_else(|| eyre::Report::new(BuildError::MissingBuzzer))?;
        let light_sensor = self
            .light_sensor
            .ok_or_else(|| eyre::Report::new(BuildError::MissingLightSensor))?;
        let led = self
            .led
            .ok_or_else(|| eyre::Report::new(BuildError::MissingLed))?;

        let range = self.range.unwrap_or_default();
        let velocity = self.velocity.unwrap_or_default();
        let risk = self.risk.unwrap_or_default();
        let alert = self.alert.unwrap_or_default();
        validate(&range, &velocity, &risk, &alert)?;

        let clock: Arc<dyn Clock + Send + Sync> = match self.clock {
            Some(b) => Arc::from(b),
            None => Arc::new(MonotonicClock::new()),
        };
        let epoch = clock.now();
        let start_ms = clock.ms_since(epoch);

        let mode = alert.mode;
        let actuator = AlertActuator::new(buzzer, alert, clock.clone());
        tracing::debug!(?mode, "control loop built");

        Ok(ControlLoop {
            range: RangeSensor::new(trigger, echo, range, clock.clone()),
            velocity: VelocityEstimator::new(&velocity, start_ms),
            classifier: RiskClassifier::new(risk),
            alerter: Alerter::new(actuator, mode),
            light: NightLight::new(light_sensor, led, self.light.unwrap_or_default()),
            loop_cfg: self.loop_cfg.unwrap_or_default(),
            clock,
            epoch,
            last_tier: None,
        })
    }
}
