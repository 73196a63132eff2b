//! The cane control loop (`ControlLoop`).
//!
//! One `tick` is one sense/decide/act cycle: light path first, then range,
//! velocity, classification and, for alerting tiers, the buzzer. Ticks never
//! fail. Echo faults are absorbed by the range sensor, and light or buzzer
//! faults are logged and reported without stopping the loop.

use std::sync::Arc;
use std::time::Instant;

use cane_traits::{AnalogInput, Clock, DigitalOutput, PulseInput, ToneOutput};

use crate::alert::AlertActuator;
use crate::alert_worker::AlertWorker;
use crate::config::{AlertMode, LoopCfg};
use crate::light::NightLight;
use crate::range::RangeSensor;
use crate::risk::{RiskClassifier, RiskTier};
use crate::status::{Assessment, CycleOutcome, CycleReport};
use crate::velocity::{VelocityEstimator, VelocityState};

pub type BoxedOutput = Box<dyn DigitalOutput + Send>;
pub type BoxedEcho = Box<dyn PulseInput + Send>;
pub type BoxedBuzzer = Box<dyn ToneOutput + Send>;
pub type BoxedAnalog = Box<dyn AnalogInput + Send>;

/// Where alert patterns play.
pub(crate) enum Alerter {
    Inline(AlertActuator<BoxedBuzzer>),
    Background(AlertWorker),
}

impl Alerter {
    pub(crate) fn new(actuator: AlertActuator<BoxedBuzzer>, mode: AlertMode) -> Self {
        match mode {
            AlertMode::Blocking => Self::Inline(actuator),
            AlertMode::Background => Self::Background(AlertWorker::spawn(actuator)),
        }
    }

    /// Returns whether a pattern was played or accepted by the worker.
    fn alert(&mut self, tier: RiskTier) -> bool {
        match self {
            Self::Inline(a) => match a.alert(tier) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(error = %e, %tier, "alert failed");
                    false
                }
            },
            Self::Background(w) => w.offer(tier),
        }
    }
}

pub struct ControlLoop {
    pub(crate) range: RangeSensor<BoxedOutput, BoxedEcho>,
    pub(crate) velocity: VelocityEstimator,
    pub(crate) classifier: RiskClassifier,
    pub(crate) alerter: Alerter,
    pub(crate) light: NightLight<BoxedAnalog, BoxedOutput>,
    pub(crate) loop_cfg: LoopCfg,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) epoch: Instant,
    pub(crate) last_tier: Option<RiskTier>,
}

impl core::fmt::Debug for ControlLoop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ControlLoop")
            .field("velocity", &self.velocity.state())
            .field("last_tier", &self.last_tier)
            .field("cycle_delay_ms", &self.loop_cfg.cycle_delay_ms)
            .finish()
    }
}

impl ControlLoop {
    /// Milliseconds since the loop was built.
    pub fn now_ms(&self) -> u64 {
        self.clock.ms_since(self.epoch)
    }

    pub fn clock(&self) -> &Arc<dyn Clock + Send + Sync> {
        &self.clock
    }

    pub fn loop_cfg(&self) -> &LoopCfg {
        &self.loop_cfg
    }

    pub fn velocity_state(&self) -> VelocityState {
        self.velocity.state()
    }

    /// Tier of the most recent assessed cycle.
    pub fn last_tier(&self) -> Option<RiskTier> {
        self.last_tier
    }

    pub fn is_background(&self) -> bool {
        matches!(self.alerter, Alerter::Background(_))
    }

    /// One iteration of the control loop. Does not include the cycle delay.
    pub fn tick(&mut self) -> CycleReport {
        let light = match self.light.update() {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::warn!(error = %e, "light path fault");
                None
            }
        };

        let at_ms = self.now_ms();
        let distance = self.range.measure();
        tracing::trace!(at_ms, cm = distance.cm, echo = distance.is_echo(), "range");

        let Some(closing_speed_cm_s) = self.velocity.update(distance.cm, at_ms) else {
            return CycleReport {
                at_ms,
                light,
                distance,
                outcome: CycleOutcome::Skipped,
            };
        };

        let tier = self.classifier.classify(distance.cm, closing_speed_cm_s);
        if self.last_tier != Some(tier) {
            tracing::info!(
                from = self.last_tier.map(RiskTier::as_str),
                to = %tier,
                distance_cm = distance.cm,
                closing_speed_cm_s,
                "risk tier changed"
            );
            self.last_tier = Some(tier);
        }

        let alerted = if tier.is_alerting() {
            tracing::debug!(%tier, distance_cm = distance.cm, "alert");
            self.alerter.alert(tier)
        } else {
            false
        };

        CycleReport {
            at_ms,
            light,
            distance,
            outcome: CycleOutcome::Assessed(Assessment {
                closing_speed_cm_s,
                tier,
                alerted,
            }),
        }
    }
}
