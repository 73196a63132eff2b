//! Audible alert patterns on the buzzer.

use std::sync::Arc;
use std::time::Duration;

use cane_traits::{Clock, ToneOutput};
use eyre::WrapErr;

use crate::config::{AlertCfg, AlertPattern};
use crate::error::Result;
use crate::hw_error::hw;
use crate::risk::RiskTier;

pub struct AlertActuator<B: ToneOutput> {
    buzzer: B,
    cfg: AlertCfg,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl<B: ToneOutput> core::fmt::Debug for AlertActuator<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AlertActuator")
            .field("critical", &self.cfg.critical)
            .field("warning", &self.cfg.warning)
            .finish()
    }
}

impl<B: ToneOutput> AlertActuator<B> {
    pub fn new(buzzer: B, cfg: AlertCfg, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { buzzer, cfg, clock }
    }

    /// Pattern played for `tier`, if it is an alerting tier.
    pub fn pattern_for(&self, tier: RiskTier) -> Option<AlertPattern> {
        match tier {
            RiskTier::Critical => Some(self.cfg.critical),
            RiskTier::Warning => Some(self.cfg.warning),
            RiskTier::Caution | RiskTier::Safe => None,
        }
    }

    /// Play the pattern for `tier`, blocking for its full on+off time.
    ///
    /// The buzzer is left at duty 0 on return, including when a write fails
    /// partway through the pattern.
    pub fn alert(&mut self, tier: RiskTier) -> Result<()> {
        let Some(p) = self.pattern_for(tier) else {
            return self.silence();
        };

        let sounded = self.sound(p);
        let silenced = self.silence();
        sounded.wrap_err_with(|| format!("playing {tier} pattern"))?;
        silenced?;
        self.clock.sleep(Duration::from_millis(p.off_ms));
        Ok(())
    }

    fn sound(&mut self, p: AlertPattern) -> Result<()> {
        self.buzzer
            .set_frequency(p.frequency_hz)
            .map_err(|e| eyre::Report::new(hw(e)))?;
        self.buzzer
            .set_duty(p.duty)
            .map_err(|e| eyre::Report::new(hw(e)))?;
        self.clock.sleep(Duration::from_millis(p.on_ms));
        Ok(())
    }

    /// Set duty to 0.
    pub fn silence(&mut self) -> Result<()> {
        self.buzzer
            .set_duty(0)
            .map_err(|e| eyre::Report::new(hw(e)))
            .wrap_err("silencing buzzer")
    }
}
