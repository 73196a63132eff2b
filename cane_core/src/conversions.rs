//! `From` implementations bridging `cane_config` types to `cane_core` types.

use crate::config::{AlertCfg, AlertMode, AlertPattern, LightCfg, LoopCfg, RangeCfg, RiskCfg, VelocityCfg};

// ── RangeCfg ─────────────────────────────────────────────────────────────────

impl From<&cane_config::RangeCfg> for RangeCfg {
    fn from(c: &cane_config::RangeCfg) -> Self {
        Self {
            trigger_settle_us: c.trigger_settle_us,
            trigger_pulse_us: c.trigger_pulse_us,
            echo_timeout_us: c.echo_timeout_us,
            speed_of_sound_cm_per_us: c.speed_of_sound_cm_per_us,
            sentinel_cm: c.sentinel_cm,
        }
    }
}

// ── VelocityCfg ──────────────────────────────────────────────────────────────

impl From<&cane_config::VelocityCfg> for VelocityCfg {
    fn from(c: &cane_config::VelocityCfg) -> Self {
        Self {
            min_elapsed_ms: c.min_elapsed_ms,
        }
    }
}

// ── RiskCfg ──────────────────────────────────────────────────────────────────

impl From<&cane_config::RiskCfg> for RiskCfg {
    fn from(c: &cane_config::RiskCfg) -> Self {
        Self {
            critical_cm: c.critical_cm,
            near_cm: c.near_cm,
            approach_speed_cm_s: c.approach_speed_cm_s,
        }
    }
}

// ── AlertCfg ─────────────────────────────────────────────────────────────────

impl From<&cane_config::PatternCfg> for AlertPattern {
    fn from(c: &cane_config::PatternCfg) -> Self {
        Self {
            frequency_hz: c.frequency_hz,
            duty: c.duty,
            on_ms: c.on_ms,
            off_ms: c.off_ms,
        }
    }
}

impl From<cane_config::AlertMode> for AlertMode {
    fn from(m: cane_config::AlertMode) -> Self {
        match m {
            cane_config::AlertMode::Blocking => AlertMode::Blocking,
            cane_config::AlertMode::Background => AlertMode::Background,
        }
    }
}

impl From<&cane_config::AlertCfg> for AlertCfg {
    fn from(c: &cane_config::AlertCfg) -> Self {
        Self {
            mode: c.mode.into(),
            critical: (&c.critical).into(),
            warning: (&c.warning).into(),
        }
    }
}

// ── LightCfg / LoopCfg ───────────────────────────────────────────────────────

impl From<&cane_config::LightCfg> for LightCfg {
    fn from(c: &cane_config::LightCfg) -> Self {
        Self {
            dark_below: c.dark_below,
        }
    }
}

impl From<&cane_config::RunnerCfg> for LoopCfg {
    fn from(c: &cane_config::RunnerCfg) -> Self {
        Self {
            cycle_delay_ms: c.cycle_delay_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_file_maps_to_default_runtime_config() {
        let file = cane_config::Config::default();
        let alert: AlertCfg = (&file.alert).into();
        assert_eq!(alert.critical, AlertPattern::CRITICAL);
        assert_eq!(alert.warning, AlertPattern::WARNING);
        assert_eq!(alert.mode, AlertMode::Blocking);

        let range: RangeCfg = (&file.range).into();
        let stock = RangeCfg::default();
        assert_eq!(range.echo_timeout_us, stock.echo_timeout_us);
        assert_eq!(range.sentinel_cm, stock.sentinel_cm);

        let risk: RiskCfg = (&file.risk).into();
        assert_eq!(risk.near_cm, 100.0);
        let light: LightCfg = (&file.light).into();
        assert_eq!(light.dark_below, 1500);
        let lp: LoopCfg = (&file.runner).into();
        assert_eq!(lp.cycle_delay_ms, 50);
        let v: VelocityCfg = (&file.velocity).into();
        assert_eq!(v.min_elapsed_ms, 100);
    }
}
