//! Obstacle risk tiers and the ordered decision rules that produce them.

use std::fmt;

use crate::config::RiskCfg;

/// Discrete risk, ordered from harmless to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskTier {
    Safe,
    Caution,
    Warning,
    Critical,
}

impl RiskTier {
    pub const ALL: [RiskTier; 4] = [Self::Safe, Self::Caution, Self::Warning, Self::Critical];

    /// Tiers that drive the buzzer. Caution is tracked but stays silent.
    #[inline]
    pub fn is_alerting(self) -> bool {
        self >= Self::Warning
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Caution => "caution",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }

    /// Dense index in `ALL` order.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct RiskClassifier {
    cfg: RiskCfg,
}

impl Default for RiskClassifier {
    fn default() -> Self {
        Self::new(RiskCfg::default())
    }
}

impl RiskClassifier {
    pub fn new(cfg: RiskCfg) -> Self {
        Self { cfg }
    }

    /// First matching rule wins:
    /// 1. closer than `critical_cm` → Critical, whatever the speed
    /// 2. closer than `near_cm` and closing faster than `approach_speed_cm_s` → Warning
    /// 3. closer than `near_cm` → Caution
    /// 4. otherwise Safe
    ///
    /// A NaN speed never satisfies rule 2.
    pub fn classify(&self, distance_cm: f32, closing_speed_cm_s: f32) -> RiskTier {
        let c = &self.cfg;
        if distance_cm < c.critical_cm {
            RiskTier::Critical
        } else if distance_cm < c.near_cm && closing_speed_cm_s > c.approach_speed_cm_s {
            RiskTier::Warning
        } else if distance_cm < c.near_cm {
            RiskTier::Caution
        } else {
            RiskTier::Safe
        }
    }
}
