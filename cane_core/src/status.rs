//! Per-cycle report returned from each control loop iteration.

use crate::light::LightState;
use crate::range::DistanceSample;
use crate::risk::RiskTier;

/// Result of the risk path when a velocity estimate was available.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    /// Signed cm/s, positive = approaching.
    pub closing_speed_cm_s: f32,
    pub tier: RiskTier,
    /// An alert pattern was played (or handed to the worker).
    pub alerted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// Too little time since the last estimate; nothing classified.
    Skipped,
    Assessed(Assessment),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    /// Milliseconds since the loop started, captured before ranging.
    pub at_ms: u64,
    /// `None` when the light sensor or LED failed this cycle.
    pub light: Option<LightState>,
    pub distance: DistanceSample,
    pub outcome: CycleOutcome,
}

impl CycleReport {
    pub fn tier(&self) -> Option<RiskTier> {
        match self.outcome {
            CycleOutcome::Assessed(a) => Some(a.tier),
            CycleOutcome::Skipped => None,
        }
    }

    pub fn assessment(&self) -> Option<&Assessment> {
        match &self.outcome {
            CycleOutcome::Assessed(a) => Some(a),
            CycleOutcome::Skipped => None,
        }
    }
}
