//! Fixed-cadence runner around `ControlLoop::tick` with shutdown and statistics.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::control::ControlLoop;
use crate::risk::RiskTier;
use crate::status::{CycleOutcome, CycleReport};

#[derive(Debug, Clone, Copy)]
pub struct RunParams {
    /// Pause after every iteration.
    pub cycle_delay: Duration,
    /// Stop after this many iterations; `None` runs until shutdown.
    pub max_cycles: Option<u64>,
}

impl RunParams {
    pub fn from_loop(ctl: &ControlLoop, max_cycles: Option<u64>) -> Self {
        Self {
            cycle_delay: Duration::from_millis(ctl.loop_cfg().cycle_delay_ms),
            max_cycles,
        }
    }
}

/// Aggregate counters over a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoopStats {
    pub cycles: u64,
    /// Cycles where the velocity estimate was not ready.
    pub skipped: u64,
    /// Cycles where the sentinel distance was substituted.
    pub no_echo: u64,
    /// Cycles where the light path failed.
    pub light_faults: u64,
    /// Assessed cycles per tier, indexed by `RiskTier::index`.
    pub tiers: [u64; 4],
    pub alerts: u64,
    pub latency_min: Option<Duration>,
    pub latency_max: Duration,
    latency_total: Duration,
}

impl LoopStats {
    pub fn record(&mut self, report: &CycleReport, latency: Duration) {
        self.cycles += 1;
        if !report.distance.is_echo() {
            self.no_echo += 1;
        }
        if report.light.is_none() {
            self.light_faults += 1;
        }
        match report.outcome {
            CycleOutcome::Skipped => self.skipped += 1,
            CycleOutcome::Assessed(a) => {
                self.tiers[a.tier.index()] += 1;
                if a.alerted {
                    self.alerts += 1;
                }
            }
        }
        self.latency_min = Some(self.latency_min.map_or(latency, |m| m.min(latency)));
        self.latency_max = self.latency_max.max(latency);
        self.latency_total += latency;
    }

    pub fn tier_count(&self, tier: RiskTier) -> u64 {
        self.tiers[tier.index()]
    }

    pub fn latency_avg(&self) -> Option<Duration> {
        let n = u32::try_from(self.cycles).ok().filter(|n| *n > 0)?;
        Some(self.latency_total / n)
    }
}

/// Drive `ctl` until `shutdown` is set or `max_cycles` is reached.
///
/// `on_cycle` sees every report as it is produced. Sleeps go through the
/// loop's clock, so a test clock runs this without waiting.
pub fn run<F>(
    ctl: &mut ControlLoop,
    params: RunParams,
    shutdown: &AtomicBool,
    mut on_cycle: F,
) -> LoopStats
where
    F: FnMut(&CycleReport),
{
    let clock = ctl.clock().clone();
    let mut stats = LoopStats::default();

    while !shutdown.load(Ordering::Relaxed) {
        if params.max_cycles.is_some_and(|max| stats.cycles >= max) {
            break;
        }
        let started = clock.now();
        let report = ctl.tick();
        let latency = clock.now().saturating_duration_since(started);
        on_cycle(&report);
        stats.record(&report, latency);

        if shutdown.load(Ordering::Relaxed) {
            break;
        }
        clock.sleep(params.cycle_delay);
    }

    tracing::info!(
        cycles = stats.cycles,
        skipped = stats.skipped,
        no_echo = stats.no_echo,
        alerts = stats.alerts,
        "control loop stopped"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::LightState;
    use crate::range::{DistanceSample, SampleKind};
    use crate::status::Assessment;

    fn report(kind: SampleKind, outcome: CycleOutcome) -> CycleReport {
        CycleReport {
            at_ms: 0,
            light: Some(LightState {
                reading: 0,
                led_on: true,
            }),
            distance: DistanceSample { cm: 200.0, kind },
            outcome,
        }
    }

    #[test]
    fn stats_accumulate_per_outcome() {
        let mut s = LoopStats::default();
        s.record(&report(SampleKind::Echo, CycleOutcome::Skipped), Duration::from_millis(2));
        s.record(
            &report(
                SampleKind::NoEcho,
                CycleOutcome::Assessed(Assessment {
                    closing_speed_cm_s: 0.0,
                    tier: RiskTier::Critical,
                    alerted: true,
                }),
            ),
            Duration::from_millis(4),
        );
        assert_eq!(s.cycles, 2);
        assert_eq!(s.skipped, 1);
        assert_eq!(s.no_echo, 1);
        assert_eq!(s.alerts, 1);
        assert_eq!(s.tier_count(RiskTier::Critical), 1);
        assert_eq!(s.latency_min, Some(Duration::from_millis(2)));
        assert_eq!(s.latency_max, Duration::from_millis(4));
        assert_eq!(s.latency_avg(), Some(Duration::from_millis(3)));
    }

    #[test]
    fn empty_stats_have_no_average() {
        assert_eq!(LoopStats::default().latency_avg(), None);
    }
}
