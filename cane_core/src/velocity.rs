//! Closing-speed estimation by finite differences over consecutive samples.

use crate::config::VelocityCfg;
use crate::util::ms_to_secs;

/// Previous sample, owned by the estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityState {
    pub previous_distance_cm: f32,
    pub previous_timestamp_ms: u64,
}

impl VelocityState {
    /// State before any sample: distance 0 at the loop start time.
    pub fn at_start(start_ms: u64) -> Self {
        Self {
            previous_distance_cm: 0.0,
            previous_timestamp_ms: start_ms,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VelocityEstimator {
    state: VelocityState,
    min_elapsed_ms: u64,
}

impl VelocityEstimator {
    pub fn new(cfg: &VelocityCfg, start_ms: u64) -> Self {
        Self {
            state: VelocityState::at_start(start_ms),
            min_elapsed_ms: cfg.min_elapsed_ms,
        }
    }

    pub fn state(&self) -> VelocityState {
        self.state
    }

    /// Closing speed in cm/s since the previous accepted sample; positive
    /// means the obstacle is getting closer.
    ///
    /// Returns `None` and leaves the state untouched unless strictly more
    /// than `min_elapsed_ms` has passed. Otherwise the sample becomes the new
    /// reference.
    pub fn update(&mut self, current_distance_cm: f32, current_time_ms: u64) -> Option<f32> {
        let elapsed_ms = current_time_ms.saturating_sub(self.state.previous_timestamp_ms);
        if elapsed_ms <= self.min_elapsed_ms {
            return None;
        }
        let speed = (self.state.previous_distance_cm - current_distance_cm) / ms_to_secs(elapsed_ms);
        self.state = VelocityState {
            previous_distance_cm: current_distance_cm,
            previous_timestamp_ms: current_time_ms,
        };
        Some(speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator(start_ms: u64) -> VelocityEstimator {
        VelocityEstimator::new(&VelocityCfg::default(), start_ms)
    }

    #[test]
    fn approaching_obstacle_has_positive_speed() {
        let mut v = estimator(0);
        v.state = VelocityState {
            previous_distance_cm: 100.0,
            previous_timestamp_ms: 1_000,
        };
        let s = v.update(80.0, 1_200).expect("elapsed > 100 ms");
        assert!((s - 100.0).abs() < 1e-3, "{s}");
        assert_eq!(
            v.state(),
            VelocityState {
                previous_distance_cm: 80.0,
                previous_timestamp_ms: 1_200
            }
        );
    }

    #[test]
    fn exactly_min_elapsed_is_skipped() {
        let mut v = estimator(500);
        assert_eq!(v.update(10.0, 600), None);
        assert_eq!(v.state(), VelocityState::at_start(500));
        assert!(v.update(10.0, 601).is_some());
    }

    #[test]
    fn clock_going_backwards_is_skipped() {
        let mut v = estimator(1_000);
        assert_eq!(v.update(50.0, 10), None);
    }

    #[test]
    fn first_sample_against_zero_reads_as_retreating() {
        let mut v = estimator(0);
        let s = v.update(150.0, 200).unwrap();
        assert!(s < 0.0);
    }
}
