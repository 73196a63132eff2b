use cane_core::{RiskCfg, RiskClassifier, RiskTier, VelocityCfg, VelocityEstimator};
use rstest::rstest;

#[rstest]
#[case(29.0, 0.0, RiskTier::Critical)]
#[case(99.0, 21.0, RiskTier::Warning)]
#[case(99.0, 19.0, RiskTier::Caution)]
#[case(150.0, 100.0, RiskTier::Safe)]
#[case(30.0, 1000.0, RiskTier::Warning)]
#[case(30.0, 0.0, RiskTier::Caution)]
#[case(99.0, 20.0, RiskTier::Caution)]
#[case(100.0, 500.0, RiskTier::Safe)]
#[case(0.0, -50.0, RiskTier::Critical)]
#[case(200.0, 0.0, RiskTier::Safe)]
fn classify_table(#[case] distance: f32, #[case] speed: f32, #[case] want: RiskTier) {
    assert_eq!(RiskClassifier::default().classify(distance, speed), want);
}

#[test]
fn thirty_centimetres_is_not_critical() {
    // Critical is strictly below 30; at 30 the speed decides.
    let c = RiskClassifier::default();
    assert_eq!(c.classify(30.0, 0.0), RiskTier::Caution);
    assert_eq!(c.classify(29.999, 0.0), RiskTier::Critical);
}

#[test]
fn thresholds_follow_config() {
    let c = RiskClassifier::new(RiskCfg {
        critical_cm: 50.0,
        near_cm: 150.0,
        approach_speed_cm_s: 40.0,
    });
    assert_eq!(c.classify(45.0, 0.0), RiskTier::Critical);
    assert_eq!(c.classify(120.0, 41.0), RiskTier::Warning);
    assert_eq!(c.classify(120.0, 39.0), RiskTier::Caution);
    assert_eq!(c.classify(150.0, 100.0), RiskTier::Safe);
}

#[rstest]
#[case(0)]
#[case(50)]
#[case(100)]
fn no_estimate_within_min_elapsed(#[case] dt: u64) {
    let mut v = VelocityEstimator::new(&VelocityCfg::default(), 1_000);
    assert_eq!(v.update(10.0, 1_000 + dt), None);
    assert_eq!(v.update(500.0, 1_000 + dt), None);
    assert_eq!(v.state().previous_timestamp_ms, 1_000);
}

#[test]
fn hundred_to_eighty_in_two_hundred_ms_is_hundred_cm_per_s() {
    let mut v = VelocityEstimator::new(&VelocityCfg::default(), 0);
    // seed the reference sample
    let _ = v.update(100.0, 1_000);
    let s = v.update(80.0, 1_200).expect("elapsed 200 ms");
    assert!((s - 100.0).abs() < 1e-3, "{s}");
}

#[test]
fn receding_obstacle_has_negative_speed() {
    let mut v = VelocityEstimator::new(&VelocityCfg::default(), 0);
    let _ = v.update(50.0, 200);
    let s = v.update(100.0, 700).unwrap();
    assert!((s + 100.0).abs() < 1e-3, "{s}");
}

#[test]
fn skipped_update_keeps_older_reference() {
    let mut v = VelocityEstimator::new(&VelocityCfg::default(), 0);
    let _ = v.update(100.0, 1_000);
    assert_eq!(v.update(10.0, 1_050), None);
    // measured against the 1 000 ms sample, not the skipped one
    let s = v.update(90.0, 1_500).unwrap();
    assert!((s - 20.0).abs() < 1e-3, "{s}");
}

#[test]
fn cold_start_never_raises_warning() {
    let mut v = VelocityEstimator::new(&VelocityCfg::default(), 0);
    let c = RiskClassifier::default();
    for cm in [31.0, 60.0, 99.0] {
        let mut fresh = v.clone();
        let s = fresh.update(cm, 150).unwrap();
        assert!(s < 0.0);
        assert_eq!(c.classify(cm, s), RiskTier::Caution);
    }
    assert!(v.update(20.0, 150).is_some());
}
