use std::sync::Arc;
use std::time::{Duration, Instant};

use cane_core::{
    AlertActuator, AlertCfg, AlertMode, AlertPattern, AlertWorker, ControlLoop, RiskTier,
};
use cane_hardware::{SimBuzzer, SimEcho, SimLightSensor, SimRig};
use cane_traits::MonotonicClock;
use cane_traits::clock::test_clock::TestClock;
use rstest::rstest;

fn offer_until_taken(worker: &AlertWorker, tier: RiskTier) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !worker.offer(tier) {
        assert!(Instant::now() < deadline, "worker never became idle");
        std::thread::sleep(Duration::from_millis(1));
    }
}

#[rstest]
fn busy_worker_drops_new_alerts() {
    let buzzer = SimBuzzer::new();
    let actuator = AlertActuator::new(
        buzzer.clone(),
        AlertCfg::default(),
        Arc::new(MonotonicClock::new()),
    );
    let worker = AlertWorker::spawn(actuator);

    offer_until_taken(&worker, RiskTier::Warning);
    // the warning pattern holds the worker for 400 ms
    assert!(!worker.offer(RiskTier::Critical));
    assert!(!worker.offer(RiskTier::Warning));

    drop(worker);
    assert_eq!(buzzer.beeps(), 1);
    assert_eq!(buzzer.duty(), 0);
}

#[rstest]
fn worker_plays_again_once_idle() {
    let buzzer = SimBuzzer::new();
    let actuator = AlertActuator::new(
        buzzer.clone(),
        AlertCfg::default(),
        Arc::new(MonotonicClock::new()),
    );
    let worker = AlertWorker::spawn(actuator);

    offer_until_taken(&worker, RiskTier::Critical);
    offer_until_taken(&worker, RiskTier::Critical);
    drop(worker);
    assert_eq!(buzzer.beeps(), 2);
    assert_eq!(buzzer.duty(), 0);
}

#[rstest]
fn quiet_tiers_offered_to_worker_stay_silent() {
    let buzzer = SimBuzzer::new();
    let actuator = AlertActuator::new(buzzer.clone(), AlertCfg::default(), Arc::new(TestClock::new()));
    let worker = AlertWorker::spawn(actuator);
    offer_until_taken(&worker, RiskTier::Caution);
    drop(worker);
    assert_eq!(buzzer.beeps(), 0);
}

#[rstest]
fn background_mode_does_not_block_the_loop() {
    let rig = SimRig::new(SimEcho::from_distances([15.0]), SimLightSensor::constant(900));
    let alert = AlertCfg {
        mode: AlertMode::Background,
        critical: AlertPattern {
            on_ms: 500,
            off_ms: 500,
            ..AlertPattern::CRITICAL
        },
        ..AlertCfg::default()
    };
    let mut ctl = ControlLoop::builder()
        .with_trigger(rig.trigger.clone())
        .with_echo(rig.echo.clone())
        .with_buzzer(rig.buzzer.clone())
        .with_light_sensor(rig.light.clone())
        .with_led(rig.led.clone())
        .with_alert(alert)
        .build()
        .unwrap();
    assert!(ctl.is_background());

    std::thread::sleep(Duration::from_millis(120));
    let started = Instant::now();
    let report = ctl.tick();
    assert_eq!(report.tier(), Some(RiskTier::Critical));
    assert!(started.elapsed() < Duration::from_millis(400), "tick waited on the pattern");

    drop(ctl);
    assert_eq!(rig.buzzer.duty(), 0);
    assert!(rig.buzzer.beeps() <= 1);
}
