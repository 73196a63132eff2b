use cane_config::{AlertMode, load_toml};
use rstest::rstest;

#[test]
fn empty_file_is_the_stock_cane() {
    let cfg = load_toml("").expect("parse empty TOML");
    cfg.validate().expect("defaults must validate");
    assert_eq!(cfg.pins.trigger, 5);
    assert_eq!(cfg.pins.echo, 18);
    assert_eq!(cfg.range.echo_timeout_us, 30_000);
    assert_eq!(cfg.range.sentinel_cm, 200.0);
    assert_eq!(cfg.velocity.min_elapsed_ms, 100);
    assert_eq!(cfg.risk.critical_cm, 30.0);
    assert_eq!(cfg.alert.mode, AlertMode::Blocking);
    assert_eq!(cfg.alert.warning.off_ms, 300);
    assert_eq!(cfg.light.dark_below, 1500);
    assert_eq!(cfg.runner.cycle_delay_ms, 50);
}

#[test]
fn partial_sections_keep_other_defaults() {
    let toml = r#"
[risk]
near_cm = 120.0

[alert]
mode = "background"

[alert.critical]
frequency_hz = 2500
duty = 700
on_ms = 40
off_ms = 40
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.risk.near_cm, 120.0);
    assert_eq!(cfg.risk.critical_cm, 30.0);
    assert_eq!(cfg.alert.mode, AlertMode::Background);
    assert_eq!(cfg.alert.critical.frequency_hz, 2500);
    assert_eq!(cfg.alert.warning.frequency_hz, 1000);
}

#[test]
fn unknown_alert_mode_is_a_parse_error() {
    let err = load_toml("[alert]\nmode = \"queued\"\n").expect_err("should reject mode");
    assert!(format!("{err}").contains("queued"));
}

#[rstest]
#[case("[range]\necho_timeout_us = 0\n", "echo_timeout_us must be >= 1")]
#[case("[range]\nspeed_of_sound_cm_per_us = 0.0\n", "speed_of_sound_cm_per_us must be > 0")]
#[case("[range]\nsentinel_cm = 50.0\n", "sentinel_cm must be >= risk.near_cm")]
#[case("[velocity]\nmin_elapsed_ms = 0\n", "min_elapsed_ms must be >= 1")]
#[case("[risk]\nnear_cm = 20.0\n", "near_cm must be > risk.critical_cm")]
#[case("[risk]\napproach_speed_cm_s = -1.0\n", "approach_speed_cm_s must be >= 0")]
#[case("[light]\ndark_below = 5000\n", "dark_below must be in 0..=4095")]
#[case("[pins]\nled = 18\n", "share bcm pin 18")]
#[case("[pins]\ntrigger = 40\n", "pins.trigger must be a bcm pin")]
#[case("[logging]\nrotation = \"weekly\"\n", "logging.rotation must be one of")]
#[case(
    "[alert.warning]\nfrequency_hz = 1000\nduty = 0\non_ms = 100\noff_ms = 300\n",
    "alert.warning.duty must be in 1..=1023"
)]
fn rejects_out_of_range_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    let msg = format!("{err}").to_lowercase();
    assert!(msg.contains(&needle.to_lowercase()), "message {msg:?} lacks {needle:?}");
}
