use assert_cmd::prelude::*;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[velocity]
min_elapsed_ms = 100

[runner]
cycle_delay_ms = 40
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

// Every row is inside the critical band, so any assessed cycle is critical
fn write_close_trace(dir: &tempfile::TempDir, rows: usize) -> PathBuf {
    let path = dir.path().join("walk.csv");
    let mut f = fs::File::create(&path).unwrap();
    writeln!(f, "distance_cm,light").unwrap();
    for _ in 0..rows {
        writeln!(f, "20,900").unwrap();
    }
    path
}

#[test]
fn json_run_emits_one_object_per_assessed_cycle() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let trace = write_close_trace(&dir, 12);

    let out = Command::cargo_bin("cane")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("--json")
        .arg("run")
        .arg("--trace")
        .arg(&trace)
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().filter(|l| !l.trim().is_empty()).collect();
    assert!(!lines.is_empty(), "no cycle was assessed");
    assert!(lines.len() <= 12);

    for line in lines {
        let v: serde_json::Value = serde_json::from_str(line).unwrap();
        for key in ["at_ms", "distance_cm", "echo", "closing_speed_cm_s", "tier", "alerted", "led"] {
            assert!(v.get(key).is_some(), "missing {key} in {line}");
        }
        assert_eq!(v["tier"], "critical");
        assert_eq!(v["alerted"], true);
        assert_eq!(v["echo"], true);
        assert_eq!(v["led"], true);
        let cm = v["distance_cm"].as_f64().unwrap();
        assert!((cm - 20.0).abs() < 0.1, "distance {cm}");
    }

    // The banner stays off stdout in JSON mode
    assert!(String::from_utf8_lossy(&out.stderr).contains("Smart cane active"));
}

#[test]
fn json_errors_are_structured() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[range]\nspeed_of_sound_cm_per_us = 0.0\n").unwrap();

    let out = Command::cargo_bin("cane")
        .unwrap()
        .arg("--config")
        .arg(&path)
        .arg("--json")
        .arg("self-check")
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));

    let stderr = String::from_utf8(out.stderr).unwrap();
    let last = stderr.lines().rev().find(|l| !l.trim().is_empty()).unwrap();
    let v: serde_json::Value = serde_json::from_str(last).unwrap();
    assert_eq!(v["reason"], "Config");
    assert!(v["message"].as_str().unwrap().contains("speed_of_sound"));
}

#[test]
fn json_self_check_reports_each_peripheral() {
    let out = Command::cargo_bin("cane")
        .unwrap()
        .args(["--json", "self-check"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["buzzer"], "ok");
    assert!(v["light"].is_u64());
    assert!(v.get("distance_cm").is_some());
}
