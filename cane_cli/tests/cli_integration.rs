use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Stock wiring with a short cycle so runs stay quick
fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[pins]
trigger = 5
echo = 18
buzzer = 19
led = 23

[risk]
critical_cm = 30.0
near_cm = 100.0
approach_speed_cm_s = 20.0

[runner]
cycle_delay_ms = 20
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["run", "--max-cycles", "3"], 0, "Smart cane active", "stdout")]
#[case(&["self-check"], 0, "OK", "stdout")]
#[case(&["run", "--max-cycles", "many"], 2, "invalid value", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("cane").unwrap();
    cmd.arg("--config").arg(&cfg);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[test]
fn runs_on_builtin_defaults_without_config() {
    let mut cmd = Command::cargo_bin("cane").unwrap();
    cmd.args(["run", "--max-cycles", "2"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Smart cane active"));
}

#[rstest]
#[case("[risk]\ncritical_cm = 30.0\nnear_cm = 10.0\n", "risk.near_cm")]
#[case("[pins]\ntrigger = 40\n", "pins.trigger")]
#[case("[runner\ncycle_delay_ms = 20\n", "parse")]
fn bad_config_exits_with_config_code(#[case] toml: &str, #[case] needle: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, toml).unwrap();

    let mut cmd = Command::cargo_bin("cane").unwrap();
    cmd.arg("--config")
        .arg(&path)
        .args(["run", "--max-cycles", "1"]);
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains(needle));
}

#[test]
fn missing_config_file_is_a_config_error() {
    let dir = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("cane").unwrap();
    cmd.arg("--config")
        .arg(dir.path().join("nope.toml"))
        .arg("self-check");
    cmd.assert().code(2);
}

#[test]
fn cli_reports_bad_trace_header() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let bad_csv = dir.path().join("walk.csv");
    let mut f = fs::File::create(&bad_csv).unwrap();
    writeln!(f, "distance,lux").unwrap();
    writeln!(f, "100,900").unwrap();

    let mut cmd = Command::cargo_bin("cane").unwrap();
    cmd.arg("--config")
        .arg(&cfg)
        .arg("run")
        .arg("--trace")
        .arg(&bad_csv);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid headers"));
}

#[test]
fn stats_go_to_stderr() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("cane").unwrap();
    cmd.arg("--config")
        .arg(&cfg)
        .args(["run", "--max-cycles", "4", "--stats"]);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Cycles: 4"))
        .stdout(predicate::str::contains("Cycles:").not());
}
