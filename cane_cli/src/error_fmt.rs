//! Human-readable error descriptions and structured JSON error formatting.

use cane_core::error::{BuildError, CaneError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingTrigger | BuildError::MissingEcho => {
                "What happened: The range sensor was not wired into the control loop.\nLikely causes: Trigger or echo pin failed to initialize.\nHow to fix: Check [pins] trigger/echo and that the process may access GPIO.".to_string()
            }
            BuildError::MissingBuzzer => {
                "What happened: No buzzer was provided to the control loop.\nLikely causes: PWM pin failed to initialize.\nHow to fix: Check [pins] buzzer and GPIO permissions.".to_string()
            }
            BuildError::MissingLightSensor | BuildError::MissingLed => {
                "What happened: The night light was not wired into the control loop.\nLikely causes: ADC or LED pin failed to initialize.\nHow to fix: Check [pins] led and [pins.light_adc], and that SPI is enabled.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(ce) = err.downcast_ref::<CaneError>() {
        return match ce {
            CaneError::Config(msg) => format!(
                "What happened: Configuration could not be used ({msg}).\nLikely causes: Syntax error, unknown value, or out-of-range setting.\nHow to fix: Fix the named key in the config file, or run without --config to use the built-in defaults."
            ),
            CaneError::Timeout => {
                "What happened: A sensor did not respond in time.\nLikely causes: Wiring, power, or a wrong pin number.\nHow to fix: Verify [pins] and 5V/GND to the sensor, then rerun `cane self-check`.".to_string()
            }
            CaneError::Hardware(msg) | CaneError::HardwareFault(msg) => format!(
                "What happened: Hardware error ({msg}).\nLikely causes: GPIO/SPI not enabled, insufficient permissions, or wrong pins.\nHow to fix: Enable SPI, add the user to the gpio group, check [pins], then rerun `cane self-check`."
            ),
            CaneError::State(msg) => format!(
                "What happened: {msg}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("trace csv must have headers") {
        return "Invalid headers in trace CSV. Expected 'distance_cm,light'.".to_string();
    }
    if lower.contains("trace csv") {
        return format!(
            "What happened: The trace CSV could not be replayed ({msg}).\nHow to fix: Check the file path and that every row is 'distance_cm,light' with light in 0..=4095."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Error: {msg}"
    )
}

/// Stable exit codes: config 2, build 3, hardware 4, anything else 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<BuildError>().is_some() {
        return 3;
    }
    match err.downcast_ref::<CaneError>() {
        Some(CaneError::Config(_)) => 2,
        Some(CaneError::Hardware(_) | CaneError::HardwareFault(_) | CaneError::Timeout) => 4,
        _ => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() {
        return "Build";
    }
    match err.downcast_ref::<CaneError>() {
        Some(CaneError::Config(_)) => "Config",
        Some(CaneError::Hardware(_) | CaneError::HardwareFault(_)) => "Hardware",
        Some(CaneError::Timeout) => "Timeout",
        _ => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({ "reason": reason_name(err), "message": humanize(err) }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_stable() {
        let cfg = eyre::Report::new(CaneError::Config("bad".into()));
        let build = eyre::Report::new(BuildError::MissingBuzzer);
        let hw = eyre::Report::new(CaneError::HardwareFault("spi".into()));
        let other = eyre::eyre!("boom");
        assert_eq!(exit_code_for_error(&cfg), 2);
        assert_eq!(exit_code_for_error(&build), 3);
        assert_eq!(exit_code_for_error(&hw), 4);
        assert_eq!(exit_code_for_error(&other), 1);
    }

    #[test]
    fn wrapped_errors_keep_their_code() {
        use eyre::WrapErr;
        let r: eyre::Result<()> = Err(eyre::Report::new(CaneError::Timeout));
        let err = r.wrap_err("self-check").unwrap_err();
        assert_eq!(exit_code_for_error(&err), 4);
    }

    #[test]
    fn json_error_has_reason_and_message() {
        let err = eyre::Report::new(CaneError::Config("risk.near_cm must be > risk.critical_cm".into()));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "Config");
        assert!(v["message"].as_str().unwrap().contains("risk.near_cm"));
    }
}
