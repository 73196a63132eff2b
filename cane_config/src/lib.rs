#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and recorded-trace parsing for the smart cane.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//!   Every section is optional; defaults reproduce the stock cane wiring and
//!   thresholds, so an empty file (or no file at all) is a valid setup.
//! - The trace CSV loader enforces headers and feeds the simulated rig.
use serde::Deserialize;

/// BCM pin assignments.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Pins {
    pub trigger: u8,
    pub echo: u8,
    pub buzzer: u8,
    pub led: u8,
    pub light_adc: LightAdc,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            trigger: 5,
            echo: 18,
            buzzer: 19,
            led: 23,
            light_adc: LightAdc::default(),
        }
    }
}

/// MCP3208 wiring for the light-dependent resistor.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct LightAdc {
    pub spi_bus: u8,
    pub chip_select: u8,
    pub channel: u8,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RangeCfg {
    /// Low settle time before the trigger pulse (µs)
    pub trigger_settle_us: u64,
    /// Trigger pulse width (µs)
    pub trigger_pulse_us: u64,
    /// Echo wait bound (µs). 30 ms covers a ~5 m round trip.
    pub echo_timeout_us: u64,
    pub speed_of_sound_cm_per_us: f32,
    /// Distance reported when no echo arrives (cm)
    pub sentinel_cm: f32,
}

impl Default for RangeCfg {
    fn default() -> Self {
        Self {
            trigger_settle_us: 2,
            trigger_pulse_us: 10,
            echo_timeout_us: 30_000,
            speed_of_sound_cm_per_us: 0.0343,
            sentinel_cm: 200.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct VelocityCfg {
    /// Velocity is only estimated once strictly more than this has elapsed
    pub min_elapsed_ms: u64,
}

impl Default for VelocityCfg {
    fn default() -> Self {
        Self { min_elapsed_ms: 100 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RiskCfg {
    /// Closer than this is critical regardless of speed (cm)
    pub critical_cm: f32,
    /// Closer than this is at least caution (cm)
    pub near_cm: f32,
    /// Closing faster than this inside `near_cm` is a warning (cm/s)
    pub approach_speed_cm_s: f32,
}

impl Default for RiskCfg {
    fn default() -> Self {
        Self {
            critical_cm: 30.0,
            near_cm: 100.0,
            approach_speed_cm_s: 20.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct PatternCfg {
    pub frequency_hz: u32,
    /// 0..=1023
    pub duty: u16,
    pub on_ms: u64,
    pub off_ms: u64,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertMode {
    /// Alerts play inline and pause sensing while they sound
    #[default]
    Blocking,
    /// Alerts play on a worker thread; busy worker drops new alerts
    Background,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AlertCfg {
    pub mode: AlertMode,
    pub critical: PatternCfg,
    pub warning: PatternCfg,
}

impl Default for AlertCfg {
    fn default() -> Self {
        Self {
            mode: AlertMode::Blocking,
            critical: PatternCfg {
                frequency_hz: 2000,
                duty: 512,
                on_ms: 50,
                off_ms: 50,
            },
            warning: PatternCfg {
                frequency_hz: 1000,
                duty: 512,
                on_ms: 100,
                off_ms: 300,
            },
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LightCfg {
    /// LED turns on when the ADC reads below this (0..=4095)
    pub dark_below: u16,
}

impl Default for LightCfg {
    fn default() -> Self {
        Self { dark_below: 1500 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RunnerCfg {
    /// Fixed pause between loop iterations (ms)
    pub cycle_delay_ms: u64,
}

impl Default for RunnerCfg {
    fn default() -> Self {
        Self { cycle_delay_ms: 50 }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub pins: Pins,
    pub range: RangeCfg,
    pub velocity: VelocityCfg,
    pub risk: RiskCfg,
    pub alert: AlertCfg,
    pub light: LightCfg,
    pub runner: RunnerCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Pins
        let p = &self.pins;
        let gpio = [
            ("trigger", p.trigger),
            ("echo", p.echo),
            ("buzzer", p.buzzer),
            ("led", p.led),
        ];
        for (name, pin) in gpio {
            if pin > 27 {
                eyre::bail!("pins.{name} must be a BCM pin in 0..=27, got {pin}");
            }
        }
        for (i, (a, pa)) in gpio.iter().enumerate() {
            if let Some((b, _)) = gpio[i + 1..].iter().find(|(_, pb)| pb == pa) {
                eyre::bail!("pins.{a} and pins.{b} share BCM pin {pa}");
            }
        }
        if p.light_adc.channel > 7 {
            eyre::bail!("pins.light_adc.channel must be in 0..=7");
        }

        // Range
        if self.range.trigger_pulse_us == 0 {
            eyre::bail!("range.trigger_pulse_us must be >= 1");
        }
        if self.range.echo_timeout_us == 0 {
            eyre::bail!("range.echo_timeout_us must be >= 1");
        }
        if self.range.echo_timeout_us > 1_000_000 {
            eyre::bail!("range.echo_timeout_us is unreasonably large (>1s)");
        }
        let c = self.range.speed_of_sound_cm_per_us;
        if !(c.is_finite() && c > 0.0) {
            eyre::bail!("range.speed_of_sound_cm_per_us must be > 0");
        }
        if !(self.range.sentinel_cm.is_finite() && self.range.sentinel_cm >= self.risk.near_cm) {
            eyre::bail!("range.sentinel_cm must be >= risk.near_cm so no-echo reads as safe");
        }

        // Velocity
        if self.velocity.min_elapsed_ms == 0 {
            eyre::bail!("velocity.min_elapsed_ms must be >= 1");
        }

        // Risk
        let r = &self.risk;
        if !(r.critical_cm.is_finite() && r.critical_cm > 0.0) {
            eyre::bail!("risk.critical_cm must be > 0");
        }
        if !(r.near_cm.is_finite() && r.near_cm > r.critical_cm) {
            eyre::bail!("risk.near_cm must be > risk.critical_cm");
        }
        if !r.approach_speed_cm_s.is_finite() || r.approach_speed_cm_s < 0.0 {
            eyre::bail!("risk.approach_speed_cm_s must be >= 0");
        }

        // Alert
        for (name, pat) in [("critical", &self.alert.critical), ("warning", &self.alert.warning)] {
            if pat.frequency_hz == 0 || pat.frequency_hz > 20_000 {
                eyre::bail!("alert.{name}.frequency_hz must be in 1..=20000");
            }
            if pat.duty == 0 || pat.duty > 1023 {
                eyre::bail!("alert.{name}.duty must be in 1..=1023");
            }
            if pat.on_ms == 0 {
                eyre::bail!("alert.{name}.on_ms must be >= 1");
            }
            if pat.on_ms + pat.off_ms > 5_000 {
                eyre::bail!("alert.{name} pattern is unreasonably long (>5s)");
            }
        }

        // Light
        if self.light.dark_below > 4095 {
            eyre::bail!("light.dark_below must be in 0..=4095");
        }

        // Runner
        if self.runner.cycle_delay_ms > 10_000 {
            eyre::bail!("runner.cycle_delay_ms is unreasonably large (>10s)");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot:?}");
        }

        Ok(())
    }
}

/// One replayed loop iteration.
///
/// Expected headers:
/// distance_cm,light
///
/// An empty `distance_cm` means the echo timed out on that cycle.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct TraceRow {
    pub distance_cm: Option<f32>,
    pub light: u16,
}

pub fn load_trace_csv(path: &std::path::Path) -> eyre::Result<Vec<TraceRow>> {
    let file = std::fs::File::open(path).map_err(|e| eyre::eyre!("open trace CSV {:?}: {}", path, e))?;
    parse_trace(file).map_err(|e| eyre::eyre!("trace CSV {:?}: {}", path, e))
}

/// Parse a trace from any reader (headers enforced).
pub fn parse_trace<R: std::io::Read>(reader: R) -> eyre::Result<Vec<TraceRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers: {}", e))?
        .clone();
    let expected = ["distance_cm", "light"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "trace CSV must have headers 'distance_cm,light', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<TraceRow>().enumerate() {
        let row = rec.map_err(|e| eyre::eyre!("invalid CSV row {}: {}", idx + 2, e))?;
        if let Some(d) = row.distance_cm
            && !(d.is_finite() && d >= 0.0)
        {
            eyre::bail!("invalid CSV row {}: distance_cm must be >= 0", idx + 2);
        }
        if row.light > 4095 {
            eyre::bail!("invalid CSV row {}: light must be in 0..=4095", idx + 2);
        }
        rows.push(row);
    }
    if rows.is_empty() {
        eyre::bail!("trace CSV has no rows");
    }
    Ok(rows)
}
