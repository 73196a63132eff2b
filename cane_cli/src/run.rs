//! Peripheral assembly, the run loop, and self-check.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use cane_config::Config;
use cane_core::control::{BoxedAnalog, BoxedBuzzer, BoxedEcho, BoxedOutput};
use cane_core::error::Result;
use cane_core::{
    AlertActuator, ControlLoop, CycleOutcome, CycleReport, LoopStats, NightLight, RangeSensor,
    RiskTier, RunParams,
};
use cane_traits::MonotonicClock;
use eyre::WrapErr;

use crate::cli::RunArgs;
use crate::rt::setup_rt_once;

/// The five peripherals of one cane, type-erased.
pub struct Peripherals {
    pub trigger: BoxedOutput,
    pub echo: BoxedEcho,
    pub buzzer: BoxedBuzzer,
    pub light: BoxedAnalog,
    pub led: BoxedOutput,
    /// Length of a replayed trace, if any.
    pub trace_len: Option<usize>,
}

#[cfg(feature = "hardware")]
pub fn open_peripherals(cfg: &Config, trace: Option<&Path>) -> Result<Peripherals> {
    use cane_core::error::CaneError;
    use cane_hardware::rpi::{RpiPins, RpiRig};
    if trace.is_some() {
        tracing::warn!("--trace is only used by the simulated rig; ignoring");
    }
    let p = &cfg.pins;
    let rig = RpiRig::open(&RpiPins {
        trigger: p.trigger,
        echo: p.echo,
        buzzer: p.buzzer,
        led: p.led,
        adc_bus: p.light_adc.spi_bus,
        adc_chip_select: p.light_adc.chip_select,
        adc_channel: p.light_adc.channel,
    })
    .map_err(|e| eyre::Report::new(CaneError::Hardware(e.to_string())))
    .wrap_err("opening cane peripherals")?;
    tracing::info!(
        trigger = p.trigger,
        echo = p.echo,
        buzzer = p.buzzer,
        led = p.led,
        "hardware rig opened"
    );
    Ok(Peripherals {
        trigger: Box::new(rig.trigger),
        echo: Box::new(rig.echo),
        buzzer: Box::new(rig.buzzer),
        light: Box::new(rig.light),
        led: Box::new(rig.led),
        trace_len: None,
    })
}

#[cfg(not(feature = "hardware"))]
pub fn open_peripherals(_cfg: &Config, trace: Option<&Path>) -> Result<Peripherals> {
    use cane_hardware::{EchoScript, SimEcho, SimLightSensor, SimRig};

    let (rig, trace_len) = match trace {
        Some(path) => {
            let rows = cane_config::load_trace_csv(path)?;
            let echo = SimEcho::new(rows.iter().map(|r| match r.distance_cm {
                Some(cm) => EchoScript::Distance(cm),
                None => EchoScript::NoEcho,
            }));
            let light = SimLightSensor::new(rows.iter().map(|r| r.light));
            tracing::info!(rows = rows.len(), path = %path.display(), "replaying trace");
            (SimRig::new(echo, light), Some(rows.len()))
        }
        None => (SimRig::demo_walk(), None),
    };
    tracing::info!("simulated rig");
    Ok(Peripherals {
        trigger: Box::new(rig.trigger),
        echo: Box::new(rig.echo),
        buzzer: Box::new(rig.buzzer),
        light: Box::new(rig.light),
        led: Box::new(rig.led),
        trace_len,
    })
}

fn report_json(r: &CycleReport) -> Option<String> {
    let CycleOutcome::Assessed(a) = r.outcome else {
        return None;
    };
    Some(
        serde_json::json!({
            "at_ms": r.at_ms,
            "distance_cm": r.distance.cm,
            "echo": r.distance.is_echo(),
            "closing_speed_cm_s": a.closing_speed_cm_s,
            "tier": a.tier.as_str(),
            "alerted": a.alerted,
            "led": r.light.map(|l| l.led_on),
        })
        .to_string(),
    )
}

pub fn run_loop(
    cfg: &Config,
    args: &RunArgs,
    json: bool,
    shutdown: Arc<AtomicBool>,
) -> Result<LoopStats> {
    setup_rt_once(args.rt, args.rt_prio);

    let p = open_peripherals(cfg, args.trace.as_deref())?;
    let mut ctl = ControlLoop::builder()
        .with_trigger(p.trigger)
        .with_echo(p.echo)
        .with_buzzer(p.buzzer)
        .with_light_sensor(p.light)
        .with_led(p.led)
        .with_config(cfg)
        .with_clock(Box::new(MonotonicClock::new()))
        .build()?;

    // A replayed trace ends with its last row unless told otherwise.
    let max_cycles = args.max_cycles.or(p.trace_len.map(|n| n as u64));
    let params = RunParams::from_loop(&ctl, max_cycles);

    if json {
        eprintln!("Smart cane active");
    } else {
        println!("Smart cane active");
    }
    tracing::info!(
        cycle_delay_ms = params.cycle_delay.as_millis() as u64,
        max_cycles,
        background = ctl.is_background(),
        "control loop start"
    );

    let stats = cane_core::run(&mut ctl, params, &shutdown, |r| {
        if json && let Some(line) = report_json(r) {
            println!("{line}");
        }
    });

    if args.stats {
        print_stats(&stats, params.cycle_delay);
    }
    Ok(stats)
}

/// Print loop statistics to stderr.
fn print_stats(stats: &LoopStats, cycle_delay: Duration) {
    let us = |d: Duration| d.as_micros();
    let min = stats.latency_min.map_or(0, us);
    let avg = stats.latency_avg().map_or(0, us);
    let max = us(stats.latency_max);
    eprintln!("\n--- Cane Stats ---");
    eprintln!("Cycles: {}", stats.cycles);
    eprintln!("Skipped (no velocity estimate): {}", stats.skipped);
    eprintln!("No echo (sentinel used): {}", stats.no_echo);
    eprintln!("Light faults: {}", stats.light_faults);
    for tier in RiskTier::ALL {
        eprintln!("  {tier:<8} {}", stats.tier_count(tier));
    }
    eprintln!("Alerts: {}", stats.alerts);
    eprintln!("Cycle delay (ms): {}", cycle_delay.as_millis());
    eprintln!("Latency min/avg/max (us): {min} / {avg} / {max}");
    eprintln!("------------------\n");
}

/// One light read, one range measurement, one silent buzzer write.
pub fn self_check(cfg: &Config, json: bool) -> Result<()> {
    let p = open_peripherals(cfg, None)?;
    let clock: Arc<dyn cane_traits::Clock + Send + Sync> = Arc::new(MonotonicClock::new());

    let mut light = NightLight::new(p.light, p.led, (&cfg.light).into());
    let light_state = light.update().wrap_err("self-check light path")?;

    let mut range = RangeSensor::new(p.trigger, p.echo, (&cfg.range).into(), clock.clone());
    let distance = range.try_measure();

    let mut alert = AlertActuator::new(p.buzzer, (&cfg.alert).into(), clock);
    alert.silence().wrap_err("self-check buzzer")?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "light": light_state.reading,
                "led": light_state.led_on,
                "distance_cm": distance.as_ref().ok(),
                "echo_fault": distance.as_ref().err().map(ToString::to_string),
                "buzzer": "ok",
            })
        );
    } else {
        println!(
            "light: {} (led {})",
            light_state.reading,
            if light_state.led_on { "on" } else { "off" }
        );
        match &distance {
            Ok(cm) => println!("range: {cm:.1} cm"),
            Err(e) => println!("range: {e}"),
        }
        println!("buzzer: ok");
        println!("OK");
    }
    Ok(())
}
