//! Backend assembly and the `run` / `self-check` commands.

use eyre::{Result, WrapErr};
use serde_json::json;
use sonar_config::Config;
use sonar_core::{CycleReport, Monitor, RunSummary, Transition};
use sonar_traits::MonotonicClock;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use thiserror::Error;

#[cfg(not(feature = "hardware"))]
use sonar_hardware::{SimulatedEcho, SimulatedLine};

#[cfg(not(feature = "hardware"))]
pub type CliMonitor = Monitor<SimulatedLine, SimulatedEcho, SimulatedLine, MonotonicClock>;

#[cfg(feature = "hardware")]
pub type CliMonitor = Monitor<
    sonar_hardware::hcsr04::HardwareTrigger,
    sonar_hardware::hcsr04::HardwareEcho,
    sonar_hardware::hcsr04::HardwareAlert,
    MonotonicClock,
>;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("no echo received in {samples} pings")]
    NoEcho { samples: u8 },
}

/// Build the monitor on the simulated sensor: a recorded trace when given,
/// otherwise the `[simulation]` scene.
#[cfg(not(feature = "hardware"))]
pub fn open_monitor(cfg: &Config, trace: Option<&Path>) -> Result<CliMonitor> {
    let sampler: sonar_core::SamplerCfg = (&cfg.sampler).into();
    let echo = match trace {
        Some(path) => {
            let echoes = sonar_config::load_echo_trace_csv(path)
                .wrap_err_with(|| format!("load echo trace CSV {}", path.display()))?;
            tracing::info!(path = %path.display(), pings = echoes.len(), "replaying echo trace");
            SimulatedEcho::from_trace(echoes)?
        }
        None => SimulatedEcho::from_distances(
            cfg.simulation.distances_cm.clone(),
            usize::from(sampler.samples),
        )?,
    };
    let monitor = Monitor::builder()
        .with_trigger(SimulatedLine::new("trigger"))
        .with_echo(echo)
        .with_alert(SimulatedLine::new("alert"))
        .with_clock(MonotonicClock::new())
        .sampler(sampler)
        .build()?;
    Ok(monitor)
}

/// Build the monitor on the configured GPIO pins.
#[cfg(feature = "hardware")]
pub fn open_monitor(cfg: &Config, trace: Option<&Path>) -> Result<CliMonitor> {
    if trace.is_some() {
        eyre::bail!("--trace replays through the simulated sensor; rebuild without the `hardware` feature");
    }
    let pins = cfg.pins;
    let (trigger, echo, alert) = sonar_hardware::hcsr04::open(pins.trigger, pins.echo, pins.alert)
        .wrap_err("open sensor pins")?;
    tracing::info!(
        trigger = pins.trigger,
        echo = pins.echo,
        alert = pins.alert,
        "gpio backend ready"
    );
    let monitor = Monitor::builder()
        .with_trigger(trigger)
        .with_echo(echo)
        .with_alert(alert)
        .with_clock(MonotonicClock::new())
        .sampler((&cfg.sampler).into())
        .build()?;
    Ok(monitor)
}

/// `run`: tick until Ctrl-C or `cycles`, printing every cycle.
pub fn run(
    cfg: &Config,
    cycles: Option<u64>,
    trace: Option<&Path>,
    json: bool,
    shutdown: &AtomicBool,
) -> Result<RunSummary> {
    let mut monitor = open_monitor(cfg, trace)?;
    let (near_cm, far_cm) = (monitor.thresholds().near_cm(), monitor.thresholds().far_cm());
    let period_ms = monitor.period().as_millis() as u64;
    tracing::info!(near_cm, far_cm, period_ms, "monitor ready");
    if json {
        println!(
            "{}",
            json!({ "event": "ready", "near_cm": near_cm, "far_cm": far_cm, "period_ms": period_ms })
        );
    } else {
        println!("System Ready...");
    }

    let summary = monitor.run(shutdown, cycles, |r| print_cycle(r, json));

    if json {
        println!(
            "{}",
            json!({
                "event": "summary",
                "cycles": summary.cycles,
                "detections": summary.detections,
                "clears": summary.clears,
                "no_echo_cycles": summary.no_echo_cycles,
                "detected": summary.detected,
            })
        );
    } else {
        println!(
            "Stopped after {} cycles (detections: {}, clears: {}, no-echo cycles: {})",
            summary.cycles, summary.detections, summary.clears, summary.no_echo_cycles
        );
    }
    Ok(summary)
}

/// `self-check`: one measurement; fails when nothing echoed back.
pub fn self_check(cfg: &Config, json: bool) -> Result<()> {
    let mut monitor = open_monitor(cfg, None)?;
    let samples = monitor.sampler_cfg().samples;
    let report = monitor.tick();
    let reading = &report.reading;

    if json {
        println!(
            "{}",
            json!({
                "event": "self_check",
                "distance_cm": reading.distance.cm(),
                "valid": reading.valid,
                "samples": samples,
                "echoes_us": reading.echoes_us,
            })
        );
    } else {
        println!(
            "Self-check: {:.2} cm from {}/{} echoes",
            reading.distance.cm(),
            reading.valid,
            samples
        );
    }

    if reading.valid == 0 {
        return Err(CheckError::NoEcho { samples }).wrap_err("self-check failed");
    }
    Ok(())
}

fn print_cycle(r: &CycleReport, json: bool) {
    let d = r.reading.distance;
    if json {
        println!(
            "{}",
            json!({
                "event": "cycle",
                "cycle": r.cycle,
                "distance_cm": d.cm(),
                "distance_in": d.inches(),
                "valid": r.reading.valid,
                "transition": r.transition.name(),
                "detected": r.detected,
            })
        );
        return;
    }
    println!("Distance (cm): {:.2}", d.cm());
    println!("Distance (inch): {:.2}", d.inches());
    match r.transition {
        Transition::EnterDetected => println!("⚠ Intruder detected!"),
        Transition::EnterClear => println!("Area clear"),
        Transition::NoChange => {}
    }
}
