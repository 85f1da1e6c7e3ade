use std::time::Duration;

use sonar_core::mocks::{NullLine, RecordingLine, ScriptedEcho};
use sonar_core::{Averaging, Distance, RangeSampler, SamplerCfg};
use sonar_traits::{Clock, ManualClock, SOUND_SPEED_CM_PER_US};

fn expected_cm(sum_us: u64, divisor: u64) -> f32 {
    (sum_us / divisor) as f32 * SOUND_SPEED_CM_PER_US / 2.0
}

#[test]
fn trigger_pulse_shape_and_spacing() {
    let clock = ManualClock::new();
    let probe = RecordingLine::new(clock.clone());
    let mut sampler = RangeSampler::new(
        probe.clone(),
        ScriptedEcho::new([294; 5]),
        clock.clone(),
        SamplerCfg::default(),
    );

    let start = clock.now();
    sampler.measure();

    let events = probe.events();
    assert_eq!(events.len(), 15, "three trigger writes per ping");
    let ping_span = Duration::from_micros(12) + Duration::from_millis(10);
    for (k, ping) in events.chunks(3).enumerate() {
        let base = ping_span * k as u32;
        let at = |i: usize| ping[i].0.duration_since(start);
        assert_eq!(ping[0].1, false, "ping {k} starts low");
        assert_eq!(at(0), base);
        assert_eq!(ping[1].1, true, "ping {k} goes high");
        assert_eq!(at(1), base + Duration::from_micros(2));
        assert_eq!(ping[2].1, false, "ping {k} ends low");
        assert_eq!(at(2), base + Duration::from_micros(12));
    }
    assert_eq!(clock.elapsed(), ping_span * 5);
}

#[test]
fn every_echo_uses_the_30ms_window() {
    let echo = ScriptedEcho::new([100; 5]);
    let mut sampler = RangeSampler::new(
        NullLine,
        echo.clone(),
        ManualClock::new(),
        SamplerCfg::default(),
    );
    let reading = sampler.measure_reading();
    assert_eq!(reading.echoes_us, vec![100; 5]);
    assert_eq!(echo.timeouts(), vec![Duration::from_micros(30_000); 5]);
}

#[test]
fn averages_steady_echoes() {
    let mut sampler = RangeSampler::new(
        NullLine,
        ScriptedEcho::new([294, 296, 292, 294, 294]),
        ManualClock::new(),
        SamplerCfg::default(),
    );
    let d = sampler.measure();
    assert!((d.cm() - expected_cm(1470, 5)).abs() < 1e-6);
    assert!(d.cm() < 6.0);
}

#[test]
fn lost_echoes_bias_low_under_fixed_count() {
    let mut sampler = RangeSampler::new(
        NullLine,
        ScriptedEcho::new([500, 0, 500, 0, 500]),
        ManualClock::new(),
        SamplerCfg::default(),
    );
    let r = sampler.measure_reading();
    assert_eq!(r.valid, 3);
    assert_eq!(r.average_us, 300);
    assert!((r.distance.cm() - expected_cm(1500, 5)).abs() < 1e-6);
}

#[test]
fn valid_count_policy_ignores_lost_echoes() {
    let cfg = SamplerCfg {
        averaging: Averaging::ValidCount,
        ..SamplerCfg::default()
    };
    let mut sampler = RangeSampler::new(
        NullLine,
        ScriptedEcho::new([500, 0, 500, 0, 500]),
        ManualClock::new(),
        cfg,
    );
    let r = sampler.measure_reading();
    assert_eq!(r.average_us, 500);
    assert!((r.distance.cm() - 8.5).abs() < 1e-4);
}

#[test]
fn total_signal_loss_reads_zero() {
    let mut sampler = RangeSampler::new(
        NullLine,
        ScriptedEcho::new([0; 5]),
        ManualClock::new(),
        SamplerCfg::default(),
    );
    assert_eq!(sampler.measure(), Distance::NONE);
}

#[test]
fn echo_line_errors_count_as_timeouts() {
    let mut sampler = RangeSampler::new(
        NullLine,
        ScriptedEcho::from_script([
            Ok(300),
            Err("gpio glitch"),
            Ok(300),
            Err("echo timeout"),
            Ok(300),
        ]),
        ManualClock::new(),
        SamplerCfg::default(),
    );
    let r = sampler.measure_reading();
    assert_eq!(r.echoes_us, vec![300, 0, 300, 0, 300]);
    assert_eq!(r.valid, 3);
    assert_eq!(r.average_us, 180);
}

#[test]
fn trigger_write_failure_skips_the_ping() {
    let clock = ManualClock::new();
    let trigger = RecordingLine::new(clock.clone());
    trigger.fail_next(1);
    let echo = ScriptedEcho::new([300; 5]);
    let mut sampler = RangeSampler::new(
        trigger.clone(),
        echo.clone(),
        clock,
        SamplerCfg::default(),
    );
    let r = sampler.measure_reading();
    // The first ping never fired, so only four echoes were consumed.
    assert_eq!(echo.timeouts().len(), 4);
    assert_eq!(r.echoes_us, vec![0, 300, 300, 300, 300]);
    assert_eq!(r.sum_us, 1200);
    assert_eq!(r.average_us, 240);
    // The skipped ping still left the line low.
    assert_eq!(trigger.levels().first(), Some(&false));
}

#[test]
fn sampler_keeps_no_state_between_cycles() {
    let mut sampler = RangeSampler::new(
        NullLine,
        ScriptedEcho::new([294, 294, 294, 294, 294, 0, 0, 0, 0, 0]),
        ManualClock::new(),
        SamplerCfg::default(),
    );
    assert!(sampler.measure().has_echo());
    assert_eq!(sampler.measure(), Distance::NONE);
}

#[test]
fn failed_trigger_reset_does_not_stop_the_cycle() {
    let clock = ManualClock::new();
    let trigger = RecordingLine::new(clock.clone());
    // First ping: the initial low write and the reset write both fail.
    trigger.fail_next(2);
    let echo = ScriptedEcho::new([300; 5]);
    let mut sampler = RangeSampler::new(
        trigger.clone(),
        echo.clone(),
        clock,
        SamplerCfg::default(),
    );
    let r = sampler.measure_reading();
    assert_eq!(r.echoes_us, vec![0, 300, 300, 300, 300]);
    assert_eq!(echo.timeouts().len(), 4);
    // Four full pulses recorded, nothing for the failed ping.
    assert_eq!(trigger.levels().len(), 12);
}
