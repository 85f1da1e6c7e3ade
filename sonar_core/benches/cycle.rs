use criterion::{Criterion, black_box, criterion_group, criterion_main};
use sonar_core::mocks::NullLine;
use sonar_core::{Averaging, Distance, Monitor, PresenceDetector, PresenceState, RangeReading};
use sonar_hardware::{SimulatedEcho, SimulatedLine};
use sonar_traits::ManualClock;

fn bench_reduce(c: &mut Criterion) {
    let echoes = vec![294u32, 0, 296, 292, 0];
    c.bench_function("reduce_five_echoes", |b| {
        b.iter(|| RangeReading::from_echoes(black_box(echoes.clone()), Averaging::FixedCount))
    });
}

fn bench_detector(c: &mut Criterion) {
    let det = PresenceDetector::default();
    let readings: Vec<Distance> = [20.0, 5.0, 7.0, 9.0, 0.0, 3.0]
        .into_iter()
        .map(Distance::from_cm)
        .collect();
    c.bench_function("detector_update", |b| {
        let mut state = PresenceState::default();
        b.iter(|| {
            for &d in &readings {
                black_box(det.update(d, &mut state));
            }
        })
    });
}

fn bench_tick(c: &mut Criterion) {
    let echo = SimulatedEcho::from_distances(vec![20.0, 5.0, 7.0, 9.0], 5).expect("scene");
    let mut monitor = Monitor::builder()
        .with_trigger(NullLine)
        .with_echo(echo)
        .with_alert(SimulatedLine::new("alert"))
        .with_clock(ManualClock::new())
        .build()
        .expect("build monitor");
    c.bench_function("monitor_tick_simulated", |b| b.iter(|| black_box(monitor.tick())));
}

criterion_group!(benches, bench_reduce, bench_detector, bench_tick);
criterion_main!(benches);
