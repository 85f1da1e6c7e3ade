#![no_main]
use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;
use sonar_core::config::{FAR_CM, NEAR_CM};
use sonar_core::{Averaging, PresenceDetector, PresenceState, RangeReading, Thresholds, Transition};

#[derive(Debug, Arbitrary)]
struct Input {
    valid_only: bool,
    cycles: Vec<[u32; 5]>,
}

fuzz_target!(|input: Input| {
    let Ok(thresholds) = Thresholds::new(NEAR_CM, FAR_CM) else {
        return;
    };
    let detector = PresenceDetector::new(thresholds);
    let averaging = if input.valid_only {
        Averaging::ValidCount
    } else {
        Averaging::FixedCount
    };
    let mut state = PresenceState::default();
    for echoes in input.cycles {
        let reading = RangeReading::from_echoes(echoes.to_vec(), averaging);
        let d = reading.distance.cm();
        assert!(d.is_finite() && d >= 0.0);
        let before = state.is_detected();
        let t = detector.update(reading.distance, &mut state);
        match t {
            Transition::EnterDetected => assert!(!before && d > 0.0 && d < NEAR_CM),
            Transition::EnterClear => assert!(before && d > FAR_CM),
            Transition::NoChange => assert_eq!(before, state.is_detected()),
        }
    }
});
