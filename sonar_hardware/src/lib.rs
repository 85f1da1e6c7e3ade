//! Sensor and alert backends.
//!
//! The simulated backend runs anywhere and is what the CLI uses unless the
//! `hardware` feature selects the Raspberry Pi GPIO implementation.
pub mod error;
#[cfg(feature = "hardware")]
pub mod hcsr04;
pub mod util;

use sonar_traits::{DigitalOut, PulseIn, SOUND_SPEED_CM_PER_US};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::error::{HwError, Result};

/// Round-trip echo time in microseconds for an object at `cm`.
///
/// Zero, negative and non-finite distances model "nothing in front of the sensor".
pub fn echo_us_for_cm(cm: f32) -> u32 {
    if !cm.is_finite() || cm <= 0.0 {
        return 0;
    }
    let us = (cm * 2.0 / SOUND_SPEED_CM_PER_US).round();
    if us >= u32::MAX as f32 { u32::MAX } else { us as u32 }
}

/// Simulated output line; remembers the last level driven.
///
/// Clones share state, so keep one as a probe before handing the line over.
#[derive(Debug, Clone)]
pub struct SimulatedLine {
    name: &'static str,
    high: Rc<Cell<bool>>,
    writes: Rc<Cell<u32>>,
}

impl SimulatedLine {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            high: Rc::new(Cell::new(false)),
            writes: Rc::new(Cell::new(0)),
        }
    }

    pub fn is_high(&self) -> bool {
        self.high.get()
    }

    /// Number of level writes seen so far.
    pub fn writes(&self) -> u32 {
        self.writes.get()
    }

    fn drive(&mut self, high: bool) {
        self.high.set(high);
        self.writes.set(self.writes.get().saturating_add(1));
        tracing::trace!(line = self.name, high, "simulated line write");
    }
}

impl DigitalOut for SimulatedLine {
    fn set_high(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.drive(true);
        Ok(())
    }
    fn set_low(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.drive(false);
        Ok(())
    }
}

#[derive(Debug)]
enum EchoSource {
    /// One object distance per measurement cycle, each held for `per_cycle` pings.
    Scene {
        distances_cm: Vec<f32>,
        per_cycle: usize,
    },
    /// Recorded raw echo lengths, one per ping.
    Trace { echoes_us: Vec<u32> },
}

/// Simulated echo line, replaying a scene or a recorded trace in a loop.
#[derive(Debug)]
pub struct SimulatedEcho {
    source: EchoSource,
    ping: usize,
}

impl SimulatedEcho {
    /// Scene of object distances in centimeters, one per cycle of `per_cycle` pings.
    pub fn from_distances(distances_cm: Vec<f32>, per_cycle: usize) -> Result<Self> {
        if distances_cm.is_empty() {
            return Err(HwError::EmptyTrace);
        }
        Ok(Self {
            source: EchoSource::Scene {
                distances_cm,
                per_cycle: per_cycle.max(1),
            },
            ping: 0,
        })
    }

    /// Raw echo lengths in microseconds, one per ping.
    pub fn from_trace(echoes_us: Vec<u32>) -> Result<Self> {
        if echoes_us.is_empty() {
            return Err(HwError::EmptyTrace);
        }
        Ok(Self {
            source: EchoSource::Trace { echoes_us },
            ping: 0,
        })
    }

    fn next_echo_us(&mut self) -> u32 {
        let us = match &self.source {
            EchoSource::Scene {
                distances_cm,
                per_cycle,
            } => {
                let idx = (self.ping / per_cycle) % distances_cm.len();
                echo_us_for_cm(distances_cm[idx])
            }
            EchoSource::Trace { echoes_us } => echoes_us[self.ping % echoes_us.len()],
        };
        self.ping = self.ping.wrapping_add(1);
        us
    }
}

impl PulseIn for SimulatedEcho {
    fn pulse_in(
        &mut self,
        timeout: Duration,
    ) -> std::result::Result<u32, Box<dyn std::error::Error + Send + Sync>> {
        let us = self.next_echo_us();
        if u128::from(us) > timeout.as_micros() {
            tracing::trace!(echo_us = us, "simulated echo beyond timeout");
            return Ok(0);
        }
        Ok(us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TIMEOUT: Duration = Duration::from_micros(30_000);

    #[rstest]
    #[case(5.0, 294)]
    #[case(7.0, 412)]
    #[case(9.0, 529)]
    #[case(0.0, 0)]
    #[case(-3.0, 0)]
    #[case(f32::NAN, 0)]
    fn echo_time_for_distance(#[case] cm: f32, #[case] us: u32) {
        assert_eq!(echo_us_for_cm(cm), us);
    }

    #[test]
    fn scene_holds_each_distance_for_a_cycle() {
        let mut echo = SimulatedEcho::from_distances(vec![5.0, 9.0], 2).unwrap();
        let got: Vec<u32> = (0..6).map(|_| echo.pulse_in(TIMEOUT).unwrap()).collect();
        assert_eq!(got, vec![294, 294, 529, 529, 294, 294]);
    }

    #[test]
    fn echo_beyond_timeout_reads_as_zero() {
        // 600 cm needs ~35 ms round trip, past the 30 ms window
        let mut echo = SimulatedEcho::from_distances(vec![600.0], 5).unwrap();
        assert_eq!(echo.pulse_in(TIMEOUT).unwrap(), 0);
    }

    #[test]
    fn trace_replays_in_order_and_wraps() {
        let mut echo = SimulatedEcho::from_trace(vec![100, 0, 300]).unwrap();
        let got: Vec<u32> = (0..4).map(|_| echo.pulse_in(TIMEOUT).unwrap()).collect();
        assert_eq!(got, vec![100, 0, 300, 100]);
    }

    #[test]
    fn empty_sources_are_rejected() {
        assert!(matches!(
            SimulatedEcho::from_trace(Vec::new()),
            Err(HwError::EmptyTrace)
        ));
        assert!(matches!(
            SimulatedEcho::from_distances(Vec::new(), 5),
            Err(HwError::EmptyTrace)
        ));
    }

    #[test]
    fn simulated_line_tracks_level_through_clone() {
        let probe = SimulatedLine::new("alert");
        let mut line = probe.clone();
        line.set_high().unwrap();
        assert!(probe.is_high());
        line.set_level(false).unwrap();
        assert!(!probe.is_high());
        assert_eq!(probe.writes(), 2);
    }
}
