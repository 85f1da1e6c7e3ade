//! The measurement loop: sample, decide, drive the alert, sleep.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use sonar_traits::{Clock, DigitalOut, PulseIn};

use crate::builder::MonitorBuilder;
use crate::config::{SamplerCfg, Thresholds};
use crate::detector::{PresenceDetector, PresenceState, Transition};
use crate::sampler::{RangeReading, RangeSampler};

/// What happened in one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// 1-based cycle counter.
    pub cycle: u64,
    pub reading: RangeReading,
    pub transition: Transition,
    /// Presence state after this cycle.
    pub detected: bool,
}

/// Totals for a `run`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub detections: u64,
    pub clears: u64,
    /// Cycles where no sub-sample returned an echo.
    pub no_echo_cycles: u64,
    /// Presence state when the run ended.
    pub detected: bool,
}

impl RunSummary {
    fn record(&mut self, report: &CycleReport) {
        self.cycles += 1;
        match report.transition {
            Transition::EnterDetected => self.detections += 1,
            Transition::EnterClear => self.clears += 1,
            Transition::NoChange => {}
        }
        if report.reading.valid == 0 {
            self.no_echo_cycles += 1;
        }
        self.detected = report.detected;
    }
}

/// Sampler, detector, presence state and alert output, ticking on one thread.
pub struct Monitor<T, E, A, C> {
    pub(crate) sampler: RangeSampler<T, E, C>,
    pub(crate) detector: PresenceDetector,
    pub(crate) state: PresenceState,
    pub(crate) alert: A,
    pub(crate) clock: C,
    pub(crate) period: Duration,
    pub(crate) cycle: u64,
    /// Alert level that still has to reach the output after a failed write.
    pub(crate) pending_alert: Option<bool>,
}

impl<T, E, A, C> core::fmt::Debug for Monitor<T, E, A, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Monitor")
            .field("cycle", &self.cycle)
            .field("detected", &self.state.is_detected())
            .field("period", &self.period)
            .field("pending_alert", &self.pending_alert)
            .finish()
    }
}

impl<T, E, A, C> Monitor<T, E, A, C>
where
    T: DigitalOut,
    E: PulseIn,
    A: DigitalOut,
    C: Clock + Clone,
{
    /// Start building a Monitor.
    pub fn builder() -> MonitorBuilder<T, E, A, C> {
        MonitorBuilder::default()
    }

    pub fn state(&self) -> PresenceState {
        self.state
    }

    pub fn thresholds(&self) -> &Thresholds {
        self.detector.thresholds()
    }

    pub fn sampler_cfg(&self) -> &SamplerCfg {
        self.sampler.cfg()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Cycles completed so far.
    pub fn cycles(&self) -> u64 {
        self.cycle
    }

    /// One measure-and-decide cycle. Does not sleep afterwards.
    pub fn tick(&mut self) -> CycleReport {
        self.cycle += 1;
        self.flush_alert();

        let reading = self.sampler.measure_reading();
        let transition = self.detector.update(reading.distance, &mut self.state);

        tracing::info!(
            cycle = self.cycle,
            distance_cm = reading.distance.cm(),
            distance_in = reading.distance.inches(),
            valid = reading.valid,
            "distance"
        );
        match transition {
            Transition::EnterDetected => {
                tracing::warn!(distance_cm = reading.distance.cm(), "intruder detected")
            }
            Transition::EnterClear => {
                tracing::info!(distance_cm = reading.distance.cm(), "area clear")
            }
            Transition::NoChange => {}
        }

        if let Some(level) = transition.alert_level() {
            self.pending_alert = Some(level);
            self.flush_alert();
        }

        CycleReport {
            cycle: self.cycle,
            reading,
            transition,
            detected: self.state.is_detected(),
        }
    }

    /// Tick until `shutdown` is raised or `max_cycles` have run, sleeping the
    /// cycle period between ticks. `on_cycle` sees every report.
    pub fn run<F>(
        &mut self,
        shutdown: &AtomicBool,
        max_cycles: Option<u64>,
        mut on_cycle: F,
    ) -> RunSummary
    where
        F: FnMut(&CycleReport),
    {
        let mut summary = RunSummary {
            detected: self.state.is_detected(),
            ..RunSummary::default()
        };
        let done = |n: u64| max_cycles.is_some_and(|max| n >= max);

        while !done(summary.cycles) {
            if shutdown.load(Ordering::Relaxed) {
                tracing::debug!("monitor received shutdown signal");
                break;
            }
            let report = self.tick();
            summary.record(&report);
            on_cycle(&report);
            if done(summary.cycles) || shutdown.load(Ordering::Relaxed) {
                break;
            }
            self.clock.sleep(self.period);
        }

        tracing::info!(
            cycles = summary.cycles,
            detections = summary.detections,
            clears = summary.clears,
            no_echo_cycles = summary.no_echo_cycles,
            "monitor stopped"
        );
        summary
    }

    /// Push the pending alert level to the output; keep it pending on failure.
    pub(crate) fn flush_alert(&mut self) {
        let Some(level) = self.pending_alert else {
            return;
        };
        match self.alert.set_level(level) {
            Ok(()) => {
                self.pending_alert = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, level, "alert write failed; retrying next cycle");
            }
        }
    }
}
