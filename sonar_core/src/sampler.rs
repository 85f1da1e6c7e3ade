//! Multi-ping range sampling.
//!
//! Each measurement fires `samples` trigger pulses, times every echo with a
//! bounded window, and averages the echoes that came back into one distance.
//! Lost echoes and line faults never fail a measurement; they only remove a
//! sub-sample from the sum. A cycle where nothing came back reads as
//! `Distance::NONE`.
use sonar_traits::{Clock, DigitalOut, PulseIn, SOUND_SPEED_CM_PER_US};

use crate::config::{Averaging, SamplerCfg};
use crate::hw_error::{HwFault, classify_hw_error};
use crate::units::Distance;

/// Result of one measurement cycle, with the raw material it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeReading {
    /// Raw echo lengths in microseconds, `0` for no echo.
    pub echoes_us: Vec<u32>,
    /// Echoes that returned (`> 0`).
    pub valid: usize,
    /// Sum of the valid echoes.
    pub sum_us: u64,
    /// Averaged round-trip time.
    pub average_us: u64,
    pub distance: Distance,
}

impl RangeReading {
    /// Reduce one cycle of raw echoes into a distance estimate.
    ///
    /// The average uses integer division. With `FixedCount` the divisor is
    /// `echoes_us.len()` no matter how many echoes were lost.
    pub fn from_echoes(echoes_us: Vec<u32>, averaging: Averaging) -> Self {
        let (valid, sum_us) = echoes_us
            .iter()
            .filter(|&&us| us > 0)
            .fold((0usize, 0u64), |(n, sum), &us| (n + 1, sum + u64::from(us)));

        let divisor = match averaging {
            Averaging::FixedCount => echoes_us.len(),
            Averaging::ValidCount => valid,
        } as u64;
        let average_us = if valid == 0 || divisor == 0 {
            0
        } else {
            sum_us / divisor
        };

        Self {
            echoes_us,
            valid,
            sum_us,
            average_us,
            distance: round_trip_to_distance(average_us),
        }
    }
}

/// One-way distance for a round-trip echo time.
#[inline]
pub fn round_trip_to_distance(average_us: u64) -> Distance {
    Distance::from_cm(average_us as f32 * SOUND_SPEED_CM_PER_US / 2.0)
}

/// Drives the trigger line and times echoes; owns both lines.
pub struct RangeSampler<T, E, C> {
    trigger: T,
    echo: E,
    clock: C,
    cfg: SamplerCfg,
}

impl<T, E, C> RangeSampler<T, E, C>
where
    T: DigitalOut,
    E: PulseIn,
    C: Clock,
{
    pub fn new(trigger: T, echo: E, clock: C, cfg: SamplerCfg) -> Self {
        Self {
            trigger,
            echo,
            clock,
            cfg,
        }
    }

    pub fn cfg(&self) -> &SamplerCfg {
        &self.cfg
    }

    /// Measure and return the averaged distance.
    pub fn measure(&mut self) -> Distance {
        self.measure_reading().distance
    }

    /// Measure and return the full reading.
    pub fn measure_reading(&mut self) -> RangeReading {
        let n = usize::from(self.cfg.samples);
        let mut echoes = Vec::with_capacity(n);
        for i in 0..n {
            let us = self.ping();
            tracing::trace!(sub_sample = i, echo_us = us, "ping");
            echoes.push(us);
            self.clock.sleep(self.cfg.inter_sample);
        }
        let reading = RangeReading::from_echoes(echoes, self.cfg.averaging);
        tracing::debug!(
            valid = reading.valid,
            sum_us = reading.sum_us,
            average_us = reading.average_us,
            distance_cm = reading.distance.cm(),
            "range reading"
        );
        reading
    }

    /// One trigger pulse and echo. Faults degrade to "no echo".
    fn ping(&mut self) -> u32 {
        if let Err(e) = self.fire_trigger() {
            tracing::warn!(error = %e, "trigger write failed; sub-sample skipped");
            if let Err(e) = self.trigger.set_low() {
                tracing::warn!(error = %e, "trigger reset failed");
            }
            return 0;
        }
        match self.echo.pulse_in(self.cfg.echo_timeout) {
            Ok(us) => us,
            Err(e) => {
                match classify_hw_error(e.as_ref()) {
                    HwFault::Timeout => tracing::trace!("echo timeout"),
                    HwFault::Fault(msg) => {
                        tracing::warn!(error = %msg, "echo read failed; sub-sample skipped")
                    }
                }
                0
            }
        }
    }

    /// Low settle, fixed-width high pulse, back low.
    fn fire_trigger(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.trigger.set_low()?;
        self.clock.sleep(self.cfg.trigger_settle);
        self.trigger.set_high()?;
        self.clock.sleep(self.cfg.trigger_pulse);
        self.trigger.set_low()?;
        Ok(())
    }
}
