//! Runtime configuration for the sampler, detector and monitor loop.
//!
//! These are the fixed operating constants of the detector. Only the
//! averaging policy is taken from the TOML file in `sonar_config`.

use std::time::Duration;

use crate::error::BuildError;

/// Sub-samples averaged per measurement cycle.
pub const SAMPLES_PER_CYCLE: u8 = 5;
/// Echo window; longer echoes (beyond ~5 m) count as no echo.
pub const ECHO_TIMEOUT: Duration = Duration::from_micros(30_000);
/// Low settle time before the trigger pulse.
pub const TRIGGER_SETTLE: Duration = Duration::from_micros(2);
/// Trigger pulse width required by the sensor.
pub const TRIGGER_PULSE: Duration = Duration::from_micros(10);
/// Pause between sub-samples so one ping's echo does not bleed into the next.
pub const INTER_SAMPLE_DELAY: Duration = Duration::from_millis(10);
/// Monitor cadence (2 Hz).
pub const CYCLE_PERIOD: Duration = Duration::from_millis(500);
/// Enter "detected" strictly below this distance (cm).
pub const NEAR_CM: f32 = 6.0;
/// Return to "clear" strictly above this distance (cm).
pub const FAR_CM: f32 = 8.0;

/// Divisor policy for the per-cycle average.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Averaging {
    /// Divide the echo sum by the sub-sample count, valid or not.
    /// Timeouts pull the estimate down; kept for field-calibrated devices.
    #[default]
    FixedCount,
    /// Divide by the number of sub-samples that returned an echo.
    ValidCount,
}

/// Sampler timing and reduction settings.
#[derive(Debug, Clone)]
pub struct SamplerCfg {
    /// Pings per measurement cycle.
    pub samples: u8,
    /// Max wait for one echo.
    pub echo_timeout: Duration,
    /// Trigger held low before the pulse.
    pub trigger_settle: Duration,
    /// Trigger high time.
    pub trigger_pulse: Duration,
    /// Wait after each ping.
    pub inter_sample: Duration,
    pub averaging: Averaging,
}

impl Default for SamplerCfg {
    fn default() -> Self {
        Self {
            samples: SAMPLES_PER_CYCLE,
            echo_timeout: ECHO_TIMEOUT,
            trigger_settle: TRIGGER_SETTLE,
            trigger_pulse: TRIGGER_PULSE,
            inter_sample: INTER_SAMPLE_DELAY,
            averaging: Averaging::FixedCount,
        }
    }
}

impl SamplerCfg {
    /// Worst-case blocking time of one measurement (every ping timing out).
    pub fn worst_case_cycle(&self) -> Duration {
        let per_ping =
            self.trigger_settle + self.trigger_pulse + self.echo_timeout + self.inter_sample;
        per_ping * u32::from(self.samples)
    }

    pub(crate) fn validate(&self) -> Result<(), BuildError> {
        if self.samples == 0 {
            return Err(BuildError::InvalidConfig("sampler.samples must be >= 1"));
        }
        if self.echo_timeout.is_zero() {
            return Err(BuildError::InvalidConfig("sampler.echo_timeout must be > 0"));
        }
        if self.trigger_pulse.is_zero() {
            return Err(BuildError::InvalidConfig("sampler.trigger_pulse must be > 0"));
        }
        Ok(())
    }
}

/// Hysteresis thresholds in centimeters; `near < far`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    near_cm: f32,
    far_cm: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            near_cm: NEAR_CM,
            far_cm: FAR_CM,
        }
    }
}

impl Thresholds {
    pub fn new(near_cm: f32, far_cm: f32) -> Result<Self, BuildError> {
        let ok = near_cm.is_finite() && far_cm.is_finite() && near_cm >= 0.0 && near_cm < far_cm;
        if !ok {
            return Err(BuildError::InvalidThresholds {
                near: near_cm,
                far: far_cm,
            });
        }
        Ok(Self { near_cm, far_cm })
    }

    #[inline]
    pub fn near_cm(&self) -> f32 {
        self.near_cm
    }

    #[inline]
    pub fn far_cm(&self) -> f32 {
        self.far_cm
    }

    /// Width of the dead band between detect and clear.
    #[inline]
    pub fn band_cm(&self) -> f32 {
        self.far_cm - self.near_cm
    }
}

/// Monitor loop settings.
#[derive(Debug, Clone)]
pub struct RunnerCfg {
    /// Sleep after each cycle.
    pub period: Duration,
}

impl Default for RunnerCfg {
    fn default() -> Self {
        Self {
            period: CYCLE_PERIOD,
        }
    }
}
