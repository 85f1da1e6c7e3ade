//! Builder for `Monitor`.
//!
//! All collaborators are required; `build()` reports the first one missing
//! and validates the sampler and runner settings.

use sonar_traits::{Clock, DigitalOut, PulseIn};

use crate::config::{RunnerCfg, SamplerCfg, Thresholds};
use crate::detector::{PresenceDetector, PresenceState};
use crate::error::BuildError;
use crate::runner::Monitor;
use crate::sampler::RangeSampler;

pub struct MonitorBuilder<T, E, A, C> {
    trigger: Option<T>,
    echo: Option<E>,
    alert: Option<A>,
    clock: Option<C>,
    sampler: SamplerCfg,
    thresholds: Thresholds,
    runner: RunnerCfg,
}

impl<T, E, A, C> Default for MonitorBuilder<T, E, A, C> {
    fn default() -> Self {
        Self {
            trigger: None,
            echo: None,
            alert: None,
            clock: None,
            sampler: SamplerCfg::default(),
            thresholds: Thresholds::default(),
            runner: RunnerCfg::default(),
        }
    }
}

impl<T, E, A, C> MonitorBuilder<T, E, A, C>
where
    T: DigitalOut,
    E: PulseIn,
    A: DigitalOut,
    C: Clock + Clone,
{
    pub fn with_trigger(mut self, trigger: T) -> Self {
        self.trigger = Some(trigger);
        self
    }

    pub fn with_echo(mut self, echo: E) -> Self {
        self.echo = Some(echo);
        self
    }

    pub fn with_alert(mut self, alert: A) -> Self {
        self.alert = Some(alert);
        self
    }

    pub fn with_clock(mut self, clock: C) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn sampler(mut self, cfg: SamplerCfg) -> Self {
        self.sampler = cfg;
        self
    }

    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn runner(mut self, cfg: RunnerCfg) -> Self {
        self.runner = cfg;
        self
    }

    /// Assemble the monitor and drive the alert low.
    pub fn build(self) -> Result<Monitor<T, E, A, C>, BuildError> {
        let trigger = self.trigger.ok_or(BuildError::MissingTrigger)?;
        let echo = self.echo.ok_or(BuildError::MissingEcho)?;
        let alert = self.alert.ok_or(BuildError::MissingAlert)?;
        let clock = self.clock.ok_or(BuildError::MissingClock)?;
        self.sampler.validate()?;
        if self.runner.period.is_zero() {
            return Err(BuildError::InvalidConfig("runner.period must be > 0"));
        }

        tracing::debug!(
            samples = self.sampler.samples,
            averaging = ?self.sampler.averaging,
            near_cm = self.thresholds.near_cm(),
            far_cm = self.thresholds.far_cm(),
            band_cm = self.thresholds.band_cm(),
            worst_case_measure_ms = self.sampler.worst_case_cycle().as_millis() as u64,
            period_ms = self.runner.period.as_millis() as u64,
            "monitor configured"
        );

        let mut monitor = Monitor {
            sampler: RangeSampler::new(trigger, echo, clock.clone(), self.sampler),
            detector: PresenceDetector::new(self.thresholds),
            state: PresenceState::default(),
            alert,
            clock,
            period: self.runner.period,
            cycle: 0,
            pending_alert: Some(false),
        };
        monitor.flush_alert();
        Ok(monitor)
    }
}
