//! Hardware capability traits shared by the core, the hardware backends and the CLI.
//!
//! The detector needs exactly three things from the platform: drive a digital line,
//! time the high phase of a digital line, and wait. Everything else is plumbing.
pub mod clock;

pub use clock::{Clock, MonotonicClock};

#[cfg(any(test, feature = "test-util"))]
pub use clock::test_clock::ManualClock;

/// Speed of sound in air at room temperature, centimeters per microsecond.
pub const SOUND_SPEED_CM_PER_US: f32 = 0.034;

/// A digital output line (sensor trigger, alert buzzer).
pub trait DigitalOut {
    fn set_high(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn set_low(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Drive the line to `high`.
    fn set_level(&mut self, high: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if high { self.set_high() } else { self.set_low() }
    }
}

/// A digital input line able to time a high pulse.
pub trait PulseIn {
    /// Length of the next high pulse in microseconds.
    ///
    /// Returns `Ok(0)` when no complete pulse was observed within `timeout`;
    /// a missing echo is not an error.
    fn pulse_in(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<u32, Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: DigitalOut + ?Sized> DigitalOut for Box<T> {
    fn set_high(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).set_high()
    }
    fn set_low(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).set_low()
    }
}

impl<T: PulseIn + ?Sized> PulseIn for Box<T> {
    fn pulse_in(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<u32, Box<dyn std::error::Error + Send + Sync>> {
        (**self).pulse_in(timeout)
    }
}
