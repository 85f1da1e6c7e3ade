use std::thread;
use std::time::{Duration, Instant};

/// Below this, `MonotonicClock::sleep` spins instead of yielding to the scheduler.
const SPIN_THRESHOLD: Duration = Duration::from_micros(100);

/// Monotonic clock abstraction for pulse timing and loop pacing.
///
/// - now(): returns a monotonic Instant
/// - sleep(): waits for the provided duration (implementations may simulate)
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);
}

/// Default, real-time monotonic clock backed by std::time::Instant.
///
/// Microsecond waits (trigger pulse shaping) busy-wait; a thread sleep on
/// Linux overshoots them by tens of microseconds.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        if d < SPIN_THRESHOLD {
            let deadline = Instant::now() + d;
            while Instant::now() < deadline {
                std::hint::spin_loop();
            }
            return;
        }
        thread::sleep(d);
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_clock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Deterministic clock whose time only moves when someone sleeps on it.
    ///
    /// Clones share the same timeline, so a simulated line holding a clone
    /// sees the waits performed by the sampler.
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        origin: Instant,
        offset: Arc<Mutex<Duration>>,
    }

    impl Default for ManualClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ManualClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                offset: Arc::new(Mutex::new(Duration::ZERO)),
            }
        }

        /// Advance the clock by the given duration.
        pub fn advance(&self, d: Duration) {
            if let Ok(mut off) = self.offset.lock() {
                *off = off.saturating_add(d);
            }
        }

        /// Virtual time elapsed since construction.
        pub fn elapsed(&self) -> Duration {
            self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO)
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.origin + self.elapsed()
        }

        fn sleep(&self, d: Duration) {
            self.advance(d);
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_short_sleep_waits_at_least_requested() {
        let clock = MonotonicClock::new();
        let start = clock.now();
        clock.sleep(Duration::from_micros(20));
        assert!(clock.now().duration_since(start) >= Duration::from_micros(20));
    }
}
