use std::time::{Duration, Instant};

use crate::error::{HwError, Result};

/// Time the next complete high pulse reported by `is_high`.
///
/// Mirrors the classic pulse-in contract: a pulse already in progress is
/// skipped, then the rising and falling edges are awaited. The whole
/// measurement shares one `timeout` budget; running out at any stage yields
/// `HwError::EchoTimeout`. Busy-waits, since the edges are microseconds apart.
pub fn measure_high_pulse(mut is_high: impl FnMut() -> bool, timeout: Duration) -> Result<Duration> {
    let deadline = Instant::now() + timeout;

    wait_while(&mut is_high, true, deadline)?;
    wait_while(&mut is_high, false, deadline)?;
    let rise = Instant::now();
    wait_while(&mut is_high, true, deadline)?;
    Ok(rise.elapsed())
}

/// Spin until `is_high()` differs from `level`, or fail at `deadline`.
fn wait_while(is_high: &mut impl FnMut() -> bool, level: bool, deadline: Instant) -> Result<()> {
    while is_high() == level {
        if Instant::now() >= deadline {
            return Err(HwError::EchoTimeout);
        }
        std::hint::spin_loop();
    }
    Ok(())
}

/// Saturating conversion of a pulse length to whole microseconds.
#[inline]
pub fn duration_to_us(d: Duration) -> u32 {
    u32::try_from(d.as_micros()).unwrap_or(u32::MAX)
}
