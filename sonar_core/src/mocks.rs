//! Test and helper mocks for sonar_core

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

use sonar_traits::{Clock, DigitalOut, PulseIn};

/// Output line that ignores every write.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLine;

impl DigitalOut for NullLine {
    fn set_high(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
    fn set_low(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

/// Echo line that replays a fixed script, then reports no echo forever.
///
/// Clones share the script and the call log.
#[derive(Debug, Default, Clone)]
pub struct ScriptedEcho {
    script: Rc<RefCell<VecDeque<Result<u32, &'static str>>>>,
    timeouts: Rc<RefCell<Vec<Duration>>>,
}

impl ScriptedEcho {
    pub fn new(echoes_us: impl IntoIterator<Item = u32>) -> Self {
        Self::from_script(echoes_us.into_iter().map(Ok))
    }

    /// Script entries are either an echo length or a line error message.
    pub fn from_script(script: impl IntoIterator<Item = Result<u32, &'static str>>) -> Self {
        Self {
            script: Rc::new(RefCell::new(script.into_iter().collect())),
            timeouts: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Timeouts passed to each `pulse_in` call so far.
    pub fn timeouts(&self) -> Vec<Duration> {
        self.timeouts.borrow().clone()
    }
}

impl PulseIn for ScriptedEcho {
    fn pulse_in(
        &mut self,
        timeout: Duration,
    ) -> Result<u32, Box<dyn std::error::Error + Send + Sync>> {
        self.timeouts.borrow_mut().push(timeout);
        match self.script.borrow_mut().pop_front() {
            Some(Ok(us)) => Ok(us),
            Some(Err(msg)) => Err(msg.into()),
            None => Ok(0),
        }
    }
}

/// Output line that records every level change with the clock's timestamp.
///
/// Clones share the log, so keep one as a probe. Writes can be made to fail
/// with `fail_next`.
#[derive(Debug, Clone)]
pub struct RecordingLine<C> {
    clock: C,
    log: Rc<RefCell<Vec<(Instant, bool)>>>,
    failures: Rc<Cell<u32>>,
}

impl<C: Clock> RecordingLine<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            log: Rc::new(RefCell::new(Vec::new())),
            failures: Rc::new(Cell::new(0)),
        }
    }

    /// Recorded `(timestamp, level)` pairs, oldest first.
    pub fn events(&self) -> Vec<(Instant, bool)> {
        self.log.borrow().clone()
    }

    /// Recorded levels without timestamps.
    pub fn levels(&self) -> Vec<bool> {
        self.log.borrow().iter().map(|&(_, l)| l).collect()
    }

    /// Make the next `n` writes fail without changing the recorded level.
    pub fn fail_next(&self, n: u32) {
        self.failures.set(n);
    }

    fn write(&mut self, high: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let pending = self.failures.get();
        if pending > 0 {
            self.failures.set(pending - 1);
            return Err("line write failed".into());
        }
        self.log.borrow_mut().push((self.clock.now(), high));
        Ok(())
    }
}

impl<C: Clock> DigitalOut for RecordingLine<C> {
    fn set_high(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.write(true)
    }
    fn set_low(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.write(false)
    }
}
