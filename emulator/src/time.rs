//! Monotonic time sources for the two front-ends.

use std::cell::Cell;
use std::time::Instant as HostInstant;

use clock_core::scheduler::{Instant, Monotonic, Sleeper};

/// Simulated time that only moves when the scheduler sleeps. Scripted runs are
/// deterministic because of it.
#[derive(Debug, Default)]
pub struct VirtualClock {
    now: Cell<Instant>,
}

impl Monotonic for VirtualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

impl Sleeper for VirtualClock {
    fn sleep_until(&mut self, deadline: Instant) {
        if deadline > self.now.get() {
            self.now.set(deadline);
        }
    }
}

/// Wall time since the emulator started.
#[derive(Debug)]
pub struct HostClock {
    origin: HostInstant,
}

impl HostClock {
    pub fn new() -> Self {
        Self {
            origin: HostInstant::now(),
        }
    }
}

impl Monotonic for HostClock {
    fn now(&self) -> Instant {
        let micros = self.origin.elapsed().as_micros();
        Instant::from_micros(u64::try_from(micros).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_clock_never_runs_backwards() {
        let mut clock = VirtualClock::default();
        clock.sleep_until(Instant::from_millis(40));
        clock.sleep_until(Instant::from_millis(10));
        assert_eq!(clock.now(), Instant::from_millis(40));
    }
}
