//! Monotonic time used by the scheduler.

use core::ops::Add;
use core::time::Duration;

/// Microsecond timestamp from an arbitrary monotonic epoch (usually boot).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Instant(u64);

impl Instant {
    /// The epoch itself.
    pub const ZERO: Self = Self(0);

    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis.saturating_mul(1_000))
    }

    pub const fn as_micros(self) -> u64 {
        self.0
    }

    pub const fn as_millis(self) -> u64 {
        self.0 / 1_000
    }

    /// Time elapsed since `earlier`, or zero when `earlier` is in the future.
    pub const fn saturating_duration_since(self, earlier: Self) -> Duration {
        Duration::from_micros(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for Instant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        let micros = u64::try_from(rhs.as_micros()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(micros))
    }
}

/// Source of monotonic timestamps.
pub trait Monotonic {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

impl<M: Monotonic + ?Sized> Monotonic for &M {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Monotonic source that can also block the caller until a deadline.
pub trait Sleeper: Monotonic {
    /// Blocks until `deadline`; returns immediately when it already passed.
    fn sleep_until(&mut self, deadline: Instant);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addition_saturates() {
        let late = Instant::from_micros(u64::MAX - 5);
        assert_eq!(late + Duration::from_secs(1), Instant::from_micros(u64::MAX));
    }

    #[test]
    fn duration_since_never_goes_negative() {
        let early = Instant::from_millis(5);
        let late = Instant::from_millis(12);
        assert_eq!(late.saturating_duration_since(early), Duration::from_millis(7));
        assert_eq!(early.saturating_duration_since(late), Duration::ZERO);
    }
}
