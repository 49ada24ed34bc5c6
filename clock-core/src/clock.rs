//! Wall-clock date/time and the collaborators that keep it.
//!
//! The committed time lives behind [`WallClock`]; the core reads it through a
//! per-second snapshot and writes it only when clock edit commits, a network
//! sync succeeds, or a saved time is restored.

use core::fmt;

use crate::error::{Peripheral, ServiceError};
use crate::scheduler::Instant;

const SECONDS_PER_DAY: i64 = 86_400;

/// Returns `true` for Gregorian leap years.
pub const fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`; zero for invalid months.
pub const fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Calendar date and time of day, second resolution.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DateTime {
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl DateTime {
    /// Latest representable instant.
    pub const MAX: Self = Self {
        year: 9999,
        month: 12,
        day: 31,
        hour: 23,
        minute: 59,
        second: 59,
    };

    /// Time shown until something sets the clock.
    pub const DEFAULT: Self = Self {
        year: 2024,
        month: 11,
        day: 4,
        hour: 21,
        minute: 30,
        second: 0,
    };

    /// Builds a validated date/time.
    pub const fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Option<Self> {
        if year > 9999
            || month == 0
            || month > 12
            || day == 0
            || day > days_in_month(year, month)
            || hour > 23
            || minute > 59
            || second > 59
        {
            return None;
        }
        Some(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    pub const fn year(&self) -> u16 {
        self.year
    }

    pub const fn month(&self) -> u8 {
        self.month
    }

    pub const fn day(&self) -> u8 {
        self.day
    }

    pub const fn hour(&self) -> u8 {
        self.hour
    }

    pub const fn minute(&self) -> u8 {
        self.minute
    }

    pub const fn second(&self) -> u8 {
        self.second
    }

    /// Returns `[year, month, day, hour, minute, second]`.
    pub fn fields(&self) -> [u16; 6] {
        [
            self.year,
            u16::from(self.month),
            u16::from(self.day),
            u16::from(self.hour),
            u16::from(self.minute),
            u16::from(self.second),
        ]
    }

    /// Builds a date/time from edited fields, clamping each into range.
    ///
    /// The day is clamped to the length of the resulting month, so editing
    /// 31 January into February lands on the 28th or 29th.
    pub fn from_fields_clamped(fields: [u16; 6]) -> Self {
        let [year, month, day, hour, minute, second] = fields;
        let year = year.min(9999);
        let month = clamp_u8(month, 1, 12);
        let day = clamp_u8(day, 1, days_in_month(year, month));
        Self {
            year,
            month,
            day,
            hour: clamp_u8(hour, 0, 23),
            minute: clamp_u8(minute, 0, 59),
            second: clamp_u8(second, 0, 59),
        }
    }

    /// Seconds relative to 1970-01-01T00:00:00 (negative before it).
    pub fn epoch_seconds(&self) -> i64 {
        let days = days_from_civil(i64::from(self.year), self.month, self.day);
        days * SECONDS_PER_DAY
            + i64::from(self.hour) * 3_600
            + i64::from(self.minute) * 60
            + i64::from(self.second)
    }

    /// Inverse of [`DateTime::epoch_seconds`], saturating to years 0-9999.
    pub fn from_epoch_seconds(seconds: i64) -> Self {
        let days = seconds.div_euclid(SECONDS_PER_DAY);
        let secs_of_day = seconds.rem_euclid(SECONDS_PER_DAY);
        let (year, month, day) = civil_from_days(days);
        let Ok(year) = u16::try_from(year) else {
            return if year < 0 {
                Self::from_fields_clamped([0, 1, 1, 0, 0, 0])
            } else {
                Self::MAX
            };
        };
        if year > 9999 {
            return Self::MAX;
        }
        // secs_of_day is in 0..86_400, so every component fits a u8.
        let hour = u8::try_from(secs_of_day / 3_600).unwrap_or(0);
        let minute = u8::try_from(secs_of_day % 3_600 / 60).unwrap_or(0);
        let second = u8::try_from(secs_of_day % 60).unwrap_or(0);
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Returns the date/time `seconds` later.
    #[must_use]
    pub fn add_seconds(self, seconds: u64) -> Self {
        let delta = i64::try_from(seconds).unwrap_or(i64::MAX);
        Self::from_epoch_seconds(self.epoch_seconds().saturating_add(delta))
    }
}

impl Default for DateTime {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for DateTime {
    /// Formats as `YYYY-MM-DD  HH:MM:SS`, exactly one LCD row wide.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}  {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

fn clamp_u8(value: u16, min: u8, max: u8) -> u8 {
    u8::try_from(value.clamp(u16::from(min), u16::from(max))).unwrap_or(max)
}

// Proleptic Gregorian day counting, after Howard Hinnant's civil algorithms.
fn days_from_civil(year: i64, month: u8, day: u8) -> i64 {
    let year = if month <= 2 { year - 1 } else { year };
    let era = year.div_euclid(400);
    let year_of_era = year - era * 400;
    let month = i64::from(month);
    let shifted_month = if month > 2 { month - 3 } else { month + 9 };
    let day_of_year = (153 * shifted_month + 2) / 5 + i64::from(day) - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * 146_097 + day_of_era - 719_468
}

fn civil_from_days(days: i64) -> (i64, u8, u8) {
    let days = days + 719_468;
    let era = days.div_euclid(146_097);
    let day_of_era = days - era * 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1_460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let shifted_month = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * shifted_month + 2) / 5 + 1;
    let month = if shifted_month < 10 {
        shifted_month + 3
    } else {
        shifted_month - 9
    };
    let year = year_of_era + era * 400 + i64::from(month <= 2);
    (
        year,
        u8::try_from(month).unwrap_or(1),
        u8::try_from(day).unwrap_or(1),
    )
}

/// Keeper of the committed wall-clock time.
pub trait WallClock {
    /// Returns the current date/time.
    fn now(&self) -> DateTime;

    /// Replaces the committed date/time as of the monotonic instant `at`.
    fn set(&mut self, time: DateTime, at: Instant);

    /// Advances software clocks to the monotonic instant `at`.
    ///
    /// Hardware RTCs keep time on their own and ignore this.
    fn tick(&mut self, _at: Instant) {}
}

/// Wall clock derived from the monotonic timer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SoftClock {
    base: DateTime,
    base_at: Instant,
    last: Instant,
}

impl SoftClock {
    /// Starts counting from `start` at the monotonic instant `at`.
    pub const fn new(start: DateTime, at: Instant) -> Self {
        Self {
            base: start,
            base_at: at,
            last: at,
        }
    }
}

impl Default for SoftClock {
    fn default() -> Self {
        Self::new(DateTime::DEFAULT, Instant::ZERO)
    }
}

impl WallClock for SoftClock {
    fn now(&self) -> DateTime {
        let elapsed = self.last.saturating_duration_since(self.base_at);
        self.base.add_seconds(elapsed.as_secs())
    }

    fn set(&mut self, time: DateTime, at: Instant) {
        self.base = time;
        self.base_at = at;
        self.last = self.last.max(at);
    }

    fn tick(&mut self, at: Instant) {
        self.last = self.last.max(at);
    }
}

/// Persistent storage for the wall-clock time (an SD card on the
/// clock board).
pub trait TimeStore {
    fn load_time(&mut self) -> Result<DateTime, ServiceError>;

    fn save_time(&mut self, time: &DateTime) -> Result<(), ServiceError>;
}

/// Store used when the board has no persistent medium.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoTimeStore;

impl TimeStore for NoTimeStore {
    fn load_time(&mut self) -> Result<DateTime, ServiceError> {
        Err(ServiceError::Unavailable(Peripheral::Storage))
    }

    fn save_time(&mut self, _: &DateTime) -> Result<(), ServiceError> {
        Err(ServiceError::Unavailable(Peripheral::Storage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;
    use core::time::Duration;
    use heapless::String;

    #[test]
    fn formats_as_one_lcd_row() {
        let mut text: String<24> = String::new();
        write!(text, "{}", DateTime::DEFAULT).unwrap();
        assert_eq!(text.as_str(), "2024-11-04  21:30:00");
        assert_eq!(text.len(), 20);
    }

    #[test]
    fn month_lengths_follow_leap_rules() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2024, 13), 0);
    }

    #[test]
    fn rejects_invalid_dates() {
        assert!(DateTime::new(2023, 2, 29, 0, 0, 0).is_none());
        assert!(DateTime::new(2024, 2, 29, 0, 0, 0).is_some());
        assert!(DateTime::new(2024, 0, 1, 0, 0, 0).is_none());
        assert!(DateTime::new(2024, 1, 1, 24, 0, 0).is_none());
    }

    #[test]
    fn epoch_round_trips() {
        let unix = DateTime::new(1970, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(unix.epoch_seconds(), 0);
        let sample = DateTime::new(2024, 11, 4, 21, 30, 0).unwrap();
        assert_eq!(sample.epoch_seconds(), 1_730_755_800);
        assert_eq!(DateTime::from_epoch_seconds(1_730_755_800), sample);
    }

    #[test]
    fn adding_seconds_rolls_over_dates() {
        let eve = DateTime::new(2024, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(
            eve.add_seconds(1),
            DateTime::new(2025, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(DateTime::MAX.add_seconds(10), DateTime::MAX);
    }

    #[test]
    fn clamped_fields_respect_month_length() {
        let time = DateTime::from_fields_clamped([2023, 2, 31, 12, 0, 0]);
        assert_eq!(time, DateTime::new(2023, 2, 28, 12, 0, 0).unwrap());
        let zeroed = DateTime::from_fields_clamped([2024, 0, 0, 99, 99, 99]);
        assert_eq!(zeroed, DateTime::new(2024, 1, 1, 23, 59, 59).unwrap());
    }

    #[test]
    fn soft_clock_follows_monotonic_time() {
        let mut clock = SoftClock::new(DateTime::DEFAULT, Instant::from_millis(500));
        clock.tick(Instant::from_millis(500) + Duration::from_millis(2_400));
        assert_eq!(clock.now(), DateTime::DEFAULT.add_seconds(2));

        let set_to = DateTime::new(2030, 6, 1, 8, 0, 0).unwrap();
        clock.set(set_to, Instant::from_millis(2_900));
        assert_eq!(clock.now(), set_to);
        clock.tick(Instant::from_millis(62_900));
        assert_eq!(clock.now(), set_to.add_seconds(60));
    }

    #[test]
    fn setting_between_ticks_counts_from_the_commit() {
        let mut clock = SoftClock::new(DateTime::DEFAULT, Instant::ZERO);
        clock.tick(Instant::from_millis(900));
        let set_to = DateTime::new(2030, 6, 1, 8, 0, 0).unwrap();
        clock.set(set_to, Instant::from_millis(1_800));
        assert_eq!(clock.now(), set_to);

        clock.tick(Instant::from_millis(2_700));
        assert_eq!(clock.now(), set_to);
        clock.tick(Instant::from_millis(2_800));
        assert_eq!(clock.now(), set_to.add_seconds(1));
    }
}
