//! Wall-clock access for roll ids, photo filenames and the date imprint.

use chrono::{Local, NaiveDate, TimeZone, Utc};

/// Source of the current time
pub trait Clock: Send {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;

    /// Calendar date printed on photos
    fn today(&self) -> NaiveDate;
}

/// The system clock, dates in the local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock frozen at a given instant, for tests and reproducible runs
///
/// Unlike [`SystemClock`], `today` is the UTC date of the instant, so the
/// imprinted date does not depend on the host's time zone.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    millis: i64,
}

impl FixedClock {
    pub fn new(millis: i64) -> Self {
        Self { millis }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.millis
    }

    fn today(&self) -> NaiveDate {
        Utc.timestamp_millis_opt(self.millis)
            .single()
            .map(|t| t.date_naive())
            .unwrap_or(NaiveDate::MIN)
    }
}

/// Issues strictly increasing millisecond stamps on top of a [`Clock`]
///
/// Two calls inside the same millisecond (or after the wall clock stepped
/// back) still get distinct stamps.
#[derive(Debug, Clone)]
pub struct StampSequence {
    last: i64,
}

impl Default for StampSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl StampSequence {
    pub fn new() -> Self {
        Self { last: i64::MIN }
    }

    /// Next stamp, never less than or equal to any stamp issued or observed before
    pub fn next(&mut self, clock: &dyn Clock) -> i64 {
        let stamp = clock.now_millis().max(self.last.saturating_add(1));
        self.last = stamp;
        stamp
    }

    /// Record a stamp issued elsewhere (e.g. loaded from disk)
    pub fn observe(&mut self, stamp: i64) {
        self.last = self.last.max(stamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamps_strictly_increase_on_frozen_clock() {
        let clock = FixedClock::new(1_000);
        let mut stamps = StampSequence::new();

        assert_eq!(stamps.next(&clock), 1_000);
        assert_eq!(stamps.next(&clock), 1_001);
        assert_eq!(stamps.next(&clock), 1_002);
    }

    #[test]
    fn test_observed_stamps_are_skipped() {
        let clock = FixedClock::new(1_000);
        let mut stamps = StampSequence::new();
        stamps.observe(5_000);

        assert_eq!(stamps.next(&clock), 5_001);
    }

    #[test]
    fn test_fixed_clock_date() {
        // 2024-03-05T12:00:00Z
        let clock = FixedClock::new(1_709_640_000_000);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_fixed_clock_date_is_utc() {
        // 2024-03-05T23:30:00Z, already March 6th east of UTC
        let clock = FixedClock::new(1_709_681_400_000);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }
}
