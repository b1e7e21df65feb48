//! Half-hour timezone offsets and local wall-clock conversion for display.
//!
//! Offsets only ever shift what the user sees. Code derivation stays on UTC.

use core::fmt;

/// Lowest supported offset in half hours (UTC-12:00).
pub const MIN_HALF_HOURS: i8 = -24;
/// Highest supported offset in half hours (UTC+14:00).
pub const MAX_HALF_HOURS: i8 = 28;

const SECONDS_PER_HALF_HOUR: i64 = 30 * 60;
const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Signed timezone offset counted in half hours, always within range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimezoneOffset(i8);

impl TimezoneOffset {
    pub const UTC: Self = Self(0);

    /// Build an offset, clamping out-of-range values to the nearest bound.
    pub fn clamped(half_hours: i32) -> Self {
        let bounded = half_hours.clamp(i32::from(MIN_HALF_HOURS), i32::from(MAX_HALF_HOURS));
        Self(bounded as i8)
    }

    /// Accept a raw persisted value only if it is already in range.
    pub fn from_raw(half_hours: i8) -> Option<Self> {
        (MIN_HALF_HOURS..=MAX_HALF_HOURS)
            .contains(&half_hours)
            .then_some(Self(half_hours))
    }

    pub const fn half_hours(self) -> i8 {
        self.0
    }

    pub const fn seconds(self) -> i32 {
        self.0 as i32 * SECONDS_PER_HALF_HOUR as i32
    }

    /// One half hour later, saturating at UTC+14.
    pub fn increment(self) -> Self {
        Self::clamped(i32::from(self.0) + 1)
    }

    /// One half hour earlier, saturating at UTC-12.
    pub fn decrement(self) -> Self {
        Self::clamped(i32::from(self.0) - 1)
    }

    pub fn is_utc(self) -> bool {
        self.0 == 0
    }
}

/// Renders as `UTC`, `UTC+5`, `UTC+2.5` or `UTC-3.5`.
impl fmt::Display for TimezoneOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_utc() {
            return f.write_str("UTC");
        }

        let sign = if self.0 > 0 { '+' } else { '-' };
        let magnitude = self.0.unsigned_abs();
        let hours = magnitude / 2;
        if magnitude % 2 == 0 {
            write!(f, "UTC{sign}{hours}")
        } else {
            write!(f, "UTC{sign}{hours}.5")
        }
    }
}

/// Local time of day shown on the idle screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallClock {
    pub hour: u8,
    pub minute: u8,
}

impl WallClock {
    /// Convert a UTC unix timestamp into local time of day.
    pub fn from_utc(unix_time: u32, offset: TimezoneOffset) -> Self {
        let local = i64::from(unix_time) + i64::from(offset.seconds());
        let seconds_of_day = local.rem_euclid(SECONDS_PER_DAY);
        Self {
            hour: (seconds_of_day / 3_600) as u8,
            minute: ((seconds_of_day % 3_600) / 60) as u8,
        }
    }

    pub fn is_pm(self) -> bool {
        self.hour >= 12
    }

    pub fn hour12(self) -> u8 {
        match self.hour % 12 {
            0 => 12,
            hour => hour,
        }
    }
}

/// Twelve-hour rendering such as `9:05AM`.
impl fmt::Display for WallClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = if self.is_pm() { "PM" } else { "AM" };
        write!(f, "{}:{:02}{suffix}", self.hour12(), self.minute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_to_supported_range() {
        assert_eq!(TimezoneOffset::clamped(40).half_hours(), MAX_HALF_HOURS);
        assert_eq!(TimezoneOffset::clamped(-40).half_hours(), MIN_HALF_HOURS);
        assert_eq!(TimezoneOffset::clamped(5).half_hours(), 5);
    }

    #[test]
    fn stepping_saturates_at_bounds() {
        let top = TimezoneOffset::clamped(i32::from(MAX_HALF_HOURS));
        assert_eq!(top.increment(), top);
        let bottom = TimezoneOffset::clamped(i32::from(MIN_HALF_HOURS));
        assert_eq!(bottom.decrement(), bottom);
        assert_eq!(TimezoneOffset::UTC.increment().half_hours(), 1);
        assert_eq!(TimezoneOffset::UTC.decrement().half_hours(), -1);
    }

    #[test]
    fn raw_values_outside_range_are_rejected() {
        assert_eq!(TimezoneOffset::from_raw(29), None);
        assert_eq!(TimezoneOffset::from_raw(-25), None);
        assert_eq!(TimezoneOffset::from_raw(-24), Some(TimezoneOffset::clamped(-24)));
    }

    #[test]
    fn labels_use_decimal_half_hours() {
        assert_eq!(TimezoneOffset::UTC.to_string(), "UTC");
        assert_eq!(TimezoneOffset::clamped(5).to_string(), "UTC+2.5");
        assert_eq!(TimezoneOffset::clamped(10).to_string(), "UTC+5");
        assert_eq!(TimezoneOffset::clamped(-7).to_string(), "UTC-3.5");
        assert_eq!(TimezoneOffset::clamped(-24).to_string(), "UTC-12");
        assert_eq!(TimezoneOffset::clamped(-1).to_string(), "UTC-0.5");
    }

    #[test]
    fn wall_clock_applies_offset_across_midnight() {
        // 2023-11-14 22:13:20 UTC
        let utc = 1_700_000_000;
        assert_eq!(WallClock::from_utc(utc, TimezoneOffset::UTC).to_string(), "10:13PM");
        assert_eq!(
            WallClock::from_utc(utc, TimezoneOffset::clamped(5)).to_string(),
            "12:43AM"
        );
        assert_eq!(
            WallClock::from_utc(utc, TimezoneOffset::clamped(-7)).to_string(),
            "6:43PM"
        );
        assert_eq!(
            WallClock::from_utc(utc, TimezoneOffset::clamped(28)).to_string(),
            "12:13PM"
        );
    }

    #[test]
    fn wall_clock_handles_negative_local_time_near_epoch() {
        let clock = WallClock::from_utc(0, TimezoneOffset::clamped(-2));
        assert_eq!(clock, WallClock { hour: 23, minute: 0 });
    }
}
