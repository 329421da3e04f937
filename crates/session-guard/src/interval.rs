//! Half-open time-of-day intervals and the overlap primitive.
//!
//! Every check in this crate reduces to one test: two intervals `[a_start, a_end)`
//! and `[b_start, b_end)` overlap iff `a_start < b_end && b_start < a_end`.
//! Back-to-back bookings (one ends exactly when the next starts) do NOT overlap.
//!
//! A booking that runs until midnight ends at [`END_OF_DAY`], the last
//! representable instant of the day, which prints as `24:00`.

use std::fmt;

use chrono::{Duration, NaiveTime, Timelike};
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Exclusive end of a booking that runs until midnight.
pub const END_OF_DAY: NaiveTime = match NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999) {
    Some(t) => t,
    None => panic!("23:59:59.999999999 is a valid time"),
};

pub(crate) const MIDNIGHT: NaiveTime = clock(0, 0);

/// A whole-minute wall-clock time, for use in constants.
pub(crate) const fn clock(hour: u32, minute: u32) -> NaiveTime {
    match NaiveTime::from_hms_opt(hour, minute, 0) {
        Some(t) => t,
        None => panic!("clock time out of range"),
    }
}

/// A half-open `[start, end)` range of wall-clock time on a single day.
///
/// Always satisfies `start < end`; use [`TimeInterval::new`] to build one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeInterval {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeInterval {
    /// Build an interval, returning `None` for zero or negative durations.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// Build the interval of a booked session.
    ///
    /// An end of `00:00` after a later start is the midnight that closes the
    /// day (a session from 23:00 until the next day's 00:00), so it becomes
    /// [`END_OF_DAY`].
    pub fn booking(start: NaiveTime, end: NaiveTime) -> Option<Self> {
        let end = if end == MIDNIGHT && start > MIDNIGHT {
            END_OF_DAY
        } else {
            end
        };
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Whether the interval runs until midnight.
    pub fn ends_at_midnight(&self) -> bool {
        self.end == END_OF_DAY
    }

    pub fn duration_minutes(&self) -> i64 {
        let closing = if self.ends_at_midnight() {
            Duration::nanoseconds(1)
        } else {
            Duration::zero()
        };
        (self.end - self.start + closing).num_minutes()
    }

    /// Whether the two intervals share any instant.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The intersection of two intervals, if they overlap.
    pub fn overlap_with(&self, other: &TimeInterval) -> Option<TimeInterval> {
        if !self.overlaps(other) {
            return None;
        }
        TimeInterval::new(self.start.max(other.start), self.end.min(other.end))
    }

    /// Whether `time` falls inside `[start, end)`.
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time < self.end
    }
}

/// `HH:MM:SS`, with [`END_OF_DAY`] written as `24:00:00`.
pub fn format_clock(time: NaiveTime) -> String {
    if time == END_OF_DAY {
        return "24:00:00".to_string();
    }
    time.format("%H:%M:%S").to_string()
}

/// `HH:MM`, or `HH:MM:SS` when seconds are set.
fn short_clock(time: NaiveTime) -> String {
    if time == END_OF_DAY {
        "24:00".to_string()
    } else if time.second() != 0 {
        time.format("%H:%M:%S").to_string()
    } else {
        time.format("%H:%M").to_string()
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", short_clock(self.start), short_clock(self.end))
    }
}

impl Serialize for TimeInterval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("TimeInterval", 2)?;
        state.serialize_field("start", &format_clock(self.start))?;
        state.serialize_field("end", &format_clock(self.end))?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn degenerate_interval_rejected() {
        assert!(TimeInterval::new(t(10, 0), t(10, 0)).is_none());
        assert!(TimeInterval::new(t(11, 0), t(10, 0)).is_none());
    }

    #[test]
    fn intersection_of_partial_overlap() {
        let a = TimeInterval::new(t(9, 0), t(10, 0)).unwrap();
        let b = TimeInterval::new(t(9, 30), t(10, 30)).unwrap();
        let overlap = a.overlap_with(&b).unwrap();
        assert_eq!(overlap.start(), t(9, 30));
        assert_eq!(overlap.end(), t(10, 0));
        assert_eq!(overlap.duration_minutes(), 30);
    }

    #[test]
    fn contains_is_half_open() {
        let a = TimeInterval::new(t(9, 0), t(10, 0)).unwrap();
        assert!(a.contains(t(9, 0)));
        assert!(!a.contains(t(10, 0)));
    }

    #[test]
    fn display_uses_hours_and_minutes() {
        let a = TimeInterval::new(t(9, 5), t(10, 30)).unwrap();
        assert_eq!(a.to_string(), "09:05-10:30");
    }

    #[test]
    fn display_keeps_seconds_when_set() {
        let a = TimeInterval::new(
            NaiveTime::from_hms_opt(9, 0, 30).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 50).unwrap(),
        )
        .unwrap();
        assert_eq!(a.to_string(), "09:00:30-09:00:50");
    }

    #[test]
    fn booking_until_midnight_runs_to_end_of_day() {
        let late = TimeInterval::booking(t(23, 0), t(0, 0)).unwrap();
        assert!(late.ends_at_midnight());
        assert_eq!(late.duration_minutes(), 60);
        assert_eq!(late.to_string(), "23:00-24:00");
        assert!(late.overlaps(&TimeInterval::new(t(23, 15), t(23, 45)).unwrap()));
        assert!(TimeInterval::booking(t(0, 0), t(0, 0)).is_none());
    }

    #[test]
    fn serializes_full_clock_times() {
        let late = TimeInterval::booking(t(22, 30), t(0, 0)).unwrap();
        let json = serde_json::to_string(&late).unwrap();
        assert_eq!(json, r#"{"start":"22:30:00","end":"24:00:00"}"#);
    }
}
