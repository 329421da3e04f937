//! Day and month availability views for the booking calendar.
//!
//! The day view lists every busy range of the selected professional and local,
//! tagged by source so the time picker can colour them differently. The month
//! view only says which days have any booking at all.
//!
//! Busy slots are NOT merged: a session that belongs to both the professional
//! and the local appears twice, once per source. Only the free-slot computation
//! merges, and it does so internally.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::Serialize;

use crate::conflict::{bookable_on, is_relevant, valid_interval};
use crate::error::GuardError;
use crate::interval::TimeInterval;
use crate::session::ExistingSession;

/// Which booking makes a slot busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotSource {
    Professional,
    Local,
}

/// An occupied range within a day, for rendering only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusySlot {
    pub interval: TimeInterval,
    pub source: SlotSource,
    pub title: String,
    pub session_id: String,
}

/// A bookable gap between busy ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreeSlot {
    pub interval: TimeInterval,
    pub duration_minutes: i64,
}

/// A calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarMonth {
    year: i32,
    month: u32,
}

impl CalendarMonth {
    /// Returns `None` unless `month` is in `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl FromStr for CalendarMonth {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GuardError::InvalidMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        CalendarMonth::new(year, month).ok_or_else(invalid)
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Busy ranges of a professional (and optionally a local) on one day.
///
/// Professional slots come first, then local slots, each in input order.
/// Cancelled sessions, the session being edited, and corrupt rows are left out.
pub fn busy_slots_for_day(
    date: NaiveDate,
    professional_id: Option<&str>,
    local_id: Option<&str>,
    existing: &[ExistingSession],
    exclude_id: Option<&str>,
) -> Vec<BusySlot> {
    let day: Vec<(&ExistingSession, TimeInterval)> =
        bookable_on(existing, date, professional_id, local_id, exclude_id).collect();

    let professional = professional_id.into_iter().flat_map(|id| {
        day.iter()
            .filter(move |(s, _)| s.is_for_professional(id))
            .map(|(s, interval)| busy_slot(s, *interval, SlotSource::Professional))
    });
    let local = local_id.into_iter().flat_map(|id| {
        day.iter()
            .filter(move |(s, _)| s.is_at_local(id))
            .map(|(s, interval)| busy_slot(s, *interval, SlotSource::Local))
    });

    professional.chain(local).collect()
}

fn busy_slot(session: &ExistingSession, interval: TimeInterval, source: SlotSource) -> BusySlot {
    BusySlot {
        interval,
        source,
        title: session.title.clone(),
        session_id: session.id.clone(),
    }
}

/// Days of `month` on which the professional or the local has a booking.
///
/// A day counts if either source is booked; this is a hint for the month grid,
/// not a blocking signal.
pub fn occupied_dates_for_month(
    month: CalendarMonth,
    professional_id: Option<&str>,
    local_id: Option<&str>,
    existing: &[ExistingSession],
) -> BTreeSet<NaiveDate> {
    existing
        .iter()
        .filter(|s| s.is_active() && month.contains(s.date))
        .filter(|s| is_relevant(s, professional_id, local_id))
        .filter_map(valid_interval)
        .map(|(s, _)| s.date)
        .collect()
}

/// Gaps of at least `min_duration_minutes` inside `window` on `date`.
///
/// Busy slots from both sources are clipped to the window, sorted, and merged
/// (overlapping or adjacent ranges join) before the gaps are measured.
pub fn free_slots_for_day(
    date: NaiveDate,
    professional_id: Option<&str>,
    local_id: Option<&str>,
    existing: &[ExistingSession],
    exclude_id: Option<&str>,
    window: TimeInterval,
    min_duration_minutes: i64,
) -> Vec<FreeSlot> {
    let busy = busy_slots_for_day(date, professional_id, local_id, existing, exclude_id);
    let merged = merge_busy(busy.iter().map(|slot| slot.interval), window);

    let mut free = Vec::new();
    let mut cursor = window.start();

    for busy in &merged {
        push_gap(&mut free, cursor, busy.start(), min_duration_minutes);
        cursor = cursor.max(busy.end());
    }
    push_gap(&mut free, cursor, window.end(), min_duration_minutes);

    free
}

fn push_gap(
    free: &mut Vec<FreeSlot>,
    start: NaiveTime,
    end: NaiveTime,
    min_duration_minutes: i64,
) {
    if let Some(interval) = TimeInterval::new(start, end) {
        let duration_minutes = interval.duration_minutes();
        if duration_minutes >= min_duration_minutes {
            free.push(FreeSlot {
                interval,
                duration_minutes,
            });
        }
    }
}

/// Clip intervals to `window` and merge overlapping or adjacent ones.
fn merge_busy(
    intervals: impl Iterator<Item = TimeInterval>,
    window: TimeInterval,
) -> Vec<TimeInterval> {
    let mut clipped: Vec<TimeInterval> = intervals.filter_map(|i| i.overlap_with(&window)).collect();
    clipped.sort();

    let mut merged: Vec<TimeInterval> = Vec::new();
    for interval in clipped {
        if let Some(last) = merged.last_mut() {
            if interval.start() <= last.end() {
                // Overlapping or adjacent, extend the current block.
                if let Some(extended) =
                    TimeInterval::new(last.start(), last.end().max(interval.end()))
                {
                    *last = extended;
                }
                continue;
            }
        }
        merged.push(interval);
    }

    merged
}
