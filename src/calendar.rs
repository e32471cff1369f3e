//! Local calendar resolution
//!
//! Entries carry UTC timestamps; every date-bucketed view works on the
//! user's local calendar day. The calendar is a fixed UTC offset passed in
//! explicitly so results never depend on ambient process state.

use crate::error::InsightsError;
use crate::types::Entry;
use chrono::{DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, Offset, Utc};

const MAX_OFFSET_MINUTES: i32 = 18 * 60;

/// Maps instants to local calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalCalendar {
    offset: FixedOffset,
}

impl Default for LocalCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl LocalCalendar {
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// Calendar for the host's current local offset
    pub fn local() -> Self {
        Self {
            offset: Local::now().offset().fix(),
        }
    }

    /// Calendar at `minutes` east of UTC (negative for west)
    pub fn from_offset_minutes(minutes: i32) -> Result<Self, InsightsError> {
        if minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(InsightsError::InvalidOffset(minutes));
        }
        FixedOffset::east_opt(minutes * 60)
            .map(|offset| Self { offset })
            .ok_or(InsightsError::InvalidOffset(minutes))
    }

    pub fn offset_minutes(&self) -> i32 {
        self.offset.local_minus_utc() / 60
    }

    /// Local calendar day of an instant
    pub fn day_of(&self, instant: &DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Local calendar day of an entry, `None` without a timestamp
    pub fn entry_day(&self, entry: &Entry) -> Option<NaiveDate> {
        entry.timestamp.as_ref().map(|ts| self.day_of(ts))
    }

    /// Today's local day at `now`
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.day_of(&now)
    }
}

/// The `count` consecutive days ending at `anchor`, oldest first
pub fn days_ending(anchor: NaiveDate, count: u32) -> Vec<NaiveDate> {
    (0..i64::from(count))
        .rev()
        .filter_map(|back| anchor.checked_sub_signed(Duration::days(back)))
        .collect()
}

/// Every day in `[from, to]`, empty when `from > to`
pub fn days_between(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    from.iter_days().take_while(|day| *day <= to).collect()
}

/// January 1st of `day`'s year
pub fn year_start(day: NaiveDate) -> NaiveDate {
    day.with_ordinal(1).unwrap_or(day)
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_day(s: &str) -> Result<NaiveDate, InsightsError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| InsightsError::DateParseError(format!("{}: {}", s, e)))
}
