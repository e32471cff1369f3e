//! Day bucketing
//!
//! Groups entries by local calendar day over a fixed window ending at an
//! anchor day. Every day of the window is present in the output, including
//! days nobody wrote anything on.

use crate::calendar::{days_ending, LocalCalendar};
use crate::types::Entry;
use chrono::NaiveDate;

/// Entries written on one calendar day
#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket<'a> {
    pub day: NaiveDate,
    /// Same-day entries in input order
    pub entries: Vec<&'a Entry>,
}

impl<'a> DayBucket<'a> {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Bucket `entries` into the `window_days` days ending at `anchor`, oldest first
///
/// Entries outside the window or without a timestamp are left out.
pub fn bucket<'a>(
    entries: &'a [Entry],
    window_days: u32,
    anchor: NaiveDate,
    calendar: &LocalCalendar,
) -> Vec<DayBucket<'a>> {
    let mut buckets: Vec<DayBucket<'a>> = days_ending(anchor, window_days)
        .into_iter()
        .map(|day| DayBucket {
            day,
            entries: Vec::new(),
        })
        .collect();

    let Some(start) = buckets.first().map(|b| b.day) else {
        return buckets;
    };

    for entry in entries {
        let Some(day) = calendar.entry_day(entry) else {
            continue;
        };
        if day < start || day > anchor {
            continue;
        }
        let index = (day - start).num_days() as usize;
        if let Some(bucket) = buckets.get_mut(index) {
            bucket.entries.push(entry);
        }
    }

    buckets
}

/// All entries held by `buckets`, oldest day first
pub fn flatten<'a>(buckets: &[DayBucket<'a>]) -> Vec<&'a Entry> {
    buckets
        .iter()
        .flat_map(|b| b.entries.iter().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry_at(id: &str, y: i32, m: u32, d: u32, h: u32) -> Entry {
        Entry::new(id, Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap())
    }

    #[test]
    fn test_every_day_present_oldest_first() {
        let entries = vec![entry_at("a", 2024, 6, 10, 9)];
        let buckets = bucket(&entries, 7, day(2024, 6, 10), &LocalCalendar::utc());

        assert_eq!(buckets.len(), 7);
        assert_eq!(buckets[0].day, day(2024, 6, 4));
        assert_eq!(buckets[6].day, day(2024, 6, 10));
        assert_eq!(buckets.iter().filter(|b| !b.is_empty()).count(), 1);
        assert_eq!(buckets[6].entries[0].id, "a");
    }

    #[test]
    fn test_same_day_entries_kept_in_order() {
        let entries = vec![
            entry_at("morning", 2024, 6, 10, 8),
            entry_at("evening", 2024, 6, 10, 21),
        ];
        let buckets = bucket(&entries, 1, day(2024, 6, 10), &LocalCalendar::utc());

        let ids: Vec<&str> = buckets[0].entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["morning", "evening"]);
    }

    #[test]
    fn test_entries_outside_window_excluded() {
        let entries = vec![
            entry_at("old", 2024, 6, 1, 12),
            entry_at("future", 2024, 6, 11, 12),
            entry_at("in", 2024, 6, 9, 12),
            Entry {
                id: "no-time".to_string(),
                ..Default::default()
            },
        ];
        let buckets = bucket(&entries, 3, day(2024, 6, 10), &LocalCalendar::utc());

        let kept: Vec<&str> = flatten(&buckets).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(kept, vec!["in"]);
    }

    #[test]
    fn test_local_midnight_truncation() {
        // 22:30 UTC is already the next day at UTC+2
        let entries = vec![entry_at("late", 2024, 6, 9, 22)];
        let calendar = LocalCalendar::from_offset_minutes(120).unwrap();
        let buckets = bucket(&entries, 2, day(2024, 6, 10), &calendar);

        assert!(buckets[0].is_empty());
        assert_eq!(buckets[1].entries.len(), 1);
    }

    #[test]
    fn test_zero_window() {
        let entries = vec![entry_at("a", 2024, 6, 10, 9)];
        assert!(bucket(&entries, 0, day(2024, 6, 10), &LocalCalendar::utc()).is_empty());
    }
}
