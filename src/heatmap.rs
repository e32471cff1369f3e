//! Calendar heatmap
//!
//! Entry counts per local calendar day. Every day in the requested range is
//! present, with 0 for days without entries.

use crate::calendar::{days_between, year_start, LocalCalendar};
use crate::types::{Entry, Heatmap};
use chrono::NaiveDate;
use std::collections::BTreeMap;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Count entries for each day in `[from, to]`
pub fn heatmap<'a, I>(
    entries: I,
    from: NaiveDate,
    to: NaiveDate,
    calendar: &LocalCalendar,
) -> Heatmap
where
    I: IntoIterator<Item = &'a Entry>,
{
    let mut per_day: BTreeMap<NaiveDate, u32> = days_between(from, to)
        .into_iter()
        .map(|day| (day, 0))
        .collect();

    for day in entries
        .into_iter()
        .filter_map(|entry| calendar.entry_day(entry))
    {
        if let Some(count) = per_day.get_mut(&day) {
            *count += 1;
        }
    }

    Heatmap {
        days: per_day
            .into_iter()
            .map(|(day, count)| (day.format(DATE_FORMAT).to_string(), count))
            .collect(),
    }
}

/// Heatmap from January 1st of `today`'s year through `today`
pub fn year_to_date<'a, I>(entries: I, today: NaiveDate, calendar: &LocalCalendar) -> Heatmap
where
    I: IntoIterator<Item = &'a Entry>,
{
    heatmap(entries, year_start(today), today, calendar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry_on(id: &str, m: u32, d: u32) -> Entry {
        Entry::new(id, Utc.with_ymd_and_hms(2024, m, d, 10, 0, 0).unwrap())
    }

    #[test]
    fn test_range_completeness() {
        let entries = vec![entry_on("a", 3, 5), entry_on("b", 3, 5), entry_on("c", 3, 7)];
        let map = heatmap(&entries, day(2024, 3, 1), day(2024, 3, 10), &LocalCalendar::utc());

        assert_eq!(map.len(), 10);
        assert_eq!(map.get(day(2024, 3, 5)), Some(2));
        assert_eq!(map.get(day(2024, 3, 6)), Some(0));
        assert_eq!(map.get(day(2024, 3, 7)), Some(1));
        assert_eq!(map.get(day(2024, 3, 11)), None);
        assert_eq!(map.max_count(), 2);
    }

    #[test]
    fn test_keys_are_valid_dates_in_range() {
        let map = heatmap(
            &Vec::<Entry>::new(),
            day(2024, 2, 27),
            day(2024, 3, 2),
            &LocalCalendar::utc(),
        );
        assert_eq!(map.len(), 5);
        for key in map.days.keys() {
            let parsed = NaiveDate::parse_from_str(key, DATE_FORMAT).unwrap();
            assert!(parsed >= day(2024, 2, 27) && parsed <= day(2024, 3, 2));
        }
        assert!(map.days.values().all(|count| *count == 0));
    }

    #[test]
    fn test_out_of_range_and_untimed_entries_ignored() {
        let entries = vec![entry_on("early", 1, 1), Entry::default(), entry_on("in", 3, 2)];
        let map = heatmap(&entries, day(2024, 3, 1), day(2024, 3, 3), &LocalCalendar::utc());
        assert_eq!(map.days.values().sum::<u32>(), 1);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let map = heatmap(
            &Vec::<Entry>::new(),
            day(2024, 3, 3),
            day(2024, 3, 1),
            &LocalCalendar::utc(),
        );
        assert!(map.is_empty());
    }

    #[test]
    fn test_year_to_date() {
        let entries = vec![entry_on("a", 1, 1), entry_on("b", 2, 29)];
        let map = year_to_date(&entries, day(2024, 3, 1), &LocalCalendar::utc());

        // 31 + 29 + 1 days in leap year 2024
        assert_eq!(map.len(), 61);
        assert_eq!(map.get(day(2024, 1, 1)), Some(1));
        assert_eq!(map.get(day(2024, 2, 29)), Some(1));
    }
}
