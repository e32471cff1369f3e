//! Streaks and summary statistics
//!
//! A streak only counts a run that includes today: with no entry today the
//! current streak is 0 even if yesterday was logged.

use crate::calendar::LocalCalendar;
use crate::ranking::top_emotions;
use crate::trend::RunningMean;
use crate::types::{Entry, SummaryStats};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeSet;

/// Distinct logged days, most recent first
fn logged_days_desc<'a, I>(entries: I, calendar: &LocalCalendar) -> Vec<NaiveDate>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let days: BTreeSet<NaiveDate> = entries
        .into_iter()
        .filter_map(|entry| calendar.entry_day(entry))
        .collect();
    days.into_iter().rev().collect()
}

/// Consecutive logged days ending today
pub fn streak<'a, I>(entries: I, calendar: &LocalCalendar, today: NaiveDate) -> u32
where
    I: IntoIterator<Item = &'a Entry>,
{
    let days = logged_days_desc(entries, calendar);
    let future = days.iter().take_while(|day| **day > today).count();
    if future > 0 {
        log::debug!("Ignoring {} future-dated day(s) after {}", future, today);
    }

    let mut count = 0u32;
    let mut expected = today;
    for day in days.into_iter().skip(future) {
        if day != expected {
            break;
        }
        count += 1;
        match expected.checked_sub_signed(Duration::days(1)) {
            Some(previous) => expected = previous,
            None => break,
        }
    }
    count
}

/// Longest run of consecutive logged days anywhere in history
pub fn longest_streak<'a, I>(entries: I, calendar: &LocalCalendar) -> u32
where
    I: IntoIterator<Item = &'a Entry>,
{
    let days = logged_days_desc(entries, calendar);
    let mut longest = 0u32;
    let mut run = 0u32;
    let mut previous: Option<NaiveDate> = None;

    for day in days {
        run = match previous {
            Some(prev) if (prev - day).num_days() == 1 => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }
    longest
}

/// Headline statistics over the whole history
pub fn summarize(entries: &[Entry], calendar: &LocalCalendar, today: NaiveDate) -> SummaryStats {
    let mood: RunningMean = entries
        .iter()
        .map(|entry| f64::from(entry.mood_score()))
        .collect();
    let sleep: RunningMean = entries
        .iter()
        .filter_map(|entry| entry.valid_sleep_hours())
        .collect();

    SummaryStats {
        total_entries: entries.len(),
        current_streak: streak(entries, calendar, today),
        longest_streak: longest_streak(entries, calendar),
        days_logged: logged_days_desc(entries, calendar).len(),
        average_mood: mood.value(),
        average_sleep_hours: sleep.value(),
        dominant_emotion: top_emotions(entries, 1).first().map(|top| top.label),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Emotion;
    use chrono::{TimeZone, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn days_ago(id: &str, back: i64, hour: u32) -> Entry {
        let day = today() - Duration::days(back);
        let ts = Utc.from_utc_datetime(&day.and_hms_opt(hour, 0, 0).unwrap());
        Entry::new(id, ts)
    }

    fn utc() -> LocalCalendar {
        LocalCalendar::utc()
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(streak(&Vec::<Entry>::new(), &utc(), today()), 0);
        assert_eq!(longest_streak(&Vec::<Entry>::new(), &utc()), 0);
    }

    #[test]
    fn test_run_with_gap() {
        let entries = vec![days_ago("a", 0, 9), days_ago("b", 1, 9), days_ago("c", 3, 9)];
        assert_eq!(streak(&entries, &utc(), today()), 2);
    }

    // Strict: yesterday's run is not credited until today is logged.
    #[test]
    fn test_no_entry_today_means_zero_even_with_yesterday() {
        let entries = vec![days_ago("a", 1, 9), days_ago("b", 2, 9), days_ago("c", 3, 9)];
        assert_eq!(streak(&entries, &utc(), today()), 0);
    }

    #[test]
    fn test_same_day_entries_count_once() {
        let entries = vec![
            days_ago("a", 0, 8),
            days_ago("b", 0, 12),
            days_ago("c", 0, 20),
            days_ago("d", 1, 9),
        ];
        assert_eq!(streak(&entries, &utc(), today()), 2);
    }

    #[test]
    fn test_unordered_input() {
        let entries = vec![days_ago("c", 2, 9), days_ago("a", 0, 9), days_ago("b", 1, 9)];
        assert_eq!(streak(&entries, &utc(), today()), 3);
    }

    #[test]
    fn test_future_entries_ignored() {
        let entries = vec![days_ago("future", -2, 9), days_ago("a", 0, 9)];
        assert_eq!(streak(&entries, &utc(), today()), 1);
    }

    #[test]
    fn test_entries_without_timestamp_ignored() {
        let entries = vec![Entry::default(), days_ago("a", 0, 9)];
        assert_eq!(streak(&entries, &utc(), today()), 1);
    }

    #[test]
    fn test_longest_streak() {
        let entries = vec![
            days_ago("a", 0, 9),
            days_ago("b", 5, 9),
            days_ago("c", 6, 9),
            days_ago("d", 7, 9),
            days_ago("e", 7, 18),
            days_ago("f", 10, 9),
        ];
        assert_eq!(longest_streak(&entries, &utc()), 3);
    }

    #[test]
    fn test_summarize() {
        let entries = vec![
            days_ago("a", 0, 9).with_label("joy").with_sleep(8.0),
            days_ago("b", 0, 20).with_label("joy"),
            days_ago("c", 1, 9).with_label("anger").with_sleep(6.0),
        ];
        let stats = summarize(&entries, &utc(), today());

        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 2);
        assert_eq!(stats.days_logged, 2);
        // (5 + 5 + 0) / 3
        assert!((stats.average_mood.unwrap() - 10.0 / 3.0).abs() < 0.05);
        assert_eq!(stats.average_sleep_hours, Some(7.0));
        assert_eq!(stats.dominant_emotion, Some(Emotion::Joy));
    }

    #[test]
    fn test_summarize_empty() {
        let stats = summarize(&[], &utc(), today());
        assert_eq!(stats, SummaryStats::default());
    }
}
