//! Trend series
//!
//! Turns day buckets into chart series. Empty days stay `None` so the chart
//! draws a gap; a mean of 0.0 is a real (all-anger) value.

use crate::bucketing::DayBucket;
use crate::types::{SleepPoint, TrendPoint};
use chrono::NaiveDate;

/// Incremental arithmetic mean
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningMean {
    mean: f64,
    count: usize,
}

impl RunningMean {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one observation: `(mean * n + x) / (n + 1)`
    pub fn push(&mut self, value: f64) {
        let n = self.count as f64;
        self.mean = (self.mean * n + value) / (n + 1.0);
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Current mean, `None` before the first observation
    pub fn value(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }
}

impl FromIterator<f64> for RunningMean {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut mean = RunningMean::new();
        for value in iter {
            mean.push(value);
        }
        mean
    }
}

fn weekday_label(day: NaiveDate) -> String {
    day.format("%a").to_string()
}

/// Mean mood score per day
pub fn trend(buckets: &[DayBucket<'_>]) -> Vec<TrendPoint> {
    buckets
        .iter()
        .map(|bucket| {
            let mean: RunningMean = bucket
                .entries
                .iter()
                .map(|entry| f64::from(entry.mood_score()))
                .collect();
            TrendPoint {
                day: bucket.day,
                label: weekday_label(bucket.day),
                mean_score: mean.value(),
                entries: bucket.entries.len(),
            }
        })
        .collect()
}

/// Mean sleep hours per day; entries without a usable value are skipped
pub fn sleep_trend(buckets: &[DayBucket<'_>]) -> Vec<SleepPoint> {
    buckets
        .iter()
        .map(|bucket| {
            let mean: RunningMean = bucket
                .entries
                .iter()
                .filter_map(|entry| entry.valid_sleep_hours())
                .collect();
            SleepPoint {
                day: bucket.day,
                label: weekday_label(bucket.day),
                mean_hours: mean.value(),
            }
        })
        .collect()
}
