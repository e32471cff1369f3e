//! Pipeline orchestration
//!
//! This module provides the public API for Journal Insights. It runs every
//! aggregation over one entry snapshot and assembles the dashboard.

use crate::adapter::EntryAdapter;
use crate::balance::life_balance;
use crate::bucketing::{bucket, flatten};
use crate::calendar::{parse_day, LocalCalendar};
use crate::config::{InsightsConfig, MAX_WINDOW_DAYS};
use crate::distribution::distribute;
use crate::encoder::DashboardEncoder;
use crate::error::InsightsError;
use crate::heatmap::{heatmap, year_to_date};
use crate::ranking::top_emotions;
use crate::store::{EntryStore, SubscriptionId};
use crate::streak::summarize;
use crate::trend::{sleep_trend, trend};
use crate::types::{Dashboard, DashboardPayload, Entry};
use chrono::{Duration, NaiveDate, Utc};
use std::sync::{Arc, Mutex, PoisonError};

/// Compute every dashboard view from one snapshot.
///
/// Trend charts and the life-balance radar cover the configured window
/// ending at `today`; distribution, ranking and summary cover the whole
/// history; the heatmap covers year-to-date or `heatmap_days`. Both windows
/// are capped at `MAX_WINDOW_DAYS`, so an unvalidated config stays bounded.
pub fn build_dashboard(
    entries: &[Entry],
    today: NaiveDate,
    config: &InsightsConfig,
    calendar: &LocalCalendar,
) -> Dashboard {
    let window = config.trend_window_days.min(MAX_WINDOW_DAYS);
    let buckets = bucket(entries, window, today, calendar);
    let recent = flatten(&buckets);

    let heatmap = match config.heatmap_days {
        Some(days) => {
            let days = days.min(MAX_WINDOW_DAYS);
            let from = today
                .checked_sub_signed(Duration::days(i64::from(days.saturating_sub(1))))
                .unwrap_or(today);
            heatmap(entries, from, today, calendar)
        }
        None => year_to_date(entries, today, calendar),
    };

    Dashboard {
        anchor: today,
        trend: trend(&buckets),
        sleep_trend: sleep_trend(&buckets),
        distribution: distribute(entries),
        top_emotions: top_emotions(entries, config.top_emotions_limit),
        summary: summarize(entries, calendar, today),
        heatmap,
        life_balance: life_balance(recent),
    }
}

/// Convert a JSON array of entry documents into an encoded dashboard.
///
/// # Arguments
/// * `raw_json` - JSON array of entries as stored by the client
/// * `today` - Anchor day (`YYYY-MM-DD`)
/// * `utc_offset_minutes` - User's offset from UTC, used for calendar days
///
/// # Example
/// ```ignore
/// let dashboard_json = entries_to_dashboard(entries_json, "2024-06-10".to_string(), -240)?;
/// ```
pub fn entries_to_dashboard(
    raw_json: String,
    today: String,
    utc_offset_minutes: i32,
) -> Result<String, InsightsError> {
    let config = InsightsConfig {
        utc_offset_minutes: Some(utc_offset_minutes),
        ..Default::default()
    };
    let processor = DashboardProcessor::with_config(config)?;
    processor.process_json(&raw_json, parse_day(&today)?)
}

/// Stateful processor that keeps the latest dashboard for a subscribed store.
pub struct DashboardProcessor {
    config: InsightsConfig,
    calendar: LocalCalendar,
    encoder: DashboardEncoder,
    latest: Arc<Mutex<Option<Dashboard>>>,
}

impl Default for DashboardProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardProcessor {
    /// Create a processor with default settings on the host's calendar
    pub fn new() -> Self {
        Self {
            config: InsightsConfig::default(),
            calendar: LocalCalendar::local(),
            encoder: DashboardEncoder::new(),
            latest: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a processor from a validated configuration
    pub fn with_config(config: InsightsConfig) -> Result<Self, InsightsError> {
        config.validate()?;
        let calendar = config.calendar()?;
        Ok(Self {
            config,
            calendar,
            encoder: DashboardEncoder::new(),
            latest: Arc::new(Mutex::new(None)),
        })
    }

    pub fn config(&self) -> &InsightsConfig {
        &self.config
    }

    pub fn calendar(&self) -> &LocalCalendar {
        &self.calendar
    }

    /// Today on this processor's calendar
    pub fn today(&self) -> NaiveDate {
        self.calendar.today(Utc::now())
    }

    /// Compute a dashboard anchored at `today`
    pub fn process(&self, entries: &[Entry], today: NaiveDate) -> Dashboard {
        build_dashboard(entries, today, &self.config, &self.calendar)
    }

    /// Parse a JSON array of entries and return the encoded dashboard
    pub fn process_json(&self, raw_json: &str, today: NaiveDate) -> Result<String, InsightsError> {
        let entries = EntryAdapter::parse_array(raw_json)?;
        let dashboard = self.process(&entries, today);
        self.encode(&dashboard)
    }

    /// Wrap a dashboard in its envelope
    pub fn payload(&self, dashboard: &Dashboard) -> DashboardPayload {
        self.encoder.encode(dashboard, &self.calendar)
    }

    /// Encode a dashboard with this processor's calendar
    pub fn encode(&self, dashboard: &Dashboard) -> Result<String, InsightsError> {
        self.encoder.encode_to_json(dashboard, &self.calendar)
    }

    /// Most recent dashboard produced by a store subscription
    pub fn latest(&self) -> Option<Dashboard> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Recompute on every snapshot the store pushes, anchored at the
    /// current local day
    pub fn attach<S: EntryStore + ?Sized>(&self, store: &S) -> SubscriptionId {
        let calendar = self.calendar;
        self.subscribe(store, move || calendar.today(Utc::now()), |_| {})
    }

    /// Recompute on every snapshot, anchoring at `clock()` and passing each
    /// new dashboard to `on_update`
    pub fn subscribe<S, C, F>(&self, store: &S, clock: C, on_update: F) -> SubscriptionId
    where
        S: EntryStore + ?Sized,
        C: Fn() -> NaiveDate + Send + Sync + 'static,
        F: Fn(&Dashboard) + Send + Sync + 'static,
    {
        let config = self.config.clone();
        let calendar = self.calendar;
        let latest = Arc::clone(&self.latest);

        store.subscribe(Box::new(move |snapshot: &[Entry]| {
            let today = clock();
            log::debug!(
                "Recomputing dashboard for {} entries anchored at {}",
                snapshot.len(),
                today
            );
            let dashboard = build_dashboard(snapshot, today, &config, &calendar);
            on_update(&dashboard);
            *latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(dashboard);
        }))
    }
}
