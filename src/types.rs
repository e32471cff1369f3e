//! Core types for Journal Insights
//!
//! This module defines the journal entry as it arrives from the document
//! store and the immutable view models handed to the rendering layer.

use crate::scoring::{self, Emotion};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// One journal/diary record
///
/// Field names follow the camelCase documents written by the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Opaque, unique identifier
    pub id: String,
    /// Creation time; `None` when absent or unparseable
    #[serde(
        default,
        deserialize_with = "deserialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    /// Free-form text
    #[serde(default)]
    pub content: String,
    /// Raw classifier label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_label: Option<String>,
    /// Classifier confidence (0-1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_confidence: Option<f64>,
    /// Hours slept the night before
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_hours: Option<f64>,
    /// Self-rated life areas (0-10), keyed by area name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life_balance: Option<BTreeMap<String, f64>>,
}

impl Entry {
    /// Create an entry with the given id and timestamp
    pub fn new(id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            timestamp: Some(timestamp),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.mood_label = Some(label.into());
        self
    }

    pub fn with_sleep(mut self, hours: f64) -> Self {
        self.sleep_hours = Some(hours);
        self
    }

    pub fn with_balance(mut self, area: impl Into<String>, value: f64) -> Self {
        self.life_balance
            .get_or_insert_with(BTreeMap::new)
            .insert(area.into(), value);
        self
    }

    /// Recognized emotion, if the label is part of the vocabulary
    pub fn emotion(&self) -> Option<Emotion> {
        self.mood_label.as_deref().and_then(Emotion::parse)
    }

    /// Mood score in [0, 5], neutral when unlabeled
    pub fn mood_score(&self) -> u8 {
        scoring::score(self.mood_label.as_deref())
    }

    /// Sleep hours if present and usable
    pub fn valid_sleep_hours(&self) -> Option<f64> {
        self.sleep_hours.filter(|h| h.is_finite() && *h >= 0.0)
    }
}

/// Accepts RFC 3339 strings, epoch milliseconds, or `{seconds, nanoseconds}`
/// objects. Anything else becomes `None` rather than failing the document.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let parsed = parse_timestamp_value(&value);
    if parsed.is_none() && !value.is_null() {
        log::warn!("Ignoring unparseable entry timestamp: {}", value);
    }
    Ok(parsed)
}

pub(crate) fn parse_timestamp_value(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        serde_json::Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            Utc.timestamp_millis_opt(millis).single()
        }
        serde_json::Value::Object(obj) => {
            let seconds = obj
                .get("seconds")
                .or_else(|| obj.get("_seconds"))
                .and_then(|v| v.as_i64())?;
            let nanos = obj
                .get("nanoseconds")
                .or_else(|| obj.get("_nanoseconds"))
                .and_then(|v| v.as_u64())
                .unwrap_or(0);
            Utc.timestamp_opt(seconds, u32::try_from(nanos).ok()?).single()
        }
        _ => None,
    }
}

/// Life areas rated on the balance radar, in axis order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeArea {
    Health,
    Work,
    Relationships,
    PersonalGrowth,
    Finances,
    Leisure,
}

impl LifeArea {
    pub const ALL: [LifeArea; 6] = [
        LifeArea::Health,
        LifeArea::Work,
        LifeArea::Relationships,
        LifeArea::PersonalGrowth,
        LifeArea::Finances,
        LifeArea::Leisure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LifeArea::Health => "health",
            LifeArea::Work => "work",
            LifeArea::Relationships => "relationships",
            LifeArea::PersonalGrowth => "personal_growth",
            LifeArea::Finances => "finances",
            LifeArea::Leisure => "leisure",
        }
    }

    /// Resolve an area name; case-insensitive, `-` and spaces read as `_`
    pub fn parse(name: &str) -> Option<Self> {
        let normalized: String = name
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        Self::ALL
            .iter()
            .copied()
            .find(|area| area.as_str() == normalized)
    }
}

/// One point of the mood trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub day: NaiveDate,
    /// Short weekday name for chart axes
    pub label: String,
    /// Mean mood score; `None` renders as a gap
    pub mean_score: Option<f64>,
    pub entries: usize,
}

/// One point of the sleep trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepPoint {
    pub day: NaiveDate,
    pub label: String,
    pub mean_hours: Option<f64>,
}

/// Share of one emotion among labeled entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionSlice {
    pub label: Emotion,
    /// Rounded percentage of labeled entries
    pub percent: u32,
    pub count: usize,
}

/// Frequency of one emotion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionCount {
    pub label: Emotion,
    pub count: usize,
}

/// Headline numbers for the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_entries: usize,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Distinct calendar days with at least one entry
    pub days_logged: usize,
    pub average_mood: Option<f64>,
    pub average_sleep_hours: Option<f64>,
    pub dominant_emotion: Option<Emotion>,
}

/// Entry counts per calendar day, keyed `YYYY-MM-DD`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Heatmap {
    pub days: BTreeMap<String, u32>,
}

impl Heatmap {
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn get(&self, day: NaiveDate) -> Option<u32> {
        self.days.get(&day.format("%Y-%m-%d").to_string()).copied()
    }

    /// Busiest day's count, for colour scaling
    pub fn max_count(&self) -> u32 {
        self.days.values().copied().max().unwrap_or(0)
    }
}

/// One axis of the life-balance radar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceAxis {
    pub area: LifeArea,
    pub average: Option<f64>,
    pub samples: usize,
}

/// Every view the dashboard renders, computed from one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    /// Day the views are anchored to ("today")
    pub anchor: NaiveDate,
    pub trend: Vec<TrendPoint>,
    pub sleep_trend: Vec<SleepPoint>,
    pub distribution: Vec<DistributionSlice>,
    pub top_emotions: Vec<EmotionCount>,
    pub summary: SummaryStats,
    pub heatmap: Heatmap,
    pub life_balance: Vec<BalanceAxis>,
}

/// Producer metadata for encoded dashboards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Encoded dashboard envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardPayload {
    pub schema_version: String,
    pub producer: DashboardProducer,
    pub computed_at_utc: String,
    /// UTC offset used to resolve calendar days
    pub utc_offset_minutes: i32,
    pub dashboard: Dashboard,
}
