//! Engine configuration
//!
//! Window sizes and calendar settings for the dashboard. Every field has a
//! default, so an empty JSON object is a valid configuration.

use crate::calendar::LocalCalendar;
use crate::error::InsightsError;
use crate::ranking::DEFAULT_TOP_LIMIT;
use serde::{Deserialize, Serialize};

/// Default trend window in days
pub const DEFAULT_TREND_WINDOW: u32 = 7;

/// Longest supported trend or heatmap window
pub const MAX_WINDOW_DAYS: u32 = 3660;

/// Dashboard configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    /// Days covered by the trend charts and the radar
    pub trend_window_days: u32,
    /// Maximum number of ranked emotions
    pub top_emotions_limit: usize,
    /// Heatmap span ending today; `None` means year-to-date
    pub heatmap_days: Option<u32>,
    /// Minutes east of UTC for calendar days; `None` uses the host offset
    pub utc_offset_minutes: Option<i32>,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            trend_window_days: DEFAULT_TREND_WINDOW,
            top_emotions_limit: DEFAULT_TOP_LIMIT,
            heatmap_days: None,
            utc_offset_minutes: None,
        }
    }
}

impl InsightsConfig {
    /// Load and validate configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, InsightsError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, InsightsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), InsightsError> {
        if self.trend_window_days == 0 || self.trend_window_days > MAX_WINDOW_DAYS {
            return Err(InsightsError::InvalidConfig(format!(
                "trend_window_days must be within 1..={}, got {}",
                MAX_WINDOW_DAYS, self.trend_window_days
            )));
        }
        if let Some(days) = self.heatmap_days {
            if days == 0 || days > MAX_WINDOW_DAYS {
                return Err(InsightsError::InvalidConfig(format!(
                    "heatmap_days must be within 1..={}, got {}",
                    MAX_WINDOW_DAYS, days
                )));
            }
        }
        if let Some(minutes) = self.utc_offset_minutes {
            LocalCalendar::from_offset_minutes(minutes)?;
        }
        Ok(())
    }

    /// Calendar described by this configuration
    pub fn calendar(&self) -> Result<LocalCalendar, InsightsError> {
        match self.utc_offset_minutes {
            Some(minutes) => LocalCalendar::from_offset_minutes(minutes),
            None => Ok(LocalCalendar::local()),
        }
    }
}
