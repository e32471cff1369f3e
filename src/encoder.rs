//! Dashboard encoding
//!
//! Wraps a computed dashboard in a versioned envelope with producer metadata
//! before it is handed to the client.

use crate::calendar::LocalCalendar;
use crate::error::InsightsError;
use crate::types::{Dashboard, DashboardPayload, DashboardProducer};
use crate::{INSIGHTS_VERSION, PRODUCER_NAME};
use chrono::Utc;
use uuid::Uuid;

/// Current dashboard schema version
pub const DASHBOARD_SCHEMA_VERSION: &str = "insights.dashboard.v1";

/// Encoder for dashboard payloads
#[derive(Debug, Clone)]
pub struct DashboardEncoder {
    instance_id: String,
}

impl Default for DashboardEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Wrap a dashboard in its envelope
    pub fn encode(&self, dashboard: &Dashboard, calendar: &LocalCalendar) -> DashboardPayload {
        DashboardPayload {
            schema_version: DASHBOARD_SCHEMA_VERSION.to_string(),
            producer: DashboardProducer {
                name: PRODUCER_NAME.to_string(),
                version: INSIGHTS_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            utc_offset_minutes: calendar.offset_minutes(),
            dashboard: dashboard.clone(),
        }
    }

    /// Encode to JSON string
    pub fn encode_to_json(
        &self,
        dashboard: &Dashboard,
        calendar: &LocalCalendar,
    ) -> Result<String, InsightsError> {
        let payload = self.encode(dashboard, calendar);
        serde_json::to_string(&payload).map_err(|e| InsightsError::EncodingError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InsightsConfig;
    use crate::pipeline::build_dashboard;
    use crate::types::Entry;
    use chrono::{NaiveDate, TimeZone};

    fn sample_dashboard() -> Dashboard {
        let entries = vec![
            Entry::new("a", Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap()).with_label("joy"),
        ];
        build_dashboard(
            &entries,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            &InsightsConfig::default(),
            &LocalCalendar::utc(),
        )
    }

    #[test]
    fn test_encode_payload() {
        let encoder = DashboardEncoder::with_instance_id("test-instance".to_string());
        let calendar = LocalCalendar::from_offset_minutes(60).unwrap();
        let payload = encoder.encode(&sample_dashboard(), &calendar);

        assert_eq!(payload.schema_version, DASHBOARD_SCHEMA_VERSION);
        assert_eq!(payload.producer.name, PRODUCER_NAME);
        assert_eq!(payload.producer.version, INSIGHTS_VERSION);
        assert_eq!(payload.producer.instance_id, "test-instance");
        assert_eq!(payload.utc_offset_minutes, 60);
        assert_eq!(payload.dashboard.summary.total_entries, 1);
    }

    #[test]
    fn test_encode_to_json() {
        let encoder = DashboardEncoder::new();
        let json = encoder
            .encode_to_json(&sample_dashboard(), &LocalCalendar::utc())
            .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["dashboard"]["anchor"], "2024-01-15");
        assert_eq!(parsed["dashboard"]["trend"][6]["day"], "2024-01-15");
        assert_eq!(parsed["dashboard"]["trend"][6]["mean_score"], 5.0);
        assert!(parsed["dashboard"]["trend"][5]["mean_score"].is_null());
        assert_eq!(parsed["dashboard"]["heatmap"]["2024-01-15"], 1);
        assert_eq!(parsed["dashboard"]["distribution"][0]["label"], "joy");
    }
}
