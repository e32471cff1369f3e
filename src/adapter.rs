//! Entry document adapter
//!
//! Parses entry documents exported from the document store (a JSON array or
//! NDJSON) and reports entries whose fields fall outside their documented
//! domains. The engine itself tolerates all of these; validation exists so
//! callers can surface data problems.

use crate::error::InsightsError;
use crate::scoring::Emotion;
use crate::types::{Entry, LifeArea};
use std::io::BufRead;
use thiserror::Error;

/// Adapter for turning exported documents into entries
pub struct EntryAdapter;

impl EntryAdapter {
    /// Parse a JSON string containing an array of entries
    pub fn parse_array(json: &str) -> Result<Vec<Entry>, InsightsError> {
        let entries: Vec<Entry> = serde_json::from_str(json)?;
        Ok(entries)
    }

    /// Parse NDJSON (newline-delimited JSON) containing entries
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<Entry>, InsightsError> {
        let mut entries = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<Entry>(trimmed) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    return Err(InsightsError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(entries)
    }

    /// Read NDJSON entries from `reader` and hand each one to `sink` as soon
    /// as its line is parsed. Returns the number of entries delivered.
    ///
    /// Entries that fail validation are logged and still delivered; the
    /// aggregations score unknown labels as neutral and leave untimed
    /// entries out of date-bucketed views. Malformed JSON stops the stream.
    pub fn read_ndjson_stream<R, F>(reader: R, mut sink: F) -> Result<usize, InsightsError>
    where
        R: BufRead,
        F: FnMut(Entry),
    {
        let mut delivered = 0;
        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let entry: Entry = serde_json::from_str(trimmed).map_err(|e| {
                InsightsError::ParseError(format!("Failed to parse line {}: {}", line_num + 1, e))
            })?;
            if let Err(e) = validate(&entry) {
                log::warn!("Line {} (entry '{}'): {}", line_num + 1, entry.id, e);
            }
            sink(entry);
            delivered += 1;
        }
        Ok(delivered)
    }

    /// Validate a batch of entries, returning only the failures
    pub fn validate_entries(entries: &[Entry]) -> Vec<ValidationResult> {
        entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                validate(entry).err().map(|error| ValidationResult {
                    index,
                    entry_id: (!entry.id.is_empty()).then(|| entry.id.clone()),
                    error,
                })
            })
            .collect()
    }
}

/// Result of entry validation
#[derive(Debug)]
pub struct ValidationResult {
    pub index: usize,
    pub entry_id: Option<String>,
    pub error: ValidationError,
}

/// Entry fields outside their documented domains
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Entry has an empty id")]
    EmptyId,

    #[error("Missing or unparseable timestamp")]
    MissingTimestamp,

    #[error("Unknown mood label: {0}")]
    UnknownLabel(String),

    #[error("Mood confidence must be within [0, 1], got {0}")]
    ConfidenceOutOfRange(f64),

    #[error("Sleep hours must be non-negative, got {0}")]
    NegativeSleep(f64),

    #[error("Unknown life area: {0}")]
    UnknownLifeArea(String),

    #[error("Life balance rating for {area} must be within [0, 10], got {value}")]
    RatingOutOfRange { area: String, value: f64 },
}

/// Check one entry; reports the first problem found
pub fn validate(entry: &Entry) -> Result<(), ValidationError> {
    if entry.id.trim().is_empty() {
        return Err(ValidationError::EmptyId);
    }
    if entry.timestamp.is_none() {
        return Err(ValidationError::MissingTimestamp);
    }
    if let Some(label) = &entry.mood_label {
        if Emotion::parse(label).is_none() {
            return Err(ValidationError::UnknownLabel(label.clone()));
        }
    }
    if let Some(confidence) = entry.mood_confidence {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ValidationError::ConfidenceOutOfRange(confidence));
        }
    }
    if let Some(hours) = entry.sleep_hours {
        if hours.is_nan() || hours < 0.0 {
            return Err(ValidationError::NegativeSleep(hours));
        }
    }
    if let Some(ratings) = &entry.life_balance {
        for (area, value) in ratings {
            if LifeArea::parse(area).is_none() {
                return Err(ValidationError::UnknownLifeArea(area.clone()));
            }
            if !(0.0..=10.0).contains(value) {
                return Err(ValidationError::RatingOutOfRange {
                    area: area.clone(),
                    value: *value,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::io::Cursor;

    fn valid_entry() -> Entry {
        Entry::new("e1", Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap())
            .with_label("joy")
            .with_sleep(7.0)
            .with_balance("health", 7.0)
    }

    #[test]
    fn test_parse_array() {
        let json = r#"[
            {"id": "a", "timestamp": "2024-01-15T09:00:00Z", "moodLabel": "joy"},
            {"id": "b", "timestamp": 1705309200000}
        ]"#;
        let entries = EntryAdapter::parse_array(json).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].timestamp, entries[1].timestamp);
    }

    #[test]
    fn test_parse_ndjson_skips_blank_lines() {
        let ndjson = concat!(
            "{\"id\":\"a\",\"timestamp\":\"2024-01-15T09:00:00Z\"}\n",
            "\n   \n",
            "{\"id\":\"b\"}\n",
        );
        let entries = EntryAdapter::parse_ndjson(ndjson).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_parse_ndjson_reports_line_number() {
        let ndjson = "{\"id\":\"a\"}\n{broken\n";
        let err = EntryAdapter::parse_ndjson(ndjson).unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn test_stream_keeps_entries_that_fail_validation() {
        let ndjson = concat!(
            "{\"id\":\"a\",\"timestamp\":\"2024-06-10T09:00:00Z\",\"moodLabel\":\"joy\"}\n",
            "{\"id\":\"b\",\"timestamp\":\"2024-06-10T10:00:00Z\",\"moodLabel\":\"optimism\"}\n",
            "\n",
            "{\"id\":\"c\",\"timestamp\":\"garbage\",\"moodLabel\":\"sadness\"}\n",
            "{\"id\":\"d\",\"timestamp\":\"2024-06-10T11:00:00Z\",\"moodLabel\":\"sadness\"}\n",
        );
        let mut ids = Vec::new();
        let delivered = EntryAdapter::read_ndjson_stream(Cursor::new(ndjson), |entry| {
            ids.push(entry.id);
        })
        .unwrap();

        assert_eq!(delivered, 4);
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_stream_stops_on_malformed_json() {
        let ndjson = "{\"id\":\"a\"}\n{broken\n{\"id\":\"c\"}\n";
        let mut seen = 0;
        let err = EntryAdapter::read_ndjson_stream(Cursor::new(ndjson), |_| seen += 1).unwrap_err();

        assert!(err.to_string().contains("line 2"), "{err}");
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_valid_entry_passes() {
        assert_eq!(validate(&valid_entry()), Ok(()));
        let mut unlabeled = valid_entry();
        unlabeled.mood_label = None;
        assert_eq!(validate(&unlabeled), Ok(()));
    }

    #[test]
    fn test_domain_violations() {
        let mut e = valid_entry();
        e.timestamp = None;
        assert_eq!(validate(&e), Err(ValidationError::MissingTimestamp));

        let mut e = valid_entry();
        e.mood_label = Some("elated".to_string());
        assert_eq!(validate(&e), Err(ValidationError::UnknownLabel("elated".to_string())));

        let mut e = valid_entry();
        e.mood_confidence = Some(1.2);
        assert_eq!(validate(&e), Err(ValidationError::ConfidenceOutOfRange(1.2)));

        let e = valid_entry().with_sleep(-2.0);
        assert_eq!(validate(&e), Err(ValidationError::NegativeSleep(-2.0)));

        let e = valid_entry().with_balance("work", 12.0);
        assert!(matches!(validate(&e), Err(ValidationError::RatingOutOfRange { .. })));
    }

    #[test]
    fn test_validate_entries_reports_index_and_id() {
        let entries = vec![
            valid_entry(),
            Entry::default(),
            Entry {
                id: "bad".to_string(),
                ..Default::default()
            },
        ];
        let failures = EntryAdapter::validate_entries(&entries);

        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].index, 1);
        assert_eq!(failures[0].entry_id, None);
        assert_eq!(failures[0].error, ValidationError::EmptyId);
        assert_eq!(failures[1].entry_id.as_deref(), Some("bad"));
        assert_eq!(failures[1].error, ValidationError::MissingTimestamp);
    }
}
