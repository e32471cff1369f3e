//! Classifier output contract
//!
//! The hosted text classifier returns candidate labels with confidence
//! scores, either as a single object, a flat list or a list of lists.
//! This module reduces any of those shapes to one `Classification` and
//! applies it to an entry.

use crate::error::InsightsError;
use crate::scoring::Emotion;
use crate::types::Entry;
use serde::{Deserialize, Serialize};

/// Best label reported by the classifier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProviderOutput {
    Single(Classification),
    List(Vec<Classification>),
    Nested(Vec<Vec<Classification>>),
}

impl Classification {
    /// Parse provider output, keeping the highest-scoring candidate
    pub fn from_provider_json(json: &str) -> Result<Self, InsightsError> {
        let output: ProviderOutput = serde_json::from_str(json)?;
        let candidates = match output {
            ProviderOutput::Single(single) => vec![single],
            ProviderOutput::List(list) => list,
            ProviderOutput::Nested(nested) => nested.into_iter().flatten().collect(),
        };
        Ok(Self::best(candidates).unwrap_or_default())
    }

    /// Highest-scoring candidate; candidates without a score rank last
    pub fn best(candidates: Vec<Classification>) -> Option<Classification> {
        candidates.into_iter().reduce(|best, next| {
            let best_score = best.score.unwrap_or(f64::NEG_INFINITY);
            let next_score = next.score.unwrap_or(f64::NEG_INFINITY);
            if next_score > best_score {
                next
            } else {
                best
            }
        })
    }

    pub fn emotion(&self) -> Option<Emotion> {
        self.label.as_deref().and_then(Emotion::parse)
    }

    /// Confidence if it is a probability
    pub fn confidence(&self) -> Option<f64> {
        self.score.filter(|s| s.is_finite() && (0.0..=1.0).contains(s))
    }
}

impl Entry {
    /// Copy of this entry carrying the classifier's label and confidence
    ///
    /// Recognized labels are stored lower-cased; anything else is kept
    /// verbatim and scores as neutral downstream.
    pub fn with_classification(&self, classification: &Classification) -> Entry {
        let mood_label = match classification.emotion() {
            Some(emotion) => Some(emotion.as_str().to_string()),
            None => {
                if let Some(raw) = &classification.label {
                    log::warn!("Entry {} classified with unknown label '{}'", self.id, raw);
                }
                classification.label.clone()
            }
        };

        Entry {
            mood_label,
            mood_confidence: classification.confidence(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_candidates_pick_highest() {
        let json = r#"[[
            {"label": "sadness", "score": 0.12},
            {"label": "joy", "score": 0.81},
            {"label": "anger", "score": 0.07}
        ]]"#;
        let c = Classification::from_provider_json(json).unwrap();

        assert_eq!(c.label.as_deref(), Some("joy"));
        assert_eq!(c.emotion(), Some(Emotion::Joy));
    }

    #[test]
    fn test_single_object_and_flat_list() {
        let single = Classification::from_provider_json(r#"{"label":"FEAR","score":0.6}"#).unwrap();
        let flat = Classification::from_provider_json(
            r#"[{"label":"neutral","score":0.3},{"label":"surprise","score":0.4}]"#,
        )
        .unwrap();

        assert_eq!(single.emotion(), Some(Emotion::Fear));
        assert_eq!(flat.emotion(), Some(Emotion::Surprise));
    }

    #[test]
    fn test_empty_output_is_unlabeled() {
        let c = Classification::from_provider_json("[]").unwrap();
        assert_eq!(c, Classification::default());
        assert!(Classification::from_provider_json("not json").is_err());
    }

    #[test]
    fn test_apply_to_entry() {
        let entry = Entry {
            id: "e1".to_string(),
            content: "Had a lovely walk".to_string(),
            ..Default::default()
        };
        let classified = entry.with_classification(&Classification {
            label: Some("Joy".to_string()),
            score: Some(0.93),
        });

        assert_eq!(classified.mood_label.as_deref(), Some("joy"));
        assert_eq!(classified.mood_confidence, Some(0.93));
        assert_eq!(classified.content, "Had a lovely walk");
        assert!(entry.mood_label.is_none());
    }

    #[test]
    fn test_unknown_label_and_bad_confidence() {
        let classified = Entry::default().with_classification(&Classification {
            label: Some("optimism".to_string()),
            score: Some(1.7),
        });

        assert_eq!(classified.mood_label.as_deref(), Some("optimism"));
        assert_eq!(classified.mood_confidence, None);
        assert_eq!(classified.mood_score(), 3);
    }
}
