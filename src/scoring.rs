//! Mood scoring
//!
//! Maps the classifier's emotion vocabulary onto a 0-5 mood score. Lookups
//! are case-insensitive and total: anything outside the vocabulary scores
//! as neutral.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Score assigned to missing or unrecognized labels
pub const NEUTRAL_SCORE: u8 = 3;

/// Highest possible mood score
pub const MAX_SCORE: u8 = 5;

/// Emotion vocabulary produced by the text classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Joy,
    Surprise,
    Neutral,
    Disgust,
    Sadness,
    Fear,
    Anger,
}

impl Emotion {
    /// Every emotion in the vocabulary, happiest first
    pub const ALL: [Emotion; 7] = [
        Emotion::Joy,
        Emotion::Surprise,
        Emotion::Neutral,
        Emotion::Disgust,
        Emotion::Sadness,
        Emotion::Fear,
        Emotion::Anger,
    ];

    /// Resolve a raw label, ignoring case and surrounding whitespace
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|emotion| emotion.as_str().eq_ignore_ascii_case(label))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Joy => "joy",
            Emotion::Surprise => "surprise",
            Emotion::Neutral => "neutral",
            Emotion::Disgust => "disgust",
            Emotion::Sadness => "sadness",
            Emotion::Fear => "fear",
            Emotion::Anger => "anger",
        }
    }

    /// Mood score in [0, 5]
    pub fn score(&self) -> u8 {
        match self {
            Emotion::Joy => 5,
            Emotion::Surprise => 4,
            Emotion::Neutral => 3,
            Emotion::Disgust => 2,
            Emotion::Sadness | Emotion::Fear => 1,
            Emotion::Anger => 0,
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a label is outside the vocabulary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown emotion label: {0}")]
pub struct UnknownEmotion(pub String);

impl FromStr for Emotion {
    type Err = UnknownEmotion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emotion::parse(s).ok_or_else(|| UnknownEmotion(s.to_string()))
    }
}

/// Score an optional raw label. Never fails.
pub fn score(label: Option<&str>) -> u8 {
    label
        .and_then(Emotion::parse)
        .map(|emotion| emotion.score())
        .unwrap_or(NEUTRAL_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_scores() {
        let expected = [
            ("joy", 5),
            ("surprise", 4),
            ("neutral", 3),
            ("disgust", 2),
            ("sadness", 1),
            ("fear", 1),
            ("anger", 0),
        ];
        for (label, value) in expected {
            assert_eq!(score(Some(label)), value, "label {label}");
        }
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(score(Some("JOY")), 5);
        assert_eq!(score(Some("  Anger ")), 0);
        assert_eq!(Emotion::parse("SuRpRiSe"), Some(Emotion::Surprise));
    }

    #[test]
    fn test_unknown_and_missing_default_to_neutral() {
        assert_eq!(score(None), NEUTRAL_SCORE);
        assert_eq!(score(Some("")), NEUTRAL_SCORE);
        assert_eq!(score(Some("optimism")), NEUTRAL_SCORE);
        assert_eq!(score(Some("joyful")), NEUTRAL_SCORE);
    }

    #[test]
    fn test_scores_within_range() {
        assert!(Emotion::ALL.iter().all(|e| e.score() <= MAX_SCORE));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("fear".parse::<Emotion>(), Ok(Emotion::Fear));
        assert!("calm".parse::<Emotion>().is_err());
    }
}
