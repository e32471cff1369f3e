//! Error types for Journal Insights

use thiserror::Error;

/// Errors that can occur at the fallible edges of the engine
///
/// The aggregations themselves are total; these only surface while parsing
/// input documents, loading configuration or encoding output.
#[derive(Debug, Error)]
pub enum InsightsError {
    #[error("Failed to parse entry payload: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid UTC offset: {0} minutes")]
    InvalidOffset(i32),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
