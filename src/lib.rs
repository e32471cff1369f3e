//! Journal Insights - On-device aggregation engine for journal mood analytics
//!
//! Journal Insights turns a user's journal entries into the views a wellness
//! dashboard renders: mood trend, emotion distribution, streaks, calendar
//! heatmap, top emotions and life-balance radar. Every view is recomputed
//! from a full entry snapshot; nothing is cached between calls.
//!
//! ## Modules
//!
//! - **Aggregations**: scoring, bucketing, trend, distribution, streak, heatmap, ranking, balance
//! - **Edges**: entry adapter, classifier contract, store subscription, dashboard encoding

pub mod adapter;
pub mod balance;
pub mod bucketing;
pub mod calendar;
pub mod classification;
pub mod config;
pub mod distribution;
pub mod encoder;
pub mod error;
pub mod heatmap;
pub mod pipeline;
pub mod ranking;
pub mod scoring;
pub mod store;
pub mod streak;
pub mod trend;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use calendar::LocalCalendar;
pub use classification::Classification;
pub use config::InsightsConfig;
pub use error::InsightsError;
pub use pipeline::{build_dashboard, entries_to_dashboard, DashboardProcessor};
pub use scoring::{score, Emotion};
pub use store::{EntryStore, MemoryStore};
pub use types::{Dashboard, Entry};

/// Engine version embedded in encoded dashboards
pub const INSIGHTS_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for encoded dashboards
pub const PRODUCER_NAME: &str = "journal-insights";
