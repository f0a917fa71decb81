//! Oura Tags Library
//!
//! Correlates the tags and notes recorded in the Oura app with the ring's daily sleep
//! and readiness metrics, to show whether tagged days differ from the baseline of a
//! chosen date range.
//!
//! ## Architecture Overview
//!
//! The correlation engine is two pure, synchronous components:
//!
//! - [`tags`] - [`TagExtractor`] maps every tag or note text to the days it occurred on
//! - [`averager`] - [`MetricAverager`] computes the baseline and the day-before,
//!   same-day and day-after averages per tag and metric
//!
//! Around it sit the request collaborators:
//!
//! - [`models`] - Records, tag/day maps, the wanted metric selection and results
//! - [`metric_table`] - Daily metric table built from the ring's daily summaries
//! - [`range`] - Date range and formula validation
//! - [`input`] - Offline input files
//! - `oura_client` - Oura API access (feature `fetch`)
//! - [`analyzer`] - Request coordinator
//! - [`display`] - Terminal and JSON rendering
//! - [`config`] - Configuration management with environment variable support
//! - [`logging`] - Structured logging with JSON and pretty-print formats
//!
//! ## Example
//!
//! ```rust
//! use oura_tags::{AnnotationRecord, Formula, MetricAverager, MetricTable, TagExtractor};
//! use chrono::NaiveDate;
//!
//! let day = |d: u32| NaiveDate::from_ymd_opt(2022, 1, d).unwrap();
//! let records = vec![AnnotationRecord::new(day(2), &["cold"], "")];
//!
//! let mut table = MetricTable::new();
//! for (d, score) in [(1, 70.0), (2, 80.0), (3, 90.0)] {
//!     table.insert(day(d), "SLEEP:score", score);
//! }
//!
//! let tag_days = TagExtractor::extract(&records);
//! let scores = oura_tags::models::WantedScores::new(&[(oura_tags::Category::Sleep, &["score"])]);
//! let result = MetricAverager::with_scores(Formula::Mean, scores)
//!     .compute(&tag_days, &table)
//!     .unwrap();
//!
//! let score = result.get("cold", oura_tags::Category::Sleep, "score").unwrap();
//! assert_eq!(score.average_all, 80.0);
//! assert_eq!(score.offset(1).unwrap().all_diff, Some(10.0));
//! ```

pub mod analyzer;
pub mod averager;
pub mod config;
pub mod display;
pub mod error;
pub mod input;
pub mod logging;
pub mod metric_table;
pub mod models;
pub mod range;
pub mod tags;

#[cfg(feature = "fetch")]
pub mod oura_client;

pub use analyzer::TagInsightsAnalyzer;
pub use averager::{Formula, MetricAverager};
pub use error::AnalysisError;
pub use metric_table::MetricTable;
pub use models::*;
pub use tags::TagExtractor;
