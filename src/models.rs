//! Core Data Models
//!
//! This module defines the data structures that flow through the tag correlation
//! pipeline, from raw annotation records to the nested per-tag averages.
//!
//! ## Data Flow
//!
//! 1. **Raw Data**: [`AnnotationRecord`] - Individual tags/notes returned by the Oura API
//! 2. **Grouping**: [`TagDayMap`] - Every distinct tag label with the days it occurred on
//! 3. **Metrics**: [`crate::metric_table::MetricTable`] - Daily physiological metrics
//! 4. **Output**: [`AverageResult`] - Baseline and offset-day averages per tag and metric
//!
//! ## Static Configuration
//!
//! [`WANTED_SCORES`] lists which metrics are analyzed within each [`Category`]. It is
//! process-wide constant data and never changes at runtime.

use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Days examined relative to each tagged day: the day before, the day itself and the day after
pub const OFFSETS: [i64; 3] = [-1, 0, 1];

/// A single tag entry as recorded by the ring's companion app
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub day: NaiveDate,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

impl AnnotationRecord {
    pub fn new(day: NaiveDate, tags: &[&str], text: &str) -> Self {
        Self {
            day,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            text: text.to_string(),
        }
    }

    /// Whether this record was tagged with `label`, either as a tag or as its note text
    pub fn matches(&self, label: &str) -> bool {
        self.tags.iter().any(|t| t == label) || self.text == label
    }
}

// The API sends `"text": null` for entries without a note
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of the tag collection endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagPage {
    #[serde(default)]
    pub data: Vec<AnnotationRecord>,
    #[serde(default)]
    pub next_token: Option<String>,
}

/// Tag label -> days on which it was recorded. Duplicate days are kept.
pub type TagDayMap = BTreeMap<String, Vec<NaiveDate>>;

/// Metric category, rendered as the column prefix used by the metric table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "SLEEP")]
    Sleep,
    #[serde(rename = "READY")]
    Readiness,
    #[serde(rename = "ACTIVITY")]
    Activity,
}

impl Category {
    pub fn prefix(self) -> &'static str {
        match self {
            Category::Sleep => "SLEEP",
            Category::Readiness => "READY",
            Category::Activity => "ACTIVITY",
        }
    }

    /// Column name for `metric` within this category, e.g. `SLEEP:score`
    pub fn column(self, metric: &str) -> String {
        format!("{}:{}", self.prefix(), metric)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Category -> metric names selected for analysis
#[derive(Debug, Clone, Copy)]
pub struct WantedScores(&'static [(Category, &'static [&'static str])]);

impl WantedScores {
    pub const fn new(entries: &'static [(Category, &'static [&'static str])]) -> Self {
        Self(entries)
    }

    /// Every (category, metric) pair; categories without metrics yield nothing
    pub fn pairs(&self) -> impl Iterator<Item = (Category, &'static str)> + '_ {
        self.0
            .iter()
            .flat_map(|(category, metrics)| metrics.iter().map(move |m| (*category, *m)))
    }

    pub fn metrics(&self, category: Category) -> &'static [&'static str] {
        self.0
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, metrics)| *metrics)
            .unwrap_or(&[])
    }
}

impl Serialize for WantedScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (category, metrics) in self.0 {
            map.serialize_entry(category.prefix(), metrics)?;
        }
        map.end()
    }
}

/// Metrics analyzed for every tag
pub static WANTED_SCORES: WantedScores = WantedScores::new(&[
    (
        Category::Sleep,
        &[
            "duration_in_hrs",
            "score",
            "temperature_deviation",
            "hr_lowest",
            "hr_average",
        ],
    ),
    (Category::Readiness, &["score", "score_hrv_balance"]),
    (Category::Activity, &[]),
]);

/// Average over the days at one offset from the tagged days
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffsetAverage {
    pub average: Option<f64>,
    pub all_diff: Option<f64>,
}

impl OffsetAverage {
    pub const ABSENT: OffsetAverage = OffsetAverage {
        average: None,
        all_diff: None,
    };
}

/// Baseline plus offset-day averages for one metric of one tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricAverages {
    pub average_all: f64,
    pub offsets: BTreeMap<i64, OffsetAverage>,
}

impl MetricAverages {
    pub fn offset(&self, days: i64) -> Option<&OffsetAverage> {
        self.offsets.get(&days)
    }
}

/// Tag -> category -> metric -> averages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AverageResult {
    pub tags: BTreeMap<String, BTreeMap<Category, BTreeMap<String, MetricAverages>>>,
}

impl AverageResult {
    pub fn get(&self, tag: &str, category: Category, metric: &str) -> Option<&MetricAverages> {
        self.tags.get(tag)?.get(&category)?.get(metric)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
