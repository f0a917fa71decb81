//! Daily metric table
//!
//! Holds daily physiological metrics in columns named `"<CATEGORY>:<metric>"`, built
//! from the ring's daily sleep, readiness and activity summaries. Days and individual
//! cells may be missing; only a column missing entirely is treated as an error.

use crate::error::{AnalysisError, Result};
use crate::models::Category;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Raw daily summary documents, one list per category
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryPayload {
    #[serde(default)]
    pub sleep: Vec<Value>,
    #[serde(default)]
    pub readiness: Vec<Value>,
    #[serde(default)]
    pub activity: Vec<Value>,
}

impl SummaryPayload {
    fn documents(&self) -> [(Category, &[Value]); 3] {
        [
            (Category::Sleep, self.sleep.as_slice()),
            (Category::Readiness, self.readiness.as_slice()),
            (Category::Activity, self.activity.as_slice()),
        ]
    }
}

/// Column -> day -> value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricTable {
    columns: BTreeMap<String, BTreeMap<NaiveDate, f64>>,
}

impl MetricTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, day: NaiveDate, column: impl Into<String>, value: f64) {
        self.columns
            .entry(column.into())
            .or_default()
            .insert(day, value);
    }

    /// All values of a column, ordered by day
    pub fn column(&self, name: &str) -> Result<&BTreeMap<NaiveDate, f64>> {
        self.columns
            .get(name)
            .ok_or_else(|| AnalysisError::MissingColumn {
                column: name.to_string(),
            })
    }

    pub fn value(&self, column: &str, day: NaiveDate) -> Option<f64> {
        self.columns.get(column)?.get(&day).copied()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Number of distinct days holding at least one value
    pub fn day_count(&self) -> usize {
        let mut days: Vec<&NaiveDate> = self.columns.values().flat_map(|c| c.keys()).collect();
        days.sort();
        days.dedup();
        days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Keep only the rows dated within `start..=end`. Columns left without values
    /// count as missing afterwards.
    pub fn restrict(&self, start: NaiveDate, end: NaiveDate) -> Self {
        if start > end {
            return Self::new();
        }

        let columns = self
            .columns
            .iter()
            .filter_map(|(name, column)| {
                let kept: BTreeMap<NaiveDate, f64> = column
                    .range(start..=end)
                    .map(|(day, value)| (*day, *value))
                    .collect();
                (!kept.is_empty()).then(|| (name.clone(), kept))
            })
            .collect();

        Self { columns }
    }

    /// Build a table from daily summaries, adding the derived `SLEEP:duration_in_hrs` column
    pub fn from_summaries(payload: &SummaryPayload) -> Self {
        let mut table = Self::new();

        for (category, documents) in payload.documents() {
            for document in documents {
                let Some(fields) = document.as_object() else {
                    continue;
                };
                let Some(day) = summary_day(document) else {
                    debug!(category = %category, "Skipping summary without a summary date");
                    continue;
                };

                for (field, value) in fields {
                    if let Some(number) = numeric(value) {
                        table.insert(day, category.column(field), number);
                    }
                }
            }
        }

        let duration_column = Category::Sleep.column("duration");
        let hours: Vec<(NaiveDate, f64)> = table
            .columns
            .get(&duration_column)
            .map(|column| {
                column
                    .iter()
                    .map(|(day, secs)| (*day, secs / SECONDS_PER_HOUR))
                    .collect()
            })
            .unwrap_or_default();
        for (day, value) in hours {
            table.insert(day, Category::Sleep.column("duration_in_hrs"), value);
        }

        debug!(
            columns = table.columns.len(),
            days = table.day_count(),
            "Built metric table"
        );

        table
    }
}

fn summary_day(document: &Value) -> Option<NaiveDate> {
    let raw = document
        .get("summary_date")
        .or_else(|| document.get("day"))?
        .as_str()?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

// Booleans and strings are not metrics
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}
