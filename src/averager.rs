//! Metric Averaging Engine
//!
//! Compares each tag's metrics against the baseline of the whole queried range.
//!
//! For every tag and every wanted `(category, metric)` pair the averager computes:
//!
//! - `average_all`: the selected [`Formula`] over the full metric column
//! - for each offset in [`OFFSETS`]: the formula over the values found `offset` days
//!   away from each tagged day, and its signed difference from `average_all`
//!
//! Offsets exist because sleep and readiness data logged under a date often reflect
//! the night before, so the day after a tag can matter as much as the day itself.
//!
//! ## Missing Data
//!
//! - A wanted column that is absent from the table aborts the computation with
//!   [`AnalysisError::MissingColumn`]; no partial result is returned.
//! - Lookups that land on a day without a value are skipped.
//! - An offset with no values at all has both `average` and `all_diff` absent.
//!
//! The computation is a pure function of its inputs: identical inputs always yield
//! bit-identical output.

use crate::error::{AnalysisError, Result, UnknownFormula};
use crate::metric_table::MetricTable;
use crate::models::{
    AverageResult, MetricAverages, OffsetAverage, TagDayMap, WantedScores, OFFSETS, WANTED_SCORES,
};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Aggregation applied to both the baseline and every offset average of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Formula {
    #[default]
    Mean,
    Median,
}

impl Formula {
    /// The aggregation function for this formula
    pub fn aggregator(self) -> fn(&[f64]) -> f64 {
        match self {
            Formula::Mean => mean,
            Formula::Median => median,
        }
    }

    /// Apply the formula, `None` when there is nothing to aggregate
    pub fn apply(self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            None
        } else {
            Some((self.aggregator())(values))
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Formula::Mean => "mean",
            Formula::Median => "median",
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Formula {
    type Err = UnknownFormula;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(Formula::Mean),
            "median" => Ok(Formula::Median),
            other => Err(UnknownFormula(other.to_string())),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

// Even-length input averages the two middle values
fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

pub struct MetricAverager {
    formula: Formula,
    scores: WantedScores,
}

impl MetricAverager {
    pub fn new(formula: Formula) -> Self {
        Self {
            formula,
            scores: WANTED_SCORES,
        }
    }

    /// Use a different metric selection than [`WANTED_SCORES`]
    pub fn with_scores(formula: Formula, scores: WantedScores) -> Self {
        Self { formula, scores }
    }

    pub fn formula(&self) -> Formula {
        self.formula
    }

    /// Baseline and offset-day averages for every tag and wanted metric
    pub fn compute(&self, tag_days: &TagDayMap, table: &MetricTable) -> Result<AverageResult> {
        let mut result = AverageResult::default();
        if tag_days.is_empty() {
            return Ok(result);
        }

        // Baselines do not depend on the tag, compute each once
        let mut baselines = Vec::new();
        for (category, metric) in self.scores.pairs() {
            let column_name = category.column(metric);
            let column = table.column(&column_name)?;
            let values: Vec<f64> = column.values().copied().collect();
            let average_all = self
                .formula
                .apply(&values)
                .ok_or_else(|| AnalysisError::MissingColumn {
                    column: column_name.clone(),
                })?;
            baselines.push((category, metric, column_name, average_all));
        }

        for (tag, days) in tag_days {
            let per_tag = result.tags.entry(tag.clone()).or_default();

            for (category, metric, column_name, average_all) in &baselines {
                let offsets = OFFSETS
                    .iter()
                    .map(|&offset| {
                        let scores = offset_scores(table, column_name, days, offset);
                        (offset, self.offset_average(&scores, *average_all))
                    })
                    .collect::<BTreeMap<_, _>>();

                per_tag.entry(*category).or_default().insert(
                    metric.to_string(),
                    MetricAverages {
                        average_all: *average_all,
                        offsets,
                    },
                );
            }

            debug!(tag = %tag, occurrences = days.len(), "Averaged tag metrics");
        }

        info!(
            tags = result.len(),
            metrics = baselines.len(),
            formula = %self.formula,
            "Computed tag averages"
        );

        Ok(result)
    }

    fn offset_average(&self, scores: &[f64], average_all: f64) -> OffsetAverage {
        match self.formula.apply(scores) {
            Some(average) => OffsetAverage {
                average: Some(average),
                all_diff: Some(average - average_all),
            },
            None => OffsetAverage::ABSENT,
        }
    }
}

/// Values found `offset` days from each tagged day; missing days are skipped
fn offset_scores(table: &MetricTable, column: &str, days: &[NaiveDate], offset: i64) -> Vec<f64> {
    days.iter()
        .filter_map(|day| day.checked_add_signed(Duration::days(offset)))
        .filter_map(|day| table.value(column, day))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_mean_and_median() {
        assert_eq!(Formula::Mean.apply(&[1.0, 2.0, 6.0]), Some(3.0));
        assert_eq!(Formula::Median.apply(&[6.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(Formula::Median.apply(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(Formula::Mean.apply(&[]), None);
        assert_eq!(Formula::Median.apply(&[]), None);
    }

    #[test]
    fn test_formula_from_str() {
        assert_eq!("mean".parse::<Formula>().unwrap(), Formula::Mean);
        assert_eq!("Median".parse::<Formula>().unwrap(), Formula::Median);
        assert_eq!(
            "mode".parse::<Formula>(),
            Err(UnknownFormula("mode".to_string()))
        );
    }

    #[test]
    fn test_zero_average_is_present() {
        let averager = MetricAverager::new(Formula::Mean);
        let offset = averager.offset_average(&[0.0], 0.5);
        assert_eq!(offset.average, Some(0.0));
        assert_eq!(offset.all_diff, Some(-0.5));
    }

    #[test]
    fn test_offset_scores_skip_missing_days() {
        let mut table = MetricTable::new();
        table.insert(day("2022-01-02"), "SLEEP:score", 80.0);
        let days = vec![day("2022-01-01"), day("2022-01-03")];

        assert_eq!(offset_scores(&table, "SLEEP:score", &days, 1), vec![80.0]);
        assert_eq!(offset_scores(&table, "SLEEP:score", &days, -1), vec![80.0]);
        assert!(offset_scores(&table, "SLEEP:score", &days, 0).is_empty());
    }

    #[test]
    fn test_empty_tag_map_needs_no_columns() {
        let averager = MetricAverager::new(Formula::Mean);
        let result = averager.compute(&TagDayMap::new(), &MetricTable::new()).unwrap();
        assert!(result.is_empty());
    }
}
