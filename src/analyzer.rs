//! Tag Analysis Engine
//!
//! This module provides the coordinator that runs one analysis request end to end.
//!
//! ## Pipeline
//!
//! 1. **Inputs**: tag entries and the daily metric table are read from local files or
//!    fetched from the Oura API for the validated [`RangeQuery`]
//! 2. **Extraction**: [`TagExtractor`] groups the entries into a [`TagDayMap`]
//! 3. **Averaging**: [`MetricAverager`] compares each tag's offset-day averages with
//!    the baseline of the whole range
//! 4. **Reporting**: [`ReportDisplay`] renders the result as text or JSON
//!
//! A failed fetch stops the request before any computation; a metric column missing
//! from the table fails the averaging step as a whole.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use oura_tags::analyzer::{DataSource, TagInsightsAnalyzer};
//! use oura_tags::averager::Formula;
//! use oura_tags::config::Config;
//! use oura_tags::range::RangeQuery;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::default();
//! let analyzer = TagInsightsAnalyzer::new(&config);
//! let today = chrono::Local::now().date_naive();
//! let query = RangeQuery::from_args(None, None, Formula::Median, 730, today)?;
//! let source = DataSource::Api { access_token: "token".to_string() };
//!
//! let report = analyzer.analyze(&source, &query).await?;
//! println!("{} tags analyzed", report.averages.len());
//! # Ok(())
//! # }
//! ```

use crate::averager::MetricAverager;
use crate::config::{ApiConfig, Config};
use crate::display::ReportDisplay;
use crate::input;
use crate::metric_table::MetricTable;
use crate::models::{AnnotationRecord, AverageResult, TagDayMap, WantedScores, WANTED_SCORES};
use crate::range::RangeQuery;
use crate::tags::TagExtractor;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn, Instrument};

/// Where the inputs of a request come from
#[derive(Debug, Clone)]
pub enum DataSource {
    Files {
        records: PathBuf,
        metrics: Option<PathBuf>,
    },
    Api {
        access_token: String,
    },
}

/// Everything the presentation layer needs for one request
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub range: RangeQuery,
    pub wanted_scores: WantedScores,
    pub tags_days: TagDayMap,
    pub tags_data: Vec<AnnotationRecord>,
    pub averages: AverageResult,
}

pub struct TagInsightsAnalyzer {
    display: ReportDisplay,
    api: ApiConfig,
}

impl TagInsightsAnalyzer {
    pub fn new(config: &Config) -> Self {
        Self {
            display: ReportDisplay::new(config.output.json_pretty),
            api: config.api.clone(),
        }
    }

    /// Run the correlation engine over already materialized inputs. Metric rows
    /// outside the query range are ignored for the baseline and the offset lookups.
    pub fn analyze_inputs(
        query: &RangeQuery,
        records: Vec<AnnotationRecord>,
        table: &MetricTable,
    ) -> Result<AnalysisReport> {
        let tags_days = TagExtractor::extract(&records);
        let table = table.restrict(query.start_date, query.end_date);
        let averages = MetricAverager::new(query.formula)
            .compute(&tags_days, &table)
            .context("Failed to compute tag averages")?;

        Ok(AnalysisReport {
            range: *query,
            wanted_scores: WANTED_SCORES,
            tags_days,
            tags_data: records,
            averages,
        })
    }

    /// Load inputs for the query and analyze them
    pub async fn analyze(&self, source: &DataSource, query: &RangeQuery) -> Result<AnalysisReport> {
        let (records, table) = match source {
            DataSource::Files { records, metrics } => {
                let metrics = metrics
                    .as_ref()
                    .context("A metrics file is required when reading records from a file")?;
                (
                    input::load_records(records, query)?,
                    input::load_metric_table(metrics)?,
                )
            }
            DataSource::Api { access_token } => self.fetch_all(access_token, query).await?,
        };

        if records.is_empty() {
            warn!(
                start = %query.start_date,
                end = %query.end_date,
                "No tags recorded in the requested range"
            );
        }

        Self::analyze_inputs(query, records, &table)
    }

    /// Load only the tag entries for the query
    pub async fn load_records(
        &self,
        source: &DataSource,
        query: &RangeQuery,
    ) -> Result<Vec<AnnotationRecord>> {
        match source {
            DataSource::Files { records, .. } => input::load_records(records, query),
            DataSource::Api { access_token } => self.fetch_records(access_token, query).await,
        }
    }

    /// Analyze and print the full report
    pub async fn run_analyze(
        &self,
        source: &DataSource,
        query: &RangeQuery,
        json_output: bool,
    ) -> Result<()> {
        let span = crate::logging::analysis_span("analyze");
        let report = self.analyze(source, query).instrument(span).await?;

        info!(
            tags = report.tags_days.len(),
            records = report.tags_data.len(),
            "Analysis complete"
        );

        self.display.display_report(&report, json_output)
    }

    /// Extract and print tag days only
    pub async fn run_tags(
        &self,
        source: &DataSource,
        query: &RangeQuery,
        json_output: bool,
    ) -> Result<()> {
        let span = crate::logging::analysis_span("tags");
        let records = self.load_records(source, query).instrument(span).await?;
        let tags_days = TagExtractor::extract(&records);

        self.display.display_tags(query, &tags_days, json_output)
    }

    #[cfg(feature = "fetch")]
    async fn fetch_all(
        &self,
        access_token: &str,
        query: &RangeQuery,
    ) -> Result<(Vec<AnnotationRecord>, MetricTable)> {
        let client = crate::oura_client::OuraClient::new(&self.api, access_token);
        let (records, table) = futures::try_join!(
            client.fetch_tags(query),
            client.fetch_metric_table(query),
        )?;
        Ok((records, table))
    }

    #[cfg(feature = "fetch")]
    async fn fetch_records(
        &self,
        access_token: &str,
        query: &RangeQuery,
    ) -> Result<Vec<AnnotationRecord>> {
        let client = crate::oura_client::OuraClient::new(&self.api, access_token);
        Ok(client.fetch_tags(query).await?)
    }

    #[cfg(not(feature = "fetch"))]
    async fn fetch_all(
        &self,
        _access_token: &str,
        _query: &RangeQuery,
    ) -> Result<(Vec<AnnotationRecord>, MetricTable)> {
        anyhow::bail!("Built without the `fetch` feature: use --records and --metrics")
    }

    #[cfg(not(feature = "fetch"))]
    async fn fetch_records(
        &self,
        _access_token: &str,
        _query: &RangeQuery,
    ) -> Result<Vec<AnnotationRecord>> {
        anyhow::bail!("Built without the `fetch` feature: use --records")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::averager::Formula;
    use crate::error::AnalysisError;
    use crate::models::{Category, OffsetAverage};
    use chrono::NaiveDate;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_missing_column_fails_whole_request() {
        let query =
            RangeQuery::new(day("2022-01-01"), day("2022-01-03"), Formula::Mean, day("2022-02-01"))
                .unwrap();
        let records = vec![AnnotationRecord::new(day("2022-01-02"), &["cold"], "")];
        let mut table = MetricTable::new();
        table.insert(day("2022-01-02"), "SLEEP:score", 80.0);

        let err = TagInsightsAnalyzer::analyze_inputs(&query, records, &table).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_metric_rows_outside_range_are_ignored() {
        let query =
            RangeQuery::new(day("2022-01-02"), day("2022-01-03"), Formula::Mean, day("2022-02-01"))
                .unwrap();
        let records = vec![AnnotationRecord::new(day("2022-01-02"), &["cold"], "")];
        let mut table = MetricTable::new();
        for (category, metric) in WANTED_SCORES.pairs() {
            for (d, value) in [
                ("2021-12-31", 0.0),
                ("2022-01-01", 70.0),
                ("2022-01-02", 80.0),
                ("2022-01-03", 90.0),
                ("2022-06-01", 0.0),
            ] {
                table.insert(day(d), category.column(metric), value);
            }
        }

        let report = TagInsightsAnalyzer::analyze_inputs(&query, records, &table).unwrap();
        let score = report.averages.get("cold", Category::Sleep, "score").unwrap();

        assert_eq!(score.average_all, 85.0);
        assert_eq!(score.offset(-1), Some(&OffsetAverage::ABSENT));
        assert_eq!(score.offset(0).unwrap().average, Some(80.0));
        assert_eq!(score.offset(0).unwrap().all_diff, Some(-5.0));
        assert_eq!(score.offset(1).unwrap().average, Some(90.0));
        assert_eq!(score.offset(1).unwrap().all_diff, Some(5.0));
    }
}
