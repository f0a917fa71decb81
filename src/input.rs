//! Local input files
//!
//! Offline mode reads the same JSON shapes the Oura API returns: the records file is
//! either a bare array of tag entries or a `{"data": [...]}` page, and the metrics
//! file is one object with optional `sleep`, `readiness` and `activity` arrays.

use crate::metric_table::{MetricTable, SummaryPayload};
use crate::models::{AnnotationRecord, TagPage};
use crate::range::RangeQuery;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordsFile {
    Records(Vec<AnnotationRecord>),
    Page(TagPage),
}

/// Load tag entries, keeping only those inside the query range
pub fn load_records(path: &Path, query: &RangeQuery) -> Result<Vec<AnnotationRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read records file: {}", path.display()))?;

    let parsed: RecordsFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse records file: {}", path.display()))?;

    let records = match parsed {
        RecordsFile::Records(records) => records,
        RecordsFile::Page(page) => page.data,
    };
    let total = records.len();

    let records: Vec<AnnotationRecord> = records
        .into_iter()
        .filter(|r| r.day >= query.start_date && r.day <= query.end_date)
        .collect();

    debug!(total, kept = records.len(), "Filtered records to query range");
    info!(path = %path.display(), records = records.len(), "Loaded records file");

    Ok(records)
}

/// Load daily summaries and build the metric table. Clipping to the query range
/// happens in the analyzer, for files and API payloads alike.
pub fn load_metric_table(path: &Path) -> Result<MetricTable> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read metrics file: {}", path.display()))?;

    let payload: SummaryPayload = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse metrics file: {}", path.display()))?;

    let table = MetricTable::from_summaries(&payload);
    info!(path = %path.display(), days = table.day_count(), "Loaded metrics file");

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::averager::Formula;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn query() -> RangeQuery {
        RangeQuery::new(
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2022, 1, 31).unwrap(),
            Formula::Mean,
            NaiveDate::from_ymd_opt(2022, 6, 1).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_records_page_and_array() {
        let dir = tempdir().unwrap();
        let page = dir.path().join("page.json");
        let array = dir.path().join("array.json");
        fs::write(
            &page,
            r#"{"data":[{"day":"2022-01-05","tags":["cold"],"text":null},{"day":"2022-03-01","tags":["cold"],"text":""}],"next_token":null}"#,
        )
        .unwrap();
        fs::write(&array, r#"[{"day":"2022-01-05","tags":[],"text":"cold"}]"#).unwrap();

        assert_eq!(load_records(&page, &query()).unwrap().len(), 1);
        assert_eq!(load_records(&array, &query()).unwrap()[0].text, "cold");
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempdir().unwrap();
        let err = load_metric_table(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read metrics file"));
    }
}
