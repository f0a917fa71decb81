#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use oura_tags::{AnnotationRecord, MetricTable};
use std::fs;
use std::path::{Path, PathBuf};

pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
}

/// The two-record scenario: a tag on Jan 1st and the same label as a note on Jan 3rd
pub fn cold_records() -> Vec<AnnotationRecord> {
    vec![
        AnnotationRecord::new(day("2022-01-01"), &["cold"], ""),
        AnnotationRecord::new(day("2022-01-03"), &[], "cold"),
    ]
}

/// A table holding every wanted column for the given days, with `SLEEP:score`
/// set from `scores` and the other columns filled with constants
pub fn full_table(scores: &[(&str, f64)]) -> MetricTable {
    let mut table = MetricTable::new();
    for (d, score) in scores {
        let d = day(d);
        table.insert(d, "SLEEP:score", *score);
        table.insert(d, "SLEEP:duration_in_hrs", 7.5);
        table.insert(d, "SLEEP:temperature_deviation", 0.1);
        table.insert(d, "SLEEP:hr_lowest", 50.0);
        table.insert(d, "SLEEP:hr_average", 58.0);
        table.insert(d, "READY:score", 80.0);
        table.insert(d, "READY:score_hrv_balance", 75.0);
    }
    table
}

pub const RECORDS_JSON: &str = r#"{
  "data": [
    {"id": "1", "day": "2022-01-02", "text": null, "timestamp": "2022-01-02T21:00:00+02:00", "tags": ["tag_generic_alcohol"]},
    {"id": "2", "day": "2022-01-04", "text": "late dinner", "timestamp": "2022-01-04T22:00:00+02:00", "tags": []},
    {"id": "3", "day": "2022-01-04", "text": "", "timestamp": "2022-01-04T23:00:00+02:00", "tags": ["tag_generic_alcohol"]}
  ],
  "next_token": null
}"#;

pub const METRICS_JSON: &str = r#"{
  "sleep": [
    {"summary_date": "2022-01-01", "score": 70, "duration": 27000, "temperature_deviation": 0.1, "hr_lowest": 50, "hr_average": 58},
    {"summary_date": "2022-01-02", "score": 80, "duration": 28800, "temperature_deviation": 0.2, "hr_lowest": 52, "hr_average": 60},
    {"summary_date": "2022-01-03", "score": 60, "duration": 21600, "temperature_deviation": 0.4, "hr_lowest": 58, "hr_average": 66},
    {"summary_date": "2022-01-04", "score": 85, "duration": 30600, "temperature_deviation": 0.0, "hr_lowest": 49, "hr_average": 57},
    {"summary_date": "2022-01-05", "score": 65, "duration": 25200, "temperature_deviation": 0.3, "hr_lowest": 56, "hr_average": 63}
  ],
  "readiness": [
    {"summary_date": "2022-01-01", "score": 82, "score_hrv_balance": 70},
    {"summary_date": "2022-01-02", "score": 84, "score_hrv_balance": 72},
    {"summary_date": "2022-01-03", "score": 66, "score_hrv_balance": 55},
    {"summary_date": "2022-01-04", "score": 88, "score_hrv_balance": 76},
    {"summary_date": "2022-01-05", "score": 70, "score_hrv_balance": 60}
  ],
  "activity": []
}"#;

pub fn write_fixture(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(filename);
    fs::write(&path, content)?;
    Ok(path)
}
