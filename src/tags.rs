//! Tag extraction
//!
//! Builds the [`TagDayMap`] from raw annotation records. A record counts for a
//! label when the label is one of its tags or equals its free-text note.

use crate::models::{AnnotationRecord, TagDayMap};
use std::collections::BTreeSet;
use tracing::debug;

pub struct TagExtractor;

impl TagExtractor {
    /// Every distinct non-empty label across record tags and note texts
    pub fn labels(records: &[AnnotationRecord]) -> BTreeSet<&str> {
        let tags = records
            .iter()
            .flat_map(|r| r.tags.iter())
            .map(String::as_str);
        let texts = records.iter().map(|r| r.text.as_str());

        tags.chain(texts).filter(|label| !label.is_empty()).collect()
    }

    /// Map each label to the days of the records it matches, in record order
    pub fn extract(records: &[AnnotationRecord]) -> TagDayMap {
        let mut tag_days = TagDayMap::new();

        for label in Self::labels(records) {
            for record in records.iter().filter(|r| r.matches(label)) {
                tag_days
                    .entry(label.to_string())
                    .or_default()
                    .push(record.day);
            }
        }

        debug!(
            records = records.len(),
            labels = tag_days.len(),
            "Extracted tag days"
        );

        tag_days
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_empty_input() {
        assert!(TagExtractor::extract(&[]).is_empty());
    }

    #[test]
    fn test_tag_and_text_merge_under_one_label() {
        let records = vec![
            AnnotationRecord::new(day("2022-01-01"), &["cold"], ""),
            AnnotationRecord::new(day("2022-01-03"), &[], "cold"),
        ];
        let map = TagExtractor::extract(&records);
        assert_eq!(map.len(), 1);
        assert_eq!(map["cold"], vec![day("2022-01-01"), day("2022-01-03")]);
    }

    #[test]
    fn test_no_empty_label() {
        let records = vec![
            AnnotationRecord::new(day("2022-01-01"), &[""], ""),
            AnnotationRecord::new(day("2022-01-02"), &[], ""),
        ];
        assert!(TagExtractor::extract(&records).is_empty());
    }

    #[test]
    fn test_record_matching_twice_counts_once() {
        let records = vec![AnnotationRecord::new(day("2022-02-01"), &["sauna"], "sauna")];
        let map = TagExtractor::extract(&records);
        assert_eq!(map["sauna"], vec![day("2022-02-01")]);
    }
}
