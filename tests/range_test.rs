use oura_tags::error::RangeError;
use oura_tags::range::RangeQuery;
use oura_tags::Formula;

mod common;
use common::day;

#[test]
fn test_valid_range() {
    let query = RangeQuery::from_args(
        Some("01-01-2022"),
        Some("2022-01-31"),
        Formula::Mean,
        730,
        day("2022-06-01"),
    )
    .unwrap();

    assert_eq!(query.start_date, day("2022-01-01"));
    assert_eq!(query.end_date, day("2022-01-31"));
    assert_eq!(query.days(), 31);
}

#[test]
fn test_dates_must_be_before_today() {
    let today = day("2022-06-01");

    assert_eq!(
        RangeQuery::new(today, day("2022-06-02"), Formula::Mean, today),
        Err(RangeError::StartNotInPast)
    );
    assert_eq!(
        RangeQuery::new(day("2022-05-01"), today, Formula::Mean, today),
        Err(RangeError::EndNotInPast)
    );
}

#[test]
fn test_end_must_follow_start() {
    let today = day("2022-06-01");

    assert_eq!(
        RangeQuery::new(day("2022-05-10"), day("2022-05-01"), Formula::Median, today),
        Err(RangeError::EndBeforeStart)
    );
    assert_eq!(
        RangeQuery::new(day("2022-05-10"), day("2022-05-10"), Formula::Median, today),
        Err(RangeError::EndBeforeStart)
    );
}

#[test]
fn test_invalid_date_text() {
    let err = RangeQuery::from_args(Some("yesterday"), None, Formula::Mean, 730, day("2022-06-01"))
        .unwrap_err();
    assert_eq!(err, RangeError::InvalidDate("yesterday".to_string()));
}
