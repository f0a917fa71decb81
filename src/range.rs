//! Requested date range and formula
//!
//! Dates are accepted in the `DD-MM-YYYY` form used by the web form as well as
//! ISO `YYYY-MM-DD`. Both ends must lie strictly before today and the start must
//! come strictly before the end.

use crate::averager::Formula;
use crate::error::RangeError;
use chrono::{Duration, NaiveDate};
use serde::Serialize;

const DATE_FORMATS: [&str; 2] = ["%d-%m-%Y", "%Y-%m-%d"];

/// Parse a date in any accepted format
pub fn parse_date(input: &str) -> Result<NaiveDate, RangeError> {
    let input = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
        .ok_or_else(|| RangeError::InvalidDate(input.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub formula: Formula,
}

impl RangeQuery {
    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        formula: Formula,
        today: NaiveDate,
    ) -> Result<Self, RangeError> {
        if start_date >= today {
            return Err(RangeError::StartNotInPast);
        }
        if end_date >= today {
            return Err(RangeError::EndNotInPast);
        }
        if end_date <= start_date {
            return Err(RangeError::EndBeforeStart);
        }

        Ok(Self {
            start_date,
            end_date,
            formula,
        })
    }

    /// Build a query from optional user input, defaulting to the last `lookback_days`
    /// days up to yesterday
    pub fn from_args(
        since: Option<&str>,
        until: Option<&str>,
        formula: Formula,
        lookback_days: i64,
        today: NaiveDate,
    ) -> Result<Self, RangeError> {
        let start_date = match since {
            Some(s) => parse_date(s)?,
            None => Duration::try_days(lookback_days)
                .and_then(|lookback| today.checked_sub_signed(lookback))
                .ok_or(RangeError::LookbackOutOfRange(lookback_days))?,
        };
        let end_date = match until {
            Some(s) => parse_date(s)?,
            None => today - Duration::days(1),
        };

        Self::new(start_date, end_date, formula, today)
    }

    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}
