//! Error types for the correlation engine and its collaborators

use thiserror::Error;

/// Result type for core analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors raised by the metric averager
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// A wanted metric has no column in the supplied metric table
    #[error("Metric table has no column named '{column}'")]
    MissingColumn { column: String },
}

/// Errors raised while validating a requested date range
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("Invalid date '{0}': use DD-MM-YYYY or YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Start date must be earlier than today")]
    StartNotInPast,

    #[error("End date must be earlier than today")]
    EndNotInPast,

    #[error("End date must be later than start date")]
    EndBeforeStart,

    #[error("Lookback of {0} days does not give a valid start date")]
    LookbackOutOfRange(i64),
}

/// An aggregation name that is neither `mean` nor `median`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown formula '{0}': expected 'mean' or 'median'")]
pub struct UnknownFormula(pub String);

/// Errors raised while retrieving data from the Oura API
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Couldn't retrieve data from {endpoint}, check your access token: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Couldn't retrieve data from {endpoint} (HTTP {status}), check your access token")]
    Status { endpoint: String, status: u16 },

    #[error("Couldn't decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_names_the_column() {
        let err = AnalysisError::MissingColumn {
            column: "SLEEP:score".to_string(),
        };
        assert!(err.to_string().contains("SLEEP:score"));
    }

    #[test]
    fn unknown_formula_lists_choices() {
        let err = UnknownFormula("mode".to_string());
        assert_eq!(
            err.to_string(),
            "Unknown formula 'mode': expected 'mean' or 'median'"
        );
    }

    #[test]
    fn fetch_status_mentions_token() {
        let err = FetchError::Status {
            endpoint: "tag".to_string(),
            status: 401,
        };
        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("access token"));
    }
}
