use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Invalid {field} price for {ticker} on {date}: {value}")]
    InvalidPrice {
        ticker: String,
        date: NaiveDate,
        field: &'static str,
        value: f64,
    },

    #[error("Duplicate price for {ticker} on {date}")]
    DuplicatePrice { ticker: String, date: NaiveDate },

    #[error("Unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
}
