use thiserror::Error;

/// Result type for analytics operations.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// The portfolio definition or a parameter cannot be used as given.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not enough data to perform calculation: need {required} aligned return rows, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("No price data available for: {}", .tickers.join(", "))]
    DataUnavailable { tickers: Vec<String> },

    #[error("Error in calculation: {0}")]
    Calculation(String),
}

impl AnalyticsError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }
}
