use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("Failed to read price data: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid price record on line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },

    #[error("No price data available for: {}", .tickers.join(", "))]
    DataUnavailable { tickers: Vec<String> },
}
