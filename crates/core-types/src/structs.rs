use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized security symbol: trimmed and upper-cased, never blank.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticker(String);

impl Ticker {
    /// Normalizes raw user input. Returns `None` for blank strings.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_uppercase()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One day of price data for one ticker.
///
/// The close drives every calculation; the open is carried along for display only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub open: Option<f64>,
    pub close: f64,
}

impl PriceBar {
    pub fn new(open: Option<f64>, close: f64) -> Self {
        Self { open, close }
    }

    pub fn close_only(close: f64) -> Self {
        Self { open: None, close }
    }
}

/// A single row of the user's portfolio definition, exactly as entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioEntry {
    pub ticker: String,
    /// Weight in percent. A missing value counts as zero.
    #[serde(default)]
    pub weight_percent: Option<f64>,
}

impl PortfolioEntry {
    pub fn new(ticker: impl Into<String>, weight_percent: f64) -> Self {
        Self {
            ticker: ticker.into(),
            weight_percent: Some(weight_percent),
        }
    }

    /// The entered weight, defaulting to zero when absent.
    pub fn weight_or_zero(&self) -> f64 {
        self.weight_percent.unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_normalization() {
        assert_eq!(Ticker::parse("  aapl ").unwrap().as_str(), "AAPL");
        assert_eq!(Ticker::parse("brk.b").unwrap().to_string(), "BRK.B");
        assert!(Ticker::parse("   ").is_none());
        assert!(Ticker::parse("").is_none());
    }

    #[test]
    fn test_entry_missing_weight_defaults_to_zero() {
        let entry: PortfolioEntry = serde_json::from_str(r#"{"ticker": "VTI"}"#).unwrap();
        assert_eq!(entry.weight_percent, None);
        assert_eq!(entry.weight_or_zero(), 0.0);
        assert_eq!(PortfolioEntry::new("VTI", 40.0).weight_or_zero(), 40.0);
    }
}
