//! # Folio Market Data
//!
//! The boundary between the analytics core and wherever prices come from.
//!
//! `PriceSource` is the contract the host uses, so a file-backed source (here)
//! and a live provider client can be swapped without touching the analytics.
//! A source answers with the prices it has *and* the tickers it could not
//! serve; nothing is silently defaulted to empty.

use chrono::NaiveDate;
use core_types::{PriceBar, PriceTable, PriceWindow, Ticker};
use serde::Deserialize;
use std::io;
use std::path::Path;

pub mod error;

// --- Public API ---
pub use error::MarketDataError;

/// The result of a price request: the usable subset plus what was missing.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceFetch {
    pub table: PriceTable,
    /// Requested tickers for which the source had no prices in the window.
    pub unavailable: Vec<Ticker>,
}

/// The generic, abstract interface for a historical price provider.
pub trait PriceSource {
    /// Fetches daily prices for `tickers` over the trailing `window`.
    ///
    /// Returns a partial `PriceFetch` when only some tickers have data and
    /// `MarketDataError::DataUnavailable` when none do.
    fn fetch(&self, tickers: &[Ticker], window: PriceWindow) -> Result<PriceFetch, MarketDataError>;
}

/// One row of a long-format price file: `date,ticker,open,close`.
#[derive(Debug, Deserialize)]
struct PriceRecord {
    date: NaiveDate,
    ticker: String,
    #[serde(default)]
    open: Option<f64>,
    close: f64,
}

/// A price source backed by a CSV file loaded once into memory.
#[derive(Debug, Clone, Default)]
pub struct CsvPriceSource {
    table: PriceTable,
}

impl CsvPriceSource {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MarketDataError> {
        let path = path.as_ref();
        let reader = csv::Reader::from_path(path)?;
        let source = Self::load(reader)?;
        tracing::info!(path = %path.display(), tickers = source.table.tickers().count(), "Loaded price file.");
        Ok(source)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, MarketDataError> {
        Self::load(csv::Reader::from_reader(reader))
    }

    fn load<R: io::Read>(mut reader: csv::Reader<R>) -> Result<Self, MarketDataError> {
        let mut table = PriceTable::new();

        for (index, result) in reader.deserialize::<PriceRecord>().enumerate() {
            // Line 1 is the header.
            let line = index as u64 + 2;
            let record = result?;

            let ticker = Ticker::parse(&record.ticker).ok_or_else(|| MarketDataError::InvalidRecord {
                line,
                reason: "ticker is blank".to_string(),
            })?;

            table
                .insert(ticker, record.date, PriceBar::new(record.open, record.close))
                .map_err(|e| MarketDataError::InvalidRecord {
                    line,
                    reason: e.to_string(),
                })?;
        }

        Ok(Self { table })
    }

    /// Everything the file contained.
    pub fn table(&self) -> &PriceTable {
        &self.table
    }
}

impl PriceSource for CsvPriceSource {
    fn fetch(&self, tickers: &[Ticker], window: PriceWindow) -> Result<PriceFetch, MarketDataError> {
        let windowed = self.table.trailing(window);

        let (available, unavailable): (Vec<Ticker>, Vec<Ticker>) =
            tickers.iter().cloned().partition(|t| windowed.contains(t));

        if available.is_empty() && !unavailable.is_empty() {
            return Err(MarketDataError::DataUnavailable {
                tickers: unavailable.iter().map(|t| t.to_string()).collect(),
            });
        }

        for ticker in &unavailable {
            tracing::warn!(%ticker, %window, "No price data for ticker.");
        }

        Ok(PriceFetch {
            table: windowed.restrict(&available),
            unavailable,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
date,ticker,open,close
2024-03-01,aaa,99.5,100.0
2024-03-04,AAA,,101.0
2024-03-01,BBB,50.0,50.5
";

    fn ticker(s: &str) -> Ticker {
        Ticker::parse(s).unwrap()
    }

    #[test]
    fn test_loads_long_format() {
        let source = CsvPriceSource::from_reader(SAMPLE.as_bytes()).unwrap();
        let table = source.table();

        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(table.bar(&ticker("AAA"), date), Some(&PriceBar::new(Some(99.5), 100.0)));
        let next = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert_eq!(table.bar(&ticker("AAA"), next).unwrap().open, None);
        assert_eq!(table.tickers().count(), 2);
    }

    #[test]
    fn test_duplicate_row_reports_line() {
        let data = format!("{SAMPLE}2024-03-01,BBB,50.0,51.0\n");
        let err = CsvPriceSource::from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, MarketDataError::InvalidRecord { line: 5, .. }));
    }

    #[test]
    fn test_bad_price_and_blank_ticker_are_rejected() {
        let negative = "date,ticker,open,close\n2024-03-01,AAA,,-3.0\n";
        assert!(matches!(
            CsvPriceSource::from_reader(negative.as_bytes()),
            Err(MarketDataError::InvalidRecord { line: 2, .. })
        ));

        let blank = "date,ticker,open,close\n2024-03-01,  ,,3.0\n";
        assert!(matches!(
            CsvPriceSource::from_reader(blank.as_bytes()),
            Err(MarketDataError::InvalidRecord { line: 2, .. })
        ));

        let garbage = "date,ticker,open,close\nnot-a-date,AAA,,3.0\n";
        assert!(matches!(
            CsvPriceSource::from_reader(garbage.as_bytes()),
            Err(MarketDataError::Csv(_))
        ));
    }

    #[test]
    fn test_fetch_reports_partial_availability() {
        let source = CsvPriceSource::from_reader(SAMPLE.as_bytes()).unwrap();
        let fetch = source
            .fetch(&[ticker("AAA"), ticker("ZZZ")], PriceWindow::Max)
            .unwrap();

        assert!(fetch.table.contains(&ticker("AAA")));
        assert!(!fetch.table.contains(&ticker("BBB")));
        assert_eq!(fetch.unavailable, vec![ticker("ZZZ")]);
    }

    #[test]
    fn test_fetch_with_nothing_available_is_an_error() {
        let source = CsvPriceSource::from_reader(SAMPLE.as_bytes()).unwrap();
        let err = source.fetch(&[ticker("ZZZ")], PriceWindow::Max).unwrap_err();
        match err {
            MarketDataError::DataUnavailable { tickers } => assert_eq!(tickers, vec!["ZZZ".to_string()]),
            other => panic!("unexpected error: {other}"),
        }
    }
}
