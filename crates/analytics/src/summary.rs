use chrono::NaiveDate;
use core_types::{PriceTable, Ticker};
use serde::Serialize;

/// A per-ticker snapshot of the price history, the way the overview shows it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSummary {
    pub ticker: Ticker,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub first_close: f64,
    pub last_close: f64,
    pub last_open: Option<f64>,
    /// `last_close / first_close - 1` over the table's span.
    pub period_return: f64,
    pub observations: usize,
}

/// Summarizes every ticker in the table, in ticker order.
pub fn summarize_prices(prices: &PriceTable) -> Vec<PriceSummary> {
    prices
        .tickers()
        .filter_map(|ticker| {
            let (first_date, first) = prices.first(ticker)?;
            let (last_date, last) = prices.last(ticker)?;
            let observations = prices.series(ticker).map_or(0, |s| s.len());
            Some(PriceSummary {
                ticker: ticker.clone(),
                first_date,
                last_date,
                first_close: first.close,
                last_close: last.close,
                last_open: last.open,
                period_return: last.close / first.close - 1.0,
                observations,
            })
        })
        .collect()
}
