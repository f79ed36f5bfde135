use crate::error::{AnalyticsError, AnalyticsResult};
use chrono::NaiveDate;
use core_types::{PriceTable, Ticker};
use ndarray::Array2;
use serde::Serialize;

/// Fewest aligned return rows a sample variance can be computed from.
pub const MIN_OBSERVATIONS: usize = 2;

/// The aligned simple returns of one ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetReturns {
    pub ticker: Ticker,
    pub returns: Vec<f64>,
}

impl AssetReturns {
    /// Compounded growth factor over the aligned rows, `Π(1 + r)`.
    ///
    /// Only rows that survived alignment contribute, so the span always matches
    /// `returns.len()` even when dates were dropped for gaps.
    pub fn growth(&self) -> f64 {
        self.returns.iter().map(|r| 1.0 + r).product()
    }
}

/// Periodic simple returns for every ticker, aligned on common dates.
///
/// Row `i` holds `close[d] / close[prev] - 1` for each ticker, where `prev` is the
/// date immediately before `d` in the table. A date only survives when every
/// ticker has prices on both days, so all columns have the same length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnSeries {
    dates: Vec<NaiveDate>,
    assets: Vec<AssetReturns>,
    dropped_dates: Vec<NaiveDate>,
}

impl ReturnSeries {
    /// Builds the series, requiring at least [`MIN_OBSERVATIONS`] aligned rows.
    pub fn from_prices(prices: &PriceTable) -> AnalyticsResult<Self> {
        Self::from_prices_with_min(prices, MIN_OBSERVATIONS)
    }

    /// Builds the series, requiring at least `min_observations` aligned rows (never less than one).
    pub fn from_prices_with_min(prices: &PriceTable, min_observations: usize) -> AnalyticsResult<Self> {
        let required = min_observations.max(1);
        let tickers: Vec<&Ticker> = prices.tickers().collect();
        let all_dates = prices.dates();

        let mut dates = Vec::new();
        let mut dropped_dates = Vec::new();
        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); tickers.len()];

        if !tickers.is_empty() {
            for pair in all_dates.windows(2) {
                let (prev, date) = (pair[0], pair[1]);
                let row: Option<Vec<f64>> = tickers
                    .iter()
                    .map(|t| {
                        let before = prices.close(t, prev)?;
                        let after = prices.close(t, date)?;
                        Some(after / before - 1.0)
                    })
                    .collect();

                match row {
                    Some(values) => {
                        for (column, value) in columns.iter_mut().zip(values) {
                            column.push(value);
                        }
                        dates.push(date);
                    }
                    None => dropped_dates.push(date),
                }
            }
        }

        if !dropped_dates.is_empty() {
            tracing::warn!(
                count = dropped_dates.len(),
                "Dropped return dates where at least one ticker had no price."
            );
        }

        if dates.len() < required {
            return Err(AnalyticsError::InsufficientData {
                required,
                available: dates.len(),
            });
        }

        let assets = tickers
            .into_iter()
            .zip(columns)
            .map(|(ticker, returns)| AssetReturns {
                ticker: ticker.clone(),
                returns,
            })
            .collect();

        tracing::debug!(rows = dates.len(), "Built aligned return series.");

        Ok(Self {
            dates,
            assets,
            dropped_dates,
        })
    }

    /// Dates of the aligned rows.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn assets(&self) -> &[AssetReturns] {
        &self.assets
    }

    pub fn asset(&self, ticker: &Ticker) -> Option<&AssetReturns> {
        self.assets.iter().find(|a| &a.ticker == ticker)
    }

    pub fn tickers(&self) -> impl Iterator<Item = &Ticker> {
        self.assets.iter().map(|a| &a.ticker)
    }

    /// Dates after the first one that were removed because some ticker lacked a return.
    pub fn dropped_dates(&self) -> &[NaiveDate] {
        &self.dropped_dates
    }

    /// Number of aligned return rows.
    pub fn observations(&self) -> usize {
        self.dates.len()
    }

    /// Returns as an `observations x tickers` matrix, columns in `assets()` order.
    pub fn to_matrix(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.observations(), self.assets.len()), |(i, j)| {
            self.assets[j].returns[i]
        })
    }
}
