use crate::enums::PriceWindow;
use crate::error::CoreError;
use crate::structs::{PriceBar, Ticker};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Historical prices keyed by ticker and date.
///
/// Each ticker owns a date-ordered series, so dates are strictly increasing per
/// ticker and a (ticker, date) pair can hold at most one bar. A ticker that did
/// not trade on a date simply has no entry for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    series: BTreeMap<Ticker, BTreeMap<NaiveDate, PriceBar>>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one bar. Rejects non-positive or non-finite prices and duplicate dates.
    pub fn insert(&mut self, ticker: Ticker, date: NaiveDate, bar: PriceBar) -> Result<(), CoreError> {
        validate_price(&ticker, date, "close", bar.close)?;
        if let Some(open) = bar.open {
            validate_price(&ticker, date, "open", open)?;
        }

        let series = self.series.entry(ticker.clone()).or_default();
        if series.contains_key(&date) {
            return Err(CoreError::DuplicatePrice {
                ticker: ticker.to_string(),
                date,
            });
        }
        series.insert(date, bar);
        Ok(())
    }

    /// Convenience for building a close-only series.
    pub fn insert_closes<I>(&mut self, ticker: &Ticker, closes: I) -> Result<(), CoreError>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        for (date, close) in closes {
            self.insert(ticker.clone(), date, PriceBar::close_only(close))?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.series.values().all(|s| s.is_empty())
    }

    /// Tickers that have at least one price, in sorted order.
    pub fn tickers(&self) -> impl Iterator<Item = &Ticker> {
        self.series
            .iter()
            .filter(|(_, s)| !s.is_empty())
            .map(|(t, _)| t)
    }

    pub fn contains(&self, ticker: &Ticker) -> bool {
        self.series.get(ticker).is_some_and(|s| !s.is_empty())
    }

    /// The sorted union of all dates across all tickers.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.series
            .values()
            .flat_map(|s| s.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.series.values().filter_map(|s| s.keys().next_back().copied()).max()
    }

    pub fn series(&self, ticker: &Ticker) -> Option<&BTreeMap<NaiveDate, PriceBar>> {
        self.series.get(ticker)
    }

    pub fn bar(&self, ticker: &Ticker, date: NaiveDate) -> Option<&PriceBar> {
        self.series.get(ticker)?.get(&date)
    }

    pub fn close(&self, ticker: &Ticker, date: NaiveDate) -> Option<f64> {
        self.bar(ticker, date).map(|b| b.close)
    }

    pub fn first(&self, ticker: &Ticker) -> Option<(NaiveDate, &PriceBar)> {
        self.series.get(ticker)?.iter().next().map(|(d, b)| (*d, b))
    }

    pub fn last(&self, ticker: &Ticker) -> Option<(NaiveDate, &PriceBar)> {
        self.series.get(ticker)?.iter().next_back().map(|(d, b)| (*d, b))
    }

    /// A copy holding only the requested tickers. Unknown tickers are ignored.
    pub fn restrict<'a, I>(&self, tickers: I) -> PriceTable
    where
        I: IntoIterator<Item = &'a Ticker>,
    {
        let series = tickers
            .into_iter()
            .filter_map(|t| self.series.get(t).map(|s| (t.clone(), s.clone())))
            .collect();
        PriceTable { series }
    }

    /// A copy limited to the trailing `window` ending at the table's last date.
    ///
    /// Tickers with no prices inside the window are dropped from the copy.
    pub fn trailing(&self, window: PriceWindow) -> PriceTable {
        let start = match self.last_date().and_then(|last| window.start_date(last)) {
            Some(start) => start,
            None => return self.clone(),
        };

        let series = self
            .series
            .iter()
            .filter_map(|(ticker, s)| {
                let kept: BTreeMap<_, _> = s.range(start..).map(|(d, b)| (*d, *b)).collect();
                (!kept.is_empty()).then(|| (ticker.clone(), kept))
            })
            .collect();
        PriceTable { series }
    }
}

fn validate_price(ticker: &Ticker, date: NaiveDate, field: &'static str, value: f64) -> Result<(), CoreError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CoreError::InvalidPrice {
            ticker: ticker.to_string(),
            date,
            field,
            value,
        })
    }
}
