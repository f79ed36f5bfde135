use crate::error::{AnalyticsError, AnalyticsResult};
use core_types::{DuplicatePolicy, PortfolioEntry, Ticker};
use serde::Serialize;
use std::collections::BTreeMap;

/// Decimal portfolio weights in `[0, 1]` that sum to one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NormalizedWeights {
    weights: BTreeMap<Ticker, f64>,
}

/// Turns user-entered rows into a normalized weight distribution.
///
/// Blank tickers are dropped, tickers are trimmed and upper-cased and a missing
/// weight counts as zero. Duplicates are resolved by `duplicates`.
pub fn normalize(entries: &[PortfolioEntry], duplicates: DuplicatePolicy) -> AnalyticsResult<NormalizedWeights> {
    NormalizedWeights::normalize(entries, duplicates)
}

impl NormalizedWeights {
    pub fn normalize(entries: &[PortfolioEntry], duplicates: DuplicatePolicy) -> AnalyticsResult<Self> {
        let mut raw: BTreeMap<Ticker, f64> = BTreeMap::new();

        for entry in entries {
            let Some(ticker) = Ticker::parse(&entry.ticker) else {
                continue;
            };

            let weight = entry.weight_or_zero();
            if !weight.is_finite() || weight < 0.0 {
                return Err(AnalyticsError::validation(format!(
                    "weight for {ticker} must be a non-negative number, got {weight}"
                )));
            }

            if raw.contains_key(&ticker) {
                match duplicates {
                    DuplicatePolicy::Reject => {
                        return Err(AnalyticsError::validation(format!(
                            "ticker {ticker} is listed more than once"
                        )));
                    }
                    DuplicatePolicy::LastWins => {
                        tracing::warn!(%ticker, weight, "Duplicate ticker; keeping the later weight.");
                    }
                }
            }
            raw.insert(ticker, weight);
        }

        if raw.is_empty() {
            return Err(AnalyticsError::validation("portfolio has no tickers"));
        }

        Self::rescale(raw)
    }

    /// Second normalization pass: keeps only tickers for which `available`
    /// holds and rescales the survivors. Returns the dropped tickers too.
    pub fn restrict_to<F>(&self, available: F) -> AnalyticsResult<(Self, Vec<Ticker>)>
    where
        F: Fn(&Ticker) -> bool,
    {
        let (kept, dropped): (BTreeMap<Ticker, f64>, BTreeMap<Ticker, f64>) = self
            .weights
            .iter()
            .map(|(t, w)| (t.clone(), *w))
            .partition(|(t, _)| available(t));
        let dropped: Vec<Ticker> = dropped.into_keys().collect();

        if kept.is_empty() {
            return Err(AnalyticsError::DataUnavailable {
                tickers: dropped.iter().map(|t| t.to_string()).collect(),
            });
        }

        Ok((Self::rescale(kept)?, dropped))
    }

    fn rescale(raw: BTreeMap<Ticker, f64>) -> AnalyticsResult<Self> {
        let total: f64 = raw.values().sum();
        if total == 0.0 {
            return Err(AnalyticsError::validation("total portfolio weight is zero"));
        }

        let weights = raw.into_iter().map(|(t, w)| (t, w / total)).collect();
        Ok(Self { weights })
    }

    pub fn get(&self, ticker: &Ticker) -> Option<f64> {
        self.weights.get(ticker).copied()
    }

    pub fn contains(&self, ticker: &Ticker) -> bool {
        self.weights.contains_key(ticker)
    }

    pub fn tickers(&self) -> impl Iterator<Item = &Ticker> {
        self.weights.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Ticker, f64)> {
        self.weights.iter().map(|(t, w)| (t, *w))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }
}
