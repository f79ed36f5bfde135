use core_types::{AnnualizationPolicy, Ticker};
use ndarray::Array2;
use serde::Serialize;

/// A square matrix whose rows and columns are both indexed by ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledMatrix {
    pub labels: Vec<Ticker>,
    pub values: Vec<Vec<f64>>,
}

impl LabeledMatrix {
    pub(crate) fn from_array(labels: Vec<Ticker>, array: &Array2<f64>) -> Self {
        let values = array.outer_iter().map(|row| row.to_vec()).collect();
        Self { labels, values }
    }

    pub fn get(&self, row: &Ticker, col: &Ticker) -> Option<f64> {
        let i = self.labels.iter().position(|t| t == row)?;
        let j = self.labels.iter().position(|t| t == col)?;
        Some(self.values[i][j])
    }

    pub fn size(&self) -> usize {
        self.labels.len()
    }
}

/// Annualized figures for one holding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetStats {
    pub ticker: Ticker,
    pub weight: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    /// `annualized_return * weight`; these sum to the portfolio's expected return.
    pub contribution: f64,
}

/// Per-asset and portfolio-level statistics computed from one return series.
///
/// This is the output of the `StatisticsEngine`. It is a plain value: nothing
/// is formatted and nothing is cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioStats {
    pub assets: Vec<AssetStats>,
    pub expected_return: f64,
    pub expected_volatility: f64,
    pub correlation: LabeledMatrix,
    /// Sample covariance scaled by `periods_per_year`.
    pub covariance: LabeledMatrix,
    pub observations: usize,
    pub periods_per_year: u32,
    pub policy: AnnualizationPolicy,
}

impl PortfolioStats {
    pub fn asset(&self, ticker: &Ticker) -> Option<&AssetStats> {
        self.assets.iter().find(|a| &a.ticker == ticker)
    }

    /// Sum of the per-asset contributions.
    pub fn contribution_total(&self) -> f64 {
        self.assets.iter().map(|a| a.contribution).sum()
    }
}
