use crate::error::ConfigError;
use core_types::{AnnualizationPolicy, DuplicatePolicy, MAX_HORIZON_YEARS, PortfolioEntry, PriceWindow};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so an empty file (or no file) is a valid config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisSettings,
    pub forecast: ForecastSettings,
    pub data: DataSettings,
    /// The portfolio as `[[portfolio]]` rows of `ticker` / `weight_percent`.
    pub portfolio: Vec<PortfolioEntry>,
}

/// Contains parameters for the statistics pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Return periods per year; 252 for daily trading data.
    pub periods_per_year: u32,
    pub annualization: AnnualizationPolicy,
    /// Trailing price window ("1M", "3M", "6M", "1Y", "5Y", "Max").
    pub window: PriceWindow,
    /// Fewest aligned return rows accepted before statistics are computed.
    pub min_observations: usize,
    pub duplicate_tickers: DuplicatePolicy,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            periods_per_year: 252,
            annualization: AnnualizationPolicy::MeanScaling,
            window: PriceWindow::OneYear,
            min_observations: 2,
            duplicate_tickers: DuplicatePolicy::LastWins,
        }
    }
}

/// Contains parameters for the deterministic value projection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    pub starting_value: Decimal,
    pub monthly_contribution: Decimal,
    pub horizon_years: u32,
    /// Fixed annual growth rate. When absent, the portfolio's expected return is used.
    pub annual_rate: Option<f64>,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            starting_value: dec!(10000),
            monthly_contribution: dec!(500),
            horizon_years: 10,
            annual_rate: None,
        }
    }
}

/// Where price history is read from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub prices_path: PathBuf,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            prices_path: PathBuf::from("data/sample_prices.csv"),
        }
    }
}

impl Config {
    /// Rejects values the calculations cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analysis.periods_per_year == 0 {
            return Err(ConfigError::ValidationError(
                "analysis.periods_per_year must be greater than 0".to_string(),
            ));
        }
        if self.analysis.min_observations == 0 {
            return Err(ConfigError::ValidationError(
                "analysis.min_observations must be at least 1".to_string(),
            ));
        }
        if self.forecast.horizon_years > MAX_HORIZON_YEARS {
            return Err(ConfigError::ValidationError(format!(
                "forecast.horizon_years must be at most {MAX_HORIZON_YEARS}, got {}",
                self.forecast.horizon_years
            )));
        }
        if let Some(rate) = self.forecast.annual_rate {
            if !rate.is_finite() {
                return Err(ConfigError::ValidationError(format!(
                    "forecast.annual_rate must be a finite number, got {rate}"
                )));
            }
        }
        Ok(())
    }
}
