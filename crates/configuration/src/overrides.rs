use crate::settings::Config;
use core_types::{AnnualizationPolicy, DuplicatePolicy, PriceWindow};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Command-line flags that take precedence over the configuration file.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct Overrides {
    /// Price history file (long-format CSV: date,ticker,open,close).
    #[arg(long)]
    pub prices: Option<PathBuf>,

    /// Trailing price window: 1M, 3M, 6M, 1Y, 5Y or Max.
    #[arg(long)]
    pub window: Option<PriceWindow>,

    /// Annualization policy: mean_scaling or compounding.
    #[arg(long)]
    pub policy: Option<AnnualizationPolicy>,

    /// Return periods per year.
    #[arg(long)]
    pub periods_per_year: Option<u32>,

    /// Fewest aligned return rows required.
    #[arg(long)]
    pub min_observations: Option<usize>,

    /// What to do with repeated tickers: last_wins or reject.
    #[arg(long)]
    pub duplicates: Option<DuplicatePolicy>,

    /// Starting portfolio value for the forecast.
    #[arg(long)]
    pub starting_value: Option<Decimal>,

    /// Amount added every month in the forecast.
    #[arg(long)]
    pub monthly_contribution: Option<Decimal>,

    /// Forecast horizon in years.
    #[arg(long)]
    pub years: Option<u32>,
}

impl Overrides {
    /// Copies every flag that was given onto `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(path) = &self.prices {
            config.data.prices_path = path.clone();
        }
        if let Some(window) = self.window {
            config.analysis.window = window;
        }
        if let Some(policy) = self.policy {
            config.analysis.annualization = policy;
        }
        if let Some(periods) = self.periods_per_year {
            config.analysis.periods_per_year = periods;
        }
        if let Some(min) = self.min_observations {
            config.analysis.min_observations = min;
        }
        if let Some(duplicates) = self.duplicates {
            config.analysis.duplicate_tickers = duplicates;
        }
        if let Some(value) = self.starting_value {
            config.forecast.starting_value = value;
        }
        if let Some(value) = self.monthly_contribution {
            config.forecast.monthly_contribution = value;
        }
        if let Some(years) = self.years {
            config.forecast.horizon_years = years;
        }
    }
}
