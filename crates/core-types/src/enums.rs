use crate::error::CoreError;
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a per-period return series is rescaled to a one-year figure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnualizationPolicy {
    /// `mean(returns) * periods_per_year`.
    #[default]
    MeanScaling,
    /// Geometric ("APY") growth: `(last / first) ^ (periods_per_year / observed) - 1`.
    Compounding,
}

impl fmt::Display for AnnualizationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnualizationPolicy::MeanScaling => write!(f, "mean_scaling"),
            AnnualizationPolicy::Compounding => write!(f, "compounding"),
        }
    }
}

impl FromStr for AnnualizationPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "mean_scaling" | "mean" => Ok(AnnualizationPolicy::MeanScaling),
            "compounding" | "apy" => Ok(AnnualizationPolicy::Compounding),
            _ => Err(CoreError::UnknownVariant {
                kind: "annualization policy",
                value: s.to_string(),
            }),
        }
    }
}

/// What the weight normalizer does when the same ticker is entered twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The later row overwrites the earlier one.
    #[default]
    LastWins,
    /// Duplicates are a validation failure.
    Reject,
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicatePolicy::LastWins => write!(f, "last_wins"),
            DuplicatePolicy::Reject => write!(f, "reject"),
        }
    }
}

impl FromStr for DuplicatePolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "last_wins" => Ok(DuplicatePolicy::LastWins),
            "reject" => Ok(DuplicatePolicy::Reject),
            _ => Err(CoreError::UnknownVariant {
                kind: "duplicate policy",
                value: s.to_string(),
            }),
        }
    }
}

/// A trailing look-back window over the price history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceWindow {
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[default]
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "5Y")]
    FiveYears,
    #[serde(rename = "Max")]
    Max,
}

impl PriceWindow {
    /// Length of the window in calendar months. `None` means unbounded.
    pub fn months(&self) -> Option<u32> {
        match self {
            PriceWindow::OneMonth => Some(1),
            PriceWindow::ThreeMonths => Some(3),
            PriceWindow::SixMonths => Some(6),
            PriceWindow::OneYear => Some(12),
            PriceWindow::FiveYears => Some(60),
            PriceWindow::Max => None,
        }
    }

    /// The first date (inclusive) covered by the window when it ends on `last`.
    pub fn start_date(&self, last: NaiveDate) -> Option<NaiveDate> {
        let months = self.months()?;
        // Going past the calendar's lower bound just means "everything".
        last.checked_sub_months(Months::new(months))
    }
}

impl fmt::Display for PriceWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PriceWindow::OneMonth => "1M",
            PriceWindow::ThreeMonths => "3M",
            PriceWindow::SixMonths => "6M",
            PriceWindow::OneYear => "1Y",
            PriceWindow::FiveYears => "5Y",
            PriceWindow::Max => "Max",
        };
        write!(f, "{label}")
    }
}

impl FromStr for PriceWindow {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1m" | "1mo" => Ok(PriceWindow::OneMonth),
            "3m" | "3mo" => Ok(PriceWindow::ThreeMonths),
            "6m" | "6mo" => Ok(PriceWindow::SixMonths),
            "1y" => Ok(PriceWindow::OneYear),
            "5y" => Ok(PriceWindow::FiveYears),
            "max" => Ok(PriceWindow::Max),
            _ => Err(CoreError::UnknownVariant {
                kind: "price window",
                value: s.to_string(),
            }),
        }
    }
}
