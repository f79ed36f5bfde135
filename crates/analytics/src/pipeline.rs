use crate::engine::{StatisticsEngine, TRADING_DAYS_PER_YEAR};
use crate::error::AnalyticsResult;
use crate::report::PortfolioStats;
use crate::returns::{MIN_OBSERVATIONS, ReturnSeries};
use crate::summary::{PriceSummary, summarize_prices};
use crate::weights::NormalizedWeights;
use chrono::NaiveDate;
use core_types::{AnnualizationPolicy, DuplicatePolicy, PortfolioEntry, PriceTable, PriceWindow, Ticker};
use serde::{Deserialize, Serialize};

/// Knobs for one run of the analysis pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    pub periods_per_year: u32,
    pub policy: AnnualizationPolicy,
    pub window: PriceWindow,
    pub min_observations: usize,
    pub duplicates: DuplicatePolicy,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            periods_per_year: TRADING_DAYS_PER_YEAR,
            policy: AnnualizationPolicy::default(),
            window: PriceWindow::default(),
            min_observations: MIN_OBSERVATIONS,
            duplicates: DuplicatePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// The data source returned nothing for the ticker.
    NoPriceData,
    /// The ticker has history, but none of it falls inside the selected window.
    OutsideWindow,
}

/// A ticker the user asked for that did not make it into the statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exclusion {
    pub ticker: Ticker,
    pub reason: ExclusionReason,
}

/// Everything the host needs to render one analysis request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioAnalysis {
    pub options: AnalysisOptions,
    /// Weights from the user's input, before intersecting with price data.
    pub requested: NormalizedWeights,
    /// Weights actually used, rescaled over the tickers that have prices.
    pub weights: NormalizedWeights,
    pub stats: PortfolioStats,
    pub excluded: Vec<Exclusion>,
    /// Return dates removed because some ticker had a gap.
    pub dropped_dates: Vec<NaiveDate>,
    pub prices: Vec<PriceSummary>,
}

/// Runs normalize → window → restrict → returns → statistics.
///
/// `unavailable` lists tickers the price source reported it could not serve;
/// they are excluded as `NoPriceData` whatever `prices` holds. Other tickers
/// without usable prices are excluded and reported too. The call only fails
/// when nothing usable is left.
pub fn analyze(
    entries: &[PortfolioEntry],
    prices: &PriceTable,
    unavailable: &[Ticker],
    options: &AnalysisOptions,
) -> AnalyticsResult<PortfolioAnalysis> {
    let engine = StatisticsEngine::new(options.periods_per_year, options.policy)?;

    let requested = NormalizedWeights::normalize(entries, options.duplicates)?;
    tracing::info!(tickers = requested.len(), window = %options.window, "Analyzing portfolio.");

    let windowed = prices.trailing(options.window);
    let (weights, dropped) = requested.restrict_to(|t| windowed.contains(t) && !unavailable.contains(t))?;

    let excluded: Vec<Exclusion> = dropped
        .into_iter()
        .map(|ticker| {
            let reason = if unavailable.contains(&ticker) || !prices.contains(&ticker) {
                ExclusionReason::NoPriceData
            } else {
                ExclusionReason::OutsideWindow
            };
            tracing::warn!(%ticker, ?reason, "Excluding ticker from analysis.");
            Exclusion { ticker, reason }
        })
        .collect();

    let table = windowed.restrict(weights.tickers());
    let returns = ReturnSeries::from_prices_with_min(&table, options.min_observations)?;
    let stats = engine.compute(&returns, &weights)?;

    tracing::info!(
        observations = stats.observations,
        expected_return = stats.expected_return,
        expected_volatility = stats.expected_volatility,
        "Portfolio analysis complete."
    );

    Ok(PortfolioAnalysis {
        options: *options,
        requested,
        weights,
        stats,
        excluded,
        dropped_dates: returns.dropped_dates().to_vec(),
        prices: summarize_prices(&table),
    })
}
