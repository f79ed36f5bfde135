use crate::error::{AnalyticsError, AnalyticsResult};
use crate::report::{AssetStats, LabeledMatrix, PortfolioStats};
use crate::returns::{AssetReturns, ReturnSeries};
use crate::weights::NormalizedWeights;
use core_types::{AnnualizationPolicy, Ticker};
use ndarray::{Array1, Array2};

/// Trading days in a year; the default annualization factor.
pub const TRADING_DAYS_PER_YEAR: u32 = 252;

/// A stateless calculator for per-asset and portfolio statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatisticsEngine {
    periods_per_year: u32,
    policy: AnnualizationPolicy,
}

impl Default for StatisticsEngine {
    fn default() -> Self {
        Self {
            periods_per_year: TRADING_DAYS_PER_YEAR,
            policy: AnnualizationPolicy::MeanScaling,
        }
    }
}

impl StatisticsEngine {
    pub fn new(periods_per_year: u32, policy: AnnualizationPolicy) -> AnalyticsResult<Self> {
        if periods_per_year == 0 {
            return Err(AnalyticsError::validation("periods_per_year must be greater than 0"));
        }
        Ok(Self {
            periods_per_year,
            policy,
        })
    }

    pub fn periods_per_year(&self) -> u32 {
        self.periods_per_year
    }

    pub fn policy(&self) -> AnnualizationPolicy {
        self.policy
    }

    /// The main entry point for calculating portfolio statistics.
    ///
    /// # Arguments
    ///
    /// * `returns` - Aligned periodic returns, one column per ticker.
    /// * `weights` - Decimal weights, already restricted to the tickers in `returns`.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `PortfolioStats` or an `AnalyticsError`.
    pub fn compute(&self, returns: &ReturnSeries, weights: &NormalizedWeights) -> AnalyticsResult<PortfolioStats> {
        let observations = returns.observations();
        if observations == 0 || returns.assets().is_empty() {
            return Err(AnalyticsError::InsufficientData {
                required: 1,
                available: observations,
            });
        }

        if let Some(stray) = weights.tickers().find(|t| returns.asset(t).is_none()) {
            return Err(AnalyticsError::validation(format!(
                "weight given for {stray}, which has no return series"
            )));
        }

        let ppy = f64::from(self.periods_per_year);
        let labels: Vec<Ticker> = returns.tickers().cloned().collect();
        let covariance = sample_covariance(&returns.to_matrix()).mapv(|c| c * ppy);
        let correlation = correlation_from_covariance(&covariance);

        let w: Array1<f64> = labels.iter().map(|t| weights.get(t).unwrap_or(0.0)).collect();

        let assets: Vec<AssetStats> = returns
            .assets()
            .iter()
            .enumerate()
            .map(|(j, asset)| {
                let annualized_return = self.annualized_return(asset, observations);
                AssetStats {
                    ticker: asset.ticker.clone(),
                    weight: w[j],
                    annualized_return,
                    annualized_volatility: covariance[[j, j]].sqrt(),
                    contribution: annualized_return * w[j],
                }
            })
            .collect();

        if let Some(bad) = assets
            .iter()
            .find(|a| !a.annualized_return.is_finite() || !a.annualized_volatility.is_finite())
        {
            return Err(AnalyticsError::Calculation(format!(
                "annualized {} statistics for {} are not finite (return {}, volatility {})",
                self.policy, bad.ticker, bad.annualized_return, bad.annualized_volatility
            )));
        }

        let expected_return = assets.iter().map(|a| a.contribution).sum();

        // wᵗ Σ w can come out a hair below zero in floating point.
        let variance = w.dot(&covariance.dot(&w));
        let expected_volatility = variance.max(0.0).sqrt();

        tracing::debug!(
            tickers = labels.len(),
            observations,
            expected_return,
            expected_volatility,
            "Computed portfolio statistics."
        );

        Ok(PortfolioStats {
            assets,
            expected_return,
            expected_volatility,
            correlation: LabeledMatrix::from_array(labels.clone(), &correlation),
            covariance: LabeledMatrix::from_array(labels, &covariance),
            observations,
            periods_per_year: self.periods_per_year,
            policy: self.policy,
        })
    }

    /// Annualizes one ticker's returns under the configured policy.
    pub fn annualized_return(&self, asset: &AssetReturns, observations: usize) -> f64 {
        let ppy = f64::from(self.periods_per_year);
        match self.policy {
            AnnualizationPolicy::MeanScaling => mean(&asset.returns) * ppy,
            AnnualizationPolicy::Compounding => asset.growth().powf(ppy / observations as f64) - 1.0,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample covariance (ddof = 1) of the columns of `data`.
///
/// With a single observation there is no dispersion to measure and every entry is zero.
fn sample_covariance(data: &Array2<f64>) -> Array2<f64> {
    let (rows, cols) = data.dim();
    let means: Vec<f64> = (0..cols).map(|j| data.column(j).sum() / rows as f64).collect();
    let centered = Array2::from_shape_fn((rows, cols), |(i, j)| data[[i, j]] - means[j]);
    let divisor = rows.saturating_sub(1).max(1) as f64;
    centered.t().dot(&centered).mapv(|c| c / divisor)
}

/// Pearson correlation from a covariance matrix.
///
/// Entries involving a zero-variance column are NaN, including its diagonal.
fn correlation_from_covariance(covariance: &Array2<f64>) -> Array2<f64> {
    let n = covariance.nrows();
    Array2::from_shape_fn((n, n), |(i, j)| {
        let denom = (covariance[[i, i]] * covariance[[j, j]]).sqrt();
        if denom > 0.0 {
            if i == j { 1.0 } else { (covariance[[i, j]] / denom).clamp(-1.0, 1.0) }
        } else {
            f64::NAN
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::{DuplicatePolicy, PortfolioEntry, PriceTable};
    use crate::weights::normalize;
    use approx::assert_relative_eq;

    fn ticker(s: &str) -> Ticker {
        Ticker::parse(s).unwrap()
    }

    fn prices(rows: &[(&str, &[f64])]) -> PriceTable {
        let mut table = PriceTable::new();
        for (name, closes) in rows {
            let dated = closes
                .iter()
                .enumerate()
                .map(|(i, c)| (NaiveDate::from_ymd_opt(2024, 2, 1 + i as u32).unwrap(), *c));
            table.insert_closes(&ticker(name), dated).unwrap();
        }
        table
    }

    fn weights(rows: &[(&str, f64)]) -> NormalizedWeights {
        let entries: Vec<PortfolioEntry> = rows.iter().map(|(t, w)| PortfolioEntry::new(*t, *w)).collect();
        normalize(&entries, DuplicatePolicy::LastWins).unwrap()
    }

    #[test]
    fn test_rejects_zero_periods_per_year() {
        assert!(StatisticsEngine::new(0, AnnualizationPolicy::MeanScaling).is_err());
    }

    #[test]
    fn test_mean_scaling_toy_portfolio() {
        let table = prices(&[("AAA", &[100.0, 110.0, 121.0]), ("BBB", &[50.0, 49.0, 48.0])]);
        let returns = ReturnSeries::from_prices(&table).unwrap();
        let stats = StatisticsEngine::default()
            .compute(&returns, &weights(&[("AAA", 60.0), ("BBB", 40.0)]))
            .unwrap();

        let aaa = stats.asset(&ticker("AAA")).unwrap();
        assert_relative_eq!(aaa.annualized_return, 0.10 * 252.0, epsilon = 1e-9);
        assert_relative_eq!(aaa.annualized_volatility, 0.0, epsilon = 1e-9);

        let bbb = stats.asset(&ticker("BBB")).unwrap();
        let bbb_mean = (-0.02 + (48.0 / 49.0 - 1.0)) / 2.0;
        assert_relative_eq!(bbb.annualized_return, bbb_mean * 252.0, epsilon = 1e-9);

        assert_relative_eq!(
            stats.expected_return,
            0.6 * aaa.annualized_return + 0.4 * bbb.annualized_return,
            epsilon = 1e-9
        );
        assert_relative_eq!(stats.contribution_total(), stats.expected_return, epsilon = 1e-12);
        assert!(stats.expected_volatility >= 0.0);
    }

    #[test]
    fn test_compounding_policy() {
        let table = prices(&[("AAA", &[100.0, 110.0, 121.0])]);
        let returns = ReturnSeries::from_prices(&table).unwrap();
        let engine = StatisticsEngine::new(252, AnnualizationPolicy::Compounding).unwrap();
        let stats = engine.compute(&returns, &weights(&[("AAA", 1.0)])).unwrap();

        let expected = 1.21_f64.powf(252.0 / 2.0) - 1.0;
        assert_relative_eq!(stats.assets[0].annualized_return, expected, max_relative = 1e-9);
        assert_eq!(stats.policy, AnnualizationPolicy::Compounding);
    }

    /// Inserts `(day_of_february, close)` pairs for one ticker.
    fn insert_days(table: &mut PriceTable, name: &str, closes: &[(u32, f64)]) {
        let dated = closes
            .iter()
            .map(|(d, c)| (NaiveDate::from_ymd_opt(2024, 2, *d).unwrap(), *c));
        table.insert_closes(&ticker(name), dated).unwrap();
    }

    fn one_percent_per_day(days: std::ops::RangeInclusive<u32>) -> Vec<(u32, f64)> {
        days.map(|d| (d, 100.0 * 1.01_f64.powi(d as i32 - 1))).collect()
    }

    #[test]
    fn test_compounding_uses_only_aligned_rows_when_histories_differ() {
        // BBB starts on the 3rd, so only the last two AAA returns are aligned.
        let mut table = PriceTable::new();
        insert_days(&mut table, "AAA", &one_percent_per_day(1..=5));
        insert_days(&mut table, "BBB", &[(3, 50.0), (4, 51.0), (5, 50.5)]);

        let returns = ReturnSeries::from_prices(&table).unwrap();
        assert_eq!(returns.observations(), 2);

        let engine = StatisticsEngine::new(12, AnnualizationPolicy::Compounding).unwrap();
        let stats = engine
            .compute(&returns, &weights(&[("AAA", 1.0), ("BBB", 1.0)]))
            .unwrap();

        let aaa = stats.asset(&ticker("AAA")).unwrap();
        assert_relative_eq!(aaa.annualized_return, 1.01_f64.powi(12) - 1.0, max_relative = 1e-9);
    }

    #[test]
    fn test_compounding_skips_rows_dropped_for_gaps() {
        // BBB has no close on the 3rd, which removes the 3rd and the 4th.
        let mut table = PriceTable::new();
        insert_days(&mut table, "AAA", &one_percent_per_day(1..=5));
        insert_days(&mut table, "BBB", &[(1, 20.0), (2, 20.5), (4, 21.0), (5, 20.8)]);

        let returns = ReturnSeries::from_prices(&table).unwrap();
        assert_eq!(returns.dropped_dates().len(), 2);

        let engine = StatisticsEngine::new(12, AnnualizationPolicy::Compounding).unwrap();
        let stats = engine
            .compute(&returns, &weights(&[("AAA", 1.0), ("BBB", 1.0)]))
            .unwrap();

        let aaa = stats.asset(&ticker("AAA")).unwrap();
        assert_relative_eq!(aaa.annualized_return, 1.01_f64.powi(12) - 1.0, max_relative = 1e-9);
        let bbb = stats.asset(&ticker("BBB")).unwrap();
        let bbb_growth: f64 = (20.5 / 20.0) * (20.8 / 21.0);
        assert_relative_eq!(bbb.annualized_return, bbb_growth.powi(6) - 1.0, max_relative = 1e-9);
    }

    #[test]
    fn test_overflowing_annualization_is_a_calculation_error() {
        let table = prices(&[("AAA", &[1.0, 1000.0, 1_000_000.0])]);
        let returns = ReturnSeries::from_prices(&table).unwrap();
        let engine = StatisticsEngine::new(252, AnnualizationPolicy::Compounding).unwrap();

        let result = engine.compute(&returns, &weights(&[("AAA", 1.0)]));
        assert!(matches!(result, Err(AnalyticsError::Calculation(msg)) if msg.contains("AAA")));
    }

    #[test]
    fn test_volatility_and_covariance_scaling() {
        let table = prices(&[("AAA", &[100.0, 101.0, 99.0, 102.0, 100.0])]);
        let returns = ReturnSeries::from_prices(&table).unwrap();
        let stats = StatisticsEngine::default()
            .compute(&returns, &weights(&[("AAA", 1.0)]))
            .unwrap();

        let r = &returns.assets()[0].returns;
        let m = r.iter().sum::<f64>() / r.len() as f64;
        let var = r.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (r.len() - 1) as f64;

        let aaa = ticker("AAA");
        assert_relative_eq!(stats.covariance.get(&aaa, &aaa).unwrap(), var * 252.0, max_relative = 1e-12);
        assert_relative_eq!(
            stats.assets[0].annualized_volatility,
            var.sqrt() * 252f64.sqrt(),
            max_relative = 1e-12
        );
        assert_eq!(stats.correlation.get(&aaa, &aaa), Some(1.0));
    }

    #[test]
    fn test_single_ticker_portfolio_matches_asset() {
        let table = prices(&[("SPY", &[400.0, 404.0, 398.0, 405.0, 410.0, 407.0])]);
        let returns = ReturnSeries::from_prices(&table).unwrap();
        let stats = StatisticsEngine::default()
            .compute(&returns, &weights(&[("SPY", 100.0)]))
            .unwrap();

        assert_eq!(stats.correlation.size(), 1);
        assert_eq!(stats.covariance.size(), 1);
        assert_eq!(stats.expected_return, stats.assets[0].annualized_return);
        assert_eq!(stats.expected_volatility, stats.assets[0].annualized_volatility);
    }

    #[test]
    fn test_correlation_is_symmetric_with_unit_diagonal() {
        let table = prices(&[
            ("AAA", &[10.0, 11.0, 10.5, 11.5, 12.0]),
            ("BBB", &[20.0, 19.0, 19.5, 18.0, 18.5]),
            ("CCC", &[5.0, 5.1, 5.3, 5.2, 5.6]),
        ]);
        let returns = ReturnSeries::from_prices(&table).unwrap();
        let stats = StatisticsEngine::default()
            .compute(&returns, &weights(&[("AAA", 1.0), ("BBB", 1.0), ("CCC", 1.0)]))
            .unwrap();

        let labels = stats.correlation.labels.clone();
        for a in &labels {
            assert_eq!(stats.correlation.get(a, a), Some(1.0));
            for b in &labels {
                let ab = stats.correlation.get(a, b).unwrap();
                let ba = stats.correlation.get(b, a).unwrap();
                assert_relative_eq!(ab, ba, epsilon = 1e-12);
                assert!((-1.0..=1.0).contains(&ab));
            }
        }
    }

    #[test]
    fn test_perfectly_hedged_pair_has_zero_volatility() {
        // BBB's returns are the exact negative of AAA's, so an equal split cancels out.
        let table = prices(&[("AAA", &[100.0, 110.0, 99.0]), ("BBB", &[100.0, 90.0, 99.0])]);
        let returns = ReturnSeries::from_prices(&table).unwrap();
        let stats = StatisticsEngine::default()
            .compute(&returns, &weights(&[("AAA", 50.0), ("BBB", 50.0)]))
            .unwrap();

        assert_relative_eq!(
            stats.correlation.get(&ticker("AAA"), &ticker("BBB")).unwrap(),
            -1.0,
            epsilon = 1e-9
        );
        assert!(stats.expected_volatility >= 0.0);
        assert!(stats.expected_volatility < 1e-6);
    }

    #[test]
    fn test_single_observation_has_zero_variance_and_nan_correlation() {
        let table = prices(&[("AAA", &[10.0, 11.0])]);
        let returns = ReturnSeries::from_prices_with_min(&table, 1).unwrap();
        let stats = StatisticsEngine::default()
            .compute(&returns, &weights(&[("AAA", 1.0)]))
            .unwrap();

        let aaa = ticker("AAA");
        assert_eq!(stats.observations, 1);
        assert_eq!(stats.covariance.get(&aaa, &aaa), Some(0.0));
        assert!(stats.correlation.get(&aaa, &aaa).unwrap().is_nan());
        assert_eq!(stats.expected_volatility, 0.0);
        assert_relative_eq!(stats.expected_return, 0.1 * 252.0, epsilon = 1e-9);
    }

    #[test]
    fn test_weight_for_unknown_ticker_is_rejected() {
        let table = prices(&[("AAA", &[1.0, 2.0, 3.0])]);
        let returns = ReturnSeries::from_prices(&table).unwrap();
        let result = StatisticsEngine::default().compute(&returns, &weights(&[("AAA", 1.0), ("ZZZ", 1.0)]));
        assert!(matches!(result, Err(AnalyticsError::Validation(msg)) if msg.contains("ZZZ")));
    }
}
