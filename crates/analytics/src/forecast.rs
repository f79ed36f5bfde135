use crate::error::{AnalyticsError, AnalyticsResult};
use core_types::MAX_HORIZON_YEARS;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use serde::Serialize;

/// Projected portfolio value at the end of a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ForecastPoint {
    pub month: u32,
    pub value: Decimal,
}

/// A deterministic month-by-month projection. Point 0 is the starting value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSeries {
    pub annual_rate: f64,
    pub monthly_rate: f64,
    pub monthly_contribution: Decimal,
    pub points: Vec<ForecastPoint>,
}

impl ForecastSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn starting_value(&self) -> Decimal {
        self.points.first().map(|p| p.value).unwrap_or_default()
    }

    pub fn final_value(&self) -> Decimal {
        self.points.last().map(|p| p.value).unwrap_or_default()
    }

    /// Money added over the horizon, excluding the starting value.
    pub fn total_contributions(&self) -> Decimal {
        let months = self.points.len().saturating_sub(1);
        self.monthly_contribution * Decimal::from(months)
    }

    /// Month 0 and every year-end point, for a compact yearly view.
    pub fn yearly(&self) -> Vec<ForecastPoint> {
        self.points.iter().filter(|p| p.month % 12 == 0).copied().collect()
    }
}

/// Converts an annual rate to the equivalent geometric monthly rate.
///
/// Rates at or below -100% clamp to -1, since a fractional power of a
/// non-positive base is undefined.
pub fn monthly_rate(annual_rate: f64) -> f64 {
    if annual_rate <= -1.0 {
        -1.0
    } else {
        (1.0 + annual_rate).powf(1.0 / 12.0) - 1.0
    }
}

/// Projects `starting_value` forward `horizon_years` years.
///
/// Each month the value grows by the monthly rate and then receives the contribution:
/// `value[t] = value[t-1] * (1 + monthly_rate) + monthly_contribution`.
pub fn forecast(
    starting_value: Decimal,
    monthly_contribution: Decimal,
    annual_rate: f64,
    horizon_years: u32,
) -> AnalyticsResult<ForecastSeries> {
    if !annual_rate.is_finite() {
        return Err(AnalyticsError::validation(format!(
            "annual rate must be a finite number, got {annual_rate}"
        )));
    }
    if horizon_years > MAX_HORIZON_YEARS {
        return Err(AnalyticsError::validation(format!(
            "horizon of {horizon_years} years exceeds the {MAX_HORIZON_YEARS}-year limit"
        )));
    }
    let months = horizon_years * 12;

    let rate = monthly_rate(annual_rate);
    let growth = Decimal::ONE
        + Decimal::from_f64(rate)
            .ok_or_else(|| AnalyticsError::Calculation(format!("monthly rate {rate} is not representable")))?;

    let mut points = Vec::with_capacity(months as usize + 1);
    let mut value = starting_value;
    points.push(ForecastPoint { month: 0, value });

    for month in 1..=months {
        value = value
            .checked_mul(growth)
            .and_then(|v| v.checked_add(monthly_contribution))
            .ok_or_else(|| AnalyticsError::Calculation(format!("forecast value overflowed at month {month}")))?;
        points.push(ForecastPoint { month, value });
    }

    tracing::debug!(months, monthly_rate = rate, final_value = %value, "Projected forecast.");

    Ok(ForecastSeries {
        annual_rate,
        monthly_rate: rate,
        monthly_contribution,
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_monthly_rate_compounds_back_to_annual() {
        let rate = monthly_rate(0.08);
        assert_relative_eq!((1.0 + rate).powi(12) - 1.0, 0.08, epsilon = 1e-12);
        assert_eq!(monthly_rate(0.0), 0.0);
        assert_eq!(monthly_rate(-1.0), -1.0);
        assert_eq!(monthly_rate(-1.5), -1.0);
    }

    #[test]
    fn test_series_shape() {
        let series = forecast(dec!(10000), dec!(500), 0.07, 10).unwrap();
        assert_eq!(series.len(), 121);
        assert_eq!(series.starting_value(), dec!(10000));
        assert_eq!(series.points[120].month, 120);
        assert_eq!(series.yearly().len(), 11);
        assert_eq!(series.total_contributions(), dec!(60000));
    }

    #[test]
    fn test_zero_rate_only_adds_contributions() {
        let series = forecast(dec!(1000), dec!(100), 0.0, 2).unwrap();
        assert_eq!(series.final_value(), dec!(3400));
        assert_eq!(series.points[1].value, dec!(1100));
    }

    #[test]
    fn test_zero_horizon_is_just_the_start() {
        let series = forecast(dec!(250.50), dec!(10), 0.05, 0).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.final_value(), dec!(250.50));
    }

    #[test]
    fn test_total_loss_clamps_and_keeps_contributions() {
        let series = forecast(dec!(10000), dec!(250), -1.5, 1).unwrap();
        assert_eq!(series.monthly_rate, -1.0);
        assert_eq!(series.points[0].value, dec!(10000));
        for point in &series.points[1..] {
            assert_eq!(point.value, dec!(250));
        }

        let no_contribution = forecast(dec!(10000), Decimal::ZERO, -1.0, 1).unwrap();
        assert!(no_contribution.points[1..].iter().all(|p| p.value.is_zero()));
    }

    #[test]
    fn test_growth_matches_closed_form_without_contributions() {
        let series = forecast(dec!(1000), Decimal::ZERO, 0.10, 3).unwrap();
        let final_value = series.final_value().to_f64().unwrap();
        assert_relative_eq!(final_value, 1000.0 * 1.1_f64.powi(3), max_relative = 1e-9);
    }

    #[test]
    fn test_horizon_is_capped() {
        assert_eq!(forecast(dec!(1), dec!(1), 0.05, MAX_HORIZON_YEARS).unwrap().len(), 1201);
        assert!(matches!(
            forecast(dec!(1), dec!(1), 0.05, 300_000_000),
            Err(AnalyticsError::Validation(_))
        ));
    }

    #[test]
    fn test_non_finite_rate_is_rejected() {
        assert!(matches!(
            forecast(dec!(1), dec!(1), f64::NAN, 1),
            Err(AnalyticsError::Validation(_))
        ));
        assert!(matches!(
            forecast(dec!(1), dec!(1), f64::INFINITY, 1),
            Err(AnalyticsError::Validation(_))
        ));
    }
}
