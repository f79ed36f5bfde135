use analytics::{Exclusion, ExclusionReason, ForecastSeries, LabeledMatrix, PortfolioAnalysis, PriceSummary};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use rust_decimal::Decimal;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn number(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

fn percent(value: f64) -> String {
    if value.is_finite() {
        format!("{:.2}%", value * 100.0)
    } else {
        "n/a".to_string()
    }
}

fn ratio(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.4}")
    } else {
        "n/a".to_string()
    }
}

fn money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

/// Per-holding weights and annualized figures, closed by a portfolio row.
pub fn holdings_table(analysis: &PortfolioAnalysis) -> Table {
    let mut table = new_table(vec!["Ticker", "Weight", "Return", "Volatility", "Contribution"]);
    for asset in &analysis.stats.assets {
        table.add_row(vec![
            Cell::new(asset.ticker.as_str()),
            number(percent(asset.weight)),
            number(percent(asset.annualized_return)),
            number(percent(asset.annualized_volatility)),
            number(percent(asset.contribution)),
        ]);
    }
    table.add_row(vec![
        Cell::new("Portfolio"),
        number(percent(analysis.weights.total())),
        number(percent(analysis.stats.expected_return)),
        number(percent(analysis.stats.expected_volatility)),
        number(percent(analysis.stats.contribution_total())),
    ]);
    table
}

/// A ticker-by-ticker matrix, formatted with `format`.
pub fn matrix_table(matrix: &LabeledMatrix, format: fn(f64) -> String) -> Table {
    let mut header = vec![""];
    header.extend(matrix.labels.iter().map(|t| t.as_str()));
    let mut table = new_table(header);

    for (label, row) in matrix.labels.iter().zip(&matrix.values) {
        let mut cells = vec![Cell::new(label.as_str())];
        cells.extend(row.iter().map(|v| number(format(*v))));
        table.add_row(cells);
    }
    table
}

pub fn correlation_table(matrix: &LabeledMatrix) -> Table {
    matrix_table(matrix, ratio)
}

pub fn covariance_table(matrix: &LabeledMatrix) -> Table {
    matrix_table(matrix, |v| format!("{v:.6}"))
}

pub fn exclusions_table(excluded: &[Exclusion]) -> Table {
    let mut table = new_table(vec!["Ticker", "Reason"]);
    for exclusion in excluded {
        let reason = match exclusion.reason {
            ExclusionReason::NoPriceData => "no price data",
            ExclusionReason::OutsideWindow => "no prices inside the window",
        };
        table.add_row(vec![exclusion.ticker.as_str(), reason]);
    }
    table
}

pub fn prices_table(summaries: &[PriceSummary]) -> Table {
    let mut table = new_table(vec!["Ticker", "From", "To", "First close", "Last open", "Last close", "Change", "Days"]);
    for summary in summaries {
        table.add_row(vec![
            Cell::new(summary.ticker.as_str()),
            Cell::new(summary.first_date),
            Cell::new(summary.last_date),
            number(format!("{:.2}", summary.first_close)),
            number(summary.last_open.map(|o| format!("{o:.2}")).unwrap_or_else(|| "-".to_string())),
            number(format!("{:.2}", summary.last_close)),
            number(percent(summary.period_return)),
            number(summary.observations.to_string()),
        ]);
    }
    table
}

/// Year-end values of a projection.
pub fn forecast_table(series: &ForecastSeries) -> Table {
    let mut table = new_table(vec!["Year", "Value", "Contributed"]);
    let start = series.starting_value();
    for point in series.yearly() {
        let contributed = start + series.monthly_contribution * Decimal::from(point.month);
        table.add_row(vec![
            number((point.month / 12).to_string()),
            number(money(point.value)),
            number(money(contributed)),
        ]);
    }
    table
}

pub fn forecast_summary(series: &ForecastSeries) -> String {
    format!(
        "Annual rate {} (monthly {}), {} months: {} -> {} with {} contributed.",
        percent(series.annual_rate),
        percent(series.monthly_rate),
        series.len().saturating_sub(1),
        money(series.starting_value()),
        money(series.final_value()),
        money(series.total_contributions()),
    )
}
